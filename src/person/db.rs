//! Database functions for people.

use rusqlite::Connection;

use crate::{
    Error,
    person::core::{Person, PersonId, map_person_row},
};

/// Create a person in the database at `connection`.
///
/// # Errors
/// Returns [Error::DuplicatePersonName] if a person named `name` already
/// exists.
pub fn create_person(name: &str, connection: &Connection) -> Result<Person, Error> {
    connection
        .execute("INSERT INTO person (name) VALUES (?1)", [name])
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicatePersonName(name.to_owned())
            }
            error => error.into(),
        })?;

    Ok(Person {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
    })
}

/// Retrieve a person by their ID.
pub fn get_person(id: PersonId, connection: &Connection) -> Result<Person, Error> {
    connection
        .prepare("SELECT id, name FROM person WHERE id = :id;")?
        .query_row(&[(":id", &id)], map_person_row)
        .map_err(|error| error.into())
}

/// Retrieve all people, ordered by name.
pub fn get_all_people(connection: &Connection) -> Result<Vec<Person>, Error> {
    connection
        .prepare("SELECT id, name FROM person ORDER BY name ASC;")?
        .query_map([], map_person_row)?
        .map(|maybe_person| maybe_person.map_err(|error| error.into()))
        .collect()
}

/// Rename a person.
pub fn update_person(id: PersonId, name: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute("UPDATE person SET name = ?1 WHERE id = ?2", (name, id))
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicatePersonName(name.to_owned())
            }
            error => Error::from(error),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingPerson);
    }

    Ok(())
}

/// Delete a person. Their expense allocations are deleted with them.
pub fn delete_person(id: PersonId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM person WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPerson);
    }

    Ok(())
}
