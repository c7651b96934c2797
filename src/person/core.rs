use rusqlite::Row;
use serde::Serialize;

/// An alias for the person database ID.
pub type PersonId = i64;

/// A household member that expenses can be allocated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// The ID of the person in the database.
    pub id: PersonId,
    /// The person's display name. Unique.
    pub name: String,
}

/// Create the person table in the database at `connection`.
pub fn create_person_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS person (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_person_row(row: &Row) -> Result<Person, rusqlite::Error> {
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
