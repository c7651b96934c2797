//! HTTP handlers for people.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    person::{Person, PersonId, create_person, delete_person, get_all_people, get_person, update_person},
};

/// The client's description of a person, for create and update.
#[derive(Debug, Deserialize)]
pub struct PersonPayload {
    /// The person's display name.
    pub name: String,
}

impl PersonPayload {
    fn validated_name(&self) -> Result<&str, Error> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        Ok(name)
    }
}

/// Route handler for listing people.
pub async fn list_people_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<Person>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_people(&connection).map(Json)
}

/// Route handler for retrieving a single person.
pub async fn get_person_endpoint(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
) -> Result<Json<Person>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_person(person_id, &connection).map(Json)
}

/// Route handler for creating a person.
pub async fn create_person_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<PersonPayload>,
) -> Result<(StatusCode, Json<Person>), Error> {
    let name = payload.validated_name()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let person = create_person(name, &connection)?;

    Ok((StatusCode::CREATED, Json(person)))
}

/// Route handler for renaming a person.
pub async fn update_person_endpoint(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
    Json(payload): Json<PersonPayload>,
) -> Result<Json<Person>, Error> {
    let name = payload.validated_name()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_person(person_id, name, &connection)?;

    get_person(person_id, &connection).map(Json)
}

/// Route handler for deleting a person.
pub async fn delete_person_endpoint(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_person(person_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
