//! Implements a struct that holds the state of the REST server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The directory where uploaded invoice and statement PDFs are stored.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the
    /// domain models. `upload_dir` should be a writable directory; it is
    /// created if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the upload
    /// directory cannot be created.
    pub fn new(db_connection: Connection, upload_dir: PathBuf) -> Result<Self, Error> {
        initialize(&db_connection)?;

        std::fs::create_dir_all(&upload_dir)
            .map_err(|error| Error::FileStorage(error.to_string()))?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            upload_dir,
        })
    }
}
