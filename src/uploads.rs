//! Disk storage for uploaded invoice and statement PDFs.
//!
//! Only file metadata lives in SQLite; the bytes are written to the upload
//! directory under a generated name so user-supplied filenames never touch
//! the filesystem.

use std::path::Path;

use time::OffsetDateTime;

use crate::Error;

/// Generate a unique name to store an uploaded file under.
///
/// The name combines a caller-provided prefix with a nanosecond timestamp, so
/// two uploads never collide in practice.
pub fn generate_stored_name(prefix: &str) -> String {
    format!(
        "{}-{}.pdf",
        prefix,
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    )
}

/// Write uploaded `bytes` to `stored_name` inside `upload_dir`.
///
/// # Errors
/// Returns [Error::FileStorage] if the file cannot be written.
pub fn save_upload(upload_dir: &Path, stored_name: &str, bytes: &[u8]) -> Result<(), Error> {
    std::fs::write(upload_dir.join(stored_name), bytes)
        .map_err(|error| Error::FileStorage(error.to_string()))
}

/// Read a previously stored upload back from disk.
///
/// # Errors
/// Returns [Error::NotFound] if the file is missing, or [Error::FileStorage]
/// for any other I/O error.
pub fn read_upload(upload_dir: &Path, stored_name: &str) -> Result<Vec<u8>, Error> {
    std::fs::read(upload_dir.join(stored_name)).map_err(|error| match error.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound,
        _ => Error::FileStorage(error.to_string()),
    })
}

/// Delete a stored upload, ignoring files that are already gone.
///
/// # Errors
/// Returns [Error::FileStorage] for I/O errors other than the file missing.
pub fn remove_upload(upload_dir: &Path, stored_name: &str) -> Result<(), Error> {
    match std::fs::remove_file(upload_dir.join(stored_name)) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(Error::FileStorage(error.to_string())),
    }
}
