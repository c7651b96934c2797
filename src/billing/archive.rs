//! Archived statement documents for credit cards.
//!
//! Stores metadata for uploaded statement PDFs. The files themselves live in
//! the upload directory under [Statement::stored_name].

use rusqlite::{Connection, Row, named_params};
use serde::Serialize;
use time::Date;

use crate::{Error, payment_method::PaymentMethodId};

/// An alias for the statement database ID.
pub type StatementId = i64;

/// Metadata for an archived statement PDF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// The ID of the statement in the database.
    pub id: StatementId,
    /// The credit card the statement belongs to.
    pub payment_method_id: PaymentMethodId,
    /// The date the statement was issued.
    pub statement_date: Date,
    /// The first day of the period the statement covers.
    pub period_start: Date,
    /// The last day of the period the statement covers.
    pub period_end: Date,
    /// The filename the document was uploaded with.
    pub filename: String,
    /// The size of the document in bytes.
    pub size_bytes: i64,
    /// The MIME type the document was uploaded with.
    pub mime_type: String,
    /// The name of the file on disk.
    #[serde(skip_serializing)]
    pub stored_name: String,
}

/// Create the statement table in the database at `connection`.
pub fn create_statement_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS statement (
            id INTEGER PRIMARY KEY,
            payment_method_id INTEGER NOT NULL,
            statement_date TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            filename TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            mime_type TEXT NOT NULL,
            stored_name TEXT NOT NULL,
            FOREIGN KEY(payment_method_id) REFERENCES payment_method(id) ON DELETE CASCADE
        );",
        (),
    )?;

    Ok(())
}

fn map_statement_row(row: &Row) -> Result<Statement, rusqlite::Error> {
    Ok(Statement {
        id: row.get(0)?,
        payment_method_id: row.get(1)?,
        statement_date: row.get(2)?,
        period_start: row.get(3)?,
        period_end: row.get(4)?,
        filename: row.get(5)?,
        size_bytes: row.get(6)?,
        mime_type: row.get(7)?,
        stored_name: row.get(8)?,
    })
}

/// Record an archived statement in the database at `connection`.
#[allow(clippy::too_many_arguments)]
pub fn insert_statement(
    payment_method_id: PaymentMethodId,
    statement_date: Date,
    period_start: Date,
    period_end: Date,
    filename: &str,
    size_bytes: i64,
    mime_type: &str,
    stored_name: &str,
    connection: &Connection,
) -> Result<Statement, Error> {
    connection
        .execute(
            "INSERT INTO statement (payment_method_id, statement_date, period_start, period_end,
                 filename, size_bytes, mime_type, stored_name)
             VALUES (:payment_method_id, :statement_date, :period_start, :period_end,
                 :filename, :size_bytes, :mime_type, :stored_name)",
            named_params! {
                ":payment_method_id": payment_method_id,
                ":statement_date": statement_date,
                ":period_start": period_start,
                ":period_end": period_end,
                ":filename": filename,
                ":size_bytes": size_bytes,
                ":mime_type": mime_type,
                ":stored_name": stored_name,
            },
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidPaymentMethod
            }
            error => error.into(),
        })?;

    Ok(Statement {
        id: connection.last_insert_rowid(),
        payment_method_id,
        statement_date,
        period_start,
        period_end,
        filename: filename.to_owned(),
        size_bytes,
        mime_type: mime_type.to_owned(),
        stored_name: stored_name.to_owned(),
    })
}

/// Retrieve the archived statements for a payment method, newest first.
pub fn get_statements(
    payment_method_id: PaymentMethodId,
    connection: &Connection,
) -> Result<Vec<Statement>, Error> {
    connection
        .prepare(
            "SELECT id, payment_method_id, statement_date, period_start, period_end,
                 filename, size_bytes, mime_type, stored_name
             FROM statement
             WHERE payment_method_id = :payment_method_id
             ORDER BY statement_date DESC, id DESC;",
        )?
        .query_map(
            named_params! { ":payment_method_id": payment_method_id },
            map_statement_row,
        )?
        .map(|maybe_statement| maybe_statement.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single archived statement by its ID.
pub fn get_statement(id: StatementId, connection: &Connection) -> Result<Statement, Error> {
    connection
        .prepare(
            "SELECT id, payment_method_id, statement_date, period_start, period_end,
                 filename, size_bytes, mime_type, stored_name
             FROM statement WHERE id = :id;",
        )?
        .query_row(named_params! { ":id": id }, map_statement_row)
        .map_err(|error| error.into())
}
