//! Invoice PDF metadata attached to expenses.
//!
//! The file content is stored on disk by [crate::uploads]; this table only
//! holds the pointer. An expense has at most one invoice.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{Error, expense::ExpenseId};

/// The stored metadata for an uploaded invoice PDF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    /// The ID of the invoice.
    pub id: i64,
    /// The expense the invoice belongs to.
    pub expense_id: ExpenseId,
    /// The filename the client uploaded, used for downloads.
    pub filename: String,
    /// The file size in bytes.
    pub size_bytes: i64,
    /// The MIME type the client uploaded.
    pub mime_type: String,
    /// The name the file is stored under in the upload directory.
    #[serde(skip_serializing)]
    pub stored_name: String,
}

/// Create the invoice table if it does not exist.
pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY,
            expense_id INTEGER NOT NULL UNIQUE,
            filename TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            mime_type TEXT NOT NULL,
            stored_name TEXT NOT NULL,
            FOREIGN KEY(expense_id) REFERENCES expense(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_invoice_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        expense_id: row.get(1)?,
        filename: row.get(2)?,
        size_bytes: row.get(3)?,
        mime_type: row.get(4)?,
        stored_name: row.get(5)?,
    })
}

/// Insert or replace the invoice metadata for an expense.
///
/// Re-uploading replaces the previous invoice row; the caller is responsible
/// for removing the superseded file from disk.
pub fn insert_invoice(
    expense_id: ExpenseId,
    filename: &str,
    size_bytes: i64,
    mime_type: &str,
    stored_name: &str,
    connection: &Connection,
) -> Result<Invoice, Error> {
    connection.execute(
        "INSERT INTO invoice (expense_id, filename, size_bytes, mime_type, stored_name)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(expense_id) DO UPDATE SET
             filename = excluded.filename,
             size_bytes = excluded.size_bytes,
             mime_type = excluded.mime_type,
             stored_name = excluded.stored_name",
        (expense_id, filename, size_bytes, mime_type, stored_name),
    )?;

    get_invoice(expense_id, connection)
}

/// Retrieve the invoice metadata for an expense.
///
/// # Errors
/// Returns [Error::NotFound] if the expense has no invoice.
pub fn get_invoice(expense_id: ExpenseId, connection: &Connection) -> Result<Invoice, Error> {
    connection
        .prepare(
            "SELECT id, expense_id, filename, size_bytes, mime_type, stored_name
             FROM invoice WHERE expense_id = :expense_id;",
        )?
        .query_row(&[(":expense_id", &expense_id)], map_invoice_row)
        .map_err(|error| error.into())
}

#[cfg(test)]
mod invoice_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, db::initialize,
        expense::{create_expense, delete_expense},
        payment_method::{PaymentMethodKind, create_payment_method},
    };

    use super::{get_invoice, insert_invoice};

    fn get_test_connection_and_expense() -> (Connection, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let method = create_payment_method(
            PaymentMethodKind::Cash,
            "Wallet",
            true,
            None,
            None,
            &connection,
        )
        .unwrap();
        let expense = create_expense(
            date!(2024 - 06 - 10),
            None,
            100.0,
            "medical",
            "",
            method.id,
            &connection,
        )
        .unwrap();

        (connection, expense.id)
    }

    #[test]
    fn insert_and_get_invoice() {
        let (connection, expense_id) = get_test_connection_and_expense();

        let invoice = insert_invoice(
            expense_id,
            "dentist.pdf",
            1024,
            "application/pdf",
            "invoice-1.pdf",
            &connection,
        )
        .unwrap();

        assert_eq!(invoice.filename, "dentist.pdf");
        assert_eq!(Ok(invoice), get_invoice(expense_id, &connection));
    }

    #[test]
    fn reupload_replaces_the_previous_invoice() {
        let (connection, expense_id) = get_test_connection_and_expense();

        insert_invoice(
            expense_id,
            "old.pdf",
            10,
            "application/pdf",
            "invoice-1.pdf",
            &connection,
        )
        .unwrap();
        let replacement = insert_invoice(
            expense_id,
            "new.pdf",
            20,
            "application/pdf",
            "invoice-2.pdf",
            &connection,
        )
        .unwrap();

        assert_eq!(replacement.filename, "new.pdf");
        assert_eq!(Ok(replacement), get_invoice(expense_id, &connection));
    }

    #[test]
    fn get_invoice_for_expense_without_one_returns_not_found() {
        let (connection, expense_id) = get_test_connection_and_expense();

        assert_eq!(get_invoice(expense_id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn deleting_the_expense_cascades_to_the_invoice() {
        let (connection, expense_id) = get_test_connection_and_expense();

        insert_invoice(
            expense_id,
            "dentist.pdf",
            1024,
            "application/pdf",
            "invoice-1.pdf",
            &connection,
        )
        .unwrap();

        delete_expense(expense_id, &connection).unwrap();

        assert_eq!(get_invoice(expense_id, &connection), Err(Error::NotFound));
    }
}
