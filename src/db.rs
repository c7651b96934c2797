//! Database initialization for the application's domain tables.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    billing::{create_card_payment_table, create_statement_table},
    expense::{create_expense_allocation_table, create_expense_table, create_invoice_table},
    loan::{create_loan_payment_table, create_loan_table},
    payment_method::create_payment_method_table,
    person::create_person_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// All tables are created inside a single exclusive transaction so a partially
/// initialized schema is never left behind.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys are enforced per connection in SQLite.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_payment_method_table(&transaction)?;
    create_person_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_expense_allocation_table(&transaction)?;
    create_invoice_table(&transaction)?;
    create_loan_table(&transaction)?;
    create_loan_payment_table(&transaction)?;
    create_card_payment_table(&transaction)?;
    create_statement_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).expect("First initialization failed");

        assert_eq!(Ok(()), initialize(&connection));
    }
}
