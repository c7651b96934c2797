//! Database functions for loans and loan payments.

use rusqlite::{Connection, named_params};
use time::Date;

use crate::{
    Error,
    loan::core::{
        Loan, LoanId, LoanKind, LoanPayment, LoanPaymentId, map_loan_payment_row, map_loan_row,
    },
};

/// Create a loan in the database at `connection`.
pub fn create_loan(
    name: &str,
    initial_balance: f64,
    start_date: Date,
    kind: LoanKind,
    amortization_months: Option<i64>,
    payment_frequency: &str,
    connection: &Connection,
) -> Result<Loan, Error> {
    connection.execute(
        "INSERT INTO loan (name, initial_balance, start_date, kind, amortization_months, payment_frequency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            name,
            initial_balance,
            start_date,
            kind.as_str(),
            amortization_months,
            payment_frequency,
        ),
    )?;

    Ok(Loan {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        initial_balance,
        start_date,
        kind,
        amortization_months,
        payment_frequency: payment_frequency.to_owned(),
    })
}

/// Retrieve a loan by its ID.
pub fn get_loan(id: LoanId, connection: &Connection) -> Result<Loan, Error> {
    connection
        .prepare(
            "SELECT id, name, initial_balance, start_date, kind, amortization_months, payment_frequency
             FROM loan WHERE id = :id;",
        )?
        .query_row(&[(":id", &id)], map_loan_row)
        .map_err(|error| error.into())
}

/// Retrieve all loans, ordered by name.
pub fn get_all_loans(connection: &Connection) -> Result<Vec<Loan>, Error> {
    connection
        .prepare(
            "SELECT id, name, initial_balance, start_date, kind, amortization_months, payment_frequency
             FROM loan ORDER BY name ASC;",
        )?
        .query_map([], map_loan_row)?
        .map(|maybe_loan| maybe_loan.map_err(|error| error.into()))
        .collect()
}

/// Update a loan's details.
#[allow(clippy::too_many_arguments)]
pub fn update_loan(
    id: LoanId,
    name: &str,
    initial_balance: f64,
    start_date: Date,
    kind: LoanKind,
    amortization_months: Option<i64>,
    payment_frequency: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE loan
         SET name = ?1, initial_balance = ?2, start_date = ?3, kind = ?4,
             amortization_months = ?5, payment_frequency = ?6
         WHERE id = ?7",
        (
            name,
            initial_balance,
            start_date,
            kind.as_str(),
            amortization_months,
            payment_frequency,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingLoan);
    }

    Ok(())
}

/// Delete a loan. Its payments are deleted with it.
pub fn delete_loan(id: LoanId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM loan WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingLoan);
    }

    Ok(())
}

/// Record a payment against a loan.
///
/// # Errors
/// Returns [Error::NotFound] if the loan does not exist.
pub fn record_loan_payment(
    loan_id: LoanId,
    amount: f64,
    payment_date: Date,
    notes: Option<&str>,
    connection: &Connection,
) -> Result<LoanPayment, Error> {
    connection
        .execute(
            "INSERT INTO loan_payment (loan_id, amount, payment_date, notes)
             VALUES (:loan_id, :amount, :payment_date, :notes)",
            named_params! {
                ":loan_id": loan_id,
                ":amount": amount,
                ":payment_date": payment_date,
                ":notes": notes,
            },
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::NotFound
            }
            error => error.into(),
        })?;

    Ok(LoanPayment {
        id: connection.last_insert_rowid(),
        loan_id,
        amount,
        payment_date,
        notes: notes.map(str::to_owned),
    })
}

/// Retrieve the payments made against a loan, oldest first.
///
/// Payments made on the same day keep their insertion order.
pub fn get_loan_payments(
    loan_id: LoanId,
    connection: &Connection,
) -> Result<Vec<LoanPayment>, Error> {
    connection
        .prepare(
            "SELECT id, loan_id, amount, payment_date, notes
             FROM loan_payment
             WHERE loan_id = :loan_id
             ORDER BY payment_date ASC, id ASC;",
        )?
        .query_map(named_params! { ":loan_id": loan_id }, map_loan_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Delete a single loan payment.
pub fn delete_loan_payment(id: LoanPaymentId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM loan_payment WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingLoanPayment);
    }

    Ok(())
}

#[cfg(test)]
mod loan_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, loan::core::LoanKind};

    use super::{create_loan, delete_loan, get_all_loans, get_loan, update_loan};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory database");
        initialize(&connection).expect("Could not initialize database");

        connection
    }

    #[test]
    fn create_and_retrieve_loan() {
        let connection = get_test_connection();

        let created = create_loan(
            "Car loan",
            25_000.0,
            date!(2024 - 06 - 01),
            LoanKind::Loan,
            Some(60),
            "monthly",
            &connection,
        )
        .expect("Could not create loan");

        let retrieved = get_loan(created.id, &connection).expect("Could not retrieve loan");

        assert_eq!(created, retrieved);
    }

    #[test]
    fn loans_are_ordered_by_name() {
        let connection = get_test_connection();

        for name in ["Mortgage", "Car loan"] {
            create_loan(
                name,
                1000.0,
                date!(2024 - 01 - 01),
                LoanKind::Loan,
                None,
                "monthly",
                &connection,
            )
            .expect("Could not create loan");
        }

        let loans = get_all_loans(&connection).expect("Could not list loans");
        let names: Vec<&str> = loans.iter().map(|loan| loan.name.as_str()).collect();

        assert_eq!(names, ["Car loan", "Mortgage"]);
    }

    #[test]
    fn update_loan_changes_fields() {
        let connection = get_test_connection();

        let loan = create_loan(
            "Car loan",
            25_000.0,
            date!(2024 - 06 - 01),
            LoanKind::Loan,
            Some(60),
            "monthly",
            &connection,
        )
        .expect("Could not create loan");

        update_loan(
            loan.id,
            "Car loan (refinanced)",
            20_000.0,
            date!(2024 - 06 - 01),
            LoanKind::Loan,
            Some(48),
            "fortnightly",
            &connection,
        )
        .expect("Could not update loan");

        let retrieved = get_loan(loan.id, &connection).expect("Could not retrieve loan");

        assert_eq!(retrieved.name, "Car loan (refinanced)");
        assert_eq!(retrieved.initial_balance, 20_000.0);
        assert_eq!(retrieved.amortization_months, Some(48));
        assert_eq!(retrieved.payment_frequency, "fortnightly");
    }

    #[test]
    fn update_missing_loan_fails() {
        let connection = get_test_connection();

        let result = update_loan(
            999,
            "Car loan",
            25_000.0,
            date!(2024 - 06 - 01),
            LoanKind::Loan,
            None,
            "monthly",
            &connection,
        );

        assert!(matches!(result, Err(Error::UpdateMissingLoan)));
    }

    #[test]
    fn delete_missing_loan_fails() {
        let connection = get_test_connection();

        assert!(matches!(
            delete_loan(999, &connection),
            Err(Error::DeleteMissingLoan)
        ));
    }
}
