//! Loan balance summaries derived from recorded payments.

use rusqlite::{Connection, named_params};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    loan::{
        core::LoanId,
        db::{get_loan, get_loan_payments},
    },
};

/// An all-time summary of what remains owing on a loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanBalance {
    /// The amount owed when tracking started.
    pub initial_balance: f64,
    /// The sum of all recorded payments.
    pub total_payments: f64,
    /// The initial balance less all payments.
    pub current_balance: f64,
    /// How many payments have been recorded.
    pub payment_count: i64,
    /// The date of the most recent payment, if any.
    pub last_payment_date: Option<Date>,
}

/// The loan balance immediately after one payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    /// The date of the payment.
    pub date: Date,
    /// The amount paid.
    pub payment: f64,
    /// What remained owing after this payment.
    pub running_balance: f64,
}

/// Summarise the balance of the loan `loan_id` from its recorded payments.
///
/// # Errors
/// Returns [Error::NotFound] if the loan does not exist.
pub fn calculated_balance(loan_id: LoanId, connection: &Connection) -> Result<LoanBalance, Error> {
    let loan = get_loan(loan_id, connection)?;

    let (payment_count, total_payments, last_payment_date) = connection
        .prepare(
            "SELECT COUNT(id), COALESCE(SUM(amount), 0.0), MAX(payment_date)
             FROM loan_payment
             WHERE loan_id = :loan_id;",
        )?
        .query_row(named_params! { ":loan_id": loan_id }, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, Option<Date>>(2)?,
            ))
        })?;

    Ok(LoanBalance {
        initial_balance: loan.initial_balance,
        total_payments,
        current_balance: loan.initial_balance - total_payments,
        payment_count,
        last_payment_date,
    })
}

/// The balance of the loan `loan_id` after each payment, newest first.
///
/// The running balance is accumulated oldest first, with same-day payments
/// applied in insertion order, and the result reversed. A loan with no
/// payments yields an empty list.
pub fn payment_balance_history(
    loan_id: LoanId,
    connection: &Connection,
) -> Result<Vec<BalancePoint>, Error> {
    let loan = get_loan(loan_id, connection)?;
    let payments = get_loan_payments(loan_id, connection)?;

    let mut running_balance = loan.initial_balance;
    let mut history: Vec<BalancePoint> = payments
        .into_iter()
        .map(|payment| {
            running_balance -= payment.amount;

            BalancePoint {
                date: payment.payment_date,
                payment: payment.amount,
                running_balance,
            }
        })
        .collect();

    history.reverse();

    Ok(history)
}


#[cfg(test)]
mod payment_balance_history_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        loan::{
            core::LoanKind,
            db::{create_loan, record_loan_payment},
        },
    };

    use super::payment_balance_history;

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory database");
        initialize(&connection).expect("Could not initialize database");

        connection
    }

    fn create_test_loan(initial_balance: f64, connection: &Connection) -> i64 {
        create_loan(
            "Car loan",
            initial_balance,
            date!(2024 - 06 - 01),
            LoanKind::Loan,
            Some(60),
            "monthly",
            connection,
        )
        .expect("Could not create loan")
        .id
    }

    #[test]
    fn history_for_loan_with_no_payments_is_empty() {
        let connection = get_test_connection();
        let loan = create_test_loan(25_000.0, &connection);

        let history =
            payment_balance_history(loan, &connection).expect("Could not calculate history");

        assert!(history.is_empty());
    }

    #[test]
    fn history_is_newest_first_with_running_balance() {
        let connection = get_test_connection();
        let loan = create_test_loan(25_000.0, &connection);

        record_loan_payment(loan, 1000.0, date!(2024 - 06 - 15), None, &connection)
            .expect("Could not record payment");
        record_loan_payment(loan, 500.0, date!(2024 - 07 - 15), None, &connection)
            .expect("Could not record payment");

        let history =
            payment_balance_history(loan, &connection).expect("Could not calculate history");

        assert_eq!(history.len(), 2);

        assert_eq!(history[0].date, date!(2024 - 07 - 15));
        assert_eq!(history[0].payment, 500.0);
        assert_eq!(history[0].running_balance, 23_500.0);

        assert_eq!(history[1].date, date!(2024 - 06 - 15));
        assert_eq!(history[1].payment, 1000.0);
        assert_eq!(history[1].running_balance, 24_000.0);
    }

    #[test]
    fn same_day_payments_apply_in_insertion_order() {
        let connection = get_test_connection();
        let loan = create_test_loan(1000.0, &connection);

        record_loan_payment(loan, 100.0, date!(2024 - 06 - 15), None, &connection)
            .expect("Could not record payment");
        record_loan_payment(loan, 200.0, date!(2024 - 06 - 15), None, &connection)
            .expect("Could not record payment");

        let history =
            payment_balance_history(loan, &connection).expect("Could not calculate history");

        // Newest first, so the second insertion comes out on top.
        assert_eq!(history[0].payment, 200.0);
        assert_eq!(history[0].running_balance, 700.0);
        assert_eq!(history[1].payment, 100.0);
        assert_eq!(history[1].running_balance, 900.0);
    }

    #[test]
    fn running_balance_decreases_monotonically() {
        let connection = get_test_connection();
        let loan = create_test_loan(10_000.0, &connection);

        for (amount, date) in [
            (250.0, date!(2024 - 01 - 15)),
            (250.0, date!(2024 - 02 - 15)),
            (250.0, date!(2024 - 03 - 15)),
            (500.0, date!(2024 - 04 - 15)),
        ] {
            record_loan_payment(loan, amount, date, None, &connection)
                .expect("Could not record payment");
        }

        let history =
            payment_balance_history(loan, &connection).expect("Could not calculate history");

        // Newest first, so balances increase as we walk back in time.
        for window in history.windows(2) {
            assert!(window[0].running_balance < window[1].running_balance);
        }
    }
}
