//! The expense model and its table.

use rusqlite::Row;
use serde::Serialize;
use time::Date;

use crate::payment_method::PaymentMethodId;

/// The ID of an expense.
pub type ExpenseId = i64;

/// A single purchase or bill.
///
/// The date an expense counts towards a billing cycle is the posted date when
/// one is recorded (the day a card transaction settled), otherwise the
/// transaction date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The date the expense was incurred.
    pub date: Date,
    /// The date the transaction settled against the account, if known.
    pub posted_date: Option<Date>,
    /// The amount spent.
    pub amount: f64,
    /// A category label, e.g. "groceries" or "medical".
    pub category: String,
    /// A free-form description.
    pub description: String,
    /// The payment method used.
    pub payment_method_id: PaymentMethodId,
}

impl Expense {
    /// The date that determines which billing cycle this expense belongs to.
    pub fn effective_date(&self) -> Date {
        self.posted_date.unwrap_or(self.date)
    }
}

/// Create the expense table if it does not exist.
pub fn create_expense_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            posted_date TEXT,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            payment_method_id INTEGER NOT NULL,
            FOREIGN KEY(payment_method_id) REFERENCES payment_method(id)
        );

        CREATE INDEX IF NOT EXISTS idx_expense_effective_date
            ON expense(payment_method_id, COALESCE(posted_date, date));",
    )?;

    Ok(())
}

/// Map a `SELECT id, date, posted_date, amount, category, description,
/// payment_method_id` row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        posted_date: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        payment_method_id: row.get(6)?,
    })
}


#[cfg(test)]
mod effective_date_tests {
    use time::macros::date;

    use super::Expense;

    fn expense_with_dates(date: time::Date, posted_date: Option<time::Date>) -> Expense {
        Expense {
            id: 1,
            date,
            posted_date,
            amount: 10.0,
            category: "groceries".to_owned(),
            description: String::new(),
            payment_method_id: 1,
        }
    }

    #[test]
    fn posted_date_takes_precedence() {
        let expense = expense_with_dates(date!(2024 - 06 - 10), Some(date!(2024 - 06 - 20)));

        assert_eq!(expense.effective_date(), date!(2024 - 06 - 20));
    }

    #[test]
    fn falls_back_to_transaction_date() {
        let expense = expense_with_dates(date!(2024 - 06 - 10), None);

        assert_eq!(expense.effective_date(), date!(2024 - 06 - 10));
    }
}
