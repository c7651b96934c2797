//! Database operations for expenses.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    expense::{Expense, ExpenseId, map_expense_row},
    payment_method::PaymentMethodId,
};

/// Optional filters for listing expenses.
#[derive(Debug, Default, Clone)]
pub struct ExpenseQuery {
    /// Only include expenses paid with this payment method.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Only include expenses whose effective date is on or after this date.
    pub start_date: Option<Date>,
    /// Only include expenses whose effective date is on or before this date.
    pub end_date: Option<Date>,
}

/// Create an expense and return it with its generated ID.
///
/// # Errors
/// Returns [Error::InvalidPaymentMethod] if `payment_method_id` does not refer
/// to a valid payment method.
pub fn create_expense(
    date: Date,
    posted_date: Option<Date>,
    amount: f64,
    category: &str,
    description: &str,
    payment_method_id: PaymentMethodId,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .execute(
            "INSERT INTO expense (date, posted_date, amount, category, description, payment_method_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (date, posted_date, amount, category, description, payment_method_id),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidPaymentMethod
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        date,
        posted_date,
        amount,
        category: category.to_owned(),
        description: description.to_owned(),
        payment_method_id,
    })
}

/// Retrieve a single expense by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a valid expense.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, date, posted_date, amount, category, description, payment_method_id
             FROM expense WHERE id = :id;",
        )?
        .query_row(&[(":id", &id)], map_expense_row)
        .map_err(|error| error.into())
}

/// Query for expenses, newest effective date first.
///
/// The date filters apply to the effective date: the posted date when present,
/// otherwise the transaction date.
pub fn get_expenses(filter: &ExpenseQuery, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut query_string_parts = vec![
        "SELECT id, date, posted_date, amount, category, description, payment_method_id
         FROM expense"
            .to_string(),
    ];
    let mut where_clause_parts = vec![];
    let mut query_parameters = vec![];

    if let Some(payment_method_id) = filter.payment_method_id {
        where_clause_parts.push(format!(
            "payment_method_id = ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Integer(payment_method_id));
    }

    if let Some(start_date) = filter.start_date {
        where_clause_parts.push(format!(
            "COALESCE(posted_date, date) >= ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        where_clause_parts.push(format!(
            "COALESCE(posted_date, date) <= ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(end_date.to_string()));
    }

    if !where_clause_parts.is_empty() {
        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
    }

    query_string_parts.push("ORDER BY COALESCE(posted_date, date) DESC, id DESC".to_string());

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter());

    connection
        .prepare(&query_string)?
        .query_map(params, map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
        .collect()
}

/// Update an expense. Returns an error if it doesn't exist.
///
/// # Errors
/// Returns [Error::UpdateMissingExpense] if `id` does not refer to a valid
/// expense, or [Error::InvalidPaymentMethod] for an unknown payment method.
pub fn update_expense(
    id: ExpenseId,
    date: Date,
    posted_date: Option<Date>,
    amount: f64,
    category: &str,
    description: &str,
    payment_method_id: PaymentMethodId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE expense
             SET date = ?1, posted_date = ?2, amount = ?3, category = ?4, description = ?5,
                 payment_method_id = ?6
             WHERE id = ?7",
            (date, posted_date, amount, category, description, payment_method_id, id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidPaymentMethod
            }
            error => Error::from(error),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense by ID. Allocations and the invoice row cascade.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if the expense doesn't exist.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, db::initialize,
        payment_method::{PaymentMethodKind, create_payment_method},
    };

    use super::{
        ExpenseQuery, create_expense, delete_expense, get_expense, get_expenses, update_expense,
    };

    fn get_test_connection_and_method() -> (Connection, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let method = create_payment_method(
            PaymentMethodKind::CreditCard,
            "Visa",
            true,
            Some(16),
            None,
            &connection,
        )
        .expect("Could not create payment method");

        (connection, method.id)
    }

    #[test]
    fn create_and_get_expense() {
        let (connection, method_id) = get_test_connection_and_method();

        let expense = create_expense(
            date!(2024 - 06 - 10),
            Some(date!(2024 - 06 - 12)),
            42.5,
            "groceries",
            "weekly shop",
            method_id,
            &connection,
        )
        .expect("Could not create expense");

        assert!(expense.id > 0);
        assert_eq!(Ok(expense), get_expense(connection.last_insert_rowid(), &connection));
    }

    #[test]
    fn create_with_invalid_payment_method_fails() {
        let (connection, _) = get_test_connection_and_method();

        let result = create_expense(
            date!(2024 - 06 - 10),
            None,
            42.5,
            "groceries",
            "",
            999,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidPaymentMethod));
    }

    #[test]
    fn get_expenses_filters_on_effective_date() {
        let (connection, method_id) = get_test_connection_and_method();

        // Effective date is the posted date: 2024-06-20, inside the range.
        let inside = create_expense(
            date!(2024 - 06 - 10),
            Some(date!(2024 - 06 - 20)),
            10.0,
            "groceries",
            "",
            method_id,
            &connection,
        )
        .unwrap();

        // Effective date is the posted date: 2024-06-10, outside the range
        // despite the transaction date being inside it.
        create_expense(
            date!(2024 - 06 - 20),
            Some(date!(2024 - 06 - 10)),
            20.0,
            "groceries",
            "",
            method_id,
            &connection,
        )
        .unwrap();

        let got = get_expenses(
            &ExpenseQuery {
                payment_method_id: Some(method_id),
                start_date: Some(date!(2024 - 06 - 16)),
                end_date: Some(date!(2024 - 07 - 15)),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(got, vec![inside]);
    }

    #[test]
    fn get_expenses_orders_newest_effective_date_first() {
        let (connection, method_id) = get_test_connection_and_method();

        let older = create_expense(
            date!(2024 - 06 - 01),
            None,
            1.0,
            "groceries",
            "",
            method_id,
            &connection,
        )
        .unwrap();
        let newer = create_expense(
            date!(2024 - 06 - 05),
            None,
            2.0,
            "groceries",
            "",
            method_id,
            &connection,
        )
        .unwrap();

        let got = get_expenses(&ExpenseQuery::default(), &connection).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn update_expense_succeeds() {
        let (connection, method_id) = get_test_connection_and_method();
        let expense = create_expense(
            date!(2024 - 06 - 10),
            None,
            42.5,
            "groceries",
            "weekly shop",
            method_id,
            &connection,
        )
        .unwrap();

        let result = update_expense(
            expense.id,
            date!(2024 - 06 - 11),
            Some(date!(2024 - 06 - 13)),
            45.0,
            "medical",
            "pharmacy",
            method_id,
            &connection,
        );

        assert_eq!(result, Ok(()));

        let updated = get_expense(expense.id, &connection).unwrap();
        assert_eq!(updated.category, "medical");
        assert_eq!(updated.posted_date, Some(date!(2024 - 06 - 13)));
    }

    #[test]
    fn update_missing_expense_fails() {
        let (connection, method_id) = get_test_connection_and_method();

        let result = update_expense(
            999,
            date!(2024 - 06 - 11),
            None,
            45.0,
            "medical",
            "",
            method_id,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn delete_expense_succeeds() {
        let (connection, method_id) = get_test_connection_and_method();
        let expense = create_expense(
            date!(2024 - 06 - 10),
            None,
            42.5,
            "groceries",
            "",
            method_id,
            &connection,
        )
        .unwrap();

        assert_eq!(delete_expense(expense.id, &connection), Ok(()));
        assert_eq!(get_expense(expense.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_expense_fails() {
        let (connection, _) = get_test_connection_and_method();

        assert_eq!(delete_expense(999, &connection), Err(Error::DeleteMissingExpense));
    }
}
