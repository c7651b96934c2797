//! Database operations for payment methods.

use rusqlite::Connection;

use crate::{
    Error,
    payment_method::{PaymentMethod, PaymentMethodId, PaymentMethodKind, map_payment_method_row},
};

/// Create a payment method and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicatePaymentMethodName] if `name` is already taken, or
/// [Error::SqlError] if there is some other SQL error.
pub fn create_payment_method(
    kind: PaymentMethodKind,
    name: &str,
    active: bool,
    billing_cycle_day: Option<u8>,
    current_balance: Option<f64>,
    connection: &Connection,
) -> Result<PaymentMethod, Error> {
    connection
        .execute(
            "INSERT INTO payment_method (kind, name, active, billing_cycle_day, current_balance)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (kind.as_str(), name, active, billing_cycle_day, current_balance),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicatePaymentMethodName(name.to_owned())
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(PaymentMethod {
        id,
        kind,
        name: name.to_owned(),
        active,
        billing_cycle_day,
        current_balance,
    })
}

/// Retrieve a single payment method by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a valid payment method.
pub fn get_payment_method(
    id: PaymentMethodId,
    connection: &Connection,
) -> Result<PaymentMethod, Error> {
    connection
        .prepare(
            "SELECT id, kind, name, active, billing_cycle_day, current_balance
             FROM payment_method WHERE id = :id;",
        )?
        .query_row(&[(":id", &id)], map_payment_method_row)
        .map_err(|error| error.into())
}

/// Retrieve all payment methods ordered alphabetically by name.
pub fn get_all_payment_methods(connection: &Connection) -> Result<Vec<PaymentMethod>, Error> {
    connection
        .prepare(
            "SELECT id, kind, name, active, billing_cycle_day, current_balance
             FROM payment_method ORDER BY name ASC;",
        )?
        .query_map([], map_payment_method_row)?
        .map(|maybe_method| maybe_method.map_err(|error| error.into()))
        .collect()
}

/// Update a payment method. Returns an error if it doesn't exist.
///
/// # Errors
/// Returns [Error::UpdateMissingPaymentMethod] if `id` does not refer to a
/// valid payment method, or [Error::DuplicatePaymentMethodName] if the new
/// name is already taken.
pub fn update_payment_method(
    id: PaymentMethodId,
    kind: PaymentMethodKind,
    name: &str,
    active: bool,
    billing_cycle_day: Option<u8>,
    current_balance: Option<f64>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE payment_method
             SET kind = ?1, name = ?2, active = ?3, billing_cycle_day = ?4, current_balance = ?5
             WHERE id = ?6",
            (kind.as_str(), name, active, billing_cycle_day, current_balance, id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicatePaymentMethodName(name.to_owned())
            }
            error => Error::from(error),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingPaymentMethod);
    }

    Ok(())
}

/// Delete a payment method by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingPaymentMethod] if the payment method doesn't
/// exist, or [Error::PaymentMethodInUse] if expenses still reference it.
pub fn delete_payment_method(id: PaymentMethodId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute("DELETE FROM payment_method WHERE id = ?1", [id])
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed: an expense
            // still references this payment method.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::PaymentMethodInUse
            }
            error => Error::from(error),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPaymentMethod);
    }

    Ok(())
}

#[cfg(test)]
mod payment_method_query_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize, payment_method::PaymentMethodKind};

    use super::{
        create_payment_method, delete_payment_method, get_all_payment_methods, get_payment_method,
        update_payment_method,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_payment_method_succeeds() {
        let connection = get_test_db_connection();

        let method = create_payment_method(
            PaymentMethodKind::CreditCard,
            "Visa ending 4242",
            true,
            Some(16),
            Some(0.0),
            &connection,
        )
        .expect("Could not create payment method");

        assert!(method.id > 0);
        assert_eq!(method.kind, PaymentMethodKind::CreditCard);
        assert_eq!(method.billing_cycle_day, Some(16));
    }

    #[test]
    fn create_duplicate_name_fails() {
        let connection = get_test_db_connection();
        create_payment_method(PaymentMethodKind::Cash, "Wallet", true, None, None, &connection)
            .expect("Could not create payment method");

        let duplicate = create_payment_method(
            PaymentMethodKind::Debit,
            "Wallet",
            true,
            None,
            None,
            &connection,
        );

        assert_eq!(
            duplicate,
            Err(Error::DuplicatePaymentMethodName("Wallet".to_owned()))
        );
    }

    #[test]
    fn get_payment_method_succeeds() {
        let connection = get_test_db_connection();
        let inserted = create_payment_method(
            PaymentMethodKind::Debit,
            "Everyday account",
            true,
            None,
            None,
            &connection,
        )
        .expect("Could not create payment method");

        let selected = get_payment_method(inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_payment_method_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let selected = get_payment_method(999, &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_all_payment_methods_orders_by_name() {
        let connection = get_test_db_connection();
        create_payment_method(PaymentMethodKind::Cash, "Wallet", true, None, None, &connection)
            .unwrap();
        create_payment_method(PaymentMethodKind::Debit, "Cheque account", true, None, None, &connection)
            .unwrap();

        let methods = get_all_payment_methods(&connection).unwrap();

        let names: Vec<&str> = methods.iter().map(|method| method.name.as_str()).collect();
        assert_eq!(names, vec!["Cheque account", "Wallet"]);
    }

    #[test]
    fn update_payment_method_succeeds() {
        let connection = get_test_db_connection();
        let method = create_payment_method(
            PaymentMethodKind::CreditCard,
            "Visa",
            true,
            Some(1),
            None,
            &connection,
        )
        .unwrap();

        let result = update_payment_method(
            method.id,
            PaymentMethodKind::CreditCard,
            "Visa Platinum",
            false,
            Some(16),
            Some(-250.0),
            &connection,
        );

        assert_eq!(result, Ok(()));

        let updated = get_payment_method(method.id, &connection).unwrap();
        assert_eq!(updated.name, "Visa Platinum");
        assert!(!updated.active);
        assert_eq!(updated.billing_cycle_day, Some(16));
    }

    #[test]
    fn update_payment_method_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = update_payment_method(
            999,
            PaymentMethodKind::Cash,
            "Wallet",
            true,
            None,
            None,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingPaymentMethod));
    }

    #[test]
    fn delete_payment_method_succeeds() {
        let connection = get_test_db_connection();
        let method =
            create_payment_method(PaymentMethodKind::Cash, "Wallet", true, None, None, &connection)
                .unwrap();

        let result = delete_payment_method(method.id, &connection);

        assert_eq!(result, Ok(()));
        assert_eq!(get_payment_method(method.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_payment_method_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = delete_payment_method(999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingPaymentMethod));
    }
}
