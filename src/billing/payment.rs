//! Payments recorded against a credit card.
//!
//! Card payments reduce the statement balance for the billing cycle they fall
//! in. Unlike loan payments they are only ever aggregated over a cycle's date
//! range, never over the card's lifetime.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::Date;

use crate::{Error, payment_method::PaymentMethodId};

/// The ID of a card payment.
pub type CardPaymentId = i64;

/// A payment made towards a credit card's balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPayment {
    /// The ID of the payment.
    pub id: CardPaymentId,
    /// The credit card the payment was made against.
    pub payment_method_id: PaymentMethodId,
    /// The amount paid.
    pub amount: f64,
    /// The date the payment was made.
    pub payment_date: Date,
    /// Free-form notes, e.g. "paid from joint account".
    pub notes: Option<String>,
}

/// Create the card payment table if it does not exist.
pub fn create_card_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS card_payment (
            id INTEGER PRIMARY KEY,
            payment_method_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            payment_date TEXT NOT NULL,
            notes TEXT,
            FOREIGN KEY(payment_method_id) REFERENCES payment_method(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_card_payment_row(row: &Row) -> Result<CardPayment, rusqlite::Error> {
    Ok(CardPayment {
        id: row.get(0)?,
        payment_method_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: row.get(3)?,
        notes: row.get(4)?,
    })
}

/// Record a payment against a credit card and return it with its generated ID.
pub fn record_card_payment(
    payment_method_id: PaymentMethodId,
    amount: f64,
    payment_date: Date,
    notes: Option<&str>,
    connection: &Connection,
) -> Result<CardPayment, Error> {
    connection.execute(
        "INSERT INTO card_payment (payment_method_id, amount, payment_date, notes)
         VALUES (?1, ?2, ?3, ?4)",
        (payment_method_id, amount, payment_date, notes),
    )?;

    let id = connection.last_insert_rowid();

    Ok(CardPayment {
        id,
        payment_method_id,
        amount,
        payment_date,
        notes: notes.map(str::to_owned),
    })
}

/// Retrieve all payments for a credit card, newest first.
pub fn get_card_payments(
    payment_method_id: PaymentMethodId,
    connection: &Connection,
) -> Result<Vec<CardPayment>, Error> {
    connection
        .prepare(
            "SELECT id, payment_method_id, amount, payment_date, notes
             FROM card_payment
             WHERE payment_method_id = :payment_method_id
             ORDER BY payment_date DESC, id DESC;",
        )?
        .query_map(
            &[(":payment_method_id", &payment_method_id)],
            map_card_payment_row,
        )?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Sum the payments made against a credit card between `start` and `end`,
/// inclusive on both ends.
///
/// # Errors
/// Returns [Error::InvalidDateRange] when `end` is before `start`.
pub fn sum_card_payments_in_range(
    payment_method_id: PaymentMethodId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    if end < start {
        return Err(Error::InvalidDateRange { start, end });
    }

    let total = connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0)
             FROM card_payment
             WHERE payment_method_id = :payment_method_id
               AND payment_date BETWEEN :start AND :end;",
        )?
        .query_row(
            rusqlite::named_params! {
                ":payment_method_id": payment_method_id,
                ":start": start,
                ":end": end,
            },
            |row| row.get(0),
        )?;

    Ok(total)
}
