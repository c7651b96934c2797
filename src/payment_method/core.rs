//! The payment method model and its table.

use rusqlite::{
    Row,
    types::{FromSqlError, Type},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The ID of a payment method.
pub type PaymentMethodId = i64;

/// How an expense was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Physical cash.
    Cash,
    /// A debit or EFTPOS card drawing directly from a bank account.
    Debit,
    /// A written cheque.
    Cheque,
    /// A credit card with a billing cycle and statements.
    CreditCard,
}

impl PaymentMethodKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Debit => "debit",
            Self::Cheque => "cheque",
            Self::CreditCard => "credit_card",
        }
    }

    fn from_db_str(text: &str) -> Option<Self> {
        match text {
            "cash" => Some(Self::Cash),
            "debit" => Some(Self::Debit),
            "cheque" => Some(Self::Cheque),
            "credit_card" => Some(Self::CreditCard),
            _ => None,
        }
    }
}

/// A way of paying for expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethod {
    /// The ID of the payment method.
    pub id: PaymentMethodId,
    /// The kind of payment method.
    pub kind: PaymentMethodKind,
    /// The display name, e.g. "Visa ending 4242".
    pub name: String,
    /// Whether the method can be used for new expenses.
    pub active: bool,
    /// The day of the month (1-31) on which a credit card's billing cycle
    /// starts. `None` for non-credit-card methods.
    pub billing_cycle_day: Option<u8>,
    /// The last known balance for a credit card.
    pub current_balance: Option<f64>,
}

/// Check that a billing cycle day is within 1-31.
///
/// Days past the end of a short month are clamped when computing cycle
/// boundaries, but days outside 1-31 are rejected as invalid configuration.
///
/// # Errors
/// Returns [Error::InvalidCycleDay] when `day` is outside the valid range.
pub fn validate_cycle_day(day: i64) -> Result<u8, Error> {
    if (1..=31).contains(&day) {
        Ok(day as u8)
    } else {
        Err(Error::InvalidCycleDay(day))
    }
}

/// Create the payment method table if it does not exist.
pub fn create_payment_method_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS payment_method (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL,
            name TEXT NOT NULL UNIQUE,
            active INTEGER NOT NULL DEFAULT 1,
            billing_cycle_day INTEGER,
            current_balance REAL
        )",
        (),
    )?;

    Ok(())
}

/// Map a `SELECT id, kind, name, active, billing_cycle_day, current_balance`
/// row to a [PaymentMethod].
pub fn map_payment_method_row(row: &Row) -> Result<PaymentMethod, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_kind: String = row.get(1)?;
    let kind = PaymentMethodKind::from_db_str(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            Box::new(FromSqlError::InvalidType),
        )
    })?;
    let name = row.get(2)?;
    let active = row.get(3)?;
    let billing_cycle_day = row.get(4)?;
    let current_balance = row.get(5)?;

    Ok(PaymentMethod {
        id,
        kind,
        name,
        active,
        billing_cycle_day,
        current_balance,
    })
}
