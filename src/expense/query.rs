//! Aggregation of expenses over a date range.
//!
//! This is the one semantically load-bearing rule in the billing subsystem:
//! an expense belongs to a range when its effective date,
//! `COALESCE(posted_date, date)`, falls within the range, inclusive on both
//! ends.

use rusqlite::Connection;
use time::Date;

use crate::{Error, payment_method::PaymentMethodId};

/// The number and total amount of expenses within a date range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeTotals {
    /// How many expenses fell in the range.
    pub count: i64,
    /// The sum of their amounts, 0 when there are none.
    pub total: f64,
}

/// Count and sum the expenses for a payment method whose effective date falls
/// within `[start, end]`.
///
/// # Errors
/// Returns [Error::InvalidDateRange] when `end` is before `start`.
pub fn totals_in_range(
    payment_method_id: PaymentMethodId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<RangeTotals, Error> {
    if end < start {
        return Err(Error::InvalidDateRange { start, end });
    }

    connection
        .prepare(
            "SELECT COUNT(id), COALESCE(SUM(amount), 0)
             FROM expense
             WHERE payment_method_id = :payment_method_id
               AND COALESCE(posted_date, date) BETWEEN :start AND :end;",
        )?
        .query_row(
            rusqlite::named_params! {
                ":payment_method_id": payment_method_id,
                ":start": start,
                ":end": end,
            },
            |row| {
                Ok(RangeTotals {
                    count: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )
        .map_err(|error| error.into())
}

/// Count the expenses for a payment method whose effective date falls within
/// `[start, end]`.
pub fn count_in_range(
    payment_method_id: PaymentMethodId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<i64, Error> {
    totals_in_range(payment_method_id, start, end, connection).map(|totals| totals.count)
}

/// Sum the expenses for a payment method whose effective date falls within
/// `[start, end]`.
pub fn sum_in_range(
    payment_method_id: PaymentMethodId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    totals_in_range(payment_method_id, start, end, connection).map(|totals| totals.total)
}
