//! Statement balance and billing cycle history for credit cards.
//!
//! The statement balance of a card for a cycle is the sum of expenses
//! effective within that cycle less the card payments made during it.

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    billing::{
        cycle::{BillingCycle, current_cycle, previous_cycles},
        payment::sum_card_payments_in_range,
    },
    expense::totals_in_range,
    payment_method::{PaymentMethod, PaymentMethodId, PaymentMethodKind, get_payment_method},
};

/// The running balance of a credit card's current billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementBalance {
    /// The first day of the cycle.
    pub cycle_start: Date,
    /// The last day of the cycle.
    pub cycle_end: Date,
    /// How many expenses fell within the cycle.
    pub transaction_count: i64,
    /// The sum of those expenses.
    pub transaction_total: f64,
    /// Card payments made during the cycle.
    pub payments_in_cycle: f64,
    /// What is owed for the cycle so far.
    pub balance: f64,
}

/// Per-cycle totals for the billing cycle history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    /// The first day of the cycle.
    pub cycle_start: Date,
    /// The last day of the cycle.
    pub cycle_end: Date,
    /// How many expenses fell within the cycle.
    pub transaction_count: i64,
    /// The sum of those expenses.
    pub transaction_total: f64,
}

fn credit_card_cycle_day(payment_method: &PaymentMethod) -> Result<u8, Error> {
    if payment_method.kind != PaymentMethodKind::CreditCard {
        return Err(Error::NotACreditCard(payment_method.id));
    }

    payment_method.billing_cycle_day.ok_or(Error::MissingCycleDay)
}

/// Calculate the balance owed on the credit card `payment_method_id` for the
/// billing cycle containing `today`.
///
/// # Errors
/// Returns [Error::NotFound] if the payment method does not exist,
/// [Error::NotACreditCard] if it is not a credit card, and
/// [Error::MissingCycleDay] if it has no billing cycle day.
pub fn statement_balance(
    payment_method_id: PaymentMethodId,
    today: Date,
    connection: &Connection,
) -> Result<StatementBalance, Error> {
    let payment_method = get_payment_method(payment_method_id, connection)?;
    let cycle_day = credit_card_cycle_day(&payment_method)?;

    let cycle = current_cycle(cycle_day, today)?;
    let totals = totals_in_range(payment_method_id, cycle.start, cycle.end, connection)?;
    let payments = sum_card_payments_in_range(payment_method_id, cycle.start, cycle.end, connection)?;

    Ok(StatementBalance {
        cycle_start: cycle.start,
        cycle_end: cycle.end,
        transaction_count: totals.count,
        transaction_total: totals.total,
        payments_in_cycle: payments,
        balance: totals.total - payments,
    })
}

/// Summarise the `count` billing cycles preceding the one containing `today`
/// for the credit card `payment_method_id`, most recent first.
///
/// Cycles with no expenses are included with zero totals.
pub fn previous_billing_cycles(
    payment_method_id: PaymentMethodId,
    count: usize,
    today: Date,
    connection: &Connection,
) -> Result<Vec<CycleSummary>, Error> {
    let payment_method = get_payment_method(payment_method_id, connection)?;
    let cycle_day = credit_card_cycle_day(&payment_method)?;

    previous_cycles(cycle_day, today, count)?
        .into_iter()
        .map(|BillingCycle { start, end }| {
            let totals = totals_in_range(payment_method_id, start, end, connection)?;

            Ok(CycleSummary {
                cycle_start: start,
                cycle_end: end,
                transaction_count: totals.count,
                transaction_total: totals.total,
            })
        })
        .collect()
}
