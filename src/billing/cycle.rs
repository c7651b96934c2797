//! Billing cycle boundary computation.
//!
//! A credit card's billing cycle is anchored to a configured day of the month.
//! Cycles are contiguous and non-overlapping: each cycle ends the day before
//! the next one starts.

use serde::Serialize;
use time::{Date, Duration, Month};

use crate::Error;

/// A credit card billing cycle. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingCycle {
    /// The first day of the cycle.
    pub start: Date,
    /// The last day of the cycle.
    pub end: Date,
}

/// Compute the billing cycle that `reference` falls in for a card whose cycle
/// starts on `cycle_day` of each month.
///
/// If the reference day-of-month is on or after the cycle day, the cycle
/// starts in the reference month; otherwise it started in the previous month.
/// When `cycle_day` exceeds the number of days in a month, the boundary falls
/// on the last day of that month.
///
/// # Errors
/// Returns [Error::InvalidCycleDay] when `cycle_day` is outside 1-31. Days
/// past the end of a short month are clamped, days outside 1-31 are not.
pub fn current_cycle(cycle_day: u8, reference: Date) -> Result<BillingCycle, Error> {
    if !(1..=31).contains(&cycle_day) {
        return Err(Error::InvalidCycleDay(cycle_day as i64));
    }

    let boundary_day = clamp_day(cycle_day, reference.year(), reference.month());

    let start = if reference.day() >= boundary_day {
        cycle_boundary(reference.year(), reference.month(), cycle_day)
    } else {
        let (year, month) = previous_month(reference.year(), reference.month());
        cycle_boundary(year, month, cycle_day)
    };

    let (next_year, next_month) = next_month(start.year(), start.month());
    let end = cycle_boundary(next_year, next_month, cycle_day) - Duration::days(1);

    Ok(BillingCycle { start, end })
}

/// Compute the `count` billing cycles strictly before the current one, most
/// recent first. Consecutive cycles are contiguous.
///
/// # Errors
/// Returns [Error::InvalidCycleDay] when `cycle_day` is outside 1-31.
pub fn previous_cycles(
    cycle_day: u8,
    reference: Date,
    count: usize,
) -> Result<Vec<BillingCycle>, Error> {
    let current = current_cycle(cycle_day, reference)?;

    let mut cycles = Vec::with_capacity(count);
    let mut cursor = current.start;

    for _ in 0..count {
        let cycle = current_cycle(cycle_day, cursor - Duration::days(1))?;
        cursor = cycle.start;
        cycles.push(cycle);
    }

    Ok(cycles)
}

/// The cycle boundary in the given month: `cycle_day`, clamped to the last
/// day of the month.
fn cycle_boundary(year: i32, month: Month, cycle_day: u8) -> Date {
    let day = clamp_day(cycle_day, year, month);

    Date::from_calendar_date(year, month, day).expect("invalid cycle boundary date")
}

fn clamp_day(day: u8, year: i32, month: Month) -> u8 {
    day.min(last_day_of_month(year, month))
}

fn next_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        month => (year, month.next()),
    }
}

fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        month => (year, month.previous()),
    }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
