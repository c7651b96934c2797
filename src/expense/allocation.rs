//! Per-person allocations of an expense.
//!
//! Medical expenses in particular are split across family members. The split
//! for an expense is always replaced as a whole, inside one SQL transaction,
//! so a failed write never leaves a partial allocation behind.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{Error, expense::ExpenseId, person::PersonId};

/// A share of an expense assigned to one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    /// The ID of the allocation.
    pub id: i64,
    /// The expense being split.
    pub expense_id: ExpenseId,
    /// The person this share belongs to.
    pub person_id: PersonId,
    /// The amount of the expense assigned to this person.
    pub amount: f64,
}

/// Create the expense allocation table if it does not exist.
pub fn create_expense_allocation_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense_allocation (
            id INTEGER PRIMARY KEY,
            expense_id INTEGER NOT NULL,
            person_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(expense_id) REFERENCES expense(id) ON DELETE CASCADE,
            FOREIGN KEY(person_id) REFERENCES person(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_allocation_row(row: &Row) -> Result<Allocation, rusqlite::Error> {
    Ok(Allocation {
        id: row.get(0)?,
        expense_id: row.get(1)?,
        person_id: row.get(2)?,
        amount: row.get(3)?,
    })
}

/// Retrieve the allocations for an expense in insertion order.
pub fn get_allocations(
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<Vec<Allocation>, Error> {
    connection
        .prepare(
            "SELECT id, expense_id, person_id, amount
             FROM expense_allocation
             WHERE expense_id = :expense_id
             ORDER BY id ASC;",
        )?
        .query_map(&[(":expense_id", &expense_id)], map_allocation_row)?
        .map(|maybe_allocation| maybe_allocation.map_err(|error| error.into()))
        .collect()
}

/// Replace the full allocation set for an expense.
///
/// The delete and the batched inserts run inside one SQL transaction: either
/// the whole new split is stored, or the previous one is kept.
///
/// # Errors
/// Returns [Error::InvalidPerson] if any share names an unknown person, or
/// [Error::SqlError] for other SQL errors. The caller is expected to have
/// verified that the expense exists.
pub fn replace_allocations(
    expense_id: ExpenseId,
    shares: &[(PersonId, f64)],
    connection: &Connection,
) -> Result<Vec<Allocation>, Error> {
    let tx = connection.unchecked_transaction()?;

    tx.execute(
        "DELETE FROM expense_allocation WHERE expense_id = ?1",
        [expense_id],
    )?;

    let mut allocations = Vec::with_capacity(shares.len());

    {
        let mut statement = tx.prepare(
            "INSERT INTO expense_allocation (expense_id, person_id, amount)
             VALUES (?1, ?2, ?3)",
        )?;

        for &(person_id, amount) in shares {
            statement
                .execute((expense_id, person_id, amount))
                .map_err(|error| match error {
                    // Code 787 occurs when a FOREIGN KEY constraint failed.
                    rusqlite::Error::SqliteFailure(sql_error, Some(_))
                        if sql_error.extended_code == 787 =>
                    {
                        Error::InvalidPerson
                    }
                    error => error.into(),
                })?;

            allocations.push(Allocation {
                id: tx.last_insert_rowid(),
                expense_id,
                person_id,
                amount,
            });
        }
    }

    tx.commit()?;

    Ok(allocations)
}
