use rusqlite::Row;
use serde::{Deserialize, Serialize};
use time::Date;

/// An alias for the loan database ID.
pub type LoanId = i64;

/// An alias for the loan payment database ID.
pub type LoanPaymentId = i64;

/// What sort of debt a loan tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    /// A plain fixed-term loan.
    Loan,
    /// A mortgage.
    Mortgage,
    /// A revolving line of credit.
    LineOfCredit,
}

impl LoanKind {
    /// How the kind is stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanKind::Loan => "loan",
            LoanKind::Mortgage => "mortgage",
            LoanKind::LineOfCredit => "line_of_credit",
        }
    }

    pub(crate) fn from_db_str(text: &str) -> Option<LoanKind> {
        match text {
            "loan" => Some(LoanKind::Loan),
            "mortgage" => Some(LoanKind::Mortgage),
            "line_of_credit" => Some(LoanKind::LineOfCredit),
            _ => None,
        }
    }
}

/// A debt whose balance is tracked through recorded payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loan {
    /// The ID of the loan in the database.
    pub id: LoanId,
    /// A display name for the loan.
    pub name: String,
    /// The amount owed when tracking started.
    pub initial_balance: f64,
    /// The date the loan started.
    pub start_date: Date,
    /// What sort of debt this is.
    pub kind: LoanKind,
    /// The amortization term in months, if the loan has one.
    pub amortization_months: Option<i64>,
    /// How often payments are expected, e.g. "monthly".
    pub payment_frequency: String,
}

/// A payment made against a loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanPayment {
    /// The ID of the payment in the database.
    pub id: LoanPaymentId,
    /// The loan the payment was made against.
    pub loan_id: LoanId,
    /// The amount paid.
    pub amount: f64,
    /// The date the payment was made.
    pub payment_date: Date,
    /// An optional note.
    pub notes: Option<String>,
}

/// Create the loan table in the database at `connection`.
pub fn create_loan_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS loan (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            initial_balance REAL NOT NULL,
            start_date TEXT NOT NULL,
            kind TEXT NOT NULL,
            amortization_months INTEGER,
            payment_frequency TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

/// Create the loan payment table in the database at `connection`.
pub fn create_loan_payment_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS loan_payment (
            id INTEGER PRIMARY KEY,
            loan_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            payment_date TEXT NOT NULL,
            notes TEXT,
            FOREIGN KEY(loan_id) REFERENCES loan(id) ON DELETE CASCADE
        );",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_loan_row(row: &Row) -> Result<Loan, rusqlite::Error> {
    let kind: String = row.get(4)?;
    let kind = LoanKind::from_db_str(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown loan kind '{kind}'").into(),
        )
    })?;

    Ok(Loan {
        id: row.get(0)?,
        name: row.get(1)?,
        initial_balance: row.get(2)?,
        start_date: row.get(3)?,
        kind,
        amortization_months: row.get(5)?,
        payment_frequency: row.get(6)?,
    })
}

pub(crate) fn map_loan_payment_row(row: &Row) -> Result<LoanPayment, rusqlite::Error> {
    Ok(LoanPayment {
        id: row.get(0)?,
        loan_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: row.get(3)?,
        notes: row.get(4)?,
    })
}
