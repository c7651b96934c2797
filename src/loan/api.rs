//! HTTP handlers for loans and loan payments.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    loan::{
        BalancePoint, Loan, LoanBalance, LoanId, LoanKind, LoanPayment, LoanPaymentId,
        calculated_balance, create_loan, delete_loan, delete_loan_payment, get_all_loans,
        get_loan, get_loan_payments, payment_balance_history, record_loan_payment, update_loan,
    },
};

/// The client's description of a loan, for create and update.
#[derive(Debug, Deserialize)]
pub struct LoanPayload {
    /// A display name for the loan.
    pub name: String,
    /// The amount owed when tracking started. Must be positive.
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

impl LoanPayload {
    fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        if self.initial_balance <= 0.0 {
            return Err(Error::NonPositiveAmount(self.initial_balance));
        }

        Ok(())
    }
}

/// The client's description of a payment made against a loan.
#[derive(Debug, Deserialize)]
pub struct LoanPaymentPayload {
    /// The amount paid. Must be positive.
    pub amount: f64,
    /// The date the payment was made.
    pub payment_date: Date,
    /// An optional note.
    pub notes: Option<String>,
}

/// Route handler for listing loans.
pub async fn list_loans_endpoint(State(state): State<AppState>) -> Result<Json<Vec<Loan>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_loans(&connection).map(Json)
}

/// Route handler for retrieving a single loan.
pub async fn get_loan_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> Result<Json<Loan>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_loan(loan_id, &connection).map(Json)
}

/// Route handler for creating a loan.
pub async fn create_loan_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<LoanPayload>,
) -> Result<(StatusCode, Json<Loan>), Error> {
    payload.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let loan = create_loan(
        payload.name.trim(),
        payload.initial_balance,
        payload.start_date,
        payload.kind,
        payload.amortization_months,
        &payload.payment_frequency,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Route handler for updating a loan.
pub async fn update_loan_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
    Json(payload): Json<LoanPayload>,
) -> Result<Json<Loan>, Error> {
    payload.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_loan(
        loan_id,
        payload.name.trim(),
        payload.initial_balance,
        payload.start_date,
        payload.kind,
        payload.amortization_months,
        &payload.payment_frequency,
        &connection,
    )?;

    get_loan(loan_id, &connection).map(Json)
}

/// Route handler for deleting a loan and its payments.
pub async fn delete_loan_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_loan(loan_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Route handler for a loan's all-time balance summary.
pub async fn get_calculated_balance_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> Result<Json<LoanBalance>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    calculated_balance(loan_id, &connection).map(Json)
}

/// Route handler for a loan's running balance after each payment.
pub async fn get_payment_balance_history_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> Result<Json<Vec<BalancePoint>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    payment_balance_history(loan_id, &connection).map(Json)
}

/// Route handler for listing a loan's payments, oldest first.
pub async fn list_loan_payments_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> Result<Json<Vec<LoanPayment>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    // Distinguish a missing loan from one with no payments.
    get_loan(loan_id, &connection)?;

    get_loan_payments(loan_id, &connection).map(Json)
}

/// Route handler for recording a payment against a loan.
pub async fn create_loan_payment_endpoint(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
    Json(payload): Json<LoanPaymentPayload>,
) -> Result<(StatusCode, Json<LoanPayment>), Error> {
    if payload.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(payload.amount));
    }

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let payment = record_loan_payment(
        loan_id,
        payload.amount,
        payload.payment_date,
        payload.notes.as_deref(),
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Route handler for deleting a single loan payment.
pub async fn delete_loan_payment_endpoint(
    State(state): State<AppState>,
    Path(loan_payment_id): Path<LoanPaymentId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_loan_payment(loan_payment_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
