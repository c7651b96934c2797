//! Homeledger is a web app for tracking a household's expenses, payment
//! methods, credit card billing cycles, and loans.
//!
//! This library provides a JSON REST API backed by a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod app_state;
mod billing;
mod db;
mod endpoints;
mod expense;
mod loan;
mod payment_method;
mod person;
mod routing;
mod uploads;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A statement or card payment operation was requested for a payment
    /// method that is not a credit card.
    #[error("payment method {0} is not a credit card")]
    NotACreditCard(i64),

    /// A credit card was configured or queried without a billing cycle day.
    #[error("credit cards require a billing cycle day")]
    MissingCycleDay,

    /// A billing cycle day outside the range 1-31 was provided.
    ///
    /// Days past the end of a short month are clamped to the last day of that
    /// month, but days outside 1-31 are a configuration error.
    #[error("{0} is not a valid billing cycle day, expected a day from 1 to 31")]
    InvalidCycleDay(i64),

    /// A date range with the end date before the start date was provided.
    #[error("invalid date range: end date {end} is before start date {start}")]
    InvalidDateRange {
        /// The start of the rejected range.
        start: Date,
        /// The end of the rejected range.
        end: Date,
    },

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("could not parse \"{0}\" as a date in YYYY-MM-DD format")]
    InvalidDate(String),

    /// An empty string was used where a display name is required.
    #[error("name cannot be empty")]
    EmptyName,

    /// A zero or negative amount was used for an expense or payment.
    #[error("{0} is not a valid amount, expected a positive number")]
    NonPositiveAmount(f64),

    /// An expense, payment, or allocation referred to a payment method that
    /// does not exist.
    #[error("the payment method ID does not refer to a valid payment method")]
    InvalidPaymentMethod,

    /// An allocation referred to a person that does not exist.
    #[error("the person ID does not refer to a valid person")]
    InvalidPerson,

    /// Tried to delete a payment method that still has expenses recorded
    /// against it.
    #[error("the payment method still has expenses and cannot be deleted")]
    PaymentMethodInUse,

    /// The specified payment method name already exists in the database.
    #[error("the payment method \"{0}\" already exists in the database")]
    DuplicatePaymentMethodName(String),

    /// The specified person name already exists in the database.
    #[error("the person \"{0}\" already exists in the database")]
    DuplicatePersonName(String),

    /// Tried to update a payment method that does not exist.
    #[error("tried to update a payment method that is not in the database")]
    UpdateMissingPaymentMethod,

    /// Tried to delete a payment method that does not exist.
    #[error("tried to delete a payment method that is not in the database")]
    DeleteMissingPaymentMethod,

    /// Tried to update an expense that does not exist.
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist.
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to update a person that does not exist.
    #[error("tried to update a person that is not in the database")]
    UpdateMissingPerson,

    /// Tried to delete a person that does not exist.
    #[error("tried to delete a person that is not in the database")]
    DeleteMissingPerson,

    /// Tried to update a loan that does not exist.
    #[error("tried to update a loan that is not in the database")]
    UpdateMissingLoan,

    /// Tried to delete a loan that does not exist.
    #[error("tried to delete a loan that is not in the database")]
    DeleteMissingLoan,

    /// Tried to delete a loan payment that does not exist.
    #[error("tried to delete a loan payment that is not in the database")]
    DeleteMissingLoanPayment,

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded file is not a PDF.
    #[error("file is not a PDF")]
    NotPdf,

    /// The multipart form did not contain a file field.
    #[error("no file was attached to the upload")]
    MissingFile,

    /// An error occurred while reading or writing an uploaded file on disk.
    ///
    /// The inner string should only be logged for debugging on the server.
    #[error("file storage error: {0}")]
    FileStorage(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::NotACreditCard(_)
            | Error::MissingCycleDay
            | Error::InvalidCycleDay(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidDate(_)
            | Error::EmptyName
            | Error::NonPositiveAmount(_)
            | Error::InvalidPaymentMethod
            | Error::InvalidPerson
            | Error::PaymentMethodInUse
            | Error::DuplicatePaymentMethodName(_)
            | Error::DuplicatePersonName(_)
            | Error::MultipartError(_)
            | Error::NotPdf
            | Error::MissingFile => StatusCode::BAD_REQUEST,
            Error::UpdateMissingPaymentMethod
            | Error::DeleteMissingPaymentMethod
            | Error::UpdateMissingExpense
            | Error::DeleteMissingExpense
            | Error::UpdateMissingPerson
            | Error::DeleteMissingPerson
            | Error::UpdateMissingLoan
            | Error::DeleteMissingLoan
            | Error::DeleteMissingLoanPayment => StatusCode::NOT_FOUND,
            Error::FileStorage(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "an internal error occurred".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
