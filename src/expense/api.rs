//! HTTP handlers for expenses, allocations, and invoice uploads.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    expense::{
        Allocation, Expense, ExpenseId, create_expense, db::ExpenseQuery, delete_expense,
        get_allocations, get_expense, get_expenses, get_invoice, insert_invoice,
        replace_allocations, update_expense,
    },
    payment_method::PaymentMethodId,
    person::PersonId,
    uploads,
};

/// The client's description of an expense, for create and update.
#[derive(Debug, Deserialize)]
pub struct ExpensePayload {
    /// The date the expense was incurred.
    pub date: Date,
    /// The date the transaction settled, if known.
    pub posted_date: Option<Date>,
    /// The amount spent. Must be positive.
    pub amount: f64,
    /// A category label.
    pub category: String,
    /// A free-form description.
    #[serde(default)]
    pub description: String,
    /// The payment method used.
    pub payment_method_id: PaymentMethodId,
}

impl ExpensePayload {
    fn validate(&self) -> Result<(), Error> {
        if self.amount <= 0.0 {
            return Err(Error::NonPositiveAmount(self.amount));
        }

        Ok(())
    }
}

/// Query string filters for listing expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    /// Only include expenses paid with this payment method.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Only include expenses effective on or after this date.
    pub start_date: Option<Date>,
    /// Only include expenses effective on or before this date.
    pub end_date: Option<Date>,
}

/// One person's share in an allocation replacement request.
#[derive(Debug, Deserialize)]
pub struct AllocationShare {
    /// The person the share belongs to.
    pub person_id: PersonId,
    /// The amount assigned to them. Must be positive.
    pub amount: f64,
}

/// Route handler for listing expenses with optional filters.
pub async fn list_expenses_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<Expense>>, Error> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date)
        && end < start
    {
        return Err(Error::InvalidDateRange { start, end });
    }

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_expenses(
        &ExpenseQuery {
            payment_method_id: query.payment_method_id,
            start_date: query.start_date,
            end_date: query.end_date,
        },
        &connection,
    )
    .map(Json)
}

/// Route handler for retrieving a single expense.
pub async fn get_expense_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_expense(expense_id, &connection).map(Json)
}

/// Route handler for creating an expense.
pub async fn create_expense_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    payload.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = create_expense(
        payload.date,
        payload.posted_date,
        payload.amount,
        &payload.category,
        &payload.description,
        payload.payment_method_id,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// Route handler for updating an expense.
pub async fn update_expense_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
    Json(payload): Json<ExpensePayload>,
) -> Result<Json<Expense>, Error> {
    payload.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_expense(
        expense_id,
        payload.date,
        payload.posted_date,
        payload.amount,
        &payload.category,
        &payload.description,
        payload.payment_method_id,
        &connection,
    )?;

    get_expense(expense_id, &connection).map(Json)
}

/// Route handler for deleting an expense.
///
/// Allocations and invoice metadata cascade in the database; the invoice file,
/// if any, is removed from disk afterwards.
pub async fn delete_expense_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    let stored_name = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let stored_name = match get_invoice(expense_id, &connection) {
            Ok(invoice) => Some(invoice.stored_name),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        };

        delete_expense(expense_id, &connection)?;

        stored_name
    };

    if let Some(stored_name) = stored_name {
        uploads::remove_upload(&state.upload_dir, &stored_name)?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Route handler for retrieving an expense's allocations.
pub async fn get_allocations_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Vec<Allocation>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    // Distinguish a missing expense from one with no allocations.
    get_expense(expense_id, &connection)?;

    get_allocations(expense_id, &connection).map(Json)
}

/// Route handler for replacing an expense's allocations as a whole.
pub async fn replace_allocations_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
    Json(shares): Json<Vec<AllocationShare>>,
) -> Result<Json<Vec<Allocation>>, Error> {
    for share in &shares {
        if share.amount <= 0.0 {
            return Err(Error::NonPositiveAmount(share.amount));
        }
    }

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_expense(expense_id, &connection)?;

    let shares: Vec<(PersonId, f64)> = shares
        .into_iter()
        .map(|share| (share.person_id, share.amount))
        .collect();

    replace_allocations(expense_id, &shares, &connection).map(Json)
}

/// Route handler for uploading an expense's invoice PDF.
///
/// Re-uploading replaces the previous invoice.
pub async fn upload_invoice_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<crate::expense::Invoice>), Error> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("invoice.pdf").to_owned();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|error| Error::MultipartError(error.to_string()))?;

            upload = Some((filename, mime_type, bytes));
        }
    }

    let (filename, mime_type, bytes) = upload.ok_or(Error::MissingFile)?;

    if mime_type != "application/pdf" && !filename.to_lowercase().ends_with(".pdf") {
        return Err(Error::NotPdf);
    }

    let stored_name = uploads::generate_stored_name("invoice");

    let (invoice, superseded) = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_expense(expense_id, &connection)?;

        uploads::save_upload(&state.upload_dir, &stored_name, &bytes)?;

        let superseded = match get_invoice(expense_id, &connection) {
            Ok(previous) => Some(previous.stored_name),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        };

        let invoice = insert_invoice(
            expense_id,
            &filename,
            bytes.len() as i64,
            &mime_type,
            &stored_name,
            &connection,
        )?;

        (invoice, superseded)
    };

    if let Some(superseded) = superseded {
        uploads::remove_upload(&state.upload_dir, &superseded)?;
    }

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Route handler for downloading an expense's invoice PDF.
pub async fn download_invoice_endpoint(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let invoice = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_invoice(expense_id, &connection)?
    };

    let bytes = uploads::read_upload(&state.upload_dir, &invoice.stored_name)?;

    Ok((
        [
            (header::CONTENT_TYPE, invoice.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", invoice.filename),
            ),
        ],
        bytes,
    )
        .into_response())
}
