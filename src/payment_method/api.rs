//! HTTP handlers for payment method CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    payment_method::{
        PaymentMethod, PaymentMethodId, PaymentMethodKind, create_payment_method,
        delete_payment_method, get_all_payment_methods, get_payment_method,
        update_payment_method, validate_cycle_day,
    },
};

/// The client's description of a payment method, for create and update.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodPayload {
    /// The kind of payment method.
    pub kind: PaymentMethodKind,
    /// The display name.
    pub name: String,
    /// Whether the method can be used for new expenses. Defaults to true.
    #[serde(default = "default_active")]
    pub active: bool,
    /// The billing cycle day for credit cards.
    pub billing_cycle_day: Option<i64>,
    /// The last known balance for credit cards.
    pub current_balance: Option<f64>,
}

fn default_active() -> bool {
    true
}

/// Validated name and cycle day from a [PaymentMethodPayload].
fn validate_payload(payload: &PaymentMethodPayload) -> Result<(String, Option<u8>), Error> {
    let name = payload.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let billing_cycle_day = payload
        .billing_cycle_day
        .map(validate_cycle_day)
        .transpose()?;

    if payload.kind == PaymentMethodKind::CreditCard && billing_cycle_day.is_none() {
        return Err(Error::MissingCycleDay);
    }

    Ok((name.to_owned(), billing_cycle_day))
}

/// Route handler for listing all payment methods.
pub async fn list_payment_methods_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethod>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_payment_methods(&connection).map(Json)
}

/// Route handler for retrieving a single payment method.
pub async fn get_payment_method_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
) -> Result<Json<PaymentMethod>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_payment_method(payment_method_id, &connection).map(Json)
}

/// Route handler for creating a payment method.
pub async fn create_payment_method_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<PaymentMethodPayload>,
) -> Result<(StatusCode, Json<PaymentMethod>), Error> {
    let (name, billing_cycle_day) = validate_payload(&payload)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let method = create_payment_method(
        payload.kind,
        &name,
        payload.active,
        billing_cycle_day,
        payload.current_balance,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(method)))
}

/// Route handler for updating a payment method.
pub async fn update_payment_method_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
    Json(payload): Json<PaymentMethodPayload>,
) -> Result<Json<PaymentMethod>, Error> {
    let (name, billing_cycle_day) = validate_payload(&payload)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_payment_method(
        payment_method_id,
        payload.kind,
        &name,
        payload.active,
        billing_cycle_day,
        payload.current_balance,
        &connection,
    )?;

    get_payment_method(payment_method_id, &connection).map(Json)
}

/// Route handler for deleting a payment method.
pub async fn delete_payment_method_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_payment_method(payment_method_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
