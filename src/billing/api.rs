//! HTTP handlers for billing cycles, statement balances, card payments, and
//! archived statement documents.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    AppState, Error,
    billing::{
        archive::{Statement, StatementId, get_statement, get_statements, insert_statement},
        payment::{CardPayment, get_card_payments, record_card_payment},
        statement::{
            CycleSummary, StatementBalance, previous_billing_cycles, statement_balance,
        },
    },
    payment_method::{PaymentMethodId, PaymentMethodKind, get_payment_method},
};

/// How many previous cycles to summarise when the client does not say.
const DEFAULT_CYCLE_COUNT: usize = 12;
/// The most previous cycles a single request may ask for.
const MAX_CYCLE_COUNT: usize = 24;

fn parse_iso_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

fn ensure_credit_card(
    payment_method_id: PaymentMethodId,
    connection: &rusqlite::Connection,
) -> Result<(), Error> {
    let payment_method = get_payment_method(payment_method_id, connection)?;

    if payment_method.kind != PaymentMethodKind::CreditCard {
        return Err(Error::NotACreditCard(payment_method_id));
    }

    Ok(())
}

/// Query string parameters for the billing cycle history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct BillingCycleQuery {
    /// How many previous cycles to summarise. Defaults to twelve, capped at
    /// twenty-four.
    pub count: Option<usize>,
}

/// Route handler for summarising a credit card's previous billing cycles.
pub async fn get_billing_cycles_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
    Query(query): Query<BillingCycleQuery>,
) -> Result<Json<Vec<CycleSummary>>, Error> {
    let count = query
        .count
        .unwrap_or(DEFAULT_CYCLE_COUNT)
        .clamp(1, MAX_CYCLE_COUNT);
    let today = OffsetDateTime::now_utc().date();

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    previous_billing_cycles(payment_method_id, count, today, &connection).map(Json)
}

/// Route handler for a credit card's current statement balance.
pub async fn get_statement_balance_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
) -> Result<Json<StatementBalance>, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    statement_balance(payment_method_id, today, &connection).map(Json)
}

/// The client's description of a payment made against a credit card.
#[derive(Debug, Deserialize)]
pub struct CardPaymentPayload {
    /// The amount paid. Must be positive.
    pub amount: f64,
    /// The date the payment was made.
    pub payment_date: Date,
    /// An optional note.
    pub notes: Option<String>,
}

/// Route handler for listing the payments made against a credit card.
pub async fn list_card_payments_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
) -> Result<Json<Vec<CardPayment>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    ensure_credit_card(payment_method_id, &connection)?;

    get_card_payments(payment_method_id, &connection).map(Json)
}

/// Route handler for recording a payment against a credit card.
pub async fn create_card_payment_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
    Json(payload): Json<CardPaymentPayload>,
) -> Result<(StatusCode, Json<CardPayment>), Error> {
    if payload.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(payload.amount));
    }

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    ensure_credit_card(payment_method_id, &connection)?;

    let payment = record_card_payment(
        payment_method_id,
        payload.amount,
        payload.payment_date,
        payload.notes.as_deref(),
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Route handler for listing a credit card's archived statements.
pub async fn list_statements_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
) -> Result<Json<Vec<Statement>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    ensure_credit_card(payment_method_id, &connection)?;

    get_statements(payment_method_id, &connection).map(Json)
}

/// Route handler for uploading a statement PDF for a credit card.
///
/// Expects a multipart form with text fields `statement_date`, `period_start`
/// and `period_end` (ISO dates) and a `file` part containing the PDF.
pub async fn upload_statement_endpoint(
    State(state): State<AppState>,
    Path(payment_method_id): Path<PaymentMethodId>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Statement>), Error> {
    let mut statement_date = None;
    let mut period_start = None;
    let mut period_end = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        match field.name() {
            Some("statement_date") => {
                let text = field
                    .text()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;
                statement_date = Some(parse_iso_date(&text)?);
            }
            Some("period_start") => {
                let text = field
                    .text()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;
                period_start = Some(parse_iso_date(&text)?);
            }
            Some("period_end") => {
                let text = field
                    .text()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;
                period_end = Some(parse_iso_date(&text)?);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("statement.pdf").to_owned();
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
            _ => {}
        }
    }

    let statement_date =
        statement_date.ok_or_else(|| Error::InvalidDate("statement_date missing".to_owned()))?;
    let period_start =
        period_start.ok_or_else(|| Error::InvalidDate("period_start missing".to_owned()))?;
    let period_end =
        period_end.ok_or_else(|| Error::InvalidDate("period_end missing".to_owned()))?;
    let (filename, mime_type, bytes) = upload.ok_or(Error::MissingFile)?;

    if period_end < period_start {
        return Err(Error::InvalidDateRange {
            start: period_start,
            end: period_end,
        });
    }

    if mime_type != "application/pdf" && !filename.to_lowercase().ends_with(".pdf") {
        return Err(Error::NotPdf);
    }

    let stored_name = crate::uploads::generate_stored_name("statement");

    let statement = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        ensure_credit_card(payment_method_id, &connection)?;

        crate::uploads::save_upload(&state.upload_dir, &stored_name, &bytes)?;

        insert_statement(
            payment_method_id,
            statement_date,
            period_start,
            period_end,
            &filename,
            bytes.len() as i64,
            &mime_type,
            &stored_name,
            &connection,
        )?
    };

    Ok((StatusCode::CREATED, Json(statement)))
}

/// Route handler for downloading an archived statement document.
pub async fn download_statement_file_endpoint(
    State(state): State<AppState>,
    Path(statement_id): Path<StatementId>,
) -> Result<Response, Error> {
    let statement = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_statement(statement_id, &connection)?
    };

    let bytes = crate::uploads::read_upload(&state.upload_dir, &statement.stored_name)?;

    Ok((
        [
            (header::CONTENT_TYPE, statement.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", statement.filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod billing_api_tests {
    use axum::http::StatusCode;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().expect("Could not open in-memory database");
        let state = AppState::new(connection, std::env::temp_dir())
            .expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server")
    }

    async fn create_credit_card(server: &TestServer) -> i64 {
        let response: Value = server
            .post(endpoints::PAYMENT_METHODS)
            .json(&json!({
                "kind": "credit_card",
                "name": "Rewards card",
                "billing_cycle_day": 16
            }))
            .await
            .json();

        response["id"].as_i64().unwrap()
    }

    async fn create_debit_account(server: &TestServer) -> i64 {
        let response: Value = server
            .post(endpoints::PAYMENT_METHODS)
            .json(&json!({ "kind": "debit", "name": "Everyday account" }))
            .await
            .json();

        response["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn statement_balance_for_credit_card_succeeds() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let response = server
            .get(&endpoints::format_endpoint(
                endpoints::STATEMENT_BALANCE,
                card,
            ))
            .await;

        response.assert_status_ok();
        let balance: Value = response.json();
        assert_eq!(balance["transaction_count"], 0);
        assert_eq!(balance["balance"], 0.0);
    }

    #[tokio::test]
    async fn statement_balance_for_debit_account_fails() {
        let server = get_test_server();
        let account = create_debit_account(&server).await;

        let response = server
            .get(&endpoints::format_endpoint(
                endpoints::STATEMENT_BALANCE,
                account,
            ))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn statement_balance_for_missing_payment_method_returns_404() {
        let server = get_test_server();

        let response = server
            .get(&endpoints::format_endpoint(
                endpoints::STATEMENT_BALANCE,
                999,
            ))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn billing_cycles_default_to_twelve() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let response = server
            .get(&endpoints::format_endpoint(endpoints::BILLING_CYCLES, card))
            .await;

        response.assert_status_ok();
        let cycles: Value = response.json();
        assert_eq!(cycles.as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn billing_cycle_count_is_clamped() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let response = server
            .get(&endpoints::format_endpoint(endpoints::BILLING_CYCLES, card))
            .add_query_param("count", 100)
            .await;

        response.assert_status_ok();
        let cycles: Value = response.json();
        assert_eq!(cycles.as_array().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn record_and_list_card_payments() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let response = server
            .post(&endpoints::format_endpoint(endpoints::CARD_PAYMENTS, card))
            .json(&json!({
                "amount": 150.0,
                "payment_date": "2024-06-20",
                "notes": "partial payment"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let payments: Value = server
            .get(&endpoints::format_endpoint(endpoints::CARD_PAYMENTS, card))
            .await
            .json();

        assert_eq!(payments.as_array().unwrap().len(), 1);
        assert_eq!(payments[0]["amount"], 150.0);
        assert_eq!(payments[0]["payment_date"], "2024-06-20");
    }

    #[tokio::test]
    async fn card_payment_with_non_positive_amount_fails() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let response = server
            .post(&endpoints::format_endpoint(endpoints::CARD_PAYMENTS, card))
            .json(&json!({ "amount": -10.0, "payment_date": "2024-06-20" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn card_payment_against_debit_account_fails() {
        let server = get_test_server();
        let account = create_debit_account(&server).await;

        let response = server
            .post(&endpoints::format_endpoint(
                endpoints::CARD_PAYMENTS,
                account,
            ))
            .json(&json!({ "amount": 10.0, "payment_date": "2024-06-20" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_list_and_download_statement() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let form = MultipartForm::new()
            .add_text("statement_date", "2024-07-16")
            .add_text("period_start", "2024-06-16")
            .add_text("period_end", "2024-07-15")
            .add_part(
                "file",
                Part::bytes(b"%PDF-1.4 test".to_vec())
                    .file_name("july.pdf")
                    .mime_type("application/pdf"),
            );

        let response = server
            .post(&endpoints::format_endpoint(endpoints::STATEMENTS, card))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::CREATED);
        let uploaded: Value = response.json();
        let statement_id = uploaded["id"].as_i64().unwrap();
        assert_eq!(uploaded["filename"], "july.pdf");
        assert!(uploaded.get("stored_name").is_none());

        let listed: Value = server
            .get(&endpoints::format_endpoint(endpoints::STATEMENTS, card))
            .await
            .json();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let download = server
            .get(&endpoints::format_endpoint(
                endpoints::STATEMENT_FILE,
                statement_id,
            ))
            .await;

        download.assert_status_ok();
        assert_eq!(download.as_bytes().as_ref(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn upload_rejects_non_pdf_file() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let form = MultipartForm::new()
            .add_text("statement_date", "2024-07-16")
            .add_text("period_start", "2024-06-16")
            .add_text("period_end", "2024-07-15")
            .add_part(
                "file",
                Part::bytes(b"hello".to_vec())
                    .file_name("notes.txt")
                    .mime_type("text/plain"),
            );

        let response = server
            .post(&endpoints::format_endpoint(endpoints::STATEMENTS, card))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_rejects_inverted_period() {
        let server = get_test_server();
        let card = create_credit_card(&server).await;

        let form = MultipartForm::new()
            .add_text("statement_date", "2024-07-16")
            .add_text("period_start", "2024-07-15")
            .add_text("period_end", "2024-06-16")
            .add_part(
                "file",
                Part::bytes(b"%PDF-1.4".to_vec())
                    .file_name("july.pdf")
                    .mime_type("application/pdf"),
            );

        let response = server
            .post(&endpoints::format_endpoint(endpoints::STATEMENTS, card))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
