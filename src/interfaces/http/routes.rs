use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::application::lifecycle::{TransactionLifecycle, TransactionRequest};
use crate::application::status::StatusResolver;
use crate::application::store::TransactionStore;
use crate::domain::codes;

use super::requests::{
    CompleteRequest, DetailsRequest, InitRequest, PaymentRequest, RefundRequest, StatusRequest,
};
use super::responses::{DetailsResponse, TransactionResponse};

pub const HEADER_X_SOURCE: &str = "X-SOURCE";
pub const SOURCE_COMERCIA: &str = "COMERCIA";

#[derive(Clone)]
pub struct AppState {
    pub store: TransactionStore,
    pub lifecycle: TransactionLifecycle,
    pub resolver: StatusResolver,
}

/// Builds the mock terminal's route tree.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/transactions/init", post(init))
        .route("/v1/transactions/payment", post(payment))
        .route("/v1/transactions/preauth/new", post(preauth_new))
        .route("/v1/transactions/preauth/complete", post(preauth_complete))
        .route("/v1/transactions/refund", post(refund))
        .route("/v1/transactions/status", post(status))
        .route("/v1/transactions/last", get(last))
        .route("/v1/reporting/details", post(details))
        .with_state(state)
}

fn source_ok(headers: &HeaderMap) -> bool {
    headers
        .get(HEADER_X_SOURCE)
        .and_then(|value| value.to_str().ok())
        == Some(SOURCE_COMERCIA)
}

/// Parses a JSON body; malformed input becomes result code 2, never a 4xx.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Json<TransactionResponse>> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejected malformed request body");
        Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR))
    })
}

macro_rules! require_source {
    ($headers:expr) => {
        if !source_ok(&$headers) {
            return Json(TransactionResponse::code(codes::EMV_INITIALIZATION_ERROR));
        }
    };
}

async fn init(headers: HeaderMap, body: Bytes) -> Json<TransactionResponse> {
    require_source!(headers);
    let request: InitRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.user.is_empty() {
        return Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR));
    }
    Json(TransactionResponse::code(codes::INITIALIZATION_SUCCESSFUL))
}

async fn payment(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Bytes,
) -> Json<TransactionResponse> {
    require_source!(headers);
    let request: PaymentRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.order_id.is_empty() {
        return Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR));
    }

    match state
        .lifecycle
        .create_payment(TransactionRequest {
            order_id: request.order_id,
            amount: request.amount,
            device_type: request.device_type,
            tokenization: request.tokenization,
            transaction_id: None,
        })
        .await
    {
        Ok(tx) => Json(TransactionResponse::summary(&tx)),
        Err(e) => Json(TransactionResponse::from_error(&e)),
    }
}

async fn preauth_new(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Bytes,
) -> Json<TransactionResponse> {
    require_source!(headers);
    let request: PaymentRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.order_id.is_empty() {
        return Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR));
    }

    match state
        .lifecycle
        .create_preauth(TransactionRequest {
            order_id: request.order_id,
            amount: request.amount,
            device_type: request.device_type,
            tokenization: request.tokenization,
            transaction_id: None,
        })
        .await
    {
        Ok(tx) => Json(TransactionResponse::summary(&tx)),
        Err(e) => Json(TransactionResponse::from_error(&e)),
    }
}

async fn preauth_complete(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Bytes,
) -> Json<TransactionResponse> {
    require_source!(headers);
    let request: CompleteRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.order_id.is_empty() {
        return Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR));
    }

    match state
        .lifecycle
        .complete_preauth(&request.order_id, request.amount)
        .await
    {
        Ok(tx) => Json(TransactionResponse::summary(&tx)),
        Err(e) => Json(TransactionResponse::from_error(&e)),
    }
}

async fn refund(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Bytes,
) -> Json<TransactionResponse> {
    require_source!(headers);
    let request: RefundRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.order_id.is_empty() || request.transaction_id.is_empty() {
        return Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR));
    }

    match state
        .lifecycle
        .create_refund(TransactionRequest {
            order_id: request.order_id,
            amount: request.amount,
            device_type: None,
            tokenization: request.tokenization,
            transaction_id: Some(request.transaction_id),
        })
        .await
    {
        Ok(tx) => Json(TransactionResponse::summary(&tx)),
        Err(e) => Json(TransactionResponse::from_error(&e)),
    }
}

async fn status(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Bytes,
) -> Json<TransactionResponse> {
    require_source!(headers);
    let request: StatusRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.order_id.is_empty() {
        return Json(TransactionResponse::code(codes::MSG_FORMAT_ERROR));
    }

    match state.resolver.status(&request.order_id).await {
        Ok(tx) => Json(TransactionResponse::summary(&tx)),
        Err(e) => Json(TransactionResponse::from_error(&e)),
    }
}

async fn last(headers: HeaderMap, State(state): State<AppState>) -> Json<TransactionResponse> {
    require_source!(headers);
    match state.store.latest().await {
        Some(tx) => Json(TransactionResponse::detailed(&tx)),
        None => Json(TransactionResponse::code(codes::DETAILS_NOT_AVAILABLE)),
    }
}

async fn details(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DetailsResponse>, Json<TransactionResponse>> {
    if !source_ok(&headers) {
        return Err(Json(TransactionResponse::code(
            codes::EMV_INITIALIZATION_ERROR,
        )));
    }
    let request: DetailsRequest = parse_body(&body)?;

    let mut transactions = state.store.all().await;
    transactions.retain(|tx| {
        request.start_date.is_none_or(|start| tx.timestamp >= start)
            && request.end_date.is_none_or(|end| tx.timestamp <= end)
            && request.r#type.is_none_or(|t| tx.r#type == Some(t))
    });
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(Json(DetailsResponse {
        result_code: codes::SUCCESS,
        result_message: codes::message(codes::SUCCESS).to_string(),
        transactions: transactions
            .iter()
            .map(TransactionResponse::detailed)
            .collect(),
    }))
}
