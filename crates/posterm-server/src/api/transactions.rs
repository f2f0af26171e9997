use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use posterm_core::TransactionRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// A posted sale as the demo backend keeps it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredTransaction {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct RecordedData {
    reference: String,
    duplicate: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    limit: Option<i64>,
}

fn validate(record: &TransactionRecord) -> Result<(), String> {
    if record.items.is_empty() {
        return Err("transaction has no items".to_string());
    }
    if record.total.is_sign_negative() {
        return Err(format!("total {} is negative", record.total));
    }
    if let Some(line) = record.items.iter().find(|l| l.quantity == 0) {
        return Err(format!("line '{}' has zero quantity", line.product_id));
    }
    if record.items.iter().any(|l| l.unit_price < Decimal::ZERO) {
        return Err("line with negative price".to_string());
    }
    Ok(())
}

/// `POST /api/transactions`: stores the sale in memory.
///
/// Replays of an already stored reference answer 200 with
/// `duplicate: true` so a client retry after a lost response is harmless.
pub(super) async fn record_transaction(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<TransactionRecord>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(record) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected transaction body");
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;
    validate(&record).map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;

    let reference = record.reference.to_string();
    let mut transactions = state.transactions.lock().await;
    let duplicate = transactions
        .iter()
        .any(|t| t.record.reference == record.reference);

    let status = if duplicate {
        tracing::info!(%reference, "duplicate transaction ignored");
        StatusCode::OK
    } else {
        tracing::info!(
            %reference,
            total = %record.total,
            items = record.item_count(),
            payment_method = %record.payment_method,
            "transaction recorded"
        );
        transactions.push(StoredTransaction {
            record,
            received_at: Utc::now(),
        });
        StatusCode::CREATED
    };
    drop(transactions);

    Ok((
        status,
        Json(ApiResponse {
            data: RecordedData {
                reference,
                duplicate,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// `GET /api/transactions`: newest first.
pub(super) async fn list_transactions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = normalize_limit(query.limit);
    let items: Vec<StoredTransaction> = state
        .transactions
        .lock()
        .await
        .iter()
        .rev()
        .take(limit)
        .cloned()
        .collect();

    Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    })
}
