use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::core::MetricsSnapshot;
use crate::pipeline::Pipeline;
use crate::types::{TransactionId, TransactionRequest, TransactionStatus};

/// Body returned by both create and lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
}

pub(super) async fn create_transaction(
    State(pipeline): State<Pipeline>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(request) = payload?;
    let transaction = pipeline.dispatcher().create(request).await?;
    Ok(Json(TransactionResponse {
        transaction_id: transaction.transaction_id,
        status: transaction.status,
    }))
}

pub(super) async fn get_transaction(
    State(pipeline): State<Pipeline>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let lookup = pipeline.dispatcher().get(&id)?;
    Ok(Json(TransactionResponse {
        transaction_id: lookup.transaction_id(),
        status: lookup.status(),
    }))
}

pub(super) async fn get_metrics(State(pipeline): State<Pipeline>) -> Json<MetricsSnapshot> {
    Json(pipeline.metrics().snapshot())
}
