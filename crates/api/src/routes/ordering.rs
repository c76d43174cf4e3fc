//! Raw ordering entry point.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use event_bus::EventPublisher;
use kv_store::KeyValueStore;
use ordering::{Inbound, InboundResponse};
use serde_json::Value;

use crate::AppState;
use crate::error::ApiError;

/// POST /ordering/invoke: accept a queue batch, a bus event or a forwarded
/// HTTP request and dispatch it by shape.
#[tracing::instrument(skip(state, payload))]
pub async fn invoke<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<InboundResponse>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Json(payload) = payload?;
    let inbound = Inbound::detect(payload)?;
    Ok(Json(state.ordering.dispatch(inbound).await?))
}
