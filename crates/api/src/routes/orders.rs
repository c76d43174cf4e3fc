//! Order query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use event_bus::EventPublisher;
use kv_store::KeyValueStore;
use ordering::Order;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParams {
    pub order_date: Option<String>,
}

/// GET /order: list all orders.
#[tracing::instrument(skip(state))]
pub async fn list<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    Ok(Json(state.ordering.query().get_all().await?))
}

/// GET /order/{user_name}: list a user's orders, narrowed to one exact
/// order date with `?orderDate=`.
#[tracing::instrument(skip(state))]
pub async fn by_user<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(user_name): Path<String>,
    params: Result<Query<OrderParams>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Query(params) = params?;
    let query = state.ordering.query();
    let orders = match params.order_date {
        Some(order_date) => query.get_by_user_and_date(&user_name, &order_date).await?,
        None => query.get_by_user(&user_name).await?,
    };
    Ok(Json(orders))
}
