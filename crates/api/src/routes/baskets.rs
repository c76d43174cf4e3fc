//! Basket and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{CheckoutOutcome, CheckoutRequest};
use domain::Basket;
use event_bus::EventPublisher;
use kv_store::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

/// GET /basket: list all baskets.
#[tracing::instrument(skip(state))]
pub async fn list<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
) -> Result<Json<Vec<Basket>>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    Ok(Json(state.baskets.list().await?))
}

/// GET /basket/{user_name}: load a user's basket.
#[tracing::instrument(skip(state))]
pub async fn get<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(user_name): Path<String>,
) -> Result<Json<Basket>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let basket = state
        .baskets
        .get(&user_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Basket not found: {user_name}")))?;
    Ok(Json(basket))
}

/// POST /basket: store a basket, replacing the user's previous one.
#[tracing::instrument(skip(state, payload))]
pub async fn put<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    payload: Result<Json<Basket>, JsonRejection>,
) -> Result<Json<Basket>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Json(basket) = payload?;
    Ok(Json(state.baskets.put(basket).await?))
}

/// DELETE /basket/{user_name}: delete a user's basket if it exists.
#[tracing::instrument(skip(state))]
pub async fn delete<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(user_name): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    state.baskets.delete(&user_name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /basket/checkout: publish the user's basket as a checkout event.
///
/// Orders are created asynchronously, so a successful checkout answers
/// `202 Accepted`.
#[tracing::instrument(skip(state, payload))]
pub async fn checkout<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutOutcome>), ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Json(request) = payload?;
    let outcome = state.checkout.checkout(request).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}
