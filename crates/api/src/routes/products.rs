//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::Item;
use domain::Product;
use event_bus::EventPublisher;
use kv_store::{Key, KeyValueStore, PageRequest};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<usize>,
    pub start_after: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductParams {
    pub category: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
}

/// GET /product: list all products, or one page with `?limit=`.
#[tracing::instrument(skip(state))]
pub async fn list<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Query(params) = params?;
    let Some(limit) = params.limit else {
        return Ok(Json(state.catalog.list().await?).into_response());
    };
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }

    let request = match params.start_after {
        Some(id) => PageRequest::after(limit, Key::partition(id)),
        None => PageRequest::first(limit),
    };
    let page = state.catalog.list_page(request).await?;
    let body = ProductPage {
        items: page.items,
        last_key: page.last_key.map(|key| key.partition),
    };
    Ok(Json(body).into_response())
}

/// POST /product: create a product with a generated id.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Json(fields) = payload?;
    let product = state.catalog.create(fields).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /product/{id}: load one product, or with `?category=` the products
/// under this id whose category contains the given text.
#[tracing::instrument(skip(state))]
pub async fn get<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    params: Result<Query<ProductParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Query(params) = params?;
    if let Some(category) = params.category {
        let products = state
            .catalog
            .list_by_category_contains(&id, &category)
            .await?;
        return Ok(Json(products).into_response());
    }

    let product = state
        .catalog
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;
    Ok(Json(product).into_response())
}

/// PUT /product/{id}: merge the given fields into the product.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<Product>, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let Json(fields) = payload?;
    Ok(Json(state.catalog.update(&id, fields).await?))
}

/// DELETE /product/{id}: delete the product if it exists.
#[tracing::instrument(skip(state))]
pub async fn delete<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    state.catalog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
