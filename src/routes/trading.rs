use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{DEFAULT_ORDER_TYPE, ERR_ORDER_NOT_FOUND, NEW_ORDER_STATUS};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{blocking, delete_owned, now_rfc3339, require_owned, update_owned};
use crate::security::CurrentUser;
use crate::AppState;

fn default_order_type() -> String {
    DEFAULT_ORDER_TYPE.to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    pub portfolio_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub portfolio_id: String,
    pub symbol: String,
    /// BUY / SELL
    pub side: String,
    pub quantity: String,
    #[serde(default = "default_order_type")]
    pub order_type: String,
}

/// Orders only change status after creation
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
}

/// GET /api/v1/trading/orders?portfolio_id=
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        let mut rows = store.get_by_owner(tables::ORDERS, &user_id)?;
        if let Some(portfolio_id) = params.portfolio_id.filter(|p| !p.is_empty()) {
            rows.retain(|row| row.value("portfolio_id") == portfolio_id);
        }
        Ok(rows)
    })
    .await?;
    Ok(Json(rows))
}

/// POST /api/v1/trading/orders
///
/// New orders start with status NEW.
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("portfolio_id", payload.portfolio_id)
        .with("symbol", payload.symbol)
        .with("side", payload.side)
        .with("quantity", payload.quantity)
        .with("order_type", payload.order_type)
        .with("status", NEW_ORDER_STATUS)
        .with("created_at", now_rfc3339());

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::ORDERS, row)?)
    })
    .await?;

    tracing::info!(
        "Order {} created: {} {} {}",
        row.value("id"),
        row.value("side"),
        row.value("quantity"),
        row.value("symbol")
    );
    Ok(Json(row))
}

pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::ORDERS, &user_id, &order_id, ERR_ORDER_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<String>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new().with_some("status", payload.status);
    let row = blocking(&state.store, move |store| {
        update_owned(store, tables::ORDERS, &user_id, &order_id, updates, ERR_ORDER_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_order(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::ORDERS, &user_id, &order_id, ERR_ORDER_NOT_FOUND)
    })
    .await?;
    Ok(Json(()))
}
