use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{DEFAULT_CURRENCY, ERR_HOLDING_NOT_FOUND, ERR_PORTFOLIO_NOT_FOUND};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{
    blocking, delete_children, delete_owned, list_children, now_rfc3339, require_owned,
    require_owned_child, update_owned,
};
use crate::security::CurrentUser;
use crate::AppState;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePortfolioRequest {
    pub name: Option<String>,
    pub currency: Option<String>,
}

impl UpdatePortfolioRequest {
    fn into_updates(self) -> Row {
        Row::new()
            .with_some("name", self.name)
            .with_some("currency", self.currency)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHoldingRequest {
    pub symbol: String,
    pub asset_class: String,
    pub quantity: String,
    pub avg_cost: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHoldingRequest {
    pub symbol: Option<String>,
    pub asset_class: Option<String>,
    pub quantity: Option<String>,
    pub avg_cost: Option<String>,
}

impl UpdateHoldingRequest {
    fn into_updates(self) -> Row {
        Row::new()
            .with_some("symbol", self.symbol)
            .with_some("asset_class", self.asset_class)
            .with_some("quantity", self.quantity)
            .with_some("avg_cost", self.avg_cost)
    }
}

/// GET /api/v1/portfolios
pub async fn list_portfolios(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::PORTFOLIOS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

/// POST /api/v1/portfolios
pub async fn create_portfolio(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreatePortfolioRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("name", payload.name)
        .with("currency", payload.currency)
        .with("created_at", now_rfc3339());

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::PORTFOLIOS, row)?)
    })
    .await?;

    tracing::info!("Portfolio created: {}", row.value("id"));
    Ok(Json(row))
}

/// GET /api/v1/portfolios/:portfolio_id
pub async fn get_portfolio(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::PORTFOLIOS, &user_id, &portfolio_id, ERR_PORTFOLIO_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

/// PUT /api/v1/portfolios/:portfolio_id
pub async fn update_portfolio(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(portfolio_id): Path<String>,
    AppJson(payload): AppJson<UpdatePortfolioRequest>,
) -> Result<Json<Row>> {
    let updates = payload.into_updates();
    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::PORTFOLIOS,
            &user_id,
            &portfolio_id,
            updates,
            ERR_PORTFOLIO_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/portfolios/:portfolio_id
///
/// Also removes the portfolio's holdings.
pub async fn delete_portfolio(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(portfolio_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::PORTFOLIOS, &user_id, &portfolio_id, ERR_PORTFOLIO_NOT_FOUND)?;
        delete_children(store, tables::HOLDINGS, &user_id, "portfolio_id", &portfolio_id)?;
        tracing::info!("Portfolio deleted: {}", portfolio_id);
        Ok(())
    })
    .await?;
    Ok(Json(()))
}

/// GET /api/v1/portfolios/:portfolio_id/holdings
pub async fn list_holdings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        require_owned(store, tables::PORTFOLIOS, &user_id, &portfolio_id, ERR_PORTFOLIO_NOT_FOUND)?;
        list_children(store, tables::HOLDINGS, &user_id, "portfolio_id", &portfolio_id)
    })
    .await?;
    Ok(Json(rows))
}

/// POST /api/v1/portfolios/:portfolio_id/holdings
pub async fn create_holding(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(portfolio_id): Path<String>,
    AppJson(payload): AppJson<CreateHoldingRequest>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::PORTFOLIOS, &user_id, &portfolio_id, ERR_PORTFOLIO_NOT_FOUND)?;
        let row = Row::new()
            .with("portfolio_id", portfolio_id)
            .with("user_id", user_id)
            .with("symbol", payload.symbol)
            .with("asset_class", payload.asset_class)
            .with("quantity", payload.quantity)
            .with("avg_cost", payload.avg_cost);
        Ok(store.append_row(tables::HOLDINGS, row)?)
    })
    .await?;
    Ok(Json(row))
}

/// PUT /api/v1/portfolios/:portfolio_id/holdings/:holding_id
pub async fn update_holding(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((portfolio_id, holding_id)): Path<(String, String)>,
    AppJson(payload): AppJson<UpdateHoldingRequest>,
) -> Result<Json<Row>> {
    let updates = payload.into_updates();
    let row = blocking(&state.store, move |store| {
        require_owned_child(
            store,
            tables::HOLDINGS,
            &user_id,
            &holding_id,
            "portfolio_id",
            &portfolio_id,
            ERR_HOLDING_NOT_FOUND,
        )?;
        update_owned(store, tables::HOLDINGS, &user_id, &holding_id, updates, ERR_HOLDING_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/portfolios/:portfolio_id/holdings/:holding_id
pub async fn delete_holding(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((portfolio_id, holding_id)): Path<(String, String)>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        require_owned_child(
            store,
            tables::HOLDINGS,
            &user_id,
            &holding_id,
            "portfolio_id",
            &portfolio_id,
            ERR_HOLDING_NOT_FOUND,
        )?;
        store.delete_row(tables::HOLDINGS, "id", &holding_id)?;
        Ok(())
    })
    .await?;
    Ok(Json(()))
}
