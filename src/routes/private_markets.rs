use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{DEFAULT_CURRENCY, ERR_COMMITMENT_NOT_FOUND, ERR_FUND_NOT_FOUND};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{
    blocking, delete_children, delete_owned, list_children, require_owned, update_owned,
};
use crate::security::CurrentUser;
use crate::AppState;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateFundRequest {
    pub name: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub vintage_year: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFundRequest {
    pub name: Option<String>,
    pub strategy: Option<String>,
    pub vintage_year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommitmentRequest {
    pub fund_id: String,
    pub amount: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommitmentRequest {
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub date: Option<String>,
}

pub async fn list_funds(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::FUNDS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_fund(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateFundRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("name", payload.name)
        .with("strategy", payload.strategy)
        .with("vintage_year", payload.vintage_year);

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::FUNDS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_fund(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(fund_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::FUNDS, &user_id, &fund_id, ERR_FUND_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_fund(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(fund_id): Path<String>,
    AppJson(payload): AppJson<UpdateFundRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("name", payload.name)
        .with_some("strategy", payload.strategy)
        .with_some("vintage_year", payload.vintage_year);

    let row = blocking(&state.store, move |store| {
        update_owned(store, tables::FUNDS, &user_id, &fund_id, updates, ERR_FUND_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

/// Deleting a fund also deletes its commitments
pub async fn delete_fund(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(fund_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::FUNDS, &user_id, &fund_id, ERR_FUND_NOT_FOUND)?;
        delete_children(store, tables::COMMITMENTS, &user_id, "fund_id", &fund_id)?;
        Ok(())
    })
    .await?;
    Ok(Json(()))
}

pub async fn list_commitments(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(fund_id): Path<String>,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        require_owned(store, tables::FUNDS, &user_id, &fund_id, ERR_FUND_NOT_FOUND)?;
        list_children(store, tables::COMMITMENTS, &user_id, "fund_id", &fund_id)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_commitment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateCommitmentRequest>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::FUNDS, &user_id, &payload.fund_id, ERR_FUND_NOT_FOUND)?;
        let row = Row::new()
            .with("user_id", user_id)
            .with("fund_id", payload.fund_id)
            .with("amount", payload.amount)
            .with("currency", payload.currency)
            .with("date", payload.date);
        Ok(store.append_row(tables::COMMITMENTS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_commitment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(commitment_id): Path<String>,
    AppJson(payload): AppJson<UpdateCommitmentRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("amount", payload.amount)
        .with_some("currency", payload.currency)
        .with_some("date", payload.date);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::COMMITMENTS,
            &user_id,
            &commitment_id,
            updates,
            ERR_COMMITMENT_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_commitment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(commitment_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(
            store,
            tables::COMMITMENTS,
            &user_id,
            &commitment_id,
            ERR_COMMITMENT_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(()))
}
