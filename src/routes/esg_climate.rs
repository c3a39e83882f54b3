use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{ERR_ESG_NOT_FOUND, ERR_PORTFOLIO_NOT_FOUND};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{blocking, delete_owned, require_owned, update_owned};
use crate::security::CurrentUser;
use crate::AppState;

/// A score (ESG, Carbon, Climate_VaR, ...) for one portfolio as of a date
#[derive(Debug, Deserialize)]
pub struct CreateEsgRequest {
    pub portfolio_id: String,
    pub score_type: String,
    pub value: String,
    pub as_of_date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEsgRequest {
    pub score_type: Option<String>,
    pub value: Option<String>,
    pub as_of_date: Option<String>,
}

pub async fn list_esg(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::PORTFOLIO_ESG, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_esg(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateEsgRequest>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(
            store,
            tables::PORTFOLIOS,
            &user_id,
            &payload.portfolio_id,
            ERR_PORTFOLIO_NOT_FOUND,
        )?;
        let row = Row::new()
            .with("user_id", user_id)
            .with("portfolio_id", payload.portfolio_id)
            .with("score_type", payload.score_type)
            .with("value", payload.value)
            .with("as_of_date", payload.as_of_date);
        Ok(store.append_row(tables::PORTFOLIO_ESG, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_esg(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(esg_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::PORTFOLIO_ESG, &user_id, &esg_id, ERR_ESG_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_esg(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(esg_id): Path<String>,
    AppJson(payload): AppJson<UpdateEsgRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("score_type", payload.score_type)
        .with_some("value", payload.value)
        .with_some("as_of_date", payload.as_of_date);

    let row = blocking(&state.store, move |store| {
        update_owned(store, tables::PORTFOLIO_ESG, &user_id, &esg_id, updates, ERR_ESG_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_esg(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(esg_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::PORTFOLIO_ESG, &user_id, &esg_id, ERR_ESG_NOT_FOUND)
    })
    .await?;
    Ok(Json(()))
}
