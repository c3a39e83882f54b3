use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_INTEGRATION_STATUS, DEFAULT_INTEGRATION_TYPE, EMPTY_JSON_OBJECT,
    ERR_INTEGRATION_NOT_FOUND,
};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{blocking, delete_owned, require_owned, update_owned};
use crate::security::CurrentUser;
use crate::AppState;

fn default_integration_type() -> String {
    DEFAULT_INTEGRATION_TYPE.to_string()
}

fn default_status() -> String {
    DEFAULT_INTEGRATION_STATUS.to_string()
}

fn default_config() -> String {
    EMPTY_JSON_OBJECT.to_string()
}

/// Connection to an external custodian, broker or data provider
#[derive(Debug, Deserialize)]
pub struct CreateIntegrationRequest {
    pub provider: String,
    #[serde(default = "default_integration_type")]
    pub integration_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_config")]
    pub config_json: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateIntegrationRequest {
    pub provider: Option<String>,
    pub integration_type: Option<String>,
    pub status: Option<String>,
    pub config_json: Option<String>,
}

pub async fn list_integrations(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::INTEGRATIONS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_integration(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateIntegrationRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("provider", payload.provider)
        .with("integration_type", payload.integration_type)
        .with("status", payload.status)
        .with("config_json", payload.config_json);

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::INTEGRATIONS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_integration(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(integration_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(
            store,
            tables::INTEGRATIONS,
            &user_id,
            &integration_id,
            ERR_INTEGRATION_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_integration(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(integration_id): Path<String>,
    AppJson(payload): AppJson<UpdateIntegrationRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("provider", payload.provider)
        .with_some("integration_type", payload.integration_type)
        .with_some("status", payload.status)
        .with_some("config_json", payload.config_json);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::INTEGRATIONS,
            &user_id,
            &integration_id,
            updates,
            ERR_INTEGRATION_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_integration(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(integration_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(
            store,
            tables::INTEGRATIONS,
            &user_id,
            &integration_id,
            ERR_INTEGRATION_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(()))
}
