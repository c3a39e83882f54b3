use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{EMPTY_JSON_OBJECT, ERR_CLIENT_ACCOUNT_NOT_FOUND, ERR_MODEL_NOT_FOUND};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{blocking, delete_children, delete_owned, require_owned, update_owned};
use crate::security::CurrentUser;
use crate::AppState;

fn default_allocation() -> String {
    EMPTY_JSON_OBJECT.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateModelRequest {
    pub name: String,
    #[serde(default = "default_allocation")]
    pub allocation_json: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateModelRequest {
    pub name: Option<String>,
    pub allocation_json: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientAccountRequest {
    pub model_id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateClientAccountRequest {
    pub model_id: Option<String>,
    pub name: Option<String>,
}

// =============================================================================
// Model Portfolios
// =============================================================================

pub async fn list_models(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::MODEL_PORTFOLIOS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_model(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateModelRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("name", payload.name)
        .with("allocation_json", payload.allocation_json);

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::MODEL_PORTFOLIOS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_model(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(model_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::MODEL_PORTFOLIOS, &user_id, &model_id, ERR_MODEL_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_model(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(model_id): Path<String>,
    AppJson(payload): AppJson<UpdateModelRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("name", payload.name)
        .with_some("allocation_json", payload.allocation_json);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::MODEL_PORTFOLIOS,
            &user_id,
            &model_id,
            updates,
            ERR_MODEL_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

/// Deleting a model also deletes the client accounts following it
pub async fn delete_model(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(model_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::MODEL_PORTFOLIOS, &user_id, &model_id, ERR_MODEL_NOT_FOUND)?;
        delete_children(store, tables::CLIENT_ACCOUNTS, &user_id, "model_id", &model_id)?;
        Ok(())
    })
    .await?;
    Ok(Json(()))
}

// =============================================================================
// Client Accounts
// =============================================================================

pub async fn list_client_accounts(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::CLIENT_ACCOUNTS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_client_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateClientAccountRequest>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(
            store,
            tables::MODEL_PORTFOLIOS,
            &user_id,
            &payload.model_id,
            ERR_MODEL_NOT_FOUND,
        )?;
        let row = Row::new()
            .with("user_id", user_id)
            .with("model_id", payload.model_id)
            .with("name", payload.name);
        Ok(store.append_row(tables::CLIENT_ACCOUNTS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_client_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(
            store,
            tables::CLIENT_ACCOUNTS,
            &user_id,
            &account_id,
            ERR_CLIENT_ACCOUNT_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_client_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
    AppJson(payload): AppJson<UpdateClientAccountRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("model_id", payload.model_id)
        .with_some("name", payload.name);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::CLIENT_ACCOUNTS,
            &user_id,
            &account_id,
            updates,
            ERR_CLIENT_ACCOUNT_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_client_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(
            store,
            tables::CLIENT_ACCOUNTS,
            &user_id,
            &account_id,
            ERR_CLIENT_ACCOUNT_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(()))
}
