use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCOUNT_TYPE, DEFAULT_CURRENCY, ERR_ACCOUNT_NOT_FOUND, ERR_TRANSACTION_NOT_FOUND,
};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{
    blocking, delete_children, delete_owned, list_children, require_owned, update_owned,
};
use crate::security::CurrentUser;
use crate::AppState;

fn default_account_type() -> String {
    DEFAULT_ACCOUNT_TYPE.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default = "default_account_type")]
    pub account_type: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub account_type: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: String,
    /// buy, sell, dividend, fee, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

pub async fn list_accounts(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::ACCOUNTS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateAccountRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("name", payload.name)
        .with("account_type", payload.account_type)
        .with("currency", payload.currency);

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::ACCOUNTS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::ACCOUNTS, &user_id, &account_id, ERR_ACCOUNT_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("name", payload.name)
        .with_some("account_type", payload.account_type)
        .with_some("currency", payload.currency);

    let row = blocking(&state.store, move |store| {
        update_owned(store, tables::ACCOUNTS, &user_id, &account_id, updates, ERR_ACCOUNT_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

/// Deleting an account also deletes its transactions
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::ACCOUNTS, &user_id, &account_id, ERR_ACCOUNT_NOT_FOUND)?;
        delete_children(store, tables::TRANSACTIONS, &user_id, "account_id", &account_id)?;
        Ok(())
    })
    .await?;
    Ok(Json(()))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        require_owned(store, tables::ACCOUNTS, &user_id, &account_id, ERR_ACCOUNT_NOT_FOUND)?;
        list_children(store, tables::TRANSACTIONS, &user_id, "account_id", &account_id)
    })
    .await?;
    Ok(Json(rows))
}

/// The referenced account must belong to the caller
pub async fn create_transaction(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateTransactionRequest>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::ACCOUNTS, &user_id, &payload.account_id, ERR_ACCOUNT_NOT_FOUND)?;
        let row = Row::new()
            .with("user_id", user_id)
            .with("account_id", payload.account_id)
            .with("type", payload.kind)
            .with("amount", payload.amount)
            .with("date", payload.date)
            .with("description", payload.description);
        Ok(store.append_row(tables::TRANSACTIONS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(transaction_id): Path<String>,
    AppJson(payload): AppJson<UpdateTransactionRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("type", payload.kind)
        .with_some("amount", payload.amount)
        .with_some("date", payload.date)
        .with_some("description", payload.description);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::TRANSACTIONS,
            &user_id,
            &transaction_id,
            updates,
            ERR_TRANSACTION_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(transaction_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(
            store,
            tables::TRANSACTIONS,
            &user_id,
            &transaction_id,
            ERR_TRANSACTION_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(()))
}
