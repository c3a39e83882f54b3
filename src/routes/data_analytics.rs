use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{DEFAULT_REPORT_TYPE, EMPTY_JSON_OBJECT, ERR_REPORT_NOT_FOUND};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{blocking, delete_owned, now_rfc3339, require_owned, update_owned};
use crate::security::CurrentUser;
use crate::AppState;

fn default_report_type() -> String {
    DEFAULT_REPORT_TYPE.to_string()
}

fn default_config() -> String {
    EMPTY_JSON_OBJECT.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub name: String,
    #[serde(default = "default_report_type")]
    pub report_type: String,
    #[serde(default = "default_config")]
    pub config_json: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportRequest {
    pub name: Option<String>,
    pub report_type: Option<String>,
    pub config_json: Option<String>,
}

pub async fn list_reports(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::SAVED_REPORTS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_report(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateReportRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("name", payload.name)
        .with("report_type", payload.report_type)
        .with("config_json", payload.config_json)
        .with("created_at", now_rfc3339());

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::SAVED_REPORTS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_report(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(report_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::SAVED_REPORTS, &user_id, &report_id, ERR_REPORT_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_report(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(report_id): Path<String>,
    AppJson(payload): AppJson<UpdateReportRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("name", payload.name)
        .with_some("report_type", payload.report_type)
        .with_some("config_json", payload.config_json);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::SAVED_REPORTS,
            &user_id,
            &report_id,
            updates,
            ERR_REPORT_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_report(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(report_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::SAVED_REPORTS, &user_id, &report_id, ERR_REPORT_NOT_FOUND)
    })
    .await?;
    Ok(Json(()))
}
