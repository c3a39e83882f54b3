use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_SCENARIO_TYPE, EMPTY_JSON_OBJECT, ERR_RESULT_NOT_FOUND, ERR_SCENARIO_NOT_FOUND,
};
use crate::db::{tables, Row};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::{
    blocking, delete_children, delete_owned, list_children, require_owned, update_owned,
};
use crate::security::CurrentUser;
use crate::AppState;

fn default_scenario_type() -> String {
    DEFAULT_SCENARIO_TYPE.to_string()
}

fn default_params() -> String {
    EMPTY_JSON_OBJECT.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateScenarioRequest {
    pub name: String,
    #[serde(default = "default_scenario_type")]
    pub scenario_type: String,
    #[serde(default = "default_params")]
    pub params_json: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateScenarioRequest {
    pub name: Option<String>,
    pub scenario_type: Option<String>,
    pub params_json: Option<String>,
}

/// Risk metric computed for a portfolio under a scenario
#[derive(Debug, Deserialize)]
pub struct CreateResultRequest {
    pub scenario_id: String,
    pub portfolio_id: String,
    pub metric: String,
    pub value: String,
}

pub async fn list_scenarios(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        Ok(store.get_by_owner(tables::RISK_SCENARIOS, &user_id)?)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_scenario(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateScenarioRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("name", payload.name)
        .with("scenario_type", payload.scenario_type)
        .with("params_json", payload.params_json);

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::RISK_SCENARIOS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_scenario(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(scenario_id): Path<String>,
) -> Result<Json<Row>> {
    let row = blocking(&state.store, move |store| {
        require_owned(store, tables::RISK_SCENARIOS, &user_id, &scenario_id, ERR_SCENARIO_NOT_FOUND)
    })
    .await?;
    Ok(Json(row))
}

pub async fn update_scenario(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(scenario_id): Path<String>,
    AppJson(payload): AppJson<UpdateScenarioRequest>,
) -> Result<Json<Row>> {
    let updates = Row::new()
        .with_some("name", payload.name)
        .with_some("scenario_type", payload.scenario_type)
        .with_some("params_json", payload.params_json);

    let row = blocking(&state.store, move |store| {
        update_owned(
            store,
            tables::RISK_SCENARIOS,
            &user_id,
            &scenario_id,
            updates,
            ERR_SCENARIO_NOT_FOUND,
        )
    })
    .await?;
    Ok(Json(row))
}

/// Deleting a scenario also deletes its results
pub async fn delete_scenario(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(scenario_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::RISK_SCENARIOS, &user_id, &scenario_id, ERR_SCENARIO_NOT_FOUND)?;
        delete_children(store, tables::RISK_RESULTS, &user_id, "scenario_id", &scenario_id)?;
        Ok(())
    })
    .await?;
    Ok(Json(()))
}

pub async fn list_results(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(scenario_id): Path<String>,
) -> Result<Json<Vec<Row>>> {
    let rows = blocking(&state.store, move |store| {
        require_owned(store, tables::RISK_SCENARIOS, &user_id, &scenario_id, ERR_SCENARIO_NOT_FOUND)?;
        list_children(store, tables::RISK_RESULTS, &user_id, "scenario_id", &scenario_id)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn create_result(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<CreateResultRequest>,
) -> Result<Json<Row>> {
    let row = Row::new()
        .with("user_id", user_id)
        .with("scenario_id", payload.scenario_id)
        .with("portfolio_id", payload.portfolio_id)
        .with("metric", payload.metric)
        .with("value", payload.value);

    let row = blocking(&state.store, move |store| {
        Ok(store.append_row(tables::RISK_RESULTS, row)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn delete_result(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(result_id): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        delete_owned(store, tables::RISK_RESULTS, &user_id, &result_id, ERR_RESULT_NOT_FOUND)
    })
    .await?;
    Ok(Json(()))
}
