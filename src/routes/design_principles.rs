//! Per-user key/value preferences.
//!
//! Preferences used to live in `user_preferences`. The first read for a user
//! with nothing in `design_principles_preferences` copies their old rows over.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{tables, Row, Store};
use crate::error::Result;
use crate::routes::extract::AppJson;
use crate::routes::owned::blocking;
use crate::security::CurrentUser;
use crate::AppState;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Preference {
    pub key: String,
    pub value: String,
}

fn to_map(rows: &[Row]) -> BTreeMap<String, String> {
    rows.iter()
        .map(|row| (row.value("key").to_string(), row.value("value").to_string()))
        .collect()
}

fn load_preferences(store: &Store, user_id: &str) -> Result<BTreeMap<String, String>> {
    let current = store.get_by_owner(tables::DESIGN_PRINCIPLES_PREFERENCES, user_id)?;
    if !current.is_empty() {
        return Ok(to_map(&current));
    }

    let legacy = store.get_by_owner(tables::USER_PREFERENCES, user_id)?;
    if !legacy.is_empty() {
        let migrated: Vec<Row> = legacy
            .iter()
            .map(|row| {
                Row::new()
                    .with("user_id", user_id)
                    .with("key", row.value("key"))
                    .with("value", row.value("value"))
            })
            .collect();
        let count = migrated.len();
        store.modify_table(tables::DESIGN_PRINCIPLES_PREFERENCES, |rows| {
            rows.extend(migrated)
        })?;
        tracing::info!("Migrated {} preferences for user {}", count, user_id);
    }

    Ok(to_map(&legacy))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<BTreeMap<String, String>>> {
    let prefs = blocking(&state.store, move |store| load_preferences(store, &user_id)).await?;
    Ok(Json(prefs))
}

/// Upsert one preference. An empty value removes the key.
pub async fn set_preference(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    AppJson(payload): AppJson<Preference>,
) -> Result<Json<Preference>> {
    let pref = payload.clone();

    blocking(&state.store, move |store| {
        store.modify_table(tables::DESIGN_PRINCIPLES_PREFERENCES, |rows| {
            let existing = rows
                .iter()
                .position(|row| row.value("user_id") == user_id && row.value("key") == pref.key);

            match existing {
                Some(index) if pref.value.is_empty() => {
                    rows.remove(index);
                }
                Some(index) => rows[index].set("value", pref.value),
                None if pref.value.is_empty() => {}
                None => rows.push(
                    Row::new()
                        .with("user_id", user_id)
                        .with("key", pref.key)
                        .with("value", pref.value),
                ),
            }
        })?;
        Ok(())
    })
    .await?;

    Ok(Json(payload))
}

/// Remove a preference; absent keys are a no-op
pub async fn delete_preference(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<()>> {
    blocking(&state.store, move |store| {
        store.delete_where(tables::DESIGN_PRINCIPLES_PREFERENCES, |row| {
            row.value("user_id") == user_id && row.value("key") == key
        })?;
        Ok(())
    })
    .await?;
    Ok(Json(()))
}
