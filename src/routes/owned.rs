//! Owner-scoped lookups shared by the resource handlers.
//!
//! Every read goes through the caller's rows first, so a row owned by someone
//! else is indistinguishable from a missing one (both are 404).

use crate::db::{Row, Store};
use crate::error::{AppError, Result};

/// Run store work on the blocking pool
pub async fn blocking<T, F>(store: &Store, f: F) -> Result<T>
where
    F: FnOnce(&Store) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store)).await?
}

/// The caller's row with the given id, if any
pub fn find_owned(store: &Store, table: &str, owner: &str, id: &str) -> Result<Option<Row>> {
    Ok(store
        .get_by_owner(table, owner)?
        .into_iter()
        .find(|row| row.value("id") == id))
}

/// The caller's row with the given id, or 404 with `not_found`
pub fn require_owned(
    store: &Store,
    table: &str,
    owner: &str,
    id: &str,
    not_found: &'static str,
) -> Result<Row> {
    find_owned(store, table, owner, id)?.ok_or(AppError::NotFound(not_found))
}

/// The caller's row matching `id` and also linked to `parent_id` via `parent_field`
pub fn require_owned_child(
    store: &Store,
    table: &str,
    owner: &str,
    id: &str,
    parent_field: &str,
    parent_id: &str,
    not_found: &'static str,
) -> Result<Row> {
    find_owned(store, table, owner, id)?
        .filter(|row| row.value(parent_field) == parent_id)
        .ok_or(AppError::NotFound(not_found))
}

/// Apply a partial update to one of the caller's rows and return it afterwards
///
/// An empty update writes nothing.
pub fn update_owned(
    store: &Store,
    table: &str,
    owner: &str,
    id: &str,
    updates: Row,
    not_found: &'static str,
) -> Result<Row> {
    require_owned(store, table, owner, id, not_found)?;
    if !updates.is_empty() {
        store.update_row(table, "id", id, &updates)?;
    }
    require_owned(store, table, owner, id, not_found)
}

/// Delete one of the caller's rows
pub fn delete_owned(
    store: &Store,
    table: &str,
    owner: &str,
    id: &str,
    not_found: &'static str,
) -> Result<()> {
    require_owned(store, table, owner, id, not_found)?;
    store.delete_row(table, "id", id)?;
    Ok(())
}

/// The caller's rows of `table` linked to `parent_id`
pub fn list_children(
    store: &Store,
    table: &str,
    owner: &str,
    parent_field: &str,
    parent_id: &str,
) -> Result<Vec<Row>> {
    let mut rows = store.get_by_owner(table, owner)?;
    rows.retain(|row| row.value(parent_field) == parent_id);
    Ok(rows)
}

/// Remove the caller's rows of `table` linked to `parent_id` (cascade delete)
pub fn delete_children(
    store: &Store,
    table: &str,
    owner: &str,
    parent_field: &str,
    parent_id: &str,
) -> Result<usize> {
    let removed = store.delete_where(table, |row| {
        row.value("user_id") == owner && row.value(parent_field) == parent_id
    })?;

    if removed > 0 {
        tracing::info!("Cascade removed {} rows from {}", removed, table);
    }
    Ok(removed)
}

/// Current time as an RFC 3339 UTC timestamp for `created_at` columns
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
