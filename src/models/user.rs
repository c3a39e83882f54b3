use serde::Serialize;

use crate::db::Row;

/// User model for API responses (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

impl User {
    /// Build from a `users` table row. An empty display name falls back to
    /// the username.
    pub fn from_row(row: &Row) -> Self {
        let username = row.value("username").to_string();
        let display_name = match row.value("display_name") {
            "" => username.clone(),
            name => name.to_string(),
        };

        Self {
            id: row.value("id").to_string(),
            username,
            display_name,
        }
    }

    /// Row to append for a new account
    pub fn new_row(id: &str, username: &str, password_hash: &str, display_name: &str) -> Row {
        Row::new()
            .with("id", id)
            .with("username", username)
            .with("password_hash", password_hash)
            .with("display_name", display_name)
    }

    /// Display name to store: the requested one trimmed, else the username
    pub fn resolve_display_name(requested: Option<&str>, username: &str) -> String {
        match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => username.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row() {
        let row = User::new_row("u1", "alice", "$2b$hash", "Alice");
        let user = User::from_row(&row);
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name, "Alice");

        let row = User::new_row("u2", "bob", "$2b$hash", "");
        assert_eq!(User::from_row(&row).display_name, "bob");
    }

    #[test]
    fn test_resolve_display_name() {
        assert_eq!(User::resolve_display_name(Some("  New User "), "nu"), "New User");
        assert_eq!(User::resolve_display_name(Some("   "), "nu"), "nu");
        assert_eq!(User::resolve_display_name(None, "nu"), "nu");
    }

    #[test]
    fn test_serialization_omits_hash() {
        let user = User::from_row(&User::new_row("u1", "alice", "secret-hash", "Alice"));
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
