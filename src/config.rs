use std::env;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES, DEFAULT_ALLOWED_ORIGINS, DEFAULT_DATA_DIR,
    DEFAULT_SECRET_KEY,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: String,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub log_requests: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string());

        let access_token_expire_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES.to_string())
            .parse()
            .map_err(|_| "Invalid ACCESS_TOKEN_EXPIRE_MINUTES")?;

        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
            .parse()
            .map_err(|_| "Invalid BCRYPT_COST")?;

        let allowed_origins = parse_origins(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let log_requests = env::var("LOG_REQUESTS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(Config {
            server_host,
            server_port,
            data_dir,
            secret_key,
            access_token_expire_minutes,
            bcrypt_cost,
            allowed_origins,
            environment,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// True when running with the built-in signing key outside development
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY && self.environment != "development"
    }
}

/// Split a comma-separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, http://127.0.0.1:5173,,"),
            vec!["http://localhost:5173", "http://127.0.0.1:5173"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_uses_default_secret() {
        let mut config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            data_dir: String::new(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            access_token_expire_minutes: 60,
            bcrypt_cost: 4,
            allowed_origins: vec![],
            environment: "development".to_string(),
            log_requests: false,
        };
        assert!(!config.uses_default_secret());

        config.environment = "production".to_string();
        assert!(config.uses_default_secret());

        config.secret_key = "rotated".to_string();
        assert!(!config.uses_default_secret());
        assert_eq!(config.server_address(), "127.0.0.1:0");
    }
}
