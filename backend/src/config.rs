use std::env;
use std::net::SocketAddr;

use crate::error::FleetError;

const DEFAULT_DATABASE_URL: &str = "sqlite://kmrl_fleet.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Process configuration, read from the environment (and `.env` if present).
///
/// - `DATABASE_URL`: SeaORM connection string, SQLite by default
/// - `BIND_ADDR`: listen address for the HTTP server
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, FleetError> {
        dotenvy::dotenv().ok();
        Self::from_vars(env::var("DATABASE_URL").ok(), env::var("BIND_ADDR").ok())
    }

    fn from_vars(database_url: Option<String>, bind_addr: Option<String>) -> Result<Self, FleetError> {
        let database_url = database_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let raw_addr = bind_addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| FleetError::Config(format!("BIND_ADDR '{}' is invalid: {}", raw_addr, e)))?;

        Ok(Self { database_url, bind_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        let cfg = AppConfig::from_vars(None, None).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.bind_addr.port(), 8000);
    }

    #[test]
    fn blank_database_url_uses_default() {
        let cfg = AppConfig::from_vars(Some("  ".into()), None).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = AppConfig::from_vars(None, Some("not-an-addr".into())).unwrap_err();
        assert!(matches!(err, FleetError::Config(_)));
    }
}
