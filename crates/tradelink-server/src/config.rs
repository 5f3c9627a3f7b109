use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub webhook_secret: Option<String>,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("TRADELINK_JWT_SECRET").unwrap_or_else(|| {
            warn!("TRADELINK_JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.into()
        });
        let webhook_secret = get("TRADELINK_WEBHOOK_SECRET").filter(|s| !s.is_empty());
        if webhook_secret.is_none() {
            warn!("TRADELINK_WEBHOOK_SECRET not set, provider webhooks will not be signature-checked");
        }

        let port = get("TRADELINK_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("TRADELINK_PORT must be a port number")?;
        let token_ttl_days = get("TRADELINK_TOKEN_TTL_DAYS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("TRADELINK_TOKEN_TTL_DAYS must be a whole number of days")?;

        Ok(Self {
            host: get("TRADELINK_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: PathBuf::from(get("TRADELINK_DB_PATH").unwrap_or_else(|| "tradelink.db".into())),
            jwt_secret,
            webhook_secret,
            token_ttl_days,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
