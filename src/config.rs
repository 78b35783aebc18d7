use anyhow::{bail, Context};
use serde::Deserialize;

/// Where the token validator gets its verification keys from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum KeySourceConfig {
    /// RS256 keys published by the identity provider at `https://{domain}/.well-known/jwks.json`.
    Jwks { domain: String },
    /// HS256 shared secret, for local runs and tests.
    Secret { secret: String, issuer: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub audience: String,
    pub keys: KeySourceConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub reset_on_start: bool,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("unknown STORE_BACKEND {other:?}"),
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required for the postgres store");
        }

        let reset_on_start = std::env::var("DB_RESET_ON_START")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let auth = AuthConfig {
            audience: std::env::var("API_AUDIENCE").unwrap_or_else(|_| "drinks".into()),
            keys: key_source_from_env()?,
        };

        Ok(Self {
            store,
            database_url,
            reset_on_start,
            auth,
        })
    }
}

fn key_source_from_env() -> anyhow::Result<KeySourceConfig> {
    match (std::env::var("AUTH0_DOMAIN"), std::env::var("AUTH_SECRET")) {
        (Ok(domain), _) if !domain.is_empty() => Ok(KeySourceConfig::Jwks { domain }),
        (_, Ok(secret)) if !secret.is_empty() => Ok(KeySourceConfig::Secret {
            secret,
            issuer: std::env::var("AUTH_ISSUER").unwrap_or_else(|_| "drinks".into()),
        }),
        _ => Err(anyhow::anyhow!("no key source configured"))
            .context("set AUTH0_DOMAIN or AUTH_SECRET"),
    }
}
