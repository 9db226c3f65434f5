use anyhow::{Context, Result};

use super::{
    config_model::{BackendServer, Database, DotEnvyConfig, Stripe},
    stage::Stage,
};

const DEFAULT_CURRENCY: &str = "xof";
const DEFAULT_STRIPE_API_VERSION: &str = "2022-08-01";
const DEFAULT_STRIPE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: match optional("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DATABASE_MAX_CONNECTIONS is invalid")?,
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        },
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        publishable_key: required("STRIPE_PUBLISHABLE_KEY")?,
        currency: optional("STRIPE_CURRENCY")
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        api_version: optional("STRIPE_API_VERSION")
            .unwrap_or_else(|| DEFAULT_STRIPE_API_VERSION.to_string()),
        timeout: match optional("STRIPE_TIMEOUT") {
            Some(raw) => raw.parse().context("STRIPE_TIMEOUT is invalid")?,
            None => DEFAULT_STRIPE_TIMEOUT_SECS,
        },
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database,
        stripe,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
