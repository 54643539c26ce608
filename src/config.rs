use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::SanityConfig;
use crate::payments::paystack::DEFAULT_BASE_URL;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub app_env: AppEnv,
    pub app_url: String,
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    pub shipping_flat_rate: Decimal,
    pub resend_api_key: Option<String>,
    pub resend_from_email: String,
    pub google_maps_api_key: Option<String>,
    pub sanity: Option<SanityConfig>,
    pub data_dir: PathBuf,
    pub admin_api_token: Option<String>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let app_url = try_load(&var, "PUBLIC_APP_URL", "http://localhost:3000".to_string())?;
        let app_url = app_url.trim_end_matches('/').to_string();
        let resend_from_email = var("RESEND_FROM_EMAIL").unwrap_or_else(|| {
            let host = app_url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .split(['/', ':'])
                .next()
                .unwrap_or("localhost");
            format!("orders@{host}")
        });

        let sanity = var("SANITY_PROJECT_ID").map(|project_id| SanityConfig {
            project_id,
            dataset: var("SANITY_DATASET").unwrap_or_else(|| "production".to_string()),
            api_version: var("SANITY_API_VERSION").unwrap_or_else(|| "2024-01-01".to_string()),
        });
        if sanity.is_none() {
            warn!("SANITY_PROJECT_ID not set, catalog routes disabled");
        }

        let shipping_flat_rate: Decimal = try_load(&var, "SHIPPING_FLAT_RATE", Decimal::from(100))?;
        if shipping_flat_rate < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                key: "SHIPPING_FLAT_RATE",
                value: shipping_flat_rate.to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        Ok(Self {
            port: try_load(&var, "PORT", 3000)?,
            app_env: try_load(&var, "APP_ENV", AppEnv::Development)?,
            paystack_secret_key: var("PAYSTACK_SECRET_KEY").ok_or(ConfigError::Missing("PAYSTACK_SECRET_KEY"))?,
            paystack_base_url: try_load(&var, "PAYSTACK_BASE_URL", DEFAULT_BASE_URL.to_string())?,
            shipping_flat_rate,
            resend_api_key: var("RESEND_API_KEY"),
            resend_from_email,
            google_maps_api_key: var("GOOGLE_MAPS_API_KEY"),
            sanity,
            data_dir: try_load(&var, "DATA_DIR", PathBuf::from("./data"))?,
            admin_api_token: var("ADMIN_API_TOKEN"),
            app_url,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }
}

fn try_load<T>(var: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{key} not set, using default");
            Ok(default)
        }
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value: raw,
        }),
    }
}
