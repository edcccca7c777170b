// Start of file: /src/config/environment.rs

// * Environment configuration with a singleton pattern.
// * Shared by the HTTP server and the background tracker.

use std::{borrow::Cow, collections::HashMap, path::PathBuf};
// * anyhow for convenient error handling
use anyhow::{Context, Result};
// * once_cell for lazy static initialization
use once_cell::sync::Lazy;
use tracing::warn;

// ! Default values for environment variables (used if variables aren't set):
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PROTOCOL: &str = "http";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_BODY_SIZE: usize = 2_097_152; // 2MB
const DEFAULT_TIMEOUT: u64 = 15; // quote fetches can take a few seconds
const DEFAULT_HOLDINGS_FILE: &str = "all_holdings.json";
const DEFAULT_DASHBOARD_FILE: &str = "dashboard_data.json";
const DEFAULT_REFERENCE_FILE: &str = "reference.json";
const DEFAULT_CACHE_DURATION: u64 = 60;
const DEFAULT_POLL_INTERVAL: u64 = 60;
const DEFAULT_MARKET_UTC_OFFSET: i32 = 3; // TRT
const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_YAHOO_CONCURRENCY: usize = 8;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

// * A struct containing all environment variables used by the app
#[derive(Clone)]
pub struct EnvironmentVariables {
    pub environment: Cow<'static, str>,
    pub host: Cow<'static, str>,
    pub port: u16,
    pub protocol: Cow<'static, str>,
    pub max_request_body_size: usize,
    pub default_timeout_seconds: u64,
    pub holdings_file: PathBuf,
    pub dashboard_file: PathBuf,
    pub reference_file: PathBuf,
    pub cache_duration_seconds: u64,
    pub poll_interval_seconds: u64,
    pub market_utc_offset_hours: i32,
    pub yahoo_base_url: Cow<'static, str>,
    pub yahoo_concurrency: usize,
    pub telegram_api_url: Cow<'static, str>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub finnhub_key: Option<String>,
}

// * Secrets are redacted so the debug dump at startup is safe to log
impl std::fmt::Debug for EnvironmentVariables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");

        f.debug_struct("EnvironmentVariables")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("max_request_body_size", &self.max_request_body_size)
            .field("default_timeout_seconds", &self.default_timeout_seconds)
            .field("holdings_file", &self.holdings_file)
            .field("dashboard_file", &self.dashboard_file)
            .field("reference_file", &self.reference_file)
            .field("cache_duration_seconds", &self.cache_duration_seconds)
            .field("poll_interval_seconds", &self.poll_interval_seconds)
            .field("market_utc_offset_hours", &self.market_utc_offset_hours)
            .field("yahoo_base_url", &self.yahoo_base_url)
            .field("yahoo_concurrency", &self.yahoo_concurrency)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("telegram_bot_token", &redact(&self.telegram_bot_token))
            .field("telegram_chat_id", &redact(&self.telegram_chat_id))
            .field("finnhub_key", &redact(&self.finnhub_key))
            .finish()
    }
}

impl EnvironmentVariables {
    // * Loads environment variables from the process and, outside production, from .env.
    pub fn load() -> Result<Self> {
        // ? In non-production environments, attempt to load .env
        if std::env::var("ENVIRONMENT").unwrap_or_default() != "production" {
            dotenv::dotenv().ok();
        }

        // * Collect all environment vars from the system and .env
        let vars: HashMap<String, String> = std::env::vars()
            .chain(dotenv::vars())
            .collect();

        Self::from_vars(&vars)
    }

    // * Builds the configuration from an arbitrary key/value map, providing defaults if missing
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        // * Empty values count as unset, same as a missing secret
        let get_var = |key: &str| {
            vars.get(key)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
        };

        Ok(Self {
            environment: get_var("ENVIRONMENT")
                .map(|s| Cow::Owned(s.into()))
                .unwrap_or_else(|| {
                    warn!("Missing ENVIRONMENT, defaulting to '{DEFAULT_ENVIRONMENT}'");
                    Cow::Borrowed(DEFAULT_ENVIRONMENT)
                }),

            host: get_var("HOST")
                .map(|s| Cow::Owned(s.into()))
                .unwrap_or(Cow::Borrowed(DEFAULT_HOST)),

            port: get_var("PORT")
                .map(|s| s.parse().context("Invalid PORT value"))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),

            protocol: get_var("PROTOCOL")
                .map(|s| Cow::Owned(s.into()))
                .unwrap_or(Cow::Borrowed(DEFAULT_PROTOCOL)),

            max_request_body_size: get_var("MAX_REQUEST_BODY_SIZE")
                .map(|s| s.parse().context("Invalid MAX_REQUEST_BODY_SIZE"))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),

            default_timeout_seconds: get_var("DEFAULT_TIMEOUT_SECONDS")
                .map(|s| s.parse().context("Invalid DEFAULT_TIMEOUT_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT),

            holdings_file: get_var("HOLDINGS_FILE")
                .unwrap_or(DEFAULT_HOLDINGS_FILE)
                .into(),

            dashboard_file: get_var("DASHBOARD_FILE")
                .unwrap_or(DEFAULT_DASHBOARD_FILE)
                .into(),

            reference_file: get_var("REFERENCE_FILE")
                .unwrap_or(DEFAULT_REFERENCE_FILE)
                .into(),

            cache_duration_seconds: get_var("CACHE_DURATION_SECONDS")
                .map(|s| s.parse().context("Invalid CACHE_DURATION_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_CACHE_DURATION),

            poll_interval_seconds: get_var("POLL_INTERVAL_SECONDS")
                .map(|s| s.parse().context("Invalid POLL_INTERVAL_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_POLL_INTERVAL),

            market_utc_offset_hours: get_var("MARKET_UTC_OFFSET_HOURS")
                .map(|s| s.parse().context("Invalid MARKET_UTC_OFFSET_HOURS"))
                .transpose()?
                .unwrap_or(DEFAULT_MARKET_UTC_OFFSET),

            yahoo_base_url: get_var("YAHOO_BASE_URL")
                .map(|s| Cow::Owned(s.trim_end_matches('/').into()))
                .unwrap_or(Cow::Borrowed(DEFAULT_YAHOO_BASE_URL)),

            yahoo_concurrency: get_var("YAHOO_CONCURRENCY")
                .map(|s| s.parse().context("Invalid YAHOO_CONCURRENCY"))
                .transpose()?
                .unwrap_or(DEFAULT_YAHOO_CONCURRENCY)
                .max(1),

            telegram_api_url: get_var("TELEGRAM_API_URL")
                .map(|s| Cow::Owned(s.trim_end_matches('/').into()))
                .unwrap_or(Cow::Borrowed(DEFAULT_TELEGRAM_API_URL)),

            telegram_bot_token: get_var("TELEGRAM_BOT_TOKEN")
                .map(String::from)
                .or_else(|| {
                    warn!("Missing TELEGRAM_BOT_TOKEN, alerts will only be logged");
                    None
                }),

            telegram_chat_id: get_var("TELEGRAM_CHAT_ID").map(String::from),

            finnhub_key: get_var("FINNHUB_KEY").map(String::from),
        })
    }

    // * Returns a reference to the lazily-initialized environment configuration
    pub fn instance() -> Result<&'static Self> {
        static INSTANCE: Lazy<Result<EnvironmentVariables, anyhow::Error>> = Lazy::new(|| {
            let config: EnvironmentVariables = EnvironmentVariables::load()?;

            if cfg!(debug_assertions) {
                tracing::debug!("Loaded environment configuration: {:#?}", config);
            }

            Ok(config)
        });

        // ! A failed first load is remembered; every caller gets the same error
        INSTANCE
            .as_ref()
            .map_err(|e| anyhow::anyhow!("Failed to load environment configuration: {e:#}"))
    }
}


// End of file: /src/config/environment.rs
