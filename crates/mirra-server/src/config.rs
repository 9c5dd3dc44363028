use std::path::Path;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use mirra_core::{AppError, ScrapeConfig};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
/// A request handler should not hang on a full failover sweep forever.
const DEFAULT_DEADLINE_MS: u64 = 60_000;

/// Server settings plus the lookup configuration it serves with.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub scrape: ScrapeConfig,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// `MIRRA_CONFIG` names an optional JSON file; `MIRRA_*` lookup
    /// overrides apply on top. Unless configured otherwise, lookups get a
    /// 60 s deadline (`MIRRA_OVERALL_TIMEOUT_SECS=0` disables it).
    pub fn from_env_with<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut base = match lookup("MIRRA_CONFIG") {
            Some(path) => ScrapeConfig::from_json_file(Path::new(&path))?,
            None => ScrapeConfig::default(),
        };
        if base.overall_timeout_ms.is_none() {
            base.overall_timeout_ms = Some(DEFAULT_DEADLINE_MS);
        }
        let scrape = base.apply_env_with(&lookup)?;
        scrape.validate()?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid PORT '{raw}': must be a port number"))
            })?,
            None => DEFAULT_PORT,
        };

        let cors_origins = match lookup("MIRRA_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => vec![DEFAULT_CORS_ORIGIN.to_string()],
        };

        Ok(Self {
            port,
            cors_origins,
            scrape,
        })
    }

    /// CORS for the configured front-end origins: POST only, with credentials.
    pub fn cors_layer(&self) -> Result<CorsLayer, AppError> {
        let origins = self
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| {
                    AppError::ConfigError(format!("Invalid CORS origin '{origin}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(true))
    }
}
