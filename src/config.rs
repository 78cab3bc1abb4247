//! Configuration management for the `ClimateWise` backend
//!
//! Reads every setting from environment variables through the `config` crate,
//! applies defaults and validates the result. Components receive the pieces
//! they need at construction time; nothing reads the environment after startup.

use crate::ClimateError;
use crate::models::Coordinates;
use ::config::{Config, ConfigError, Map};
use serde::Deserialize;
use std::fmt;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "EnvSettings")]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub groq: GroqConfig,
    pub defaults: DefaultsConfig,
    pub logging: LoggingConfig,
}

/// Deployment environment; controls error verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub body_limit_bytes: usize,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

/// Settings shared by every outbound provider call
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub nominatim_base_url: String,
    pub open_meteo_base_url: String,
    pub air_quality_base_url: String,
}

/// Completion provider settings
#[derive(Clone)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Default values applied when a request omits them
#[derive(Debug, Clone)]
pub struct DefaultsConfig {
    /// Reference point used when weather or forecast requests carry no coordinates
    pub coordinates: Coordinates,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Logging configuration settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    /// OTLP/HTTP collector endpoint; span export is disabled when unset
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "https://climatewise.vercel.app",
        "https://nn-orcin.vercel.app",
        "https://climateai.online",
        "http://climateai.online",
        "http://192.168.1.8:5173",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "ClimateWise/1.0 (contact@yourdomain.com)".to_string()
}

fn default_nominatim_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_open_meteo_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_air_quality_base_url() -> String {
    "https://air-quality-api.open-meteo.com/v1".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_latitude() -> f64 {
    19.0760
}

fn default_longitude() -> f64 {
    72.8777
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Flat view of the environment, one field per variable (lowercased)
#[derive(Debug, Deserialize)]
struct EnvSettings {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    app_env: Option<String>,
    #[serde(default)]
    node_env: Option<String>,
    #[serde(default)]
    frontend_url: Option<String>,
    #[serde(default = "default_body_limit")]
    body_limit_bytes: usize,
    #[serde(default)]
    tls_cert_path: Option<String>,
    #[serde(default)]
    tls_key_path: Option<String>,

    #[serde(default = "default_upstream_timeout")]
    upstream_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    upstream_user_agent: String,
    #[serde(default = "default_nominatim_base_url")]
    nominatim_base_url: String,
    #[serde(default = "default_open_meteo_base_url")]
    open_meteo_base_url: String,
    #[serde(default = "default_air_quality_base_url")]
    air_quality_base_url: String,

    #[serde(default)]
    groq_api_key: Option<String>,
    #[serde(default = "default_groq_base_url")]
    groq_base_url: String,
    #[serde(default = "default_groq_model")]
    groq_model: String,

    #[serde(default = "default_latitude")]
    default_latitude: f64,
    #[serde(default = "default_longitude")]
    default_longitude: f64,

    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_log_format")]
    log_format: LogFormat,
    #[serde(default)]
    otel_exporter_otlp_endpoint: Option<String>,
}

impl From<EnvSettings> for AppConfig {
    fn from(env: EnvSettings) -> Self {
        // NODE_ENV and FRONTEND_URL keep the names existing deployments use
        let environment = match env
            .app_env
            .or(env.node_env)
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            Some("development" | "dev") => Environment::Development,
            _ => Environment::Production,
        };
        let cors_origins = env.frontend_url.map_or_else(default_cors_origins, |origins| {
            origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect()
        });

        Self {
            server: ServerConfig {
                host: env.host,
                port: env.port,
                environment,
                cors_origins,
                body_limit_bytes: env.body_limit_bytes,
                tls_cert_path: env.tls_cert_path,
                tls_key_path: env.tls_key_path,
            },
            upstream: UpstreamConfig {
                timeout_seconds: env.upstream_timeout_secs,
                user_agent: env.upstream_user_agent,
                nominatim_base_url: env.nominatim_base_url,
                open_meteo_base_url: env.open_meteo_base_url,
                air_quality_base_url: env.air_quality_base_url,
            },
            groq: GroqConfig {
                api_key: env.groq_api_key,
                base_url: env.groq_base_url,
                model: env.groq_model,
            },
            defaults: DefaultsConfig {
                coordinates: Coordinates {
                    latitude: env.default_latitude,
                    longitude: env.default_longitude,
                },
            },
            logging: LoggingConfig {
                level: env.log_level,
                format: env.log_format,
                otlp_endpoint: env.otel_exporter_otlp_endpoint,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                environment: Environment::Production,
                cors_origins: default_cors_origins(),
                body_limit_bytes: default_body_limit(),
                tls_cert_path: None,
                tls_key_path: None,
            },
            upstream: UpstreamConfig {
                timeout_seconds: default_upstream_timeout(),
                user_agent: default_user_agent(),
                nominatim_base_url: default_nominatim_base_url(),
                open_meteo_base_url: default_open_meteo_base_url(),
                air_quality_base_url: default_air_quality_base_url(),
            },
            groq: GroqConfig {
                api_key: None,
                base_url: default_groq_base_url(),
                model: default_groq_model(),
            },
            defaults: DefaultsConfig {
                coordinates: Coordinates {
                    latitude: default_latitude(),
                    longitude: default_longitude(),
                },
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
                otlp_endpoint: None,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value cannot be parsed or fails validation
    pub fn from_env() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from an explicit set of variables instead of the
    /// process environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value cannot be parsed or fails validation
    pub fn from_vars<I, K, V>(vars: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> crate::Result<Self> {
        let settings = Config::builder()
            .add_source(
                ::config::Environment::default()
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(vars),
            )
            .build()
            .map_err(load_error)?;

        let config: AppConfig = settings.try_deserialize().map_err(load_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value
    pub fn validate(&self) -> crate::Result<()> {
        if self.upstream.timeout_seconds == 0 {
            return Err(ClimateError::config(
                "UPSTREAM_TIMEOUT_SECS must be greater than 0",
            ));
        }
        if self.server.cors_origins.is_empty() {
            return Err(ClimateError::config("FRONTEND_URL must name at least one origin"));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ClimateError::config("BODY_LIMIT_BYTES must be greater than 0"));
        }
        let Coordinates {
            latitude,
            longitude,
        } = self.defaults.coordinates;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ClimateError::config(format!(
                "Default coordinates out of range: {latitude}, {longitude}"
            )));
        }
        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(ClimateError::config(
                "TLS_CERT_PATH and TLS_KEY_PATH must be set together",
            ));
        }
        Ok(())
    }
}

fn load_error(err: ConfigError) -> ClimateError {
    ClimateError::config(format!("Failed to load configuration: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(pairs: &[(&str, &str)]) -> crate::Result<AppConfig> {
        AppConfig::from_vars(pairs.iter().copied())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.environment, Environment::Production);
        assert_eq!(config.server.body_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.server.cors_origins.len(), 6);
        assert_eq!(config.groq.model, "llama3-70b-8192");
        assert!(config.groq.api_key.is_none());
        assert_eq!(config.defaults.coordinates.latitude, 19.0760);
        assert_eq!(config.defaults.coordinates.longitude, 72.8777);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = load(&[("PORT", ""), ("GROQ_API_KEY", ""), ("FRONTEND_URL", "")]).unwrap();
        assert_eq!(config.server.port, 5000);
        assert!(config.groq.api_key.is_none());
        assert_eq!(config.server.cors_origins.len(), 6);
    }

    #[test]
    fn test_app_env_wins_over_node_env() {
        let config = load(&[("APP_ENV", "production"), ("NODE_ENV", "development")]).unwrap();
        assert_eq!(config.server.environment, Environment::Production);

        let config = load(&[("APP_ENV", "Dev")]).unwrap();
        assert!(config.server.environment.is_development());
    }

    #[test]
    fn test_numeric_values_parse_into_typed_fields() {
        let config = load(&[
            ("DEFAULT_LATITUDE", "48"),
            ("DEFAULT_LONGITUDE", "11.5755"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("GROQ_MODEL", "8192"),
        ])
        .unwrap();
        assert_eq!(config.defaults.coordinates.latitude, 48.0);
        assert_eq!(config.defaults.coordinates.longitude, 11.5755);
        assert_eq!(config.upstream.timeout_seconds, 3);
        assert_eq!(config.groq.model, "8192");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("NODE_ENV", "development"),
            ("FRONTEND_URL", "https://a.example, https://b.example"),
            ("GROQ_API_KEY", "gsk_test"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.environment.is_development());
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.groq.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PORT", "http")]),
            Err(ClimateError::Config { .. })
        ));
        assert!(load(&[("UPSTREAM_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("DEFAULT_LATITUDE", "95")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(load(&[("TLS_CERT_PATH", "cert.pem")]).is_err());
    }

    #[test]
    fn test_api_key_is_redacted() {
        let config = load(&[("GROQ_API_KEY", "gsk_secret")]).unwrap();
        let debug = format!("{:?}", config.groq);
        assert!(!debug.contains("gsk_secret"));
    }
}
