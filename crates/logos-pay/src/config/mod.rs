use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ethos: EthosConfig,
    pub starpay: StarpayConfig,
    pub rewards: RewardsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let ethos = EthosConfig {
            base_url: env::var("ETHOS_BASE_URL")
                .unwrap_or_else(|_| "https://api.ethos.network".to_string()),
            client_id: env::var("ETHOS_CLIENT_ID").unwrap_or_else(|_| "logos-pay".to_string()),
        };

        let markup_percent = env::var("PLATFORM_MARKUP_PERCENT")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(ConfigError::InvalidMarkup)?;

        let starpay = StarpayConfig {
            base_url: env::var("STARPAY_BASE_URL")
                .unwrap_or_else(|_| "https://www.starpay.cards".to_string()),
            api_key: optional_env("STARPAY_API_KEY"),
            markup_percent,
        };

        let rewards = RewardsConfig {
            base_url: env::var("REWARDS_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ethos,
            starpay,
            rewards,
        })
    }
}

/// Blank values count as unset so `.env` templates can ship empty keys.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Reputation graph (Ethos) lookups.
#[derive(Debug, Clone)]
pub struct EthosConfig {
    pub base_url: String,
    pub client_id: String,
}

/// Card issuer (StarPay) access. A missing API key switches the client into
/// its deterministic mock mode.
#[derive(Debug, Clone)]
pub struct StarpayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub markup_percent: f64,
}

/// Cashback rewards backend.
#[derive(Debug, Clone)]
pub struct RewardsConfig {
    pub base_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMarkup,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMarkup => {
                write!(f, "PLATFORM_MARKUP_PERCENT must be a non-negative number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidMarkup => None,
        }
    }
}
