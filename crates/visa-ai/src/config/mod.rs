use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
}

/// Top-level configuration for the assistant.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub messaging: MessagingConfig,
    pub dispatcher: DispatcherConfig,
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

        let messaging = MessagingConfig::load(environment)?;
        let dispatcher = DispatcherConfig::load()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            messaging,
            dispatcher,
        })
    }
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

/// Inbound-webhook authenticity settings for the messaging channel.
///
/// A signing secret is mandatory in production; development and test
/// environments may run unsigned for local experiments.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub webhook_secret: Option<String>,
    pub sender_id: Option<String>,
}

impl MessagingConfig {
    fn load(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let webhook_secret = env::var("WHATSAPP_WEBHOOK_SECRET")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let sender_id = env::var("WHATSAPP_SENDER_ID")
            .ok()
            .filter(|value| !value.trim().is_empty());

        if environment == AppEnvironment::Production && webhook_secret.is_none() {
            return Err(ConfigError::MissingCredential("WHATSAPP_WEBHOOK_SECRET"));
        }

        Ok(Self {
            webhook_secret,
            sender_id,
        })
    }
}

/// Dials for the conversation dispatcher and its session store.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub collaborator_timeout: Duration,
    pub session_ttl: chrono::Duration,
    pub session_capacity: usize,
}

impl DispatcherConfig {
    fn load() -> Result<Self, ConfigError> {
        let timeout_secs = env::var("COLLABORATOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidDuration("COLLABORATOR_TIMEOUT_SECS"))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidDuration("COLLABORATOR_TIMEOUT_SECS"));
        }

        let ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidDuration("SESSION_TTL_HOURS"))?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidDuration("SESSION_TTL_HOURS"));
        }

        let session_capacity = env::var("SESSION_CAPACITY")
            .unwrap_or_else(|_| "4096".to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidCapacity)?;
        if session_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }

        Ok(Self {
            collaborator_timeout: Duration::from_secs(timeout_secs),
            session_ttl: chrono::Duration::hours(ttl_hours),
            session_capacity,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingCredential(&'static str),
    InvalidDuration(&'static str),
    InvalidCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingCredential(name) => {
                write!(f, "{name} is required in production")
            }
            ConfigError::InvalidDuration(name) => {
                write!(f, "{name} must be a positive integer")
            }
            ConfigError::InvalidCapacity => {
                write!(f, "SESSION_CAPACITY must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
