//! Configuration management for the Teams database agent.
//!
//! Configuration is loaded from environment variables following the 12-factor app pattern.

use crate::constants::{
    APPLICATION_NAME, DEFAULT_DRAIN_TIMEOUT_SECS, DEFAULT_HISTORY_CLEANUP_SECS,
    DEFAULT_HISTORY_IDLE_SECS, DEFAULT_HISTORY_MAX_TURNS, DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT,
};
use crate::error::BotError;
use crate::transport::TransportType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bot configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQL Server connection settings.
    pub database: DatabaseConfig,

    /// Conversation history settings.
    pub history: HistoryConfig,

    /// Transport selection and HTTP binding.
    pub transport: TransportConfig,

    /// Time allowed for in-flight turns to finish on shutdown.
    pub drain_timeout: Duration,
}

/// SQL Server connection settings.
///
/// The catalog is not part of this struct: every transfer connects to the
/// source catalog named in its own command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Server address as written in a connection string
    /// (`host`, `host,port`, `tcp:host,port`, `host\instance`).
    pub server: String,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Enable TLS encryption
    pub encrypt: bool,

    /// Trust server certificate (for self-signed certs)
    pub trust_server_certificate: bool,

    /// Application name sent to SQL Server
    pub application_name: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthConfig {
    /// Trusted connection using the process identity.
    #[cfg(windows)]
    Integrated,

    /// SQL Server authentication (username/password)
    SqlServer { username: String, password: String },
}

/// Conversation history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Exchanges kept per conversation.
    pub max_turns: usize,

    /// Idle time after which a conversation is forgotten.
    pub idle_ttl: Duration,

    /// Interval between eviction sweeps.
    pub cleanup_interval: Duration,
}

/// Transport selection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Which front end to run.
    pub transport_type: TransportType,

    /// HTTP bind host.
    pub host: String,

    /// HTTP bind port.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `SQL_SERVER`: SQL Server address
    ///
    /// ## Optional
    /// - `SQL_USER` / `SQL_PASSWORD`: SQL authentication (default: integrated)
    /// - `SQL_ENCRYPT`: Enable TLS (default: true)
    /// - `SQL_TRUST_CERT`: Trust server certificate (default: true)
    /// - `BOT_TRANSPORT`: `http` or `console` (default: http)
    /// - `BOT_HOST`: HTTP bind host (default: 0.0.0.0)
    /// - `PORT`: HTTP port (default: 3978)
    /// - `BOT_HISTORY_MAX_TURNS`: Exchanges kept per conversation (default: 20)
    /// - `BOT_HISTORY_IDLE_SECS`: Idle eviction threshold (default: 3600)
    /// - `BOT_HISTORY_CLEANUP_SECS`: Eviction sweep interval (default: 60)
    /// - `BOT_SHUTDOWN_DRAIN_TIMEOUT`: Drain timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Required: Server
        let server = lookup("SQL_SERVER")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BotError::config("SQL_SERVER environment variable is required"))?;

        let auth = match (lookup("SQL_USER"), lookup("SQL_PASSWORD")) {
            (Some(u), Some(p)) => AuthConfig::SqlServer {
                username: u,
                password: p,
            },
            (Some(_), None) => {
                return Err(BotError::config(
                    "SQL_PASSWORD is required when SQL_USER is set",
                ))
            }
            (None, Some(_)) => {
                return Err(BotError::config(
                    "SQL_USER is required when SQL_PASSWORD is set",
                ))
            }
            (None, None) => integrated_auth()?,
        };

        let encrypt = parse_flag(lookup("SQL_ENCRYPT"), true);
        let trust_server_certificate = parse_flag(lookup("SQL_TRUST_CERT"), true);

        let transport_type = match lookup("BOT_TRANSPORT") {
            Some(t) => t
                .parse()
                .map_err(|e| BotError::config(format!("BOT_TRANSPORT: {}", e)))?,
            None => TransportType::default(),
        };

        let host = lookup("BOT_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string());

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);

        let max_turns = lookup("BOT_HISTORY_MAX_TURNS")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_MAX_TURNS);

        let idle_secs = lookup("BOT_HISTORY_IDLE_SECS")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_IDLE_SECS);

        let cleanup_secs = lookup("BOT_HISTORY_CLEANUP_SECS")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_CLEANUP_SECS);
        if cleanup_secs == 0 {
            return Err(BotError::config(
                "BOT_HISTORY_CLEANUP_SECS must be greater than zero",
            ));
        }

        let drain_secs = lookup("BOT_SHUTDOWN_DRAIN_TIMEOUT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_DRAIN_TIMEOUT_SECS);

        Ok(Config {
            database: DatabaseConfig {
                server,
                auth,
                encrypt,
                trust_server_certificate,
                application_name: APPLICATION_NAME.to_string(),
            },
            history: HistoryConfig {
                max_turns,
                idle_ttl: Duration::from_secs(idle_secs),
                cleanup_interval: Duration::from_secs(cleanup_secs),
            },
            transport: TransportConfig {
                transport_type,
                host,
                port,
            },
            drain_timeout: Duration::from_secs(drain_secs),
        })
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_HISTORY_MAX_TURNS,
            idle_ttl: Duration::from_secs(DEFAULT_HISTORY_IDLE_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_HISTORY_CLEANUP_SECS),
        }
    }
}

#[cfg(windows)]
fn integrated_auth() -> Result<AuthConfig, BotError> {
    Ok(AuthConfig::Integrated)
}

#[cfg(not(windows))]
fn integrated_auth() -> Result<AuthConfig, BotError> {
    Err(BotError::config(
        "Integrated authentication is only available on Windows: set SQL_USER and SQL_PASSWORD",
    ))
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SQL_SERVER"));
    }

    #[test]
    fn test_defaults_with_sql_auth() {
        let config = Config::from_lookup(lookup_from(&[
            ("SQL_SERVER", "db.internal,1433"),
            ("SQL_USER", "svc_bot"),
            ("SQL_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database.server, "db.internal,1433");
        assert!(config.database.encrypt);
        assert!(config.database.trust_server_certificate);
        assert!(matches!(config.database.auth, AuthConfig::SqlServer { .. }));
        assert_eq!(config.transport.port, 3978);
        assert_eq!(config.transport.host, "0.0.0.0");
        assert_eq!(config.history.max_turns, 20);
        assert_eq!(config.drain_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_user_without_password_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("SQL_SERVER", "db"),
            ("SQL_USER", "svc_bot"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SQL_PASSWORD"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SQL_SERVER", "db"),
            ("SQL_USER", "u"),
            ("SQL_PASSWORD", "p"),
            ("SQL_ENCRYPT", "false"),
            ("BOT_TRANSPORT", "console"),
            ("PORT", "8080"),
            ("BOT_HISTORY_MAX_TURNS", "5"),
            ("BOT_HISTORY_IDLE_SECS", "120"),
        ]))
        .unwrap();

        assert!(!config.database.encrypt);
        assert_eq!(config.transport.transport_type, TransportType::Console);
        assert_eq!(config.transport.port, 8080);
        assert_eq!(config.history.max_turns, 5);
        assert_eq!(config.history.idle_ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_transport() {
        let err = Config::from_lookup(lookup_from(&[
            ("SQL_SERVER", "db"),
            ("SQL_USER", "u"),
            ("SQL_PASSWORD", "p"),
            ("BOT_TRANSPORT", "carrier-pigeon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn test_zero_cleanup_interval_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("SQL_SERVER", "db"),
            ("SQL_USER", "u"),
            ("SQL_PASSWORD", "p"),
            ("BOT_HISTORY_CLEANUP_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().contains("BOT_HISTORY_CLEANUP_SECS"));

        let config = Config::from_lookup(lookup_from(&[
            ("SQL_SERVER", "db"),
            ("SQL_USER", "u"),
            ("SQL_PASSWORD", "p"),
            ("BOT_HISTORY_CLEANUP_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.history.cleanup_interval, Duration::from_secs(5));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_integrated_auth_requires_windows() {
        let err = Config::from_lookup(lookup_from(&[("SQL_SERVER", "db")])).unwrap_err();
        assert!(err.to_string().contains("SQL_USER"));
    }
}
