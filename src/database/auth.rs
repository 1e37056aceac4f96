//! Connection setup for SQL Server.
//!
//! Builds a connection string from configuration plus the catalog to open,
//! applies the configured authentication, and performs the TDS handshake:
//! - integrated authentication (Windows, process identity)
//! - SQL Server authentication (username/password)

use crate::config::{AuthConfig, DatabaseConfig};
use crate::error::BotError;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// Type alias for a raw tiberius connection.
pub type RawConnection = Client<Compat<TcpStream>>;

/// Build the ADO.NET-style connection string for `catalog`.
///
/// Credentials are not part of the string; they are applied through
/// [`configure_auth`].
pub fn build_connection_string(db_config: &DatabaseConfig, catalog: &str) -> String {
    format!(
        "server={};database={};encrypt={};TrustServerCertificate={};ApplicationName={}",
        db_config.server,
        catalog,
        db_config.encrypt,
        db_config.trust_server_certificate,
        db_config.application_name,
    )
}

/// Create a tiberius Config for `catalog` from DatabaseConfig.
///
/// This sets up server address, catalog, encryption and certificate trust
/// but does NOT configure authentication - use `configure_auth` for that.
pub fn create_base_config(db_config: &DatabaseConfig, catalog: &str) -> Result<Config, BotError> {
    let connection_string = build_connection_string(db_config, catalog);
    Config::from_ado_string(&connection_string)
        .map_err(|e| BotError::config(format!("Invalid connection settings: {}", e)))
}

/// Configure tiberius authentication method based on AuthConfig.
pub fn configure_auth(config: &mut Config, auth: &AuthConfig) {
    match auth {
        #[cfg(windows)]
        AuthConfig::Integrated => {
            config.authentication(AuthMethod::Integrated);
        }
        AuthConfig::SqlServer { username, password } => {
            config.authentication(AuthMethod::sql_server(username, password));
        }
    }
}

/// Create a raw connection whose default catalog is `catalog`.
///
/// 1. Builds the connection string and base configuration
/// 2. Configures authentication
/// 3. Establishes TCP connection
/// 4. Performs TDS handshake
pub async fn create_connection(
    db_config: &DatabaseConfig,
    catalog: &str,
) -> Result<RawConnection, BotError> {
    let mut config = create_base_config(db_config, catalog)?;
    configure_auth(&mut config, &db_config.auth);

    let address = config.get_addr();
    debug!("Creating connection to {} (catalog: {})", address, catalog);

    let tcp = TcpStream::connect(&address)
        .await
        .map_err(|e| BotError::connection(format!("Failed to connect to {}: {}", address, e)))?;

    tcp.set_nodelay(true)
        .map_err(|e| BotError::connection(format!("Failed to set TCP_NODELAY: {}", e)))?;

    let client = Client::connect(config, tcp.compat_write()).await?;

    debug!("Connection established successfully");
    Ok(client)
}

/// Truncate a string for logging purposes.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db_config() -> DatabaseConfig {
        DatabaseConfig {
            server: "localhost,1433".to_string(),
            auth: AuthConfig::SqlServer {
                username: "sa".to_string(),
                password: "test".to_string(),
            },
            encrypt: true,
            trust_server_certificate: true,
            application_name: "test".to_string(),
        }
    }

    #[test]
    fn test_connection_string_names_source_catalog() {
        let conn = build_connection_string(&test_db_config(), "dw_production");
        assert!(conn.contains("server=localhost,1433"));
        assert!(conn.contains("database=dw_production"));
        assert!(conn.contains("encrypt=true"));
        assert!(conn.contains("TrustServerCertificate=true"));
        assert!(!conn.to_lowercase().contains("password"));
    }

    #[test]
    fn test_create_base_config_resolves_address() {
        let config = create_base_config(&test_db_config(), "master").unwrap();
        assert_eq!(config.get_addr(), "localhost:1433");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("this is a long string", 10), "this is a ...");
        assert_eq!(truncate_for_log("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_for_log("héllo", 2), "h...");
    }
}
