//! Database connectivity for table transfers.

mod auth;
mod connection;

pub use auth::{
    build_connection_string, configure_auth, create_base_config, create_connection,
    truncate_for_log, RawConnection,
};
pub use connection::{SqlServerBackend, SqlServerSession};
