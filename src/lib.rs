//! # Teams DB Agent
//!
//! A Microsoft Teams chat bot that answers small requests through tools:
//!
//! - **Clock**: report the current time
//! - **Greeting**: say hello to someone
//! - **Table transfer**: copy a full table from one SQL Server database to
//!   another with `transfer [schema].[table] from [source_db] to [dest_db]`
//!
//! ## Architecture
//!
//! - [`transport`] receives activities (HTTP) or lines (console)
//! - [`bot`] turns activities into replies, keeping per-conversation [`history`]
//! - [`agent`] picks a tool from the [`tools`] registry
//! - [`transfer`] parses and runs table copies through the [`database`] backend

pub mod activity;
pub mod agent;
pub mod bot;
pub mod config;
pub mod console;
pub mod constants;
pub mod database;
pub mod error;
pub mod history;
pub mod security;
pub mod shutdown;
pub mod tools;
pub mod transfer;
pub mod transport;

pub use bot::TeamsBot;
pub use config::Config;
pub use error::BotError;
