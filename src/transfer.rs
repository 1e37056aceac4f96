//! Full-table copy between two catalogs on one SQL Server instance.
//!
//! A free-text command such as
//! `transfer dbo.DB_EVENTS from dw_production to TempObjDB` is parsed into a
//! [`TransferRequest`], the destination is checked for an existing table, and a single
//! `SELECT * INTO` statement creates and fills it inside one transaction.

mod executor;
mod parser;
mod request;

pub use executor::{TransferBackend, TransferExecutor, TransferOutcome, TransferSession};
pub use parser::{CommandParser, ParseError, RegexCommandParser};
pub use request::{TransferRequest, TABLE_EXISTS_SQL};
