//! Server-side cursor for MongoDB wire-protocol clients
//!
//! This library iterates the result set of a `find` or `aggregate` command
//! over an already established connection, pulling further batches with
//! `getMore` and releasing the server-side cursor with `killCursors`.
//!
//! # Modules
//!
//! - `command`: Connection trait and typed command execution
//! - `config`: Configuration management
//! - `cursor`: The cursor state machine
//! - `error`: Error types and handling
//! - `namespace`: Database/collection names
//!
//! # Example
//!
//! ```no_run
//! use bson::{Document, RawDocument};
//! use mongo_cursor::{Config, Connection, Cursor, CursorResult};
//!
//! fn dump<C: Connection>(reply: &RawDocument, connection: &C) -> mongo_cursor::Result<()> {
//!     let config = Config::load()?;
//!     config.logging.init();
//!
//!     let result = CursorResult::from_reply(reply)?;
//!     let mut cursor = Cursor::with_config(result, &config.cursor, connection)?;
//!     for doc in cursor.documents::<Document>() {
//!         println!("{doc}");
//!     }
//!     cursor.close()
//! }
//! ```

pub mod command;
pub mod config;
pub mod cursor;
pub mod error;
pub mod namespace;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use command::{CommandMessage, Connection};
pub use config::Config;
pub use cursor::{Cursor, CursorResult, CursorState};
pub use error::{CursorError, Result};
pub use namespace::Namespace;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
