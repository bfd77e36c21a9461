//! Error handling for cursor operations.
//!
//! This module provides:
//! - The crate-wide [`CursorError`] and its more specific kinds
//! - Structured information extracted from failed server replies
//!
//! # Example
//!
//! ```rust
//! use mongo_cursor::error::{CommandError, CursorError};
//!
//! let err = CursorError::Fetch(CommandError::Transport("connection reset".into()));
//! assert!(err.to_string().contains("connection reset"));
//! ```

pub mod kinds;
pub mod server;

// Re-export commonly used types
pub use kinds::{CommandError, ConfigError, CursorError, DecodeError, NamespaceError, Result};
pub use server::ServerErrorInfo;
