//! Command execution over a borrowed connection
//!
//! This module defines the seam between a cursor and the wire:
//! - [`Connection`]: one blocking command round trip, implemented by the transport
//! - [`CommandMessage`]: a command body addressed to a database
//! - [`execute_command`]: sends a message, checks `ok` and decodes the typed reply

use std::sync::atomic::{AtomicI32, Ordering};

use bson::{Document, RawBsonRef, RawDocument, RawDocumentBuf};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{CommandError, ServerErrorInfo};

static REQUEST_ID: AtomicI32 = AtomicI32::new(1);

/// Produce a fresh request identifier.
///
/// Identifiers only need to be unique per process; they carry no meaning to
/// the cursor.
pub fn next_request_id() -> i32 {
    REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// A command document addressed to a database
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMessage {
    /// Request identifier from [`next_request_id`]
    pub request_id: i32,

    /// Database the command runs against
    pub database: String,

    /// Whether the command may run on a secondary
    pub secondary_ok: bool,

    /// Command body; the first key names the command
    pub body: Document,
}

impl CommandMessage {
    /// Create a primary-only command with a fresh request identifier
    pub fn new(database: impl Into<String>, body: Document) -> Self {
        Self {
            request_id: next_request_id(),
            database: database.into(),
            secondary_ok: false,
            body,
        }
    }

    /// Command name, taken from the first key of the body
    pub fn name(&self) -> Option<&str> {
        self.body.keys().next().map(String::as_str)
    }
}

/// A connection able to run one command and return the raw reply.
///
/// Implementations own framing, socket I/O, deadlines and cancellation.
/// Methods take `&self` so several cursors can borrow one connection in
/// turn; a transport that needs mutable state keeps it behind interior
/// mutability.
pub trait Connection {
    /// Send `message` and block until the reply document arrives.
    fn send(&self, message: &CommandMessage) -> Result<RawDocumentBuf, CommandError>;
}

/// Run a command and decode its reply into `R`.
///
/// A reply whose `ok` field is falsy becomes [`CommandError::Server`].
pub fn execute_command<C, R>(connection: &C, message: &CommandMessage) -> Result<R, CommandError>
where
    C: Connection + ?Sized,
    R: DeserializeOwned,
{
    trace!(
        "Sending {} (request {}) to database '{}'",
        message.name().unwrap_or("<empty>"),
        message.request_id,
        message.database
    );

    let reply = connection.send(message)?;
    if !reply_ok(&reply) {
        return Err(ServerErrorInfo::from_reply(&reply).into());
    }

    Ok(bson::from_slice(reply.as_bytes())?)
}

/// Whether a reply's `ok` field is truthy.
pub(crate) fn reply_ok(reply: &RawDocument) -> bool {
    match reply.get("ok") {
        Ok(Some(RawBsonRef::Double(value))) => value != 0.0,
        Ok(Some(RawBsonRef::Int32(value))) => value != 0,
        Ok(Some(RawBsonRef::Int64(value))) => value != 0,
        Ok(Some(RawBsonRef::Boolean(value))) => value,
        _ => false,
    }
}
