use std::sync::Arc;
use std::{fmt, io};

use crate::error::server::ServerErrorInfo;

/// Crate-wide `Result` type using [`CursorError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, CursorError>;

/// Top-level error type for cursor operations.
///
/// Every variant is `Clone` so a cursor can hand out its recorded failure
/// more than once.
#[derive(Debug, Clone)]
pub enum CursorError {
    /// The namespace failed validation at construction.
    Namespace(NamespaceError),

    /// A batch element could not be decoded into the requested type.
    Decode(DecodeError),

    /// The `getMore` round trip failed.
    Fetch(CommandError),

    /// The `killCursors` round trip failed.
    Release(CommandError),

    /// Configuration errors.
    Config(ConfigError),

    /// An initial cursor reply did not have the expected shape.
    InvalidReply(String),
}

/// Namespace validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// Database component is empty.
    EmptyDatabase,

    /// Collection component is empty.
    EmptyCollection,
}

/// Failure to decode one raw batch document.
#[derive(Debug, Clone)]
pub struct DecodeError {
    /// Position of the document inside the batch it came from.
    pub position: usize,

    /// Underlying codec error.
    pub source: Arc<bson::de::Error>,
}

/// Errors raised while executing a single command round trip.
#[derive(Debug, Clone)]
pub enum CommandError {
    /// The transport reported a failure.
    Transport(String),

    /// I/O failure on the underlying connection.
    Io(Arc<io::Error>),

    /// The server replied with a falsy `ok`.
    Server(ServerErrorInfo),

    /// The command body could not be encoded.
    Encode(String),

    /// The reply could not be decoded into the expected shape.
    MalformedReply(String),
}

/// Configuration-specific errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Reading or writing the config file failed.
    Io(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::Namespace(e) => write!(f, "Invalid namespace: {e}"),
            CursorError::Decode(e) => write!(f, "Decode error: {e}"),
            CursorError::Fetch(e) => write!(f, "getMore failed: {e}"),
            CursorError::Release(e) => write!(f, "killCursors failed: {e}"),
            CursorError::Config(e) => write!(f, "Configuration error: {e}"),
            CursorError::InvalidReply(msg) => write!(f, "Invalid cursor reply: {msg}"),
        }
    }
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceError::EmptyDatabase => write!(f, "database name cannot be empty"),
            NamespaceError::EmptyCollection => write!(f, "collection name cannot be empty"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document {} of batch: {}", self.position, self.source)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Transport(msg) => write!(f, "Transport error: {msg}"),
            CommandError::Io(e) => write!(f, "I/O error: {e}"),
            CommandError::Server(info) => write!(f, "{info}"),
            CommandError::Encode(msg) => write!(f, "Failed to encode command: {msg}"),
            CommandError::MalformedReply(msg) => write!(f, "Malformed reply: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Io(msg) => write!(f, "Config I/O error: {msg}"),
        }
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CursorError::Namespace(e) => Some(e),
            CursorError::Decode(e) => Some(e),
            CursorError::Fetch(e) | CursorError::Release(e) => Some(e),
            CursorError::Config(e) => Some(e),
            CursorError::InvalidReply(_) => None,
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl std::error::Error for NamespaceError {}
impl std::error::Error for CommandError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions ========================= */

impl From<NamespaceError> for CursorError {
    fn from(err: NamespaceError) -> Self {
        CursorError::Namespace(err)
    }
}

impl From<DecodeError> for CursorError {
    fn from(err: DecodeError) -> Self {
        CursorError::Decode(err)
    }
}

impl From<ConfigError> for CursorError {
    fn from(err: ConfigError) -> Self {
        CursorError::Config(err)
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        CommandError::Io(Arc::new(err))
    }
}

impl From<bson::ser::Error> for CommandError {
    fn from(err: bson::ser::Error) -> Self {
        CommandError::Encode(err.to_string())
    }
}

impl From<bson::de::Error> for CommandError {
    fn from(err: bson::de::Error) -> Self {
        CommandError::MalformedReply(err.to_string())
    }
}

impl From<ServerErrorInfo> for CommandError {
    fn from(info: ServerErrorInfo) -> Self {
        CommandError::Server(info)
    }
}
