//! Server-side result-set cursor
//!
//! A [`Cursor`] walks the documents of a server-side result set:
//! - documents of the current batch are decoded on demand
//! - when the batch runs out, the next one is pulled with `getMore`
//! - [`Cursor::close`] releases the server-side cursor with `killCursors`
//!
//! Failures never interrupt iteration. The first one is recorded, `next`
//! returns `None` from then on, and the error is available through
//! [`Cursor::err`] and as the result of [`Cursor::close`].
//!
//! # Example
//!
//! ```rust,no_run
//! use mongo_cursor::{Connection, Cursor, CursorResult};
//! use bson::Document;
//!
//! fn print_all<C: Connection>(result: CursorResult, connection: &C) -> mongo_cursor::Result<()> {
//!     let mut cursor = Cursor::new(result, 0, connection)?;
//!     while let Some(doc) = cursor.next::<Document>() {
//!         println!("{doc}");
//!     }
//!     cursor.close()
//! }
//! ```

mod fetch;
mod release;
mod result;
mod state;


use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bson::RawDocumentBuf;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::command::Connection;
use crate::config::CursorConfig;
use crate::error::{CursorError, DecodeError, Result};
use crate::namespace::Namespace;

pub use result::CursorResult;
pub use state::CursorState;

/// Iterator over a server-side result set.
///
/// The cursor borrows its connection for its whole lifetime and never closes
/// it. It holds no locks; callers must not use one cursor from several
/// threads at once.
pub struct Cursor<'c, C: Connection + ?Sized> {
    /// Namespace being iterated
    namespace: Namespace,

    /// `batchSize` sent with `getMore`, 0 lets the server choose
    batch_size: i32,

    /// Raw documents of the current batch
    batch: Vec<RawDocumentBuf>,

    /// Index of the next undecoded document in `batch`
    position: usize,

    /// Server cursor identifier, 0 once nothing is held server-side
    cursor_id: i64,

    connection: &'c C,

    /// First failure recorded for this cursor
    error: Option<CursorError>,

    /// Set by the first call to `close`
    terminated: bool,

    documents_returned: u64,
    batches_fetched: u64,
}

impl<'c, C: Connection + ?Sized> Cursor<'c, C> {
    /// Create a cursor from the initial result of a cursor-producing command.
    ///
    /// # Arguments
    /// * `result` - Namespace, first batch and cursor id from the server
    /// * `batch_size` - `batchSize` hint for `getMore`, 0 for the server default
    /// * `connection` - Connection later batches are fetched over
    ///
    /// # Returns
    /// * `Result<Self>` - The cursor, or [`CursorError::Namespace`] if the
    ///   namespace is invalid; no I/O happens either way
    pub fn new(result: CursorResult, batch_size: i32, connection: &'c C) -> Result<Self> {
        result.namespace.validate()?;

        debug!(
            "Opened cursor {} on {} with {} buffered documents",
            result.id,
            result.namespace,
            result.first_batch.len()
        );

        Ok(Self {
            namespace: result.namespace,
            batch_size,
            batch: result.first_batch,
            position: 0,
            cursor_id: result.id,
            connection,
            error: None,
            terminated: false,
            documents_returned: 0,
            batches_fetched: 0,
        })
    }

    /// Create a cursor using the batch size from `config`
    pub fn with_config(
        result: CursorResult,
        config: &CursorConfig,
        connection: &'c C,
    ) -> Result<Self> {
        Self::new(result, config.batch_size, connection)
    }

    /// Decode the next document as `T`.
    ///
    /// Drains the local batch first and fetches at most one more batch per
    /// call. Returns `None` at the end of the result set, after a failure
    /// (see [`Cursor::err`]), or once the cursor has been closed.
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: DeserializeOwned>(&mut self) -> Option<T> {
        if !self.state().can_yield() {
            return None;
        }

        if let Some(doc) = self.next_from_batch() {
            return Some(doc);
        }
        if self.error.is_some() {
            return None;
        }

        self.fetch_next_batch();
        if self.error.is_some() {
            return None;
        }

        self.next_from_batch()
    }

    /// Decode the next document into `destination`.
    ///
    /// Returns `true` if a document was written; see [`Cursor::next`].
    pub fn next_into<T: DeserializeOwned>(&mut self, destination: &mut T) -> bool {
        match self.next() {
            Some(doc) => {
                *destination = doc;
                true
            }
            None => false,
        }
    }

    /// Iterate the remaining documents as `T`.
    ///
    /// The iterator ends under the same conditions as [`Cursor::next`]; check
    /// [`Cursor::err`] afterwards to tell exhaustion from failure.
    pub fn documents<T: DeserializeOwned>(&mut self) -> Documents<'_, 'c, C, T> {
        Documents {
            cursor: self,
            _marker: PhantomData,
        }
    }

    /// First error recorded for this cursor, if any
    pub fn err(&self) -> Option<&CursorError> {
        self.error.as_ref()
    }

    /// Current server cursor identifier
    pub fn id(&self) -> i64 {
        self.cursor_id
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn batch_size(&self) -> i32 {
        self.batch_size
    }

    /// Documents buffered locally and not yet decoded
    pub fn buffered(&self) -> usize {
        self.batch.len() - self.position
    }

    /// Number of documents successfully returned so far
    pub fn documents_returned(&self) -> u64 {
        self.documents_returned
    }

    /// Number of successful `getMore` round trips
    pub fn batches_fetched(&self) -> u64 {
        self.batches_fetched
    }

    pub fn state(&self) -> CursorState {
        if self.terminated {
            CursorState::Terminated
        } else if self.error.is_some() {
            CursorState::Failed
        } else if self.position < self.batch.len() {
            CursorState::Active
        } else if self.cursor_id == 0 {
            CursorState::Exhausted
        } else {
            CursorState::PendingFetch
        }
    }

    fn next_from_batch<T: DeserializeOwned>(&mut self) -> Option<T> {
        let raw = self.batch.get(self.position)?;

        match bson::from_slice::<T>(raw.as_bytes()) {
            Ok(doc) => {
                trace!("Decoded document {} of current batch", self.position);
                self.position += 1;
                self.documents_returned += 1;
                Some(doc)
            }
            Err(e) => {
                let err = DecodeError {
                    position: self.position,
                    source: Arc::new(e),
                };
                self.record_error(err.into());
                None
            }
        }
    }

    /// Store `err` unless an earlier failure is already recorded.
    fn record_error(&mut self, err: CursorError) {
        if self.error.is_some() {
            debug!("Cursor {} ignoring later failure: {}", self.cursor_id, err);
            return;
        }
        warn!("Cursor {} on {} failed: {}", self.cursor_id, self.namespace, err);
        self.error = Some(err);
    }
}

impl<C: Connection + ?Sized> Drop for Cursor<'_, C> {
    fn drop(&mut self) {
        if !self.terminated && self.cursor_id != 0 {
            debug!(
                "Cursor {} on {} dropped without close; server cursor left to time out",
                self.cursor_id, self.namespace
            );
        }
    }
}

/// Manual Debug implementation since the connection need not implement Debug
impl<C: Connection + ?Sized> fmt::Debug for Cursor<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("namespace", &self.namespace)
            .field("cursor_id", &self.cursor_id)
            .field("batch_size", &self.batch_size)
            .field("buffered", &self.buffered())
            .field("state", &self.state())
            .field("error", &self.error)
            .finish()
    }
}

/// Iterator returned by [`Cursor::documents`]
pub struct Documents<'a, 'c, C: Connection + ?Sized, T> {
    cursor: &'a mut Cursor<'c, C>,
    _marker: PhantomData<fn() -> T>,
}

impl<C: Connection + ?Sized, T: DeserializeOwned> Iterator for Documents<'_, '_, C, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}
