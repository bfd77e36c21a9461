//! `killCursors`: releasing the server-side cursor

use bson::Document;
use serde::Serialize;
use tracing::debug;

use crate::command::{CommandMessage, Connection, execute_command};
use crate::error::{CommandError, CursorError, Result};

#[derive(Debug, Serialize)]
struct KillCursors<'a> {
    #[serde(rename = "killCursors")]
    collection: &'a str,
    cursors: Vec<i64>,
}

impl<C: Connection + ?Sized> super::Cursor<'_, C> {
    /// Close the cursor and release its server-side resources.
    ///
    /// The local batch is always dropped. A `killCursors` round trip is only
    /// made when the server may still hold the cursor (non-zero id); once the
    /// server confirms, the id is zeroed. A release failure is recorded only
    /// if no earlier error exists.
    ///
    /// Returns the cursor's recorded error, so callers do not need a separate
    /// [`err`](super::Cursor::err) call. Calling `close` again performs no I/O
    /// and returns the same outcome.
    ///
    /// A fetch failure leaves the id untouched, so closing after one still
    /// sends `killCursors` for an id the server may already have discarded.
    pub fn close(&mut self) -> Result<()> {
        self.batch = Vec::new();
        self.position = 0;

        if self.terminated {
            return self.outcome();
        }
        self.terminated = true;

        if self.cursor_id == 0 {
            return self.outcome();
        }

        match self.kill_cursor() {
            Ok(()) => {
                debug!("Killed cursor {} on {}", self.cursor_id, self.namespace);
                self.cursor_id = 0;
            }
            Err(e) => self.record_error(CursorError::Release(e)),
        }

        self.outcome()
    }

    fn kill_cursor(&self) -> std::result::Result<(), CommandError> {
        let command = KillCursors {
            collection: &self.namespace.collection,
            cursors: vec![self.cursor_id],
        };
        let message = CommandMessage::new(&self.namespace.db, bson::to_document(&command)?);

        execute_command::<_, Document>(self.connection, &message)?;
        Ok(())
    }

    fn outcome(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
