//! `getMore`: pulling the next batch of a live cursor

use bson::RawDocumentBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::{CommandMessage, Connection, execute_command};
use crate::error::{CommandError, CursorError};

#[derive(Debug, Serialize)]
struct GetMore<'a> {
    #[serde(rename = "getMore")]
    cursor_id: i64,
    collection: &'a str,
    #[serde(rename = "batchSize", skip_serializing_if = "Option::is_none")]
    batch_size: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GetMoreReply {
    cursor: NextBatch,
}

#[derive(Debug, Deserialize)]
struct NextBatch {
    #[serde(rename = "nextBatch")]
    next_batch: Vec<RawDocumentBuf>,
    #[serde(default)]
    ns: String,
    id: i64,
}

impl<C: Connection + ?Sized> super::Cursor<'_, C> {
    /// Replace the local batch with the next one from the server.
    ///
    /// On failure the batch is left empty and the error recorded; the cursor
    /// identifier keeps its previous value.
    pub(super) fn fetch_next_batch(&mut self) {
        self.batch.clear();
        self.position = 0;

        if self.cursor_id == 0 {
            return;
        }

        match self.get_more() {
            Ok(NextBatch { next_batch, ns, id }) => {
                self.batches_fetched += 1;
                debug!(
                    "Fetched batch of {} documents from {} (cursor {} -> {})",
                    next_batch.len(),
                    if ns.is_empty() { self.namespace.full_name() } else { ns },
                    self.cursor_id,
                    id
                );
                self.cursor_id = id;
                self.batch = next_batch;
            }
            Err(e) => self.record_error(CursorError::Fetch(e)),
        }
    }

    fn get_more(&self) -> Result<NextBatch, CommandError> {
        let command = GetMore {
            cursor_id: self.cursor_id,
            collection: &self.namespace.collection,
            batch_size: (self.batch_size != 0).then_some(self.batch_size),
        };
        let message = CommandMessage::new(&self.namespace.db, bson::to_document(&command)?);

        let reply: GetMoreReply = execute_command(self.connection, &message)?;
        Ok(reply.cursor)
    }
}
