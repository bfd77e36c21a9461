//! In-memory connection for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use bson::{Document, RawDocumentBuf};

use crate::command::{CommandMessage, Connection};
use crate::error::CommandError;

/// Connection that answers with pre-scripted replies and records every command it is sent.
#[derive(Default)]
pub struct ScriptedConnection {
    replies: RefCell<VecDeque<Result<RawDocumentBuf, CommandError>>>,
    sent: RefCell<Vec<CommandMessage>>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply document.
    pub fn reply(&self, reply: Document) -> &Self {
        self.replies.borrow_mut().push_back(Ok(raw(reply)));
        self
    }

    /// Queue a failed round trip.
    pub fn fail(&self, err: CommandError) -> &Self {
        self.replies.borrow_mut().push_back(Err(err));
        self
    }

    /// Commands sent so far, in order.
    pub fn sent(&self) -> Vec<CommandMessage> {
        self.sent.borrow().clone()
    }

    pub fn round_trips(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Connection for ScriptedConnection {
    fn send(&self, message: &CommandMessage) -> Result<RawDocumentBuf, CommandError> {
        self.sent.borrow_mut().push(message.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(CommandError::Transport("no scripted reply".into())))
    }
}

pub fn raw(doc: Document) -> RawDocumentBuf {
    RawDocumentBuf::from_document(&doc).expect("test document should encode")
}

pub fn batch(docs: impl IntoIterator<Item = Document>) -> Vec<RawDocumentBuf> {
    docs.into_iter().map(raw).collect()
}
