use bson::{RawDocument, RawDocumentBuf};
use serde::Deserialize;

use crate::command::reply_ok;
use crate::error::{CursorError, Result, ServerErrorInfo};
use crate::namespace::Namespace;

/// The first result of a cursor-producing command.
///
/// This is the only input a [`Cursor`](super::Cursor) is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorResult {
    /// Namespace the cursor iterates
    pub namespace: Namespace,

    /// Documents returned with the initial reply
    pub first_batch: Vec<RawDocumentBuf>,

    /// Server cursor identifier, 0 if the result fit in the first batch
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct InitialReply {
    cursor: InitialCursor,
}

#[derive(Debug, Deserialize)]
struct InitialCursor {
    #[serde(rename = "firstBatch")]
    first_batch: Vec<RawDocumentBuf>,
    ns: String,
    id: i64,
}

impl CursorResult {
    pub fn new(namespace: Namespace, first_batch: Vec<RawDocumentBuf>, id: i64) -> Self {
        Self {
            namespace,
            first_batch,
            id,
        }
    }

    /// Decode the reply of a `find` or `aggregate` command.
    ///
    /// Expects `{ ok: 1, cursor: { firstBatch: [...], ns: "<db>.<coll>", id } }`.
    /// The namespace is parsed but not validated here.
    pub fn from_reply(reply: &RawDocument) -> Result<Self> {
        if !reply_ok(reply) {
            let info = ServerErrorInfo::from_reply(reply);
            return Err(CursorError::InvalidReply(info.to_string()));
        }

        let reply: InitialReply = bson::from_slice(reply.as_bytes())
            .map_err(|e| CursorError::InvalidReply(e.to_string()))?;

        Ok(Self {
            namespace: Namespace::parse(&reply.cursor.ns),
            first_batch: reply.cursor.first_batch,
            id: reply.cursor.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::raw;
    use bson::doc;

    #[test]
    fn test_from_find_reply() {
        let reply = raw(doc! {
            "ok": 1.0,
            "cursor": {
                "firstBatch": [{ "a": 1 }, { "a": 2 }],
                "ns": "app.users",
                "id": 42_i64,
            },
        });

        let result = CursorResult::from_reply(&reply).unwrap();
        assert_eq!(result.namespace, Namespace::new("app", "users"));
        assert_eq!(result.first_batch.len(), 2);
        assert_eq!(result.first_batch[1].to_document().unwrap(), doc! { "a": 2 });
        assert_eq!(result.id, 42);
    }

    #[test]
    fn test_from_failed_reply() {
        let reply = raw(doc! { "ok": 0, "code": 26, "errmsg": "ns does not exist" });

        let err = CursorResult::from_reply(&reply).unwrap_err();
        match err {
            CursorError::InvalidReply(msg) => assert!(msg.contains("NamespaceNotFound")),
            other => panic!("expected invalid reply, got {other:?}"),
        }
    }

    #[test]
    fn test_from_reply_without_cursor() {
        let reply = raw(doc! { "ok": 1 });
        assert!(matches!(
            CursorResult::from_reply(&reply),
            Err(CursorError::InvalidReply(_))
        ));
    }
}
