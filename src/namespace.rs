//! Database/collection namespace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NamespaceError;

/// A database name paired with a collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// Database name
    pub db: String,

    /// Collection name
    pub collection: String,
}

impl Namespace {
    /// Create a namespace without validating it
    pub fn new(db: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            collection: collection.into(),
        }
    }

    /// Parse the `<db>.<collection>` form servers report in cursor replies.
    ///
    /// The split happens on the first `.`, since collection names may contain
    /// dots and database names may not. A string without a dot yields an
    /// empty collection, which [`Namespace::validate`] rejects.
    pub fn parse(full_name: &str) -> Self {
        match full_name.split_once('.') {
            Some((db, collection)) => Self::new(db, collection),
            None => Self::new(full_name, ""),
        }
    }

    /// Reject namespaces with an empty database or collection
    pub fn validate(&self) -> Result<(), NamespaceError> {
        if self.db.is_empty() {
            return Err(NamespaceError::EmptyDatabase);
        }
        if self.collection.is_empty() {
            return Err(NamespaceError::EmptyCollection);
        }
        Ok(())
    }

    /// Full name in `<db>.<collection>` form
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.collection)
    }
}
