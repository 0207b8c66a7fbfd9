//! Narrow document-store interface the remote ledger is written against.
//!
//! Collections are slash-separated paths (`events/ss_x/assignments`), keys
//! are single path segments. Documents are flat JSON objects. Any backend
//! with single-document reads, atomic multi-document batches, and
//! per-document transactions can implement it.

use std::sync::Arc;

use giftmatch_types::{GiftmatchError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A stored document body.
pub type Document = serde_json::Map<String, Value>;

/// A document returned from a query, together with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub data: Document,
}

/// One write inside an [`DocumentStore::atomic_batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        collection: String,
        key: String,
        data: Document,
        /// Merge top-level fields into an existing document instead of
        /// replacing it.
        merge: bool,
    },
    Delete {
        collection: String,
        key: String,
    },
}

impl WriteOp {
    #[must_use]
    pub fn set(collection: impl Into<String>, key: impl Into<String>, data: Document) -> Self {
        Self::Set {
            collection: collection.into(),
            key: key.into(),
            data,
            merge: false,
        }
    }

    #[must_use]
    pub fn delete(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Delete {
            collection: collection.into(),
            key: key.into(),
        }
    }
}

/// Transaction body for [`DocumentStore::transactional_update`].
///
/// Receives the current document (if any). Returning `Some` writes the
/// returned document; `None` leaves the key untouched. A backend may call it
/// more than once if the transaction is retried, so it must not accumulate
/// side effects across calls.
pub type Transform<'a> = dyn FnMut(Option<&Document>) -> Option<Document> + 'a;

/// Storage collaborator for the remote reveal ledger.
///
/// Every method either fully succeeds or reports an error with nothing
/// written. Unreachable backends report
/// [`GiftmatchError::StorageUnavailable`]; rejected writes report
/// [`GiftmatchError::StorageWriteFailed`].
pub trait DocumentStore: Send + Sync {
    fn get_document(&self, collection: &str, key: &str) -> Result<Option<Document>>;

    fn set_document(&self, collection: &str, key: &str, data: Document, merge: bool) -> Result<()>;

    /// Deleting an absent key succeeds.
    fn delete_document(&self, collection: &str, key: &str) -> Result<()>;

    /// Documents whose top-level fields equal every `(field, value)` filter.
    /// An empty filter returns the whole collection.
    fn query(&self, collection: &str, filter: &[(&str, Value)]) -> Result<Vec<StoredDocument>>;

    /// Apply all writes or none.
    fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Read-modify-write one document, serialized against every other
    /// transaction on the same key.
    fn transactional_update(
        &self,
        collection: &str,
        key: &str,
        transform: &mut Transform<'_>,
    ) -> Result<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn get_document(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        (**self).get_document(collection, key)
    }

    fn set_document(&self, collection: &str, key: &str, data: Document, merge: bool) -> Result<()> {
        (**self).set_document(collection, key, data, merge)
    }

    fn delete_document(&self, collection: &str, key: &str) -> Result<()> {
        (**self).delete_document(collection, key)
    }

    fn query(&self, collection: &str, filter: &[(&str, Value)]) -> Result<Vec<StoredDocument>> {
        (**self).query(collection, filter)
    }

    fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        (**self).atomic_batch(ops)
    }

    fn transactional_update(
        &self,
        collection: &str,
        key: &str,
        transform: &mut Transform<'_>,
    ) -> Result<()> {
        (**self).transactional_update(collection, key, transform)
    }
}

/// Encode a value as a document body.
///
/// # Errors
/// `Serialization` if `value` does not encode to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(GiftmatchError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Decode a stored document.
///
/// # Errors
/// `CorruptDocument` naming the location if the shape does not match.
pub fn from_document<T: DeserializeOwned>(collection: &str, key: &str, data: Document) -> Result<T> {
    serde_json::from_value(Value::Object(data)).map_err(|e| GiftmatchError::CorruptDocument {
        collection: collection.to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}
