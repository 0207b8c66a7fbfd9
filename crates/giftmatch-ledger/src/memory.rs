//! In-process [`DocumentStore`].
//!
//! Backs tests and single-process deployments. One mutex guards all
//! collections, so every transaction is serialized against every other;
//! that is stronger than the per-key guarantee the trait asks for.
//!
//! Outages and write failures can be injected with [`InMemoryStore::set_offline`],
//! [`InMemoryStore::fail_next_write`] and [`InMemoryStore::set_read_only`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use giftmatch_types::{GiftmatchError, Result};
use serde_json::Value;

use crate::store::{Document, DocumentStore, StoredDocument, Transform, WriteOp};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<Collections>,
    offline: AtomicBool,
    fail_next_write: AtomicBool,
    read_only: Mutex<BTreeSet<String>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend becoming (un)reachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the next write operation fail with `StorageWriteFailed`.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Reject every write to `collection` until cleared.
    pub fn set_read_only(&self, collection: &str, read_only: bool) {
        if let Ok(mut guard) = self.read_only.lock() {
            if read_only {
                guard.insert(collection.to_string());
            } else {
                guard.remove(collection);
            }
        }
    }

    /// Number of documents in `collection`.
    pub fn document_count(&self, collection: &str) -> Result<usize> {
        let guard = self.lock()?;
        Ok(guard.get(collection).map_or(0, BTreeMap::len))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GiftmatchError::StorageUnavailable {
                reason: "in-memory store is offline".into(),
            });
        }
        self.collections
            .lock()
            .map_err(|_| GiftmatchError::Internal("in-memory store lock poisoned".into()))
    }

    fn check_write<'a>(&self, collections: impl IntoIterator<Item = &'a str>) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(GiftmatchError::StorageWriteFailed {
                reason: "injected write failure".into(),
            });
        }
        let read_only = self
            .read_only
            .lock()
            .map_err(|_| GiftmatchError::Internal("in-memory store lock poisoned".into()))?;
        if let Some(collection) = collections.into_iter().find(|c| read_only.contains(*c)) {
            return Err(GiftmatchError::StorageWriteFailed {
                reason: format!("collection {collection} is read-only"),
            });
        }
        Ok(())
    }
}

fn apply_set(collections: &mut Collections, collection: &str, key: &str, data: Document, merge: bool) {
    let docs = collections.entry(collection.to_string()).or_default();
    match docs.get_mut(key) {
        Some(existing) if merge => existing.extend(data),
        _ => {
            docs.insert(key.to_string(), data);
        }
    }
}

fn apply_delete(collections: &mut Collections, collection: &str, key: &str) {
    if let Some(docs) = collections.get_mut(collection) {
        docs.remove(key);
        if docs.is_empty() {
            collections.remove(collection);
        }
    }
}

fn check_path(collection: &str, key: &str) -> Result<()> {
    if collection.is_empty() || key.is_empty() || key.contains('/') {
        return Err(GiftmatchError::StorageWriteFailed {
            reason: format!("invalid document path {collection}/{key}"),
        });
    }
    Ok(())
}

impl DocumentStore for InMemoryStore {
    fn get_document(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let guard = self.lock()?;
        Ok(guard.get(collection).and_then(|docs| docs.get(key)).cloned())
    }

    fn set_document(&self, collection: &str, key: &str, data: Document, merge: bool) -> Result<()> {
        let mut guard = self.lock()?;
        self.check_write([collection])?;
        check_path(collection, key)?;
        apply_set(&mut guard, collection, key, data, merge);
        Ok(())
    }

    fn delete_document(&self, collection: &str, key: &str) -> Result<()> {
        let mut guard = self.lock()?;
        self.check_write([collection])?;
        apply_delete(&mut guard, collection, key);
        Ok(())
    }

    fn query(&self, collection: &str, filter: &[(&str, Value)]) -> Result<Vec<StoredDocument>> {
        let guard = self.lock()?;
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, data)| filter.iter().all(|(field, value)| data.get(*field) == Some(value)))
            .map(|(key, data)| StoredDocument {
                key: key.clone(),
                data: data.clone(),
            })
            .collect())
    }

    fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        let mut guard = self.lock()?;
        self.check_write(ops.iter().map(|op| match op {
            WriteOp::Set { collection, .. } | WriteOp::Delete { collection, .. } => {
                collection.as_str()
            }
        }))?;
        for op in &ops {
            if let WriteOp::Set { collection, key, .. } = op {
                check_path(collection, key)?;
            }
        }
        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    key,
                    data,
                    merge,
                } => apply_set(&mut guard, &collection, &key, data, merge),
                WriteOp::Delete { collection, key } => apply_delete(&mut guard, &collection, &key),
            }
        }
        Ok(())
    }

    fn transactional_update(
        &self,
        collection: &str,
        key: &str,
        transform: &mut Transform<'_>,
    ) -> Result<()> {
        let mut guard = self.lock()?;
        let current = guard.get(collection).and_then(|docs| docs.get(key));
        if let Some(updated) = transform(current) {
            self.check_write([collection])?;
            check_path(collection, key)?;
            apply_set(&mut guard, collection, key, updated, false);
        }
        Ok(())
    }
}
