use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Opaque identifier of a public key. Unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a stable id from the key material itself.
    /// Used for directory entries that arrive without a server-assigned id.
    /// Hex-encoded SHA256 prefix (first 16 bytes = 32 hex chars).
    pub fn from_material(material: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(material.trim().as_bytes());
        let hash = hasher.finalize();
        Self(hex::encode(&hash[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A public key as returned by the directory, before ownership is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryKey {
    pub key_id: KeyId,
    pub material: String,
}

impl DirectoryKey {
    pub fn new(key_id: KeyId, material: impl Into<String>) -> Self {
        Self {
            key_id,
            material: material.into(),
        }
    }

    /// Build a key whose id is derived from its material.
    pub fn from_material(material: impl Into<String>) -> Self {
        let material = material.into();
        Self {
            key_id: KeyId::from_material(&material),
            material,
        }
    }
}

/// A public key bound to the recipient it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub key_id: KeyId,
    pub owner: String,
    pub material: String,
}

/// Session-scoped mapping from key id to [`KeyRecord`].
///
/// Grows monotonically: records are never replaced or removed, so the owner
/// recorded for a key id on first sight is the owner for the whole session.
#[derive(Debug, Default)]
pub struct KeyStore {
    records: BTreeMap<KeyId, KeyRecord>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record unless its key id is already known.
    /// Returns whether the record was inserted.
    pub fn insert(&mut self, record: KeyRecord) -> bool {
        if self.records.contains_key(&record.key_id) {
            tracing::debug!(key_id = %record.key_id, "key already cached, keeping first owner");
            return false;
        }
        tracing::debug!(key_id = %record.key_id, owner = %record.owner, "caching public key");
        self.records.insert(record.key_id.clone(), record);
        true
    }

    pub fn contains(&self, key_id: &KeyId) -> bool {
        self.records.contains_key(key_id)
    }

    /// Reverse lookup: who owns this key.
    pub fn owner_of(&self, key_id: &KeyId) -> Option<&str> {
        self.records.get(key_id).map(|r| r.owner.as_str())
    }

    /// All key ids owned by `owner`.
    pub fn keys_of(&self, owner: &str) -> Vec<&KeyId> {
        self.records
            .values()
            .filter(|r| r.owner == owner)
            .map(|r| &r.key_id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The author's own key ids, fixed for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorKeySet {
    ids: BTreeSet<KeyId>,
}

impl AuthorKeySet {
    pub fn new(ids: impl IntoIterator<Item = KeyId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, key_id: &KeyId) -> bool {
        self.ids.contains(key_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
