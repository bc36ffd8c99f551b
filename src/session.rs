//! Session-scoped state.
//!
//! A [`Session`] is created once the user has a verified session with the
//! directory and lives until they leave. It owns the key cache and the
//! author's key ids; compose forms borrow it and are discarded independently.

use crate::keys::store::{AuthorKeySet, DirectoryKey, KeyRecord, KeyStore};

/// Identifiers the directory uses to authorize requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub person_id: String,
    pub session_id: String,
}

/// Everything known at session start.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub credentials: Credentials,
    /// The author's own identifier (email).
    pub author: String,
    /// The author's public keys. Every message is also encrypted to these.
    pub author_keys: Vec<DirectoryKey>,
}

/// A live session: credentials, the key cache and the author's key ids.
#[derive(Debug)]
pub struct Session {
    credentials: Credentials,
    author: String,
    keys: KeyStore,
    author_keys: AuthorKeySet,
}

impl Session {
    /// Start a session. Author keys are cached with the author as owner.
    pub fn start(context: SessionContext) -> Self {
        let author = crate::keys::normalize_identifier(&context.author);
        let mut keys = KeyStore::new();
        let mut author_ids = Vec::with_capacity(context.author_keys.len());

        for key in context.author_keys {
            author_ids.push(key.key_id.clone());
            keys.insert(KeyRecord {
                key_id: key.key_id,
                owner: author.clone(),
                material: key.material,
            });
        }

        tracing::debug!(
            author = %author,
            author_keys = author_ids.len(),
            "session started"
        );

        Self {
            credentials: context.credentials,
            author,
            keys,
            author_keys: AuthorKeySet::new(author_ids),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    pub(crate) fn keys_mut(&mut self) -> &mut KeyStore {
        &mut self.keys
    }

    pub fn author_keys(&self) -> &AuthorKeySet {
        &self.author_keys
    }
}
