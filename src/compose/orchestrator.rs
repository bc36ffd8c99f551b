//! Picks the keys a message must be encrypted to and drives the primitive.

use std::collections::BTreeSet;

use crate::crypto::armor;
use crate::error::EncryptError;
use crate::keys::store::{AuthorKeySet, KeyRecord, KeyStore};

/// Every cached key owned by one of `recipients`, plus every author key.
///
/// Each selected recipient contributes all of their registered keys, so any
/// one of them can decrypt. The author's keys are always included so sent
/// messages stay readable by their author. Sorted by key id.
pub fn assemble_keys<'a>(
    store: &'a KeyStore,
    recipients: &[String],
    author_keys: &AuthorKeySet,
) -> Vec<&'a KeyRecord> {
    let wanted: BTreeSet<&str> = recipients.iter().map(String::as_str).collect();
    store
        .iter()
        .filter(|r| wanted.contains(r.owner.as_str()) || author_keys.contains(&r.key_id))
        .collect()
}

/// Encrypt `message` for `recipients` and the author.
///
/// Fails with [`EncryptError::EmptyMessage`] before looking at recipients,
/// then [`EncryptError::NoRecipients`], before any key is assembled. The
/// primitive runs off the async executor and either yields complete armored
/// ciphertext or nothing.
pub async fn encrypt(
    message: &str,
    recipients: &[String],
    store: &KeyStore,
    author_keys: &AuthorKeySet,
) -> Result<String, EncryptError> {
    if message.is_empty() {
        return Err(EncryptError::EmptyMessage);
    }
    if recipients.is_empty() {
        return Err(EncryptError::NoRecipients);
    }

    let materials: Vec<String> = assemble_keys(store, recipients, author_keys)
        .into_iter()
        .map(|r| r.material.clone())
        .collect();

    tracing::debug!(
        recipients = recipients.len(),
        keys = materials.len(),
        "encrypting message"
    );

    let plaintext = message.to_string();
    let sealed = tokio::task::spawn_blocking(move || armor::seal(&plaintext, &materials))
        .await
        .map_err(|e| EncryptError::Primitive(format!("encryption task failed: {}", e)))?;

    sealed.map_err(|e| EncryptError::Primitive(format!("{:#}", e)))
}
