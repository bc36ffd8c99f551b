//! Recipient key directory.
//!
//! [`Directory`] is the seam between the compose workflow and wherever public
//! keys come from. [`http::HttpDirectory`] talks to a directory server;
//! tests plug in their own.

pub mod http;
pub mod wire;

use std::future::Future;

use crate::error::LookupError;
use crate::keys::store::{DirectoryKey, KeyId};

use wire::{SearchReply, WireKey};

/// Looks up the public keys registered for an identifier.
///
/// An empty list means "no keys found" and is not an error. Implementations
/// must not mutate any session state.
pub trait Directory {
    fn lookup(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Vec<DirectoryKey>, LookupError>> + Send;
}

/// Interpret a search reply body.
///
/// A body carrying `msg`/`err` is an error whatever the transport status was;
/// session expiry is recognized by its message suffix. Entries without key
/// material are dropped. Entries without an id get one derived from the key.
pub fn parse_reply(success: bool, body: &str) -> Result<Vec<DirectoryKey>, LookupError> {
    match serde_json::from_str::<SearchReply>(body) {
        Ok(SearchReply::Notice(notice)) => Err(LookupError::classify(notice.text())),
        Ok(SearchReply::Keys(_)) if !success => Err(LookupError::Directory(
            "the directory reported a failure".to_string(),
        )),
        Ok(SearchReply::Keys(entries)) => Ok(entries.into_iter().filter_map(into_key).collect()),
        Err(e) => {
            tracing::debug!("unreadable directory reply: {}", e);
            Err(LookupError::Directory(
                "the directory returned an unreadable reply".to_string(),
            ))
        }
    }
}

fn into_key(entry: WireKey) -> Option<DirectoryKey> {
    let material = entry.key.filter(|k| !k.trim().is_empty())?;
    let key_id = match entry.id.filter(|id| !id.is_empty()) {
        Some(id) => KeyId::new(id),
        None => KeyId::from_material(&material),
    };
    Some(DirectoryKey { key_id, material })
}
