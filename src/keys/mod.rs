pub mod identity;
pub mod paths;
pub mod recipients;
pub mod store;

use recipients::RecipientSet;
use store::{DirectoryKey, KeyRecord, KeyStore};

/// What a single lookup result changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recorded {
    /// Keys that were not cached before this lookup.
    pub new_keys: usize,
    /// Whether the identifier was added to the recipient list.
    pub recipient_added: bool,
}

/// Normalize a recipient identifier the way the directory compares them.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Record the keys a directory lookup returned for `identifier`.
///
/// Every unseen key is cached with `identifier` as its owner, then the
/// identifier is added to the recipient list as selected unless it is
/// already there. A lookup that found nothing changes neither.
pub fn record_lookup_result(
    store: &mut KeyStore,
    recipients: &mut RecipientSet,
    identifier: &str,
    keys: Vec<DirectoryKey>,
) -> Recorded {
    if keys.is_empty() {
        return Recorded::default();
    }

    let mut new_keys = 0;
    for key in keys {
        let inserted = store.insert(KeyRecord {
            key_id: key.key_id,
            owner: identifier.to_string(),
            material: key.material,
        });
        if inserted {
            new_keys += 1;
        }
    }

    if store.keys_of(identifier).is_empty() {
        tracing::warn!(
            recipient = %identifier,
            "every returned key is already owned by another recipient"
        );
    }

    let recipient_added = recipients.insert_selected(identifier);
    tracing::debug!(recipient = %identifier, new_keys, recipient_added, "recorded lookup result");

    Recorded {
        new_keys,
        recipient_added,
    }
}
