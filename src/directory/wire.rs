//! JSON bodies exchanged with the key directory.
//!
//! A successful search answers with an array of [`WireKey`]; anything else
//! answers with a [`WireNotice`] carrying `msg` and optionally `err`.

use serde::{Deserialize, Serialize};

pub const INVALID_REQUEST: &str = "Invalid Request";
pub const INVALID_SESSION: &str = crate::error::SESSION_EXPIRED_SUFFIX;
pub const MISSING_PARAMETER: &str = "Missing required parameter";
pub const MESSAGE_POSTED: &str = "Your message has been posted";

/// Form field names for `POST /searchPublicKeys`.
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PERSON_ID: &str = "personId";
pub const FIELD_SESSION_ID: &str = "sessionId";

/// Form field names for `POST /postMessage`.
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_RECIPIENTS: &str = "recipients";
pub const FIELD_PERSON: &str = "person";
pub const FIELD_SESSION: &str = "session";

/// One public key as the directory serializes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
    #[serde(default, rename = "name", skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Acknowledgement or error reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireNotice {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl WireNotice {
    pub fn ack(msg: &str) -> Self {
        Self {
            msg: Some(msg.to_string()),
            err: None,
        }
    }

    pub fn error(msg: &str, err: &str) -> Self {
        Self {
            msg: Some(msg.to_string()),
            err: Some(err.to_string()),
        }
    }

    /// Whether the notice reports a failure.
    pub fn is_error(&self) -> bool {
        self.err.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// User-facing text: `msg: err`, or whichever of the two is present.
    pub fn text(&self) -> String {
        let msg = self.msg.as_deref().filter(|s| !s.is_empty());
        let err = self.err.as_deref().filter(|s| !s.is_empty());
        match (msg, err) {
            (Some(m), Some(e)) => format!("{}: {}", m, e),
            (Some(m), None) => m.to_string(),
            (None, Some(e)) => e.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Either shape of reply to a key search.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchReply {
    Keys(Vec<WireKey>),
    Notice(WireNotice),
}

/// Most messages a `POST /latestMessages` reply carries.
pub const LATEST_MESSAGES_LIMIT: usize = 20;

/// A posted message as the directory lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: String,
    /// The author's email.
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Either shape of reply to a message listing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessagesReply {
    Messages(Vec<WireMessage>),
    Notice(WireNotice),
}
