use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde_json::Value;
use tokio::sync::Mutex;

use super::registry::Registry;
use crate::directory::wire::{
    WireKey, WireMessage, WireNotice, FIELD_EMAIL, FIELD_MESSAGE, FIELD_PERSON,
    FIELD_PERSON_ID, FIELD_RECIPIENTS, FIELD_SESSION, FIELD_SESSION_ID, INVALID_REQUEST,
    INVALID_SESSION, LATEST_MESSAGES_LIMIT, MESSAGE_POSTED, MISSING_PARAMETER,
};

/// A message accepted by `POST /postMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: String,
    /// The author's email, lower-cased.
    pub author: String,
    pub message: String,
    /// Recipients known to the registry; unknown addresses are dropped.
    pub recipients: Vec<String>,
}

/// Shared directory state across all requests.
pub struct DirectoryState {
    registry: Registry,
    posts: Mutex<Vec<PostedMessage>>,
}

impl DirectoryState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Messages posted so far, oldest first.
    pub async fn posted(&self) -> Vec<PostedMessage> {
        self.posts.lock().await.clone()
    }
}

impl DirectoryState {
    /// Lower-cased email of the person holding a verified session.
    fn session_email(&self, person_id: &str, session_id: &str) -> Option<String> {
        if !self.registry.is_valid_session(person_id, session_id) {
            return None;
        }
        self.registry
            .person_by_id(person_id)
            .map(|p| p.email.to_lowercase())
    }
}

/// Form fields in request order. Repeated fields appear once per value.
type FormPairs = Vec<(String, String)>;

fn field<'a>(form: &'a FormPairs, name: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn notice(notice: WireNotice) -> Json<Value> {
    Json(serde_json::to_value(notice).unwrap_or(Value::Null))
}

/// `POST /searchPublicKeys`: every key registered for `email`, on behalf of
/// a person with a verified session.
pub async fn search_public_keys(
    State(state): State<Arc<DirectoryState>>,
    Form(form): Form<FormPairs>,
) -> Json<Value> {
    let (Some(session_id), Some(person_id), Some(email)) = (
        field(&form, FIELD_SESSION_ID),
        field(&form, FIELD_PERSON_ID),
        field(&form, FIELD_EMAIL),
    ) else {
        return notice(WireNotice::error(INVALID_REQUEST, MISSING_PARAMETER));
    };

    if !state.registry.is_valid_session(person_id, session_id) {
        tracing::debug!(person = %person_id, "search rejected: invalid session");
        return notice(WireNotice::error(INVALID_REQUEST, INVALID_SESSION));
    }

    let keys: Vec<WireKey> = state
        .registry
        .person_by_email(&email.to_lowercase())
        .map(|p| p.keys.clone())
        .unwrap_or_default();

    tracing::debug!(keys = keys.len(), "search answered");
    Json(serde_json::to_value(keys).unwrap_or(Value::Array(Vec::new())))
}

/// `POST /postMessage`: record a message for the given recipients.
pub async fn post_message(
    State(state): State<Arc<DirectoryState>>,
    Form(form): Form<FormPairs>,
) -> Json<Value> {
    let (Some(session_id), Some(person_id)) =
        (field(&form, FIELD_SESSION), field(&form, FIELD_PERSON))
    else {
        return notice(WireNotice::error(INVALID_REQUEST, MISSING_PARAMETER));
    };

    let Some(author) = state.session_email(person_id, session_id) else {
        return notice(WireNotice::error(INVALID_REQUEST, INVALID_SESSION));
    };

    let Some(message) = field(&form, FIELD_MESSAGE).filter(|m| !m.is_empty()) else {
        return notice(WireNotice::error(INVALID_REQUEST, MISSING_PARAMETER));
    };

    let recipients: Vec<String> = form
        .iter()
        .filter(|(k, _)| k == FIELD_RECIPIENTS)
        .filter_map(|(_, email)| match state.registry.person_by_email(email) {
            Some(person) => Some(person.email.to_lowercase()),
            None => {
                tracing::warn!(recipient = %email, "dropping unknown recipient");
                None
            }
        })
        .collect();

    let posted = PostedMessage {
        id: uuid::Uuid::new_v4().to_string(),
        author,
        message: message.to_string(),
        recipients,
    };
    tracing::info!(
        id = %posted.id,
        recipients = posted.recipients.len(),
        "message posted"
    );
    state.posts.lock().await.push(posted);

    notice(WireNotice::ack(MESSAGE_POSTED))
}

/// `POST /latestMessages`: the newest messages the caller wrote or received.
pub async fn latest_messages(
    State(state): State<Arc<DirectoryState>>,
    Form(form): Form<FormPairs>,
) -> Json<Value> {
    let (Some(session_id), Some(person_id)) =
        (field(&form, FIELD_SESSION), field(&form, FIELD_PERSON))
    else {
        return notice(WireNotice::error(INVALID_REQUEST, MISSING_PARAMETER));
    };

    let Some(email) = state.session_email(person_id, session_id) else {
        return notice(WireNotice::error(INVALID_REQUEST, INVALID_SESSION));
    };

    let messages: Vec<WireMessage> = state
        .posts
        .lock()
        .await
        .iter()
        .rev()
        .filter(|p| p.author == email || p.recipients.contains(&email))
        .take(LATEST_MESSAGES_LIMIT)
        .map(|p| WireMessage {
            id: p.id.clone(),
            author: p.author.clone(),
            message: p.message.clone(),
            recipients: p.recipients.clone(),
        })
        .collect();

    tracing::debug!(messages = messages.len(), "latest messages answered");
    Json(serde_json::to_value(messages).unwrap_or(Value::Array(Vec::new())))
}
