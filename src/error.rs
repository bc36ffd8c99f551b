use thiserror::Error;

/// Suffix the directory appends to every reply that rejects the caller's session.
/// The directory sends no structured code for this.
pub const SESSION_EXPIRED_SUFFIX: &str = "Session is expired or invalid";

/// Failure looking up a recipient's public keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The directory rejected the session; the user must start a new one.
    #[error("{}", SESSION_EXPIRED_SUFFIX)]
    SessionExpired,

    #[error("{0}")]
    Directory(String),
}

impl LookupError {
    /// Classify directory error text. Anything ending with the session-expired
    /// suffix is [`LookupError::SessionExpired`].
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_session_expired(&message) {
            Self::SessionExpired
        } else {
            Self::Directory(message)
        }
    }
}

/// Failure producing ciphertext. Preconditions are checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptError {
    #[error("Please type a message. There is nothing to encrypt")]
    EmptyMessage,

    #[error("Please add at least one recipient before encrypting")]
    NoRecipients,

    /// The encryption primitive failed; no ciphertext was produced.
    #[error("encryption failed: {0}")]
    Primitive(String),
}

/// Failure submitting the composed message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please add at least one recipient before posting")]
    NoRecipients,
}

/// Everything a compose session operation can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Encrypt(#[from] EncryptError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("a recipient lookup is already in progress")]
    LookupInFlight,

    #[error("encryption is already in progress")]
    EncryptInFlight,

    #[error("the message is encrypted and can no longer be edited")]
    MessageFrozen,

    #[error("there is no message to post")]
    SubmitDisabled,
}

impl ComposeError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Lookup(LookupError::SessionExpired))
    }
}

pub fn is_session_expired(message: &str) -> bool {
    message.ends_with(SESSION_EXPIRED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_suffix() {
        assert_eq!(
            LookupError::classify("Invalid Request: Session is expired or invalid"),
            LookupError::SessionExpired
        );
        assert_eq!(
            LookupError::classify("Session is expired or invalid"),
            LookupError::SessionExpired
        );
        assert_eq!(
            LookupError::classify("Session is expired or invalid, try again"),
            LookupError::Directory("Session is expired or invalid, try again".to_string())
        );
        assert_eq!(
            LookupError::classify("Invalid Request: Missing required parameter"),
            LookupError::Directory("Invalid Request: Missing required parameter".to_string())
        );
    }

    #[test]
    fn session_expired_display_keeps_suffix() {
        let err = ComposeError::from(LookupError::SessionExpired);
        assert!(is_session_expired(&err.to_string()));
        assert!(err.is_session_expired());
    }
}
