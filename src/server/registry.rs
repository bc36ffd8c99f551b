use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::directory::wire::WireKey;

/// People, their public keys and their sessions, as the directory knows them.
///
/// ```toml
/// [[person]]
/// id = "p-1"
/// email = "alice@example.com"
///
/// [[person.key]]
/// id = "k-1"
/// key = "age1..."
///
/// [[session]]
/// id = "s-1"
/// person = "p-1"
/// verified = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registry {
    #[serde(rename = "person")]
    pub persons: Vec<Person>,
    #[serde(rename = "session")]
    pub sessions: Vec<SessionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub id: String,
    pub email: String,
    #[serde(default, rename = "key")]
    pub keys: Vec<WireKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionEntry {
    pub id: String,
    pub person: String,
    #[serde(default)]
    pub verified: bool,
}

impl Registry {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read registry {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse registry {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let registry: Registry = toml::from_str(content)?;
        Ok(registry)
    }

    /// Whether `session_id` is a verified session of `person_id`.
    pub fn is_valid_session(&self, person_id: &str, session_id: &str) -> bool {
        self.person_by_id(person_id).is_some()
            && self
                .sessions
                .iter()
                .any(|s| s.person == person_id && s.id == session_id && s.verified)
    }

    pub fn person_by_id(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    /// Case-insensitive email lookup.
    pub fn person_by_email(&self, email: &str) -> Option<&Person> {
        let email = email.to_lowercase();
        self.persons.iter().find(|p| p.email.to_lowercase() == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[person]]
id = "p-1"
email = "Alice@Example.com"

[[person.key]]
id = "k-1"
key = "age1one"

[[person.key]]
key = "age1two"
source = "keyserver"

[[person]]
id = "p-2"
email = "bob@example.com"

[[session]]
id = "s-1"
person = "p-1"
verified = true

[[session]]
id = "s-2"
person = "p-2"
"#;

    #[test]
    fn parses_people_and_keys() {
        let registry = Registry::from_toml(SAMPLE).unwrap();
        assert_eq!(registry.persons.len(), 2);
        let alice = registry.person_by_email("alice@example.com").unwrap();
        assert_eq!(alice.keys.len(), 2);
        assert_eq!(alice.keys[1].id, None);
        assert_eq!(alice.keys[1].source.as_deref(), Some("keyserver"));
    }

    #[test]
    fn only_verified_sessions_are_valid() {
        let registry = Registry::from_toml(SAMPLE).unwrap();
        assert!(registry.is_valid_session("p-1", "s-1"));
        assert!(!registry.is_valid_session("p-2", "s-2"));
        assert!(!registry.is_valid_session("p-2", "s-1"));
        assert!(!registry.is_valid_session("p-9", "s-1"));
    }

    #[test]
    fn empty_registry_is_valid() {
        let registry = Registry::from_toml("").unwrap();
        assert!(registry.persons.is_empty());
        assert!(registry.person_by_email("x@y.z").is_none());
    }
}
