use std::time::Duration;

use anyhow::{bail, Context, Result};

use super::wire::{
    MessagesReply, WireMessage, WireNotice, FIELD_EMAIL, FIELD_MESSAGE, FIELD_PERSON,
    FIELD_PERSON_ID, FIELD_RECIPIENTS, FIELD_SESSION, FIELD_SESSION_ID,
};
use super::{parse_reply, Directory};
use crate::compose::Submission;
use crate::error::LookupError;
use crate::keys::store::DirectoryKey;
use crate::session::Credentials;

/// Default time to wait for the directory before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Key directory reached over HTTP.
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpDirectory {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            credentials,
        })
    }

    /// Post a composed message. Returns the directory's acknowledgement text.
    pub async fn post_message(&self, submission: &Submission) -> Result<String> {
        let url = format!("{}/postMessage", self.base_url);

        let mut form: Vec<(&str, &str)> = vec![
            (FIELD_MESSAGE, submission.message.as_str()),
            (FIELD_PERSON, self.credentials.person_id.as_str()),
            (FIELD_SESSION, self.credentials.session_id.as_str()),
        ];
        for recipient in &submission.recipients {
            form.push((FIELD_RECIPIENTS, recipient.as_str()));
        }

        tracing::debug!(
            recipients = submission.recipients.len(),
            encrypted = submission.encrypted,
            "posting message to {}",
            url
        );
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .context("failed to reach the directory")?;
        let body = response
            .text()
            .await
            .context("failed to read directory reply")?;

        let notice: WireNotice =
            serde_json::from_str(&body).context("the directory returned an unreadable reply")?;
        if notice.is_error() {
            bail!("{}", notice.text());
        }
        Ok(notice.text())
    }

    /// The newest messages this person wrote or received, newest first.
    pub async fn latest_messages(&self) -> Result<Vec<WireMessage>> {
        let url = format!("{}/latestMessages", self.base_url);
        let form = [
            (FIELD_PERSON, self.credentials.person_id.as_str()),
            (FIELD_SESSION, self.credentials.session_id.as_str()),
        ];

        tracing::debug!("listing messages at {}", url);
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .context("failed to reach the directory")?;
        let body = response
            .text()
            .await
            .context("failed to read directory reply")?;

        match serde_json::from_str::<MessagesReply>(&body)
            .context("the directory returned an unreadable reply")?
        {
            MessagesReply::Messages(messages) => Ok(messages),
            MessagesReply::Notice(notice) => bail!("{}", notice.text()),
        }
    }
}

impl Directory for HttpDirectory {
    async fn lookup(&self, identifier: &str) -> Result<Vec<DirectoryKey>, LookupError> {
        let url = format!("{}/searchPublicKeys", self.base_url);
        let email = identifier.to_lowercase();
        let form = [
            (FIELD_EMAIL, email.as_str()),
            (FIELD_PERSON_ID, self.credentials.person_id.as_str()),
            (FIELD_SESSION_ID, self.credentials.session_id.as_str()),
        ];

        tracing::debug!("searching public keys at {}", url);
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| LookupError::Directory(format!("failed to reach the directory: {}", e)))?;

        let success = response.status().is_success();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Directory(format!("failed to read directory reply: {}", e)))?;

        parse_reply(success, &body)
    }
}

/// Strip trailing slashes and default to https when no scheme is given.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_urls() {
        assert_eq!(
            normalize_base_url("http://localhost:8080/"),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_url("https://keys.example.com"),
            "https://keys.example.com"
        );
        assert_eq!(
            normalize_base_url("keys.example.com"),
            "https://keys.example.com"
        );
    }
}
