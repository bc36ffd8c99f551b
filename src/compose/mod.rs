//! The compose workflow.
//!
//! A [`ComposeSession`] is one compose form: it borrows the session's key
//! cache, owns the recipient list and the [`ComposeState`], and publishes
//! every state change to subscribers. Lookups and encryption take
//! `&mut self`, so at most one of either is ever outstanding; the phase
//! checks in [`ComposeState`] reject anything issued out of turn.

pub mod orchestrator;
pub mod state;

use tokio::sync::watch;

use crate::directory::Directory;
use crate::error::{ComposeError, SubmitError};
use crate::keys::recipients::RecipientSet;
use crate::keys::{self, Recorded};
use crate::notify::{self, NotificationSink};
use crate::session::Session;

pub use state::{ComposeState, Phase};

/// Result of a recipient lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Keys were found and recorded.
    Found {
        identifier: String,
        recorded: Recorded,
    },
    /// The directory has no keys for this identifier. The user should be
    /// pointed at the key upload path.
    NoKeys { identifier: String },
}

/// A message ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub message: String,
    pub recipients: Vec<String>,
    /// Whether `message` is armored ciphertext.
    pub encrypted: bool,
}

pub struct ComposeSession<'a, D> {
    session: &'a mut Session,
    directory: &'a D,
    sink: &'a (dyn NotificationSink + Sync),
    recipients: RecipientSet,
    state: ComposeState,
    updates: watch::Sender<ComposeState>,
}

impl<'a, D: Directory> ComposeSession<'a, D> {
    pub fn new(
        session: &'a mut Session,
        directory: &'a D,
        sink: &'a (dyn NotificationSink + Sync),
    ) -> Self {
        let state = ComposeState::new();
        let (updates, _) = watch::channel(state.clone());
        Self {
            session,
            directory,
            sink,
            recipients: RecipientSet::new(),
            state,
            updates,
        }
    }

    pub fn state(&self) -> &ComposeState {
        &self.state
    }

    pub fn recipients(&self) -> &RecipientSet {
        &self.recipients
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ComposeState> {
        self.updates.subscribe()
    }

    /// Blank the form. Selected recipients are kept.
    pub fn reset(&mut self) {
        self.state.reset(self.recipients.has_selection());
        self.publish();
    }

    /// Deselect every recipient and blank the form. Cached keys are kept.
    pub fn clear_recipients(&mut self) {
        self.recipients.deselect_all();
        self.reset();
    }

    /// Re-select a recipient that was looked up earlier.
    pub fn select(&mut self, identifier: &str) -> bool {
        let found = self.recipients.select(&keys::normalize_identifier(identifier));
        self.selection_changed(found);
        found
    }

    pub fn deselect(&mut self, identifier: &str) -> bool {
        let found = self.recipients.deselect(&keys::normalize_identifier(identifier));
        self.selection_changed(found);
        found
    }

    fn selection_changed(&mut self, found: bool) {
        if found {
            self.state.selection_changed(self.recipients.has_selection());
            self.publish();
        }
    }

    pub fn show_recipient_input(&mut self) {
        self.state.show_recipient_input();
        self.publish();
    }

    /// Look up `identifier` in the directory and record what it returns.
    ///
    /// Directory failures are reported to the sink and returned. Finding no
    /// keys is not a failure: the sink is pointed at the upload path and
    /// the recipient list is left alone.
    pub async fn lookup(&mut self, identifier: &str) -> Result<LookupOutcome, ComposeError> {
        let identifier = keys::normalize_identifier(identifier);
        self.state.begin_lookup()?;
        self.publish();

        tracing::info!(recipient = %identifier, "looking up public keys");
        let result = self.directory.lookup(&identifier).await;

        let outcome = match result {
            Ok(found) if found.is_empty() => {
                tracing::info!(recipient = %identifier, "no public keys found");
                notify::report_no_keys(self.sink, &identifier);
                Ok(LookupOutcome::NoKeys { identifier })
            }
            Ok(found) => {
                let recorded = keys::record_lookup_result(
                    self.session.keys_mut(),
                    &mut self.recipients,
                    &identifier,
                    found,
                );
                tracing::info!(
                    recipient = %identifier,
                    new_keys = recorded.new_keys,
                    "recipient keys recorded"
                );
                Ok(LookupOutcome::Found {
                    identifier,
                    recorded,
                })
            }
            Err(e) => {
                tracing::warn!(recipient = %identifier, "lookup failed: {}", e);
                let err = ComposeError::Lookup(e);
                notify::report(self.sink, &err);
                Err(err)
            }
        };

        let found_keys = matches!(outcome, Ok(LookupOutcome::Found { .. }));
        self.state.finish_lookup(found_keys);
        self.publish();
        outcome
    }

    /// Replace the message text.
    pub fn edit_message(&mut self, text: &str) -> Result<(), ComposeError> {
        self.state.edit_message(text)?;
        self.publish();
        Ok(())
    }

    /// Encrypt the message to the selected recipients and the author.
    ///
    /// On success the ciphertext replaces the message and the form is frozen.
    /// On failure the error is reported and the form returns to composing.
    pub async fn encrypt(&mut self) -> Result<(), ComposeError> {
        self.state.begin_encrypt()?;
        self.publish();

        let recipients = self.recipients.selected();
        let result = orchestrator::encrypt(
            &self.state.message_text,
            &recipients,
            self.session.keys(),
            self.session.author_keys(),
        )
        .await;

        match result {
            Ok(ciphertext) => {
                tracing::info!(recipients = recipients.len(), "message encrypted");
                self.state.finish_encrypt(ciphertext);
                self.publish();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("encryption failed: {}", e);
                self.state.fail_encrypt();
                self.publish();
                let err = ComposeError::Encrypt(e);
                notify::report(self.sink, &err);
                Err(err)
            }
        }
    }

    /// Hand over the message for posting. Rejected without changing state
    /// when no recipient is selected.
    pub fn submit(&self) -> Result<Submission, ComposeError> {
        let recipients = self.recipients.selected();
        if recipients.is_empty() {
            let err = ComposeError::Submit(SubmitError::NoRecipients);
            notify::report(self.sink, &err);
            return Err(err);
        }
        if !self.state.submit_enabled {
            return Err(ComposeError::SubmitDisabled);
        }

        tracing::info!(
            recipients = recipients.len(),
            encrypted = self.state.phase == Phase::EncryptedReady,
            "message submitted"
        );
        Ok(Submission {
            message: self.state.message_text.clone(),
            recipients,
            encrypted: self.state.phase == Phase::EncryptedReady,
        })
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}
