//! Observable compose form state.
//!
//! [`ComposeState`] is the single source of truth for which inputs are
//! enabled. Renderers subscribe to it; they never infer state from widgets.
//! Transitions are plain methods so they can be exercised without a directory
//! or an encryption primitive.

use crate::error::ComposeError;

/// Where the compose form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing typed and no recipients selected.
    Idle,
    /// A recipient lookup is outstanding.
    Searching,
    /// Composing; submit and encrypt follow the message content.
    Ready,
    /// The message has been replaced by ciphertext and is frozen for submission.
    EncryptedReady,
}

/// Enable/disable flags and message buffer of one compose form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeState {
    pub phase: Phase,
    pub message_text: String,
    pub message_input_enabled: bool,
    pub recipient_input_enabled: bool,
    pub submit_enabled: bool,
    pub encrypt_toggle_enabled: bool,
    /// Set while encryption is outstanding.
    pub encrypting: bool,
    /// The free-form recipient input is visible (hidden behind "add more"
    /// once recipients are selected).
    pub recipient_input_shown: bool,
    /// The selected-recipients list is visible.
    pub recipients_shown: bool,
}

impl Default for ComposeState {
    fn default() -> Self {
        let mut state = Self {
            phase: Phase::Idle,
            message_text: String::new(),
            message_input_enabled: true,
            recipient_input_enabled: true,
            submit_enabled: false,
            encrypt_toggle_enabled: false,
            encrypting: false,
            recipient_input_shown: true,
            recipients_shown: false,
        };
        state.reset(false);
        state
    }
}

impl ComposeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to a blank form. With recipients selected the form lands in
    /// [`Phase::Ready`] showing them, otherwise in [`Phase::Idle`].
    pub fn reset(&mut self, has_selection: bool) {
        self.message_text.clear();
        self.message_input_enabled = true;
        self.recipient_input_enabled = true;
        self.submit_enabled = false;
        self.encrypt_toggle_enabled = false;
        self.encrypting = false;

        if has_selection {
            self.phase = Phase::Ready;
            self.recipients_shown = true;
            self.recipient_input_shown = false;
        } else {
            self.phase = Phase::Idle;
            self.recipients_shown = false;
            self.recipient_input_shown = true;
        }
    }

    /// Reveal the recipient input again ("add more recipients").
    pub fn show_recipient_input(&mut self) {
        self.recipient_input_shown = true;
    }

    /// A recipient was selected or deselected by hand. With nothing left
    /// selected the list is hidden and the recipient input comes back.
    pub fn selection_changed(&mut self, has_selection: bool) {
        self.recipients_shown = has_selection;
        if !has_selection {
            self.recipient_input_shown = true;
        }
    }

    pub fn begin_lookup(&mut self) -> Result<(), ComposeError> {
        match self.phase {
            Phase::Searching => return Err(ComposeError::LookupInFlight),
            Phase::EncryptedReady => return Err(ComposeError::MessageFrozen),
            Phase::Idle | Phase::Ready => {}
        }
        if self.encrypting {
            return Err(ComposeError::EncryptInFlight);
        }
        self.phase = Phase::Searching;
        self.recipient_input_enabled = false;
        Ok(())
    }

    /// The lookup finished, whatever its outcome. The input is always
    /// re-enabled so it can never stay stuck.
    pub fn finish_lookup(&mut self, found_keys: bool) {
        self.phase = Phase::Ready;
        self.recipient_input_enabled = true;
        if found_keys {
            self.recipients_shown = true;
        }
    }

    /// Replace the message text.
    ///
    /// Typing into an empty form enables submit and encrypt; clearing the
    /// text disables them again so they are never enabled on an empty message.
    pub fn edit_message(&mut self, text: &str) -> Result<(), ComposeError> {
        if !self.message_input_enabled {
            return Err(ComposeError::MessageFrozen);
        }
        self.message_text = text.to_string();

        if self.message_text.is_empty() {
            self.submit_enabled = false;
            self.encrypt_toggle_enabled = false;
        } else {
            if !self.submit_enabled {
                self.submit_enabled = true;
                self.encrypt_toggle_enabled = true;
            }
            if self.phase == Phase::Idle {
                self.phase = Phase::Ready;
            }
        }
        Ok(())
    }

    pub fn begin_encrypt(&mut self) -> Result<(), ComposeError> {
        if self.encrypting {
            return Err(ComposeError::EncryptInFlight);
        }
        match self.phase {
            Phase::Searching => return Err(ComposeError::LookupInFlight),
            Phase::EncryptedReady => return Err(ComposeError::MessageFrozen),
            Phase::Idle | Phase::Ready => {}
        }
        self.encrypting = true;
        self.submit_enabled = false;
        self.encrypt_toggle_enabled = false;
        Ok(())
    }

    /// Ciphertext replaces the message, which is frozen from here on.
    pub fn finish_encrypt(&mut self, ciphertext: String) {
        self.message_text = ciphertext;
        self.message_input_enabled = false;
        self.submit_enabled = true;
        self.encrypt_toggle_enabled = false;
        self.encrypting = false;
        self.phase = Phase::EncryptedReady;
    }

    /// Encryption was rejected or failed: back to composing with the
    /// plaintext intact and the toggle reverted.
    pub fn fail_encrypt(&mut self) {
        let has_text = !self.message_text.is_empty();
        self.encrypting = false;
        self.submit_enabled = has_text;
        self.encrypt_toggle_enabled = has_text;
        self.message_input_enabled = true;
        self.phase = Phase::Ready;
    }
}
