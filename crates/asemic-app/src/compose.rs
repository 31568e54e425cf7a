//! Outgoing message form.
//!
//! Client-local UI state: none of it is mirrored from the relay. The selected
//! key is the one piece that must track the server key set.

use asemic_proto::ObfuscationPattern;

use crate::command::{Command, ValidationError};

/// A file picked for sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name sent to the receiver.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// The compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeForm {
    /// Destination `host:port`.
    pub target: String,
    /// Key to send with. `None` until the operator picks one.
    pub selected_key: Option<String>,
    /// Obfuscation pattern.
    pub pattern: ObfuscationPattern,
    /// Message text. Cleared when a file is attached.
    pub text: String,
    /// Attached file; takes precedence over text.
    pub attachment: Option<Attachment>,
}

impl ComposeForm {
    /// Attach a file. The text field is cleared since the file wins.
    pub fn attach(&mut self, attachment: Attachment) {
        self.text.clear();
        self.attachment = Some(attachment);
    }

    /// Drop the selection if `keys` no longer contains it.
    ///
    /// Returns `true` if the selection was reset.
    pub fn retain_selection(&mut self, keys: &[String]) -> bool {
        match &self.selected_key {
            Some(key) if !keys.contains(key) => {
                self.selected_key = None;
                true
            },
            _ => false,
        }
    }

    /// Validate the form into a send command.
    pub fn build_command(&self) -> Result<Command, ValidationError> {
        Command::send_message(
            &self.target,
            self.selected_key.as_deref(),
            self.pattern,
            &self.text,
            self.attachment.as_ref().map(|a| (a.filename.as_str(), a.bytes.as_slice())),
        )
    }

    /// Clear the content after a confirmed send. Target, key and pattern stay.
    pub fn clear_content(&mut self) {
        self.text.clear();
        self.attachment = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ComposeForm {
        ComposeForm {
            target: "10.0.0.2:9000".into(),
            selected_key: Some("k1".into()),
            text: "hello".into(),
            ..ComposeForm::default()
        }
    }

    #[test]
    fn attach_clears_text() {
        let mut form = form();
        form.attach(Attachment { filename: "a.txt".into(), bytes: vec![1] });
        assert!(form.text.is_empty());
        assert!(form.attachment.is_some());
    }

    #[test]
    fn selection_kept_while_key_exists() {
        let mut form = form();
        assert!(!form.retain_selection(&["k0".into(), "k1".into()]));
        assert_eq!(form.selected_key.as_deref(), Some("k1"));

        assert!(form.retain_selection(&["k0".into()]));
        assert_eq!(form.selected_key, None);
    }

    #[test]
    fn clear_content_keeps_addressing() {
        let mut form = form();
        form.attach(Attachment { filename: "a.txt".into(), bytes: vec![] });
        form.clear_content();

        assert_eq!(form.target, "10.0.0.2:9000");
        assert_eq!(form.selected_key.as_deref(), Some("k1"));
        assert!(form.text.is_empty());
        assert!(form.attachment.is_none());
    }

    #[test]
    fn build_command_validates() {
        let mut form = form();
        assert!(matches!(form.build_command(), Ok(Command::SendMessage(_))));

        form.text.clear();
        assert_eq!(form.build_command(), Err(ValidationError::MissingContent));
    }
}
