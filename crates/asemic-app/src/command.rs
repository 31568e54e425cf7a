//! Operator commands on the request/response path.
//!
//! Commands are validated here, before anything touches the network. Once a
//! command is submitted the runtime reports back a [`CommandOutcome`]; the
//! state change it causes arrives separately on the push channel.

use std::collections::BTreeMap;

use asemic_proto::{
    Endpoint, NoiseLevel, ObfuscationPattern, OutgoingContent, OutgoingFile, SendRequest, codec,
};
use uuid::Uuid;

/// Identifier of a submitted command, unique per [`CommandTracker`].
pub type CommandId = u64;

/// Local precondition failures. No request is made when one of these occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Key identifier empty after trimming.
    #[error("key must not be empty")]
    EmptyKey,

    /// Send without a target address.
    #[error("target address is required")]
    MissingTarget,

    /// Send without a selected key.
    #[error("select a key before sending")]
    MissingKey,

    /// Send with neither text nor file.
    #[error("provide a message or a file")]
    MissingContent,

    /// Feed position does not refer to a downloadable file.
    #[error("no downloadable file at that position")]
    NoSuchFile,
}

/// Why a command failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Rejected before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The relay answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(String),
}

impl CommandError {
    /// Response body of an HTTP failure.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A mutating request to the relay, or a file fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a key.
    AddKey {
        /// Trimmed key identifier.
        key: String,
    },

    /// Forget a key.
    RemoveKey {
        /// Key identifier as listed by the relay.
        key: String,
    },

    /// Change the cover traffic rate.
    SetNoiseLevel {
        /// Requested level.
        level: NoiseLevel,
    },

    /// Queue a message for transmission.
    SendMessage(SendRequest),

    /// Download a received attachment.
    FetchFile {
        /// Attachment id.
        id: Uuid,
        /// Name to save under.
        filename: String,
    },
}

impl Command {
    /// Build an add-key command.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyKey`] if `raw` is blank.
    pub fn add_key(raw: &str) -> Result<Self, ValidationError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        Ok(Self::AddKey { key: key.to_string() })
    }

    /// Build a remove-key command.
    ///
    /// The key is sent exactly as given so it matches the relay's entry.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyKey`] if `key` is blank.
    pub fn remove_key(key: &str) -> Result<Self, ValidationError> {
        if key.trim().is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        Ok(Self::RemoveKey { key: key.to_string() })
    }

    /// Build a send command. A file, when present, wins over text.
    ///
    /// # Errors
    ///
    /// Returns the first missing precondition: target, key, then content.
    pub fn send_message(
        target: &str,
        key: Option<&str>,
        pattern: ObfuscationPattern,
        text: &str,
        file: Option<(&str, &[u8])>,
    ) -> Result<Self, ValidationError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ValidationError::MissingTarget);
        }
        let key = key.filter(|k| !k.is_empty()).ok_or(ValidationError::MissingKey)?;

        let text = text.trim();
        let content = match file {
            Some((filename, bytes)) => OutgoingContent::File(OutgoingFile {
                filename: filename.to_string(),
                data: codec::encode_attachment(bytes),
            }),
            None if !text.is_empty() => OutgoingContent::Text(text.to_string()),
            None => return Err(ValidationError::MissingContent),
        };

        Ok(Self::SendMessage(SendRequest {
            target_addr: target.to_string(),
            key: key.to_string(),
            pattern,
            content,
        }))
    }

    /// Relay endpoint this command calls.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::AddKey { .. } => Endpoint::AddKey,
            Self::RemoveKey { .. } => Endpoint::RemoveKey,
            Self::SetNoiseLevel { .. } => Endpoint::SetNoise,
            Self::SendMessage(_) => Endpoint::Send,
            Self::FetchFile { id, .. } => Endpoint::Download(*id),
        }
    }

    /// Short operator-facing description.
    pub fn describe(&self) -> String {
        match self {
            Self::AddKey { key } => format!("add key {key}"),
            Self::RemoveKey { key } => format!("remove key {key}"),
            Self::SetNoiseLevel { level } => format!("set noise {level}"),
            Self::SendMessage(req) => format!("send to {}", req.target_addr),
            Self::FetchFile { filename, .. } => format!("download {filename}"),
        }
    }
}

/// Result of a submitted command, reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Id assigned at submission.
    pub id: CommandId,
    /// `Ok` on a 2xx response.
    pub result: Result<(), CommandError>,
}

/// In-flight command bookkeeping.
///
/// Commands cannot be cancelled; an entry leaves the tracker only when its
/// outcome is reported.
#[derive(Debug, Clone, Default)]
pub struct CommandTracker {
    next_id: CommandId,
    in_flight: BTreeMap<CommandId, Command>,
}

impl CommandTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command as submitted and return its id.
    pub fn begin(&mut self, command: Command) -> CommandId {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight.insert(id, command);
        id
    }

    /// Remove a finished command. `None` for unknown ids.
    pub fn finish(&mut self, id: CommandId) -> Option<Command> {
        self.in_flight.remove(&id)
    }

    /// Number of commands awaiting an outcome.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a command of this endpoint is in flight.
    pub fn is_pending(&self, endpoint: Endpoint) -> bool {
        self.in_flight.values().any(|c| c.endpoint() == endpoint)
    }
}
