//! Input state and key handling for the console.
//!
//! This module owns the text input line (buffer, cursor) and turns keys into
//! calls on the [`App`] operator API. Slash commands are parsed on Enter.
//! `/attach` only records the request; the driver reads the file off the
//! event loop and hands the result back through [`apply_attachment`].

use std::{io, path::PathBuf};

use asemic_app::{App, AppAction, Attachment, Regions};
use thiserror::Error;

use crate::commands::{self, OperatorCommand};

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// The operator's input line.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    /// Cursor position in characters.
    cursor: usize,
    attach_request: Option<PathBuf>,
}

/// Why a file could not be attached.
#[derive(Debug, Error)]
pub enum AttachError {
    /// The path has no file name component.
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Reading the file failed.
    #[error("Error reading file: {0}")]
    Read(#[from] io::Error),
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// File the operator asked to attach, if not yet picked up.
    pub fn take_attach_request(&mut self) -> Option<PathBuf> {
        self.attach_request.take()
    }

    /// Handle a key input event.
    ///
    /// While an alert is showing, any key dismisses it and is otherwise
    /// swallowed.
    pub fn handle_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        if app.alert().is_some() {
            return app.dismiss_alert();
        }

        let len = self.buffer.chars().count();
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < len {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(len),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = len,
            KeyInput::Enter => return self.handle_enter(app),
            KeyInput::Tab => return app.cycle_key(),
            KeyInput::Esc => return app.quit(),
        }
        vec![AppAction::Render(Regions::COMPOSE)]
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }

    /// Parse the line and call the matching App operation.
    fn handle_enter(&mut self, app: &mut App) -> Vec<AppAction> {
        let line = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        if line.trim().is_empty() {
            return vec![AppAction::Render(Regions::COMPOSE)];
        }

        let mut actions = match commands::parse(&line) {
            OperatorCommand::AddKey(key) => app.add_key(&key),
            OperatorCommand::RemoveKey(key) => app.remove_key(&key),
            OperatorCommand::UseKey(key) => app.select_key(&key),
            OperatorCommand::Target(target) => app.set_target(&target),
            OperatorCommand::Pattern(pattern) => app.set_pattern(pattern),
            OperatorCommand::Noise(level) => app.set_noise_level(level),
            OperatorCommand::Attach(path) => {
                let actions = status(app, format!("Reading {}...", path.display()));
                self.attach_request = Some(path);
                actions
            },
            OperatorCommand::Detach => app.detach_file(),
            OperatorCommand::Send => app.send_message(),
            OperatorCommand::Save(position) => app.fetch_file(position),
            OperatorCommand::Quit => app.quit(),
            OperatorCommand::Message(text) => {
                let mut actions = app.set_text(&text);
                actions.extend(app.send_message());
                actions
            },
            OperatorCommand::Unknown { input } => status(app, format!("Unknown command: {input}")),
            OperatorCommand::InvalidArgs { command, error } => {
                status(app, format!("/{command}: {error}"))
            },
        };
        actions.push(AppAction::Render(Regions::COMPOSE));
        actions
    }
}

/// Read a file to attach.
pub async fn read_attachment(path: PathBuf) -> Result<Attachment, AttachError> {
    let Some(filename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Err(AttachError::NotAFile(path));
    };
    let bytes = tokio::fs::read(&path).await?;
    Ok(Attachment { filename, bytes })
}

/// Put a finished read into the compose form, or report why it failed.
pub fn apply_attachment(app: &mut App, read: Result<Attachment, AttachError>) -> Vec<AppAction> {
    match read {
        Ok(attachment) => {
            let mut actions = status(app, format!("Attached {}", attachment.filename));
            actions.extend(app.attach_file(attachment));
            actions
        },
        Err(e) => status(app, e.to_string()),
    }
}

fn status(app: &mut App, message: String) -> Vec<AppAction> {
    app.set_status(message);
    vec![AppAction::Render(Regions::STATUS)]
}
