//! Terminal driver for the console.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The push channel and command
//! client come from `asemic-client`.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use asemic_app::{
    App, AppAction, AppEvent, Attachment, ChannelEvent, Command, CommandError, CommandId,
    CommandOutcome, Driver, ViewModel,
};
use asemic_client::{
    CommandClient, CommandResponse, DEFAULT_HANDSHAKE_TIMEOUT, PushChannel, TransportError, channel,
};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::{
    sync::mpsc::error::TryRecvError,
    task::{JoinError, JoinSet},
};
use url::Url;

use crate::{
    Config, InputState, KeyInput,
    input::{self, AttachError},
    ui,
};

const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Name used when a download's file name has no usable final component.
const FALLBACK_FILENAME: &str = "download";

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the input line, the push channel, and the in-flight command and file
/// read tasks.
/// Channel events and command results that wake [`Driver::poll_event`] are
/// buffered here until the runtime drains them.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    input_state: InputState,
    push_url: Url,
    client: CommandClient,
    downloads: PathBuf,
    channel: Option<PushChannel>,
    channel_events: VecDeque<ChannelEvent>,
    commands: JoinSet<CommandOutcome>,
    completions: VecDeque<CommandOutcome>,
    file_reads: JoinSet<Result<Attachment, AttachError>>,
}

/// What woke the event loop.
enum Wake {
    Terminal(Option<io::Result<Event>>),
    Channel(Option<ChannelEvent>),
    Command(Option<Result<CommandOutcome, JoinError>>),
    Attachment(Option<Result<Result<Attachment, AttachError>, JoinError>>),
    Tick,
}

impl TerminalDriver {
    /// Create a new terminal driver and take over the terminal.
    pub fn new(config: &Config) -> Result<Self, TerminalError> {
        let client = CommandClient::new(config.server.clone())?;
        let push_url = channel::push_url(&config.server)?;

        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            input_state: InputState::new(),
            push_url,
            client,
            downloads: config.downloads.clone(),
            channel: None,
            channel_events: VecDeque::new(),
            commands: JoinSet::new(),
            completions: VecDeque::new(),
            file_reads: JoinSet::new(),
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn handle_terminal_event(
        &mut self,
        event: Option<io::Result<Event>>,
        app: &mut App,
    ) -> Result<Vec<AppAction>, TerminalError> {
        match event {
            Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                let actions = Self::convert_key(key_event.code)
                    .map(|key| self.input_state.handle_key(key, app))
                    .unwrap_or_default();
                if let Some(path) = self.input_state.take_attach_request() {
                    self.file_reads.spawn(input::read_attachment(path));
                }
                Ok(actions)
            },
            Some(Ok(Event::Resize(cols, rows))) => Ok(app.handle(AppEvent::Resize(cols, rows))),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            _ => Ok(vec![]),
        }
    }
}

/// Next event from the push channel, or never if there is none.
async fn next_channel_event(channel: &mut Option<PushChannel>) -> Option<ChannelEvent> {
    match channel {
        Some(channel) => channel.from_server.recv().await,
        None => std::future::pending().await,
    }
}

/// Run one command against the relay. Downloads are written to `downloads`.
async fn run_command(
    client: CommandClient,
    downloads: PathBuf,
    command: Command,
) -> Result<(), CommandError> {
    match client.execute(&command).await? {
        CommandResponse::Accepted => Ok(()),
        CommandResponse::File(bytes) => {
            let Command::FetchFile { filename, .. } = &command else {
                return Ok(());
            };
            let path = download_path(&downloads, filename);
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| CommandError::Transport(format!("saving {}: {e}", path.display())))?;
            tracing::info!(path = %path.display(), size = bytes.len(), "file saved");
            Ok(())
        },
    }
}

/// Where a downloaded file lands.
///
/// The sender chose `filename`, so only its final path component is used.
pub fn download_path(dir: &Path, filename: &str) -> PathBuf {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let name = match name {
        "" | "." | ".." => FALLBACK_FILENAME,
        name => name,
    };
    dir.join(name)
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let wake = tokio::select! {
            biased;

            event = self.event_stream.next() => Wake::Terminal(event),
            event = next_channel_event(&mut self.channel), if self.channel.is_some() => {
                Wake::Channel(event)
            },
            joined = self.commands.join_next(), if !self.commands.is_empty() => {
                Wake::Command(joined)
            },
            joined = self.file_reads.join_next(), if !self.file_reads.is_empty() => {
                Wake::Attachment(joined)
            },
            () = tokio::time::sleep(TICK_INTERVAL) => Wake::Tick,
        };

        match wake {
            Wake::Terminal(event) => self.handle_terminal_event(event, app),
            Wake::Channel(Some(event)) => {
                self.channel_events.push_back(event);
                Ok(vec![])
            },
            Wake::Channel(None) => {
                // Task ended without saying why.
                self.channel = None;
                self.channel_events
                    .push_back(ChannelEvent::Closed { reason: "push channel task ended".into() });
                Ok(vec![])
            },
            Wake::Command(Some(Ok(outcome))) => {
                self.completions.push_back(outcome);
                Ok(vec![])
            },
            Wake::Command(Some(Err(e))) => {
                tracing::error!(error = %e, "command task failed");
                Ok(vec![])
            },
            Wake::Command(None) => Ok(vec![]),
            Wake::Attachment(Some(Ok(read))) => Ok(input::apply_attachment(app, read)),
            Wake::Attachment(Some(Err(e))) => {
                tracing::error!(error = %e, "file read task failed");
                Ok(vec![])
            },
            Wake::Attachment(None) => Ok(vec![]),
            Wake::Tick => Ok(app.handle(AppEvent::Tick)),
        }
    }

    async fn open_channel(&mut self) -> Result<(), Self::Error> {
        self.channel = Some(channel::open(&self.push_url, DEFAULT_HANDSHAKE_TIMEOUT));
        Ok(())
    }

    async fn recv_channel(&mut self) -> Option<ChannelEvent> {
        if let Some(event) = self.channel_events.pop_front() {
            return Some(event);
        }

        let channel = self.channel.as_mut()?;
        match channel.from_server.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.channel = None;
                Some(ChannelEvent::Closed { reason: "push channel task ended".into() })
            },
        }
    }

    fn close_channel(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.stop();
        }
        self.channel_events.clear();
    }

    fn submit(&mut self, id: CommandId, command: Command) {
        let client = self.client.clone();
        let downloads = self.downloads.clone();
        self.commands.spawn(async move {
            let result = run_command(client, downloads, command).await;
            CommandOutcome { id, result }
        });
    }

    fn poll_completion(&mut self) -> Option<CommandOutcome> {
        if let Some(outcome) = self.completions.pop_front() {
            return Some(outcome);
        }

        while let Some(joined) = self.commands.try_join_next() {
            match joined {
                Ok(outcome) => return Some(outcome),
                Err(e) => tracing::error!(error = %e, "command task failed"),
            }
        }
        None
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, view: &ViewModel) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, view, &self.input_state);
        })?;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        // The alert overlay is drawn from the view; this only records it.
        tracing::warn!(%message, "operator alert");
    }

    fn stop(&mut self) {
        self.close_channel();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
