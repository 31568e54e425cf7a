//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. Tests keep injecting through `&self` while the
//! runtime owns the driver, so all state sits behind one shared lock.

use std::{
    collections::VecDeque,
    fmt,
    ops::Add,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use asemic_app::{
    App, AppAction, AppEvent, ChannelEvent, Command, CommandError, CommandId, CommandOutcome,
    Driver, ViewModel,
};
use chrono::{DateTime, TimeDelta, Utc};

/// Virtual time: offset from the start of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Instant `offset` after the start.
    pub fn from_start(offset: Duration) -> Self {
        Self(offset)
    }

    /// Offset from the start.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

type Input = Box<dyn FnOnce(&mut App) -> Vec<AppAction> + Send>;

/// How the next channel open attempt plays out.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectScript {
    /// Handshake completes.
    Open,
    /// Handshake fails with an error event.
    Fail(String),
    /// The attempt cannot start at all.
    Refuse(String),
    /// Handshake never answers.
    Stall,
}

/// Shared state for injection and inspection.
#[derive(Default)]
struct SharedState {
    now: Duration,
    inputs: VecDeque<Input>,
    channel_open: bool,
    channel_events: VecDeque<ChannelEvent>,
    connect_results: VecDeque<ConnectScript>,
    responses: VecDeque<Result<(), CommandError>>,
    completions: VecDeque<CommandOutcome>,
    opened_at: Vec<SimInstant>,
    closed: usize,
    submitted: Vec<(CommandId, Command)>,
    notifications: Vec<String>,
    last_view: Option<ViewModel>,
    renders: usize,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Channel handshakes complete on the next reactor turn and commands are
/// accepted, unless something else was scripted with
/// [`SimDriver::fail_next_connect`], [`SimDriver::refuse_next_connect`],
/// [`SimDriver::stall_next_connect`] or [`SimDriver::respond_next`].
/// Command outcomes become available on the same reactor turn they are
/// submitted.
#[derive(Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
}

impl SimDriver {
    /// Create a new simulation driver at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wall-clock time corresponding to the current virtual instant.
    pub fn wall_clock(&self) -> DateTime<Utc> {
        let base = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(1_700_000_000);
        base + TimeDelta::from_std(self.state().now).unwrap_or(TimeDelta::zero())
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, by: Duration) {
        self.state().now += by;
    }

    /// Queue operator input, applied on a later `poll_event`.
    pub fn inject_input(&self, input: impl FnOnce(&mut App) -> Vec<AppAction> + Send + 'static) {
        self.state().inputs.push_back(Box::new(input));
    }

    /// Queue an `AppEvent` as operator input.
    pub fn inject_event(&self, event: AppEvent) {
        self.inject_input(move |app| app.handle(event));
    }

    /// Deliver a text frame on the open channel, stamped with the virtual
    /// clock. Dropped if no channel is open.
    pub fn inject_frame(&self, payload: impl Into<String>) {
        let received_at = self.wall_clock();
        self.inject_channel_event(ChannelEvent::Frame { payload: payload.into(), received_at });
    }

    /// Close the open channel from the relay side.
    pub fn inject_close(&self, reason: &str) {
        self.inject_channel_event(ChannelEvent::Closed { reason: reason.to_string() });
    }

    /// Fail the open channel.
    pub fn inject_error(&self, reason: &str) {
        self.inject_channel_event(ChannelEvent::Error { reason: reason.to_string() });
    }

    fn inject_channel_event(&self, event: ChannelEvent) {
        let mut state = self.state();
        if state.channel_open {
            state.channel_events.push_back(event);
        } else {
            tracing::debug!(?event, "no channel open, event dropped");
        }
    }

    /// Make the next channel handshake fail.
    pub fn fail_next_connect(&self, reason: &str) {
        self.state().connect_results.push_back(ConnectScript::Fail(reason.to_string()));
    }

    /// Make the next channel open attempt fail before it starts.
    pub fn refuse_next_connect(&self, reason: &str) {
        self.state().connect_results.push_back(ConnectScript::Refuse(reason.to_string()));
    }

    /// Make the next channel handshake hang until
    /// [`SimDriver::complete_handshake`] or a failure is injected.
    pub fn stall_next_connect(&self) {
        self.state().connect_results.push_back(ConnectScript::Stall);
    }

    /// Finish a stalled handshake.
    pub fn complete_handshake(&self) {
        self.inject_channel_event(ChannelEvent::Opened);
    }

    /// Script the relay's answer to the next submitted command.
    pub fn respond_next(&self, result: Result<(), CommandError>) {
        self.state().responses.push_back(result);
    }

    /// True while the runtime holds a channel, open or handshaking.
    pub fn channel_open(&self) -> bool {
        self.state().channel_open
    }

    /// Virtual instants of every open attempt, successful or not.
    pub fn open_attempts(&self) -> Vec<SimInstant> {
        self.state().opened_at.clone()
    }

    /// Number of times the runtime released a channel.
    pub fn closed_count(&self) -> usize {
        self.state().closed
    }

    /// Every command submitted so far.
    pub fn submitted(&self) -> Vec<(CommandId, Command)> {
        self.state().submitted.clone()
    }

    /// Every operator notification so far.
    pub fn notifications(&self) -> Vec<String> {
        self.state().notifications.clone()
    }

    /// The most recently rendered view.
    pub fn last_view(&self) -> Option<ViewModel> {
        self.state().last_view.clone()
    }

    /// Number of renders.
    pub fn render_count(&self) -> usize {
        self.state().renders
    }

    /// True once the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let input = self.state().inputs.pop_front();
        Ok(input.map(|input| input(app)).unwrap_or_default())
    }

    async fn open_channel(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state();
        let at = SimInstant(state.now);
        state.opened_at.push(at);

        let outcome = match state.connect_results.pop_front().unwrap_or(ConnectScript::Open) {
            ConnectScript::Refuse(reason) => return Err(SimDriverError(reason)),
            ConnectScript::Open => Some(ChannelEvent::Opened),
            ConnectScript::Fail(reason) => Some(ChannelEvent::Error { reason }),
            ConnectScript::Stall => None,
        };
        state.channel_open = true;
        state.channel_events.extend(outcome);
        Ok(())
    }

    async fn recv_channel(&mut self) -> Option<ChannelEvent> {
        self.state().channel_events.pop_front()
    }

    fn close_channel(&mut self) {
        let mut state = self.state();
        if state.channel_open {
            state.channel_open = false;
            state.closed += 1;
        }
        state.channel_events.clear();
    }

    fn submit(&mut self, id: CommandId, command: Command) {
        let mut state = self.state();
        let result = state.responses.pop_front().unwrap_or(Ok(()));
        state.submitted.push((id, command));
        state.completions.push_back(CommandOutcome { id, result });
    }

    fn poll_completion(&mut self) -> Option<CommandOutcome> {
        self.state().completions.pop_front()
    }

    fn now(&self) -> Self::Instant {
        SimInstant(self.state().now)
    }

    fn render(&mut self, view: &ViewModel) -> Result<(), Self::Error> {
        let mut state = self.state();
        state.last_view = Some(view.clone());
        state.renders += 1;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.state().notifications.push(message.to_string());
    }

    fn stop(&mut self) {
        self.state().stopped = true;
    }
}
