//! Generic runtime for application orchestration.
//!
//! The Runtime is the single-threaded reactor of the console. Each turn
//! handles, in order:
//!
//! 1. operator input from the [`Driver`],
//! 2. every buffered push channel event, strictly in arrival order,
//!    including the outcome of a pending handshake,
//! 3. finished commands,
//! 4. the reconnection timer.
//!
//! Nothing here waits on the network: opening a channel only starts the
//! handshake. It owns the [`ConnectionManager`] so only the runtime can create or
//! replace the channel, and a cached [`ViewModel`] that is refreshed region by
//! region.

use crate::{
    App, AppAction, AppEvent, ChannelEvent, ConnectionAction, ConnectionConfig, ConnectionManager,
    Driver, Regions, ViewModel,
};

/// Generic runtime that orchestrates App, ConnectionManager, and Driver.
pub struct Runtime<D>
where
    D: Driver,
{
    driver: D,
    app: App,
    connection: ConnectionManager<D::Instant>,
    view: ViewModel,
}

impl<D> Runtime<D>
where
    D: Driver,
{
    /// Create a runtime for the relay at `server`.
    pub fn new(driver: D, server: String, config: ConnectionConfig) -> Self {
        let app = App::new(server);
        let view = ViewModel::render(&app);
        Self { driver, app, connection: ConnectionManager::new(config), view }
    }

    /// Run the event loop until the operator quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error. Channel and
    /// command failures are never fatal.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.start().await?;

        loop {
            let should_quit = self.step().await?;
            if should_quit {
                break;
            }
        }

        self.driver.close_channel();
        self.driver.stop();
        Ok(())
    }

    /// Draw the initial view and open the first channel.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.view)?;
        let actions = self.connection.connect();
        self.execute_connection_actions(actions).await
    }

    /// Process one turn of the reactor.
    ///
    /// Returns `true` if the application should quit.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_event(&mut self.app).await?;
        if self.dispatch(actions)? {
            return Ok(true);
        }

        while let Some(event) = self.driver.recv_channel().await {
            if self.handle_channel_event(event).await? {
                return Ok(true);
            }
        }

        while let Some(outcome) = self.driver.poll_completion() {
            let actions = self.app.handle(AppEvent::CommandCompleted(outcome));
            if self.dispatch(actions)? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let actions = self.connection.tick(now);
        self.execute_connection_actions(actions).await?;

        Ok(false)
    }

    /// Execute actions returned by the App.
    ///
    /// Render requests are merged into one refresh of the cached view.
    /// Returns `true` if should quit.
    pub fn dispatch(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut dirty = Regions::NONE;
        let mut quit = false;

        for action in actions {
            match action {
                AppAction::Render(regions) => dirty |= regions,
                AppAction::Quit => quit = true,
                AppAction::Submit { id, command } => self.driver.submit(id, command),
                AppAction::Notify { message } => self.driver.notify(&message),
            }
        }

        if !dirty.is_empty() {
            self.view.refresh(&self.app, dirty);
            self.driver.render(&self.view)?;
        }
        Ok(quit)
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) -> Result<bool, D::Error> {
        let now = self.driver.now();
        let actions = match event {
            ChannelEvent::Opened => {
                if !self.connection.handle_opened() {
                    return Ok(false);
                }
                let actions = self.app.handle(AppEvent::Connected);
                return self.dispatch(actions);
            },
            ChannelEvent::Frame { payload, received_at } => {
                let actions = self.app.handle(AppEvent::Frame { payload, received_at });
                return self.dispatch(actions);
            },
            ChannelEvent::Closed { reason } => self.connection.handle_closed(now, &reason),
            ChannelEvent::Error { reason } => self.connection.handle_error(now, &reason),
        };
        self.execute_connection_actions(actions).await?;
        Ok(false)
    }

    /// Execute connection actions until none remain.
    ///
    /// A failed open feeds back into the manager, which schedules the retry.
    async fn execute_connection_actions(
        &mut self,
        initial_actions: Vec<ConnectionAction<D::Instant>>,
    ) -> Result<(), D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    ConnectionAction::OpenChannel => {
                        let actions = self.app.handle(AppEvent::Connecting);
                        self.dispatch(actions)?;

                        // Success is reported later as `ChannelEvent::Opened`.
                        if let Err(e) = self.driver.open_channel().await {
                            let now = self.driver.now();
                            let reason = e.to_string();
                            pending_actions.extend(self.connection.handle_error(now, &reason));
                        }
                    },
                    ConnectionAction::CloseChannel => self.driver.close_channel(),
                    ConnectionAction::ScheduleReconnect { delay, .. } => {
                        let actions = self.app.handle(AppEvent::Disconnected { retry_in: delay });
                        self.dispatch(actions)?;
                    },
                }
            }
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Cached view, as last rendered.
    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Connection state machine.
    pub fn connection(&self) -> &ConnectionManager<D::Instant> {
        &self.connection
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
