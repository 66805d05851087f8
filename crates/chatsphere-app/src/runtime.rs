//! Generic runtime for application orchestration.
//!
//! The Runtime drives the single event loop, coordinating between:
//! - [`ChannelManager`]: the channel to the coordination service
//! - [`Session`]: the protocol state machine
//! - [`App`]: UI state machine
//! - [`Driver`]: Platform-specific UI I/O
//!
//! Channel events and user input are serialized on one loop, channel events
//! first. Each applied input ends with one notification to the app and every
//! subscribed [`Observer`], followed by a render.

use chatsphere_client::{CLOSED_BY_CLIENT, ChannelEvent, ChannelManager, Connector};
use chatsphere_core::{Session, SessionAction, SessionConfig};
use tokio::sync::mpsc;

use crate::{App, AppAction, AppEvent, Driver, Notice, Observer};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Coordination service endpoint
    pub endpoint: String,
    /// Session settings
    pub session: SessionConfig,
    /// Username used when `/join` omits one
    pub username: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8080".to_string(),
            session: SessionConfig::default(),
            username: None,
        }
    }
}

enum Input<E> {
    Channel(ChannelEvent),
    User(Result<Option<AppEvent>, E>),
}

/// Generic runtime that orchestrates channel, session, app and driver.
///
/// # Type Parameters
///
/// - `C`: Transport connector for the channel
/// - `D`: Platform-specific UI driver
pub struct Runtime<C, D>
where
    C: Connector,
    D: Driver,
{
    driver: D,
    channel: ChannelManager<C>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    session: Session,
    app: App,
    observers: Vec<Box<dyn Observer>>,
}

impl<C, D> Runtime<C, D>
where
    C: Connector,
    D: Driver,
{
    /// Create a new runtime.
    pub fn new(connector: C, driver: D, config: RuntimeConfig) -> Self {
        let (channel, events) = ChannelManager::new(connector, config.endpoint.clone());
        let app = App::new(config.endpoint, config.username);
        let session = Session::new(config.session);

        Self { driver, channel, events, session, app, observers: Vec::new() }
    }

    /// Add an observer. It is notified after every applied input.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Run the event loop until the user quits or the driver runs dry.
    ///
    /// Connects once at start-up. After that the channel is only reopened on
    /// an explicit `/connect`.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to poll or render. The channel
    /// is closed and the driver stopped on every exit path.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        let result = self.event_loop().await;

        if self.channel.is_open() {
            self.channel.close();
            self.session.on_close(CLOSED_BY_CLIENT);
            self.publish(&[]);
        }
        self.driver.stop();

        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        self.publish(&[]);
        self.driver.render(&self.app)?;

        let mut notices = Vec::new();
        self.connect(&mut notices).await;
        self.publish(&notices);
        self.driver.render(&self.app)?;

        loop {
            let input = tokio::select! {
                biased;
                Some(event) = self.events.recv() => Input::Channel(event),
                polled = self.driver.poll_event() => Input::User(polled),
            };

            let mut notices = Vec::new();
            match input {
                Input::Channel(event) => {
                    let Some(event) = self.channel.accept(event) else {
                        continue;
                    };
                    self.handle_channel_event(event, &mut notices).await;
                },
                Input::User(polled) => {
                    let Some(event) = polled? else {
                        tracing::debug!("input exhausted");
                        return Ok(());
                    };

                    let actions = self.app.handle(event);
                    if actions.is_empty() {
                        continue;
                    }
                    if self.apply_actions(actions, &mut notices).await {
                        return Ok(());
                    }
                },
            }

            self.publish(&notices);
            self.driver.render(&self.app)?;
        }
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent, notices: &mut Vec<Notice>) {
        match event {
            ChannelEvent::Opened { link } => {
                tracing::debug!(%link, "session opened");
                let actions = self.session.on_open();
                self.execute(actions, notices).await;
            },
            ChannelEvent::Message { frame, .. } => {
                let actions = self.session.handle_frame(&frame);
                self.execute(actions, notices).await;
            },
            ChannelEvent::Closed { link, reason } => {
                let was_connected = self.session.state().is_connected();
                self.session.on_close(&reason);

                if was_connected {
                    tracing::info!(%link, %reason, "session disconnected");
                    notices.push(Notice::Disconnected { reason });
                }
            },
        }
    }

    /// Apply app actions. Returns `true` if the app asked to quit.
    async fn apply_actions(&mut self, actions: Vec<AppAction>, notices: &mut Vec<Notice>) -> bool {
        for action in actions {
            match action {
                // Every applied input renders
                AppAction::Render => {},
                AppAction::Quit => return true,
                AppAction::Connect => self.connect(notices).await,
                AppAction::Submit(intent) => match self.session.handle_intent(intent) {
                    Ok(actions) => self.execute(actions, notices).await,
                    Err(e) => {
                        tracing::debug!(error = %e, "intent rejected");
                        notices.push(Notice::Rejected(e));
                    },
                },
            }
        }
        false
    }

    /// Carry out session actions against the channel.
    async fn execute(&mut self, actions: Vec<SessionAction>, notices: &mut Vec<Notice>) {
        for action in actions {
            match action {
                SessionAction::Send(frame) => {
                    if let Err(e) = self.channel.send(frame).await {
                        tracing::warn!(error = %e, "failed to send frame");
                        notices.push(Notice::Channel(e));
                    }
                },
                SessionAction::Close { reason } => {
                    self.channel.close();
                    notices.push(Notice::Disconnected { reason });
                },
                SessionAction::Anomaly(anomaly) => {
                    tracing::warn!(%anomaly, "session anomaly");
                    notices.push(Notice::Anomaly(anomaly));
                },
            }
        }
    }

    async fn connect(&mut self, notices: &mut Vec<Notice>) {
        if self.channel.is_open() {
            notices.push(Notice::Info("already connected".to_string()));
            return;
        }

        match self.channel.open().await {
            Ok(link) => tracing::info!(%link, endpoint = %self.channel.endpoint(), "connecting"),
            Err(e) => {
                tracing::warn!(error = %e, endpoint = %self.channel.endpoint(), "connect failed");
                notices.push(Notice::Channel(e));
            },
        }
    }

    /// Deliver notices, then the current snapshot, to the app and observers.
    fn publish(&mut self, notices: &[Notice]) {
        for notice in notices {
            self.app.on_notice(notice);
            for observer in &mut self.observers {
                observer.on_notice(notice);
            }
        }

        let snapshot = self.session.snapshot();
        self.app.on_snapshot(&snapshot);
        for observer in &mut self.observers {
            observer.on_snapshot(&snapshot);
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True if the channel is open.
    pub fn is_connected(&self) -> bool {
        self.channel.is_open()
    }
}
