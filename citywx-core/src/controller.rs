//! The weather query controller.
//!
//! All state lives in one task that handles [`Event`]s in arrival order:
//! user submissions, fetch completions and timer expirations. Renderers
//! observe it through a [`watch`] channel of [`View`] snapshots.
//!
//! Every fetch is tagged with a sequence number. Changing the query aborts
//! the in-flight fetch and bumps the sequence, so a late response for an
//! older query is dropped instead of overwriting the newer state.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    config::DEFAULT_CITY,
    error::{ErrorInfo, WeatherError},
    model::{Query, RequestState, WeatherReport},
    provider::WeatherProvider,
    timer::Timer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub default_city: String,
    pub success_delay: Duration,
    pub error_dismiss: Duration,
    pub shake: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        crate::Config::default().controller_settings()
    }
}

/// Snapshot of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub query: Query,
    pub state: RequestState,
    /// Most recent successful report; stays visible behind an error banner.
    pub last_report: Option<WeatherReport>,
    pub banner: Option<ErrorInfo>,
    /// Set briefly after an empty submission.
    pub shake: bool,
}

impl View {
    fn new(query: Query) -> Self {
        Self {
            query,
            state: RequestState::Idle,
            last_report: None,
            banner: None,
            shake: false,
        }
    }

    /// Report to draw in the panel, if any.
    pub fn panel_report(&self) -> Option<&WeatherReport> {
        match &self.state {
            RequestState::Ready(report) => Some(report),
            RequestState::Failed(_) => self.last_report.as_ref(),
            RequestState::Idle | RequestState::Loading => None,
        }
    }
}

#[derive(Debug)]
enum Event {
    Submit(String),
    Fetched {
        seq: u64,
        result: Result<WeatherReport, WeatherError>,
    },
    Reveal { seq: u64 },
    DismissBanner { id: u64 },
    EndShake { id: u64 },
    Shutdown,
}

/// Handle to a running controller.
///
/// Dropping the handle tears the controller down.
#[derive(Debug)]
pub struct WeatherController {
    events: mpsc::UnboundedSender<Event>,
    view: watch::Receiver<View>,
    task: Option<JoinHandle<()>>,
}

impl WeatherController {
    /// Start the controller and immediately look up the default city.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(provider: Arc<dyn WeatherProvider>, settings: ControllerSettings) -> Self {
        let initial = Query::parse(&settings.default_city).unwrap_or_else(|_| {
            tracing::warn!("default city is empty, falling back to {DEFAULT_CITY}");
            Query::default()
        });

        let (events, rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(View::new(initial.clone()));

        let mut core = Core {
            provider,
            settings,
            events: events.clone(),
            view: view_tx,
            seq: 0,
            fetch: None,
            pending: None,
            reveal: Timer::new(),
            banner_id: 0,
            dismiss: Timer::new(),
            shake_id: 0,
            shake: Timer::new(),
        };
        core.start_fetch(initial);

        let task = tokio::spawn(core.run(rx));

        Self {
            events,
            view,
            task: Some(task),
        }
    }

    /// Submit the text from the input field.
    ///
    /// Blank text never reaches the provider; it only raises the shake cue.
    pub fn submit_query(&self, text: impl Into<String>) -> Result<(), WeatherError> {
        self.events.send(Event::Submit(text.into())).map_err(|_| WeatherError::Closed)
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view.clone()
    }

    pub fn view(&self) -> View {
        self.view.borrow().clone()
    }

    /// Cancel the in-flight request and all timers, then wait for the loop to exit.
    pub async fn shutdown(&mut self) {
        let _ = self.events.send(Event::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for WeatherController {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.events.send(Event::Shutdown);
        }
    }
}

struct Core {
    provider: Arc<dyn WeatherProvider>,
    settings: ControllerSettings,
    events: mpsc::UnboundedSender<Event>,
    view: watch::Sender<View>,

    seq: u64,
    fetch: Option<JoinHandle<()>>,
    /// Successful report waiting out the reveal delay.
    pending: Option<WeatherReport>,
    reveal: Timer,

    banner_id: u64,
    dismiss: Timer,

    shake_id: u64,
    shake: Timer,
}

impl Core {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = rx.recv().await {
            match event {
                Event::Submit(text) => self.submit(&text),
                Event::Fetched { seq, result } => self.on_fetched(seq, result),
                Event::Reveal { seq } => self.on_reveal(seq),
                Event::DismissBanner { id } => self.on_dismiss(id),
                Event::EndShake { id } => self.on_end_shake(id),
                Event::Shutdown => break,
            }
        }

        self.teardown();
    }

    fn submit(&mut self, text: &str) {
        let query = match Query::parse(text) {
            Ok(query) => query,
            Err(_) => {
                self.signal_invalid_input();
                return;
            }
        };

        if self.view.borrow().query == query {
            tracing::debug!(%query, "query unchanged, not re-fetching");
            return;
        }

        self.start_fetch(query);
    }

    fn signal_invalid_input(&mut self) {
        tracing::debug!("empty submission ignored");

        self.shake_id += 1;
        let id = self.shake_id;
        self.view.send_modify(|v| v.shake = true);

        let events = self.events.clone();
        self.shake.restart(self.settings.shake, move || {
            let _ = events.send(Event::EndShake { id });
        });
    }

    fn start_fetch(&mut self, query: Query) {
        if let Some(previous) = self.fetch.take() {
            previous.abort();
        }
        self.reveal.cancel();
        self.pending = None;

        self.seq += 1;
        let seq = self.seq;

        self.view.send_modify(|v| {
            v.query = query.clone();
            v.state = RequestState::Loading;
        });

        tracing::debug!(%query, seq, "fetching current weather");

        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        self.fetch = Some(tokio::spawn(async move {
            let result = provider.current_weather(&query).await;
            let _ = events.send(Event::Fetched { seq, result });
        }));
    }

    fn on_fetched(&mut self, seq: u64, result: Result<WeatherReport, WeatherError>) {
        if seq != self.seq {
            tracing::debug!(seq, current = self.seq, "dropping stale response");
            return;
        }
        self.fetch = None;

        match result {
            Ok(report) => {
                if self.settings.success_delay.is_zero() {
                    self.show_report(report);
                    return;
                }

                self.pending = Some(report);
                let events = self.events.clone();
                self.reveal.restart(self.settings.success_delay, move || {
                    let _ = events.send(Event::Reveal { seq });
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "weather lookup failed");
                self.show_error(ErrorInfo::from(err));
            }
        }
    }

    fn on_reveal(&mut self, seq: u64) {
        if seq != self.seq {
            return;
        }
        if let Some(report) = self.pending.take() {
            self.show_report(report);
        }
    }

    fn show_report(&mut self, report: WeatherReport) {
        self.view.send_modify(|v| {
            v.last_report = Some(report.clone());
            v.state = RequestState::Ready(report);
        });
    }

    fn show_error(&mut self, info: ErrorInfo) {
        self.banner_id += 1;
        let id = self.banner_id;

        self.view.send_modify(|v| {
            v.banner = Some(info.clone());
            v.state = RequestState::Failed(info);
        });

        // Restarting cancels the previous banner's timer.
        let events = self.events.clone();
        self.dismiss.restart(self.settings.error_dismiss, move || {
            let _ = events.send(Event::DismissBanner { id });
        });
    }

    fn on_dismiss(&mut self, id: u64) {
        if id == self.banner_id {
            self.view.send_modify(|v| v.banner = None);
        }
    }

    fn on_end_shake(&mut self, id: u64) {
        if id == self.shake_id {
            self.view.send_modify(|v| v.shake = false);
        }
    }

    fn teardown(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        self.reveal.cancel();
        self.dismiss.cancel();
        self.shake.cancel();
        tracing::debug!("weather controller stopped");
    }
}
