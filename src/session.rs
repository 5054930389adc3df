use std::time::Duration;

use log::debug;

use crate::config::Config;
use crate::error::App;
use crate::playback::{BusEvent, Outcome, PlaybackSnapshot, Tracker, Transition};
use crate::signals::SignalTable;
use crate::sink::{deliver, Sink};

/// The listener's state: the snapshot, the rules that update it, and where
/// the resulting signals go. Events are handled one at a time.
pub struct Session<S> {
    tracker: Tracker,
    snapshot: PlaybackSnapshot,
    signals: SignalTable,
    sink: S,
    delay: Duration,
}

impl<S: Sink> Session<S> {
    pub fn new(config: &Config, sink: S) -> Self {
        Self {
            tracker: Tracker::new(&config.player),
            snapshot: PlaybackSnapshot::default(),
            signals: config.signals.clone(),
            sink,
            delay: config.sink.delay(),
        }
    }

    pub fn snapshot(&self) -> &PlaybackSnapshot {
        &self.snapshot
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn bus_name(&self) -> &str {
        self.tracker.bus_name()
    }

    /// Applies `event` and delivers the resulting signals. The state change
    /// is kept even when delivery fails; the error is returned so the caller
    /// can report it.
    pub async fn handle(&mut self, event: &BusEvent) -> Result<Outcome, App> {
        let outcome = self.tracker.apply(&mut self.snapshot, event);
        if outcome == Outcome::NotApplicable {
            debug!("Skipped {event:?}");
        }
        self.emit(outcome.transitions()).await?;
        Ok(outcome)
    }

    pub async fn seed(
        &mut self,
        owner: Option<&str>,
        track_id: Option<&str>,
        playback_status: Option<&str>,
    ) -> Result<Vec<Transition>, App> {
        let transitions = self
            .tracker
            .seed(&mut self.snapshot, owner, track_id, playback_status);
        self.emit(&transitions).await?;
        Ok(transitions)
    }

    async fn emit(&mut self, transitions: &[Transition]) -> Result<(), App> {
        if transitions.is_empty() {
            return Ok(());
        }
        let batch = self.signals.batch(transitions);
        deliver(&mut self.sink, &batch, self.delay).await
    }
}
