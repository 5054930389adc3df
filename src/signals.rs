//! Mapping from transitions to the status bar's signal vocabulary.

use serde::Deserialize;

use crate::playback::{PlaybackState, Transition};

/// Ordered signal tokens for every transition. Defaults drive the
/// `playpause`, `previous`, `next` and `spotify` polybar ipc modules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignalTable {
    pub playing: Vec<String>,
    pub paused: Vec<String>,
    pub exited: Vec<String>,
    pub track_changed: Vec<String>,
}

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| (*t).to_string()).collect()
}

impl Default for SignalTable {
    fn default() -> Self {
        Self {
            playing: tokens(&[
                "#playpause.hook.1",
                "#previous.hook.1",
                "#next.hook.1",
                "#spotify.hook.1",
            ]),
            paused: tokens(&[
                "#playpause.hook.2",
                "#previous.hook.1",
                "#next.hook.1",
                "#spotify.hook.1",
            ]),
            exited: tokens(&[
                "#playpause.hook.0",
                "#previous.hook.0",
                "#next.hook.0",
                "#spotify.hook.0",
            ]),
            track_changed: tokens(&["#spotify.hook.1"]),
        }
    }
}

impl SignalTable {
    pub fn for_state(&self, state: PlaybackState) -> &[String] {
        match state {
            PlaybackState::Playing => &self.playing,
            PlaybackState::Paused => &self.paused,
            PlaybackState::Exited => &self.exited,
        }
    }

    pub fn for_transition(&self, transition: Transition) -> &[String] {
        match transition {
            Transition::Entered(state) => self.for_state(state),
            Transition::TrackChanged => &self.track_changed,
        }
    }

    /// Tokens for a batch of transitions, in order, each token at most once.
    pub fn batch(&self, transitions: &[Transition]) -> Vec<&str> {
        let mut batch: Vec<&str> = Vec::new();
        for token in transitions
            .iter()
            .flat_map(|t| self.for_transition(*t))
        {
            if !batch.contains(&token.as_str()) {
                batch.push(token.as_str());
            }
        }
        batch
    }
}
