//! Playback state of the tracked player, as shown in the status bar.

mod machine;

pub use machine::{Outcome, Tracker};

use serde::Deserialize;

use crate::message::MessageValue;
use crate::metadata::{extract_from_property_changed, extract_name_owner_changed};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Exited,
}

impl PlaybackState {
    /// Maps an MPRIS `PlaybackStatus` value. Anything other than `Playing`
    /// and `Paused` (e.g. `Stopped`) is not a state the bar shows.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "Playing" => Some(PlaybackState::Playing),
            "Paused" => Some(PlaybackState::Paused),
            _ => None,
        }
    }
}

/// Everything the listener remembers between messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub track_id: Option<String>,
    /// Unique bus name of the tracked player, once known.
    pub owner_sender: Option<String>,
    /// Set once a message has been attributed to the tracked player.
    pub tracked: bool,
}

/// Which messages count as coming from the tracked player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SenderPolicy {
    /// A matching track id establishes the owner; later messages from that
    /// owner are trusted even without a matching track id.
    #[default]
    Owner,
    /// Only a matching track id establishes trust, which then holds until the
    /// player disconnects.
    TrackIdOnly,
}

/// A decoded bus signal. `PropertiesChanged` events only exist for the player
/// interface; signals for other interfaces never become events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    PropertiesChanged {
        sender: Option<String>,
        track_id: Option<String>,
        playback_status: Option<String>,
    },
    NameOwnerChanged {
        name: String,
        old_owner: String,
        new_owner: String,
    },
}

impl BusEvent {
    /// `None` when the signal is not about the player interface.
    pub fn properties_changed(sender: Option<&str>, args: &[MessageValue]) -> Option<Self> {
        let changed = extract_from_property_changed(args)?;
        Some(BusEvent::PropertiesChanged {
            sender: sender.map(str::to_string),
            track_id: changed.track_id().map(str::to_string),
            playback_status: changed.playback_status().map(str::to_string),
        })
    }

    pub fn name_owner_changed(args: &[MessageValue]) -> Option<Self> {
        let change = extract_name_owner_changed(args)?;
        Some(BusEvent::NameOwnerChanged {
            name: change.name.to_string(),
            old_owner: change.old_owner.to_string(),
            new_owner: change.new_owner.to_string(),
        })
    }
}

/// A change the status bar has to be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Entered(PlaybackState),
    TrackChanged,
}
