use log::{debug, info};

use super::{BusEvent, PlaybackSnapshot, PlaybackState, SenderPolicy, Transition};
use crate::config::PlayerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event is not about the tracked player.
    NotApplicable,
    /// The event was consumed; the transitions may be empty.
    Handled(Vec<Transition>),
}

impl Outcome {
    pub fn transitions(&self) -> &[Transition] {
        match self {
            Outcome::NotApplicable => &[],
            Outcome::Handled(transitions) => transitions,
        }
    }
}

/// Turns bus events into state transitions for one tracked player.
#[derive(Debug, Clone)]
pub struct Tracker {
    bus_name: String,
    track_id_prefix: String,
    sender_policy: SenderPolicy,
}

impl Tracker {
    pub fn new(player: &PlayerConfig) -> Self {
        Self {
            bus_name: player.bus_name.clone(),
            track_id_prefix: player.track_id_prefix.clone(),
            sender_policy: player.sender_policy,
        }
    }

    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    pub fn apply(&self, snapshot: &mut PlaybackSnapshot, event: &BusEvent) -> Outcome {
        match event {
            BusEvent::PropertiesChanged {
                sender,
                track_id,
                playback_status,
            } => self.properties_changed(
                snapshot,
                sender.as_deref(),
                track_id.as_deref(),
                playback_status.as_deref(),
            ),
            BusEvent::NameOwnerChanged {
                name, new_owner, ..
            } => self.name_owner_changed(snapshot, name, new_owner),
        }
    }

    /// Primes the snapshot from a direct read of the running player. The
    /// track id is stored without a track change, and any status other than
    /// `Playing` shows the paused controls.
    pub fn seed(
        &self,
        snapshot: &mut PlaybackSnapshot,
        owner: Option<&str>,
        track_id: Option<&str>,
        playback_status: Option<&str>,
    ) -> Vec<Transition> {
        snapshot.owner_sender = owner.map(str::to_string);
        snapshot.tracked = true;
        if let Some(id) = track_id.filter(|id| self.is_tracked_id(id)) {
            snapshot.track_id = Some(id.to_string());
        }
        let target = match playback_status {
            Some("Playing") => PlaybackState::Playing,
            _ => PlaybackState::Paused,
        };
        info!("Seeded from running player: {target:?}, track {track_id:?}");
        enter(snapshot, target).into_iter().collect()
    }

    fn properties_changed(
        &self,
        snapshot: &mut PlaybackSnapshot,
        sender: Option<&str>,
        track_id: Option<&str>,
        playback_status: Option<&str>,
    ) -> Outcome {
        let from_owner = matches!(
            (snapshot.owner_sender.as_deref(), sender),
            (Some(owner), Some(sender)) if owner == sender
        );

        let mut trusted = false;
        let mut track_changed = false;
        if let Some(id) = track_id.filter(|id| self.is_tracked_id(id)) {
            if snapshot.owner_sender.is_none() || from_owner {
                if snapshot.owner_sender.is_none() {
                    snapshot.owner_sender = sender.map(str::to_string);
                }
                trusted = true;
                if snapshot.track_id.as_deref() != Some(id) {
                    track_changed = snapshot.track_id.is_some();
                    snapshot.track_id = Some(id.to_string());
                }
            } else {
                debug!("Ignoring track {id} from {sender:?}, player is owned by another sender");
            }
        }

        trusted |= match self.sender_policy {
            SenderPolicy::Owner => from_owner,
            SenderPolicy::TrackIdOnly => snapshot.tracked,
        };
        if !trusted {
            debug!("PropertiesChanged from {sender:?} is not from the tracked player");
            return Outcome::NotApplicable;
        }
        snapshot.tracked = true;

        let mut transitions = Vec::new();
        if let Some(target) = playback_status.and_then(PlaybackState::from_status) {
            transitions.extend(enter(snapshot, target));
        }
        if track_changed {
            info!("Track changed");
            transitions.push(Transition::TrackChanged);
        }
        Outcome::Handled(transitions)
    }

    fn name_owner_changed(
        &self,
        snapshot: &mut PlaybackSnapshot,
        name: &str,
        new_owner: &str,
    ) -> Outcome {
        if name != self.bus_name {
            return Outcome::NotApplicable;
        }
        if new_owner.is_empty() {
            info!("Player disconnected");
            let exited = enter(snapshot, PlaybackState::Exited);
            *snapshot = PlaybackSnapshot::default();
            return Outcome::Handled(exited.into_iter().collect());
        }
        if snapshot.owner_sender.is_none() {
            debug!("Player appeared as {new_owner}");
            snapshot.owner_sender = Some(new_owner.to_string());
        }
        Outcome::Handled(Vec::new())
    }

    fn is_tracked_id(&self, track_id: &str) -> bool {
        track_id.starts_with(&self.track_id_prefix)
    }
}

/// Moves to `target` unless already there.
fn enter(snapshot: &mut PlaybackSnapshot, target: PlaybackState) -> Option<Transition> {
    if snapshot.state == target {
        return None;
    }
    info!("Player state {:?} -> {target:?}", snapshot.state);
    snapshot.state = target;
    Some(Transition::Entered(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = ":1.42";
    const OTHER: &str = ":1.99";

    fn tracker(policy: SenderPolicy) -> Tracker {
        Tracker::new(&PlayerConfig {
            sender_policy: policy,
            ..PlayerConfig::default()
        })
    }

    fn changed(sender: &str, track_id: Option<&str>, status: Option<&str>) -> BusEvent {
        BusEvent::PropertiesChanged {
            sender: Some(sender.to_string()),
            track_id: track_id.map(str::to_string),
            playback_status: status.map(str::to_string),
        }
    }

    fn owner_changed(new_owner: &str) -> BusEvent {
        BusEvent::NameOwnerChanged {
            name: "org.mpris.MediaPlayer2.spotify".to_string(),
            old_owner: OWNER.to_string(),
            new_owner: new_owner.to_string(),
        }
    }

    #[test]
    fn first_track_primes_without_notifying() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();

        let outcome = tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/a"), None),
        );
        assert_eq!(outcome, Outcome::Handled(Vec::new()));
        assert_eq!(snapshot.track_id.as_deref(), Some("/com/spotify/track/a"));
        assert_eq!(snapshot.owner_sender.as_deref(), Some(OWNER));
        assert!(snapshot.tracked);
        assert_eq!(snapshot.state, PlaybackState::Exited);

        let outcome = tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/b"), None),
        );
        assert_eq!(outcome, Outcome::Handled(vec![Transition::TrackChanged]));

        let outcome = tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/b"), None),
        );
        assert_eq!(outcome, Outcome::Handled(Vec::new()));
    }

    #[test]
    fn repeated_status_is_idempotent() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(&mut snapshot, &changed(OWNER, Some("/com/spotify/track/a"), None));

        let first = tracker.apply(&mut snapshot, &changed(OWNER, None, Some("Playing")));
        let second = tracker.apply(&mut snapshot, &changed(OWNER, None, Some("Playing")));
        assert_eq!(
            first,
            Outcome::Handled(vec![Transition::Entered(PlaybackState::Playing)])
        );
        assert_eq!(second, Outcome::Handled(Vec::new()));
        assert_eq!(snapshot.state, PlaybackState::Playing);
    }

    #[test]
    fn unknown_status_does_not_transition() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        let outcome = tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/a"), Some("Stopped")),
        );
        assert_eq!(outcome, Outcome::Handled(Vec::new()));
        assert_eq!(snapshot.state, PlaybackState::Exited);
    }

    #[test]
    fn status_before_any_track_is_not_applicable() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        let outcome = tracker.apply(&mut snapshot, &changed(OWNER, None, Some("Playing")));
        assert_eq!(outcome, Outcome::NotApplicable);
        assert_eq!(snapshot, PlaybackSnapshot::default());
    }

    #[test]
    fn other_players_are_ignored() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/a"), Some("Playing")),
        );

        let firefox = changed(OTHER, Some("/org/mpris/MediaPlayer2/firefox"), Some("Paused"));
        assert_eq!(tracker.apply(&mut snapshot, &firefox), Outcome::NotApplicable);
        assert_eq!(snapshot.state, PlaybackState::Playing);

        let impostor = changed(OTHER, Some("/com/spotify/track/z"), Some("Paused"));
        assert_eq!(tracker.apply(&mut snapshot, &impostor), Outcome::NotApplicable);
        assert_eq!(snapshot.track_id.as_deref(), Some("/com/spotify/track/a"));
    }

    #[test]
    fn owner_is_trusted_without_prefix_match() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(&mut snapshot, &changed(OWNER, Some("/com/spotify/track/a"), None));

        let advert = changed(OWNER, Some("spotify:ad:123"), Some("Paused"));
        assert_eq!(
            tracker.apply(&mut snapshot, &advert),
            Outcome::Handled(vec![Transition::Entered(PlaybackState::Paused)])
        );
        assert_eq!(snapshot.track_id.as_deref(), Some("/com/spotify/track/a"));
    }

    #[test]
    fn track_id_only_policy_is_sticky() {
        let tracker = tracker(SenderPolicy::TrackIdOnly);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(&mut snapshot, &changed(OWNER, Some("/com/spotify/track/a"), None));

        let outcome = tracker.apply(&mut snapshot, &changed(OTHER, None, Some("Paused")));
        assert_eq!(
            outcome,
            Outcome::Handled(vec![Transition::Entered(PlaybackState::Paused)])
        );
    }

    #[test]
    fn status_and_track_change_in_one_message() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(&mut snapshot, &changed(OWNER, Some("/com/spotify/track/a"), None));

        let outcome = tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/b"), Some("Playing")),
        );
        assert_eq!(
            outcome,
            Outcome::Handled(vec![
                Transition::Entered(PlaybackState::Playing),
                Transition::TrackChanged,
            ])
        );
    }

    #[test]
    fn disconnect_resets_from_playing() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/a"), Some("Playing")),
        );

        let outcome = tracker.apply(&mut snapshot, &owner_changed(""));
        assert_eq!(
            outcome,
            Outcome::Handled(vec![Transition::Entered(PlaybackState::Exited)])
        );
        assert_eq!(snapshot, PlaybackSnapshot::default());

        let again = tracker.apply(&mut snapshot, &owner_changed(""));
        assert_eq!(again, Outcome::Handled(Vec::new()));
    }

    #[test]
    fn appearing_player_records_owner() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        tracker.apply(&mut snapshot, &owner_changed(OWNER));
        assert_eq!(snapshot.owner_sender.as_deref(), Some(OWNER));

        let outcome = tracker.apply(&mut snapshot, &changed(OWNER, None, Some("Paused")));
        assert_eq!(
            outcome,
            Outcome::Handled(vec![Transition::Entered(PlaybackState::Paused)])
        );
    }

    #[test]
    fn other_names_are_not_applicable() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        let event = BusEvent::NameOwnerChanged {
            name: "org.mpris.MediaPlayer2.vlc".to_string(),
            old_owner: OTHER.to_string(),
            new_owner: String::new(),
        };
        assert_eq!(tracker.apply(&mut snapshot, &event), Outcome::NotApplicable);
    }

    #[test]
    fn seed_primes_track_and_state() {
        let tracker = tracker(SenderPolicy::Owner);
        let mut snapshot = PlaybackSnapshot::default();
        let transitions = tracker.seed(
            &mut snapshot,
            Some(OWNER),
            Some("/com/spotify/track/a"),
            Some("Stopped"),
        );
        assert_eq!(transitions, vec![Transition::Entered(PlaybackState::Paused)]);
        assert_eq!(snapshot.track_id.as_deref(), Some("/com/spotify/track/a"));
        assert!(snapshot.tracked);

        let outcome = tracker.apply(
            &mut snapshot,
            &changed(OWNER, Some("/com/spotify/track/b"), Some("Playing")),
        );
        assert_eq!(
            outcome.transitions(),
            &[
                Transition::Entered(PlaybackState::Playing),
                Transition::TrackChanged
            ]
        );
    }
}
