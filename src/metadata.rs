//! Field extraction from MPRIS messages.
//!
//! Every lookup is a [`Step`] pipeline over a [`Cursor`]; a field that is
//! missing or has an unexpected shape is reported as `None`.

use crate::message::{Cursor, MessageValue, Step, ValueType};
use crate::mpris::{
    METADATA_PROPERTY, PLAYBACK_STATUS_PROPERTY, PLAYER_INTERFACE, XESAM_ARTIST, XESAM_TITLE,
    MPRIS_TRACK_ID,
};

/// From a variant holding the metadata dictionary to its first entry.
const INTO_METADATA: &[Step<'static>] = &[Step::Type(ValueType::Variant), Step::Signature("a{sv}")];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub track_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// A `PropertiesChanged` signal for the player interface.
#[derive(Debug, Clone, Copy)]
pub struct ChangedProperties<'a> {
    pub interface: &'a str,
    changes: Cursor<'a>,
}

impl<'a> ChangedProperties<'a> {
    /// The `mpris:trackid` inside a changed `Metadata` property.
    pub fn track_id(&self) -> Option<&'a str> {
        let metadata = self.property(METADATA_PROPERTY)?.follow(INTO_METADATA)?;
        track_id_in(metadata)
    }

    pub fn playback_status(&self) -> Option<&'a str> {
        self.property(PLAYBACK_STATUS_PROPERTY)?
            .recurse_into_type(ValueType::Variant)?
            .read_string()
    }

    pub fn metadata(&self) -> Option<TrackMetadata> {
        let metadata = self.property(METADATA_PROPERTY)?.follow(INTO_METADATA)?;
        Some(fields_in(metadata))
    }

    fn property(&self, name: &str) -> Option<Cursor<'a>> {
        self.changes
            .follow(&[Step::Type(ValueType::Array), Step::Key(name)])
    }
}

/// Reads `(interface, changed_properties, invalidated)`. Signals for any
/// other interface are not applicable and yield `None`.
pub fn extract_from_property_changed(args: &[MessageValue]) -> Option<ChangedProperties<'_>> {
    let mut cursor = Cursor::new(args);
    let interface = cursor.read_string()?;
    if interface != PLAYER_INTERFACE {
        return None;
    }
    cursor.advance();
    Some(ChangedProperties {
        interface,
        changes: cursor,
    })
}

/// Reads the reply of `Properties.Get(Player, "Metadata")`, a single variant
/// wrapping the metadata dictionary.
pub fn extract_from_property_reply(args: &[MessageValue]) -> TrackMetadata {
    Cursor::new(args)
        .follow(INTO_METADATA)
        .map(fields_in)
        .unwrap_or_default()
}

/// Reads the reply of `Properties.Get(Player, "PlaybackStatus")`.
pub fn extract_playback_status_reply(args: &[MessageValue]) -> Option<&str> {
    Cursor::new(args)
        .recurse_into_type(ValueType::Variant)?
        .read_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameOwnerChange<'a> {
    pub name: &'a str,
    pub old_owner: &'a str,
    pub new_owner: &'a str,
}

pub fn extract_name_owner_changed(args: &[MessageValue]) -> Option<NameOwnerChange<'_>> {
    let mut cursor = Cursor::new(args);
    let name = cursor.read_string()?;
    cursor.advance();
    let old_owner = cursor.read_string()?;
    cursor.advance();
    let new_owner = cursor.read_string()?;
    Some(NameOwnerChange {
        name,
        old_owner,
        new_owner,
    })
}

fn fields_in(metadata: Cursor<'_>) -> TrackMetadata {
    TrackMetadata {
        track_id: track_id_in(metadata).map(str::to_string),
        title: string_in(metadata, XESAM_TITLE).map(str::to_string),
        artist: artist_in(metadata).map(str::to_string),
    }
}

fn string_in<'a>(metadata: Cursor<'a>, key: &str) -> Option<&'a str> {
    metadata
        .follow(&[Step::Key(key), Step::Type(ValueType::Variant)])?
        .read_string()
}

// The track id is an object path per MPRIS, but older clients send a string.
fn track_id_in(metadata: Cursor<'_>) -> Option<&str> {
    let value = metadata.follow(&[Step::Key(MPRIS_TRACK_ID), Step::Type(ValueType::Variant)])?;
    value.read_string().or_else(|| value.read_object_path())
}

// `xesam:artist` is a list; only the first name is shown.
fn artist_in(metadata: Cursor<'_>) -> Option<&str> {
    let value = metadata.follow(&[Step::Key(XESAM_ARTIST), Step::Type(ValueType::Variant)])?;
    match value.recurse_into_type(ValueType::Array) {
        Some(first) => first.read_string(),
        None => value.read_string(),
    }
}
