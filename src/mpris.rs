use std::fmt;

use log::debug;
use zbus::{proxy, Connection};

use crate::error::App;
use crate::message::{message_args, Cursor};
use crate::metadata::{extract_from_property_reply, extract_playback_status_reply, TrackMetadata};

pub const SPOTIFY_BUS_NAME: &str = "org.mpris.MediaPlayer2.spotify";
pub const SPOTIFY_TRACK_ID_PREFIX: &str = "/com/spotify";
pub const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";

pub const DBUS_NAME: &str = "org.freedesktop.DBus";
pub const DBUS_PATH: &str = "/org/freedesktop/DBus";
pub const NAME_OWNER_CHANGED: &str = "NameOwnerChanged";

pub const METADATA_PROPERTY: &str = "Metadata";
pub const PLAYBACK_STATUS_PROPERTY: &str = "PlaybackStatus";
pub const MPRIS_TRACK_ID: &str = "mpris:trackid";
pub const XESAM_TITLE: &str = "xesam:title";
pub const XESAM_ARTIST: &str = "xesam:artist";

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_service = "org.mpris.MediaPlayer2.spotify",
    default_path = "/org/mpris/MediaPlayer2"
)]
trait Player {
    async fn play(&self) -> zbus::Result<()>;
    async fn pause(&self) -> zbus::Result<()>;
    async fn play_pause(&self) -> zbus::Result<()>;
    async fn next(&self) -> zbus::Result<()>;
    async fn previous(&self) -> zbus::Result<()>;
}

/// Control calls forwarded to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            PlayerCommand::Play => "Play",
            PlayerCommand::Pause => "Pause",
            PlayerCommand::PlayPause => "PlayPause",
            PlayerCommand::Next => "Next",
            PlayerCommand::Previous => "Previous",
        };
        f.write_str(method)
    }
}

pub async fn send_command(
    connection: &Connection,
    bus_name: &str,
    command: PlayerCommand,
) -> Result<(), App> {
    let proxy = PlayerProxy::builder(connection)
        .destination(bus_name)?
        .build()
        .await?;
    debug!("Calling {command} on {bus_name}");
    match command {
        PlayerCommand::Play => proxy.play().await?,
        PlayerCommand::Pause => proxy.pause().await?,
        PlayerCommand::PlayPause => proxy.play_pause().await?,
        PlayerCommand::Next => proxy.next().await?,
        PlayerCommand::Previous => proxy.previous().await?,
    }
    Ok(())
}

/// `Properties.Get(Player, "Metadata")`, read through the message navigator.
pub async fn read_metadata(connection: &Connection, bus_name: &str) -> Result<TrackMetadata, App> {
    let reply = get_player_property(connection, bus_name, METADATA_PROPERTY).await?;
    Ok(extract_from_property_reply(&message_args(&reply)?))
}

pub async fn read_playback_status(
    connection: &Connection,
    bus_name: &str,
) -> Result<Option<String>, App> {
    let reply = get_player_property(connection, bus_name, PLAYBACK_STATUS_PROPERTY).await?;
    Ok(extract_playback_status_reply(&message_args(&reply)?).map(str::to_string))
}

/// Unique name currently owning `bus_name`, or `None` if nobody does.
pub async fn name_owner(connection: &Connection, bus_name: &str) -> Result<Option<String>, App> {
    let reply = connection
        .call_method(
            Some(DBUS_NAME),
            DBUS_PATH,
            Some(DBUS_NAME),
            "GetNameOwner",
            &(bus_name,),
        )
        .await;
    match reply {
        Ok(reply) => {
            let args = message_args(&reply)?;
            Ok(Cursor::new(&args).read_string().map(str::to_string))
        }
        Err(zbus::Error::MethodError(name, _, _))
            if name.as_str() == "org.freedesktop.DBus.Error.NameHasNoOwner" =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn get_player_property(
    connection: &Connection,
    bus_name: &str,
    property: &str,
) -> Result<zbus::Message, App> {
    Ok(connection
        .call_method(
            Some(bus_name),
            MPRIS_PATH,
            Some(PROPERTIES_INTERFACE),
            "Get",
            &(PLAYER_INTERFACE, property),
        )
        .await?)
}
