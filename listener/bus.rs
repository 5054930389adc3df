use futures_util::stream::{self, Stream};
use log::debug;
use spotify_polybar::message::message_args;
use spotify_polybar::mpris::{
    DBUS_NAME, DBUS_PATH, MPRIS_PATH, NAME_OWNER_CHANGED, PROPERTIES_CHANGED,
    PROPERTIES_INTERFACE,
};
use spotify_polybar::playback::BusEvent;
use spotify_polybar::App;
use zbus::{message, Connection, MatchRule, Message, MessageStream};

/// Player property changes and bus name ownership changes, in arrival order
/// per stream.
pub async fn subscribe(
    connection: &Connection,
) -> Result<impl Stream<Item = zbus::Result<Message>>, App> {
    let properties = MatchRule::builder()
        .msg_type(message::Type::Signal)
        .interface(PROPERTIES_INTERFACE)?
        .member(PROPERTIES_CHANGED)?
        .path(MPRIS_PATH)?
        .build();
    let owners = MatchRule::builder()
        .msg_type(message::Type::Signal)
        .sender(DBUS_NAME)?
        .interface(DBUS_NAME)?
        .member(NAME_OWNER_CHANGED)?
        .path(DBUS_PATH)?
        .build();

    let properties = MessageStream::for_match_rule(properties, connection, None).await?;
    let owners = MessageStream::for_match_rule(owners, connection, None).await?;
    Ok(stream::select(properties, owners))
}

/// Decodes a signal into an event, or `None` when it is not one we follow.
pub fn to_event(message: &Message) -> Option<BusEvent> {
    let header = message.header();
    let member = header.member()?.to_string();
    let args = match message_args(message) {
        Ok(args) => args,
        Err(e) => {
            debug!("Undecodable {member} signal: {e}");
            return None;
        }
    };
    match member.as_str() {
        PROPERTIES_CHANGED => {
            BusEvent::properties_changed(header.sender().map(|sender| sender.as_str()), &args)
        }
        NAME_OWNER_CHANGED => BusEvent::name_owner_changed(&args),
        _ => None,
    }
}
