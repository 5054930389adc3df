mod bus;

use futures_util::StreamExt;
use log::{error, info, warn};
use spotify_polybar::config::{config_dir, Config, CONFIG_FILE};
use spotify_polybar::logging::init_file_logger;
use spotify_polybar::mpris::{name_owner, read_metadata, read_playback_status};
use spotify_polybar::sink::PolybarSink;
use spotify_polybar::{App, Session};
use tokio::fs;
use tokio::signal::unix::{signal, SignalKind};
use zbus::Connection;

#[tokio::main]
async fn main() -> Result<(), App> {
    let config_dir = config_dir()?;
    let log_dir = config_dir.join("logs");
    fs::create_dir_all(&log_dir).await?;

    let config = Config::load(&config_dir.join(CONFIG_FILE)).await?;
    let _logger = init_file_logger(&config.logging.level, &log_dir)?;

    if let Err(e) = run(&config).await {
        error!("{e}");
        return Err(e);
    }
    Ok(())
}

async fn run(config: &Config) -> Result<(), App> {
    let connection = Connection::session()
        .await
        .map_err(|e| App::Transport(format!("Failed to connect to the session bus: {e}")))?;
    // Subscribe before seeding so nothing between the two is lost.
    let messages = bus::subscribe(&connection).await?;
    tokio::pin!(messages);

    let mut session = Session::new(config, PolybarSink::from_config(&config.sink));
    if let Err(e) = seed(&connection, &mut session).await {
        warn!("Could not read the running player: {e}");
    }

    let mut terminate = signal(SignalKind::terminate())?;
    info!("Listening for {}", session.bus_name());
    loop {
        tokio::select! {
            message = messages.next() => {
                let Some(message) = message else {
                    return Err(App::Transport("Session bus closed the signal stream".into()));
                };
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Bad message from the bus: {e}");
                        continue;
                    }
                };
                let Some(event) = bus::to_event(&message) else {
                    continue;
                };
                if let Err(e) = session.handle(&event).await {
                    error!("{e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, exiting");
                return Ok(());
            }
            _ = terminate.recv() => {
                info!("Terminated, exiting");
                return Ok(());
            }
        }
    }
}

/// Shows the right module straight away when the player is already running.
async fn seed(connection: &Connection, session: &mut Session<PolybarSink>) -> Result<(), App> {
    let bus_name = session.bus_name().to_string();
    let Some(owner) = name_owner(connection, &bus_name).await? else {
        info!("{bus_name} is not running");
        return Ok(());
    };
    let metadata = read_metadata(connection, &bus_name).await?;
    let status = read_playback_status(connection, &bus_name).await?;
    session
        .seed(Some(&owner), metadata.track_id.as_deref(), status.as_deref())
        .await?;
    Ok(())
}
