use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::error::App;
use crate::mpris::{SPOTIFY_BUS_NAME, SPOTIFY_TRACK_ID_PREFIX};
use crate::playback::SenderPolicy;
use crate::signals::SignalTable;

pub const APP_DIR: &str = "spotify-polybar";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub signals: SignalTable,
    pub sink: SinkConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub bus_name: String,
    pub track_id_prefix: String,
    pub sender_policy: SenderPolicy,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            bus_name: SPOTIFY_BUS_NAME.to_string(),
            track_id_prefix: SPOTIFY_TRACK_ID_PREFIX.to_string(),
            sender_policy: SenderPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkKind {
    /// One `polybar-msg action <token>` process per token.
    #[default]
    PolybarMsg,
    /// Write straight into polybar's IPC files.
    IpcFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub ipc_dir: PathBuf,
    /// Pause between two tokens; polybar drops actions that arrive too fast.
    pub delay_ms: u64,
}

impl SinkConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            ipc_dir: PathBuf::from("/tmp"),
            delay_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub async fn load(path: &Path) -> Result<Self, App> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, App> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), App> {
        if self.player.bus_name.is_empty() {
            return Err(App::Configuration("player.bus_name must not be empty".into()));
        }
        if self.player.track_id_prefix.is_empty() {
            return Err(App::Configuration(
                "player.track_id_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/spotify-polybar`
pub fn config_dir() -> Result<PathBuf, App> {
    let home_dir = std::env::var("HOME")?;
    Ok(PathBuf::from(home_dir).join(".config").join(APP_DIR))
}
