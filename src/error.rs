use flexi_logger::FlexiLoggerError;
use std::io::Error as IoError;
use thiserror::Error;
use zbus::Error as ZbusError;

#[derive(Error, Debug)]
pub enum App {
    #[error("I/O operation failed: {0}")]
    Io(#[from] IoError),
    #[error("Zbus error: {0}")]
    Zbus(#[from] ZbusError),
    #[error("DBus call failed: {0}")]
    Fdo(#[from] zbus::fdo::Error),
    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
    #[error("Logger initialization error: {0}")]
    Logger(#[from] FlexiLoggerError),
    #[error("Environment variable error")]
    EnvVar(#[from] std::env::VarError),
    #[error("Failed to deliver signal '{token}': {reason}")]
    SinkDelivery { token: String, reason: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl App {
    pub(crate) fn delivery(token: &str, reason: impl ToString) -> Self {
        App::SinkDelivery {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}
