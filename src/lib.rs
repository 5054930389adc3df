//! Mirrors a media player's MPRIS state into polybar.
//!
//! The listener feeds every bus signal through [`message`] navigation,
//! [`metadata`] extraction and the [`playback`] state machine, then turns the
//! resulting transitions into polybar actions with [`signals`] and [`sink`].
//! `spotifyctl status` reuses the extraction and [`format`]s a status line.

pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod message;
pub mod metadata;
pub mod mpris;
pub mod playback;
pub mod session;
pub mod signals;
pub mod sink;

pub use error::App;
pub use session::Session;
