use clap::{Parser, Subcommand};
use log::error;
use spotify_polybar::config::{config_dir, Config, CONFIG_FILE};
use spotify_polybar::format::{format_output, FormatOptions, ARTIST_TOKEN, TITLE_TOKEN};
use spotify_polybar::logging::init_cli_logger;
use spotify_polybar::mpris::{read_metadata, send_command, PlayerCommand};
use spotify_polybar::App;
use std::path::Path;
use std::process;
use zbus::Connection;

type StdResult<T> = std::result::Result<T, App>;

#[derive(Parser)]
#[command(
    name = "spotifyctl",
    about = "Control spotify and print what it is playing.",
    version
)]
struct Cli {
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Hide errors such as spotify not running"
    )]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print the current artist and title")]
    Status(StatusCommand),

    #[command(about = "Play spotify")]
    Play,

    #[command(about = "Pause spotify")]
    Pause,

    #[command(about = "Toggle the play/pause state on spotify")]
    Playpause,

    #[command(about = "Go to the next track on spotify")]
    Next,

    #[command(about = "Go to the previous track on spotify")]
    Previous,
}

#[derive(Parser)]
struct StatusCommand {
    #[arg(long = "max-artist-length", value_parser = parse_length, help = "Maximum length of the artist name")]
    max_artist_length: Option<usize>,

    #[arg(long = "max-title-length", value_parser = parse_length, help = "Maximum length of the track title")]
    max_title_length: Option<usize>,

    #[arg(long = "max-length", value_parser = parse_length, help = "Maximum length of the whole line")]
    max_length: Option<usize>,

    #[arg(
        long = "format",
        default_value_t = format!("{ARTIST_TOKEN}: {TITLE_TOKEN}"),
        help = "Output template; %artist% and %title% are replaced"
    )]
    format: String,

    #[arg(
        long = "trunc",
        default_value = "...",
        help = "Appended to anything that was shortened"
    )]
    trunc: String,
}

impl StatusCommand {
    fn options(&self) -> FormatOptions {
        FormatOptions {
            max_artist_len: self.max_artist_length,
            max_title_len: self.max_title_length,
            max_len: self.max_length,
            format: self.format.clone(),
            trunc: self.trunc.clone(),
        }
    }
}

fn parse_length(value: &str) -> Result<usize, String> {
    positive_length(value).map_err(|e| e.to_string())
}

fn positive_length(value: &str) -> StdResult<usize> {
    match value.parse::<usize>() {
        Ok(length) if length > 0 => Ok(length),
        _ => Err(App::InvalidInput(format!(
            "'{value}' is not a positive length"
        ))),
    }
}

#[tokio::main]
async fn main() -> StdResult<()> {
    let cli = Cli::parse();
    let _logger = init_cli_logger(cli.quiet)?;
    if let Err(e) = handle_command(cli).await {
        error!("{e}");
        process::exit(1);
    }
    Ok(())
}

/// The player named in the listener's config file, so both binaries follow
/// the same player.
async fn load_config(dir: &Path) -> StdResult<Config> {
    Config::load(&dir.join(CONFIG_FILE)).await
}

async fn handle_command(cli: Cli) -> StdResult<()> {
    let config = load_config(&config_dir()?).await?;
    let bus_name = config.player.bus_name.as_str();
    let connection = Connection::session()
        .await
        .map_err(|e| App::Transport(format!("Failed to connect to the session bus: {e}")))?;

    let command = match cli.command {
        Commands::Status(status) => {
            let metadata = read_metadata(&connection, bus_name).await?;
            let line = format_output(
                metadata.artist.as_deref().unwrap_or_default(),
                metadata.title.as_deref().unwrap_or_default(),
                &status.options(),
            )?;
            println!("{line}");
            return Ok(());
        }
        Commands::Play => PlayerCommand::Play,
        Commands::Pause => PlayerCommand::Pause,
        Commands::Playpause => PlayerCommand::PlayPause,
        Commands::Next => PlayerCommand::Next,
        Commands::Previous => PlayerCommand::Previous,
    };
    send_command(&connection, bus_name, command).await
}
