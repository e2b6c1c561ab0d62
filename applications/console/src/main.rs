/// Cadence - terminal music player
use anyhow::Context;
use cadence_console::{
    catalog::open_catalog, AppConfig, ConsoleView, LibraryPresenter, PlayerPresenter,
};
use cadence_core::{Catalog, Track};
use cadence_playback::{
    ConnectorEvent, LogNotifier, PlaybackConfig, RepeatMode, SessionConnector, SessionEvent,
    SessionHost, SimulatedEngine,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence terminal music player", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./cadence.toml when present)
    #[arg(short, long, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every song in the catalog
    List,
    /// Search by title, artist or album
    Search {
        /// Text to look for
        query: String,
    },
    /// Play the catalog (or a search result) on the simulated engine
    Play {
        /// Position in the list to start from (0-based)
        #[arg(short, long, default_value_t = 0)]
        start: usize,
        /// Only play songs matching this text
        #[arg(short, long)]
        query: Option<String>,
        /// Start with shuffle on
        #[arg(long)]
        shuffle: bool,
        /// Start with this repeat mode (off, all, one)
        #[arg(long)]
        repeat: Option<RepeatMode>,
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "cadence_console=debug,cadence_playback=debug,cadence_core=debug"
    } else {
        "cadence_console=info,cadence_playback=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config.as_deref())?;
    let catalog = Arc::new(open_catalog(&config.catalog).context("Failed to open catalog")?);

    match cli.command {
        Commands::List => {
            let mut library = LibraryPresenter::new(catalog);
            library.attach_view(ConsoleView::stdout());
            library.load_songs();
            library.next_update().await;
        }
        Commands::Search { query } => {
            let mut library = LibraryPresenter::new(catalog);
            library.attach_view(ConsoleView::stdout());
            library.search(&query);
            library.next_update().await;
        }
        Commands::Play {
            start,
            query,
            shuffle,
            repeat,
            seconds,
        } => {
            let tracks = match query {
                Some(query) => catalog.search(&query).await?,
                None => catalog.fetch_all().await?,
            };
            if tracks.is_empty() {
                anyhow::bail!("No songs to play");
            }

            let mut playback = config.playback_config();
            playback.initial_shuffle |= shuffle;
            if let Some(mode) = repeat {
                playback.initial_repeat = mode;
            }

            play(
                tracks,
                start,
                playback,
                config.engine.default_track_ms,
                seconds,
            )
            .await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path, true)?,
        None => AppConfig::load()?,
    };
    config.validate()?;
    Ok(config)
}

async fn play(
    tracks: Vec<Track>,
    start: usize,
    playback: PlaybackConfig,
    default_track_ms: u64,
    seconds: Option<u64>,
) -> anyhow::Result<()> {
    let engine = tracks
        .iter()
        .filter(|track| track.duration_ms() > 0)
        .fold(
            SimulatedEngine::new().with_default_duration(default_track_ms),
            |engine, track| engine.with_duration(track.stream_uri(), track.duration_ms()),
        );

    let handle = SessionHost::spawn(engine, Box::new(LogNotifier::new()), playback.clone());
    let connector = SessionConnector::new(handle.clone(), playback.retry);
    let mut player = PlayerPresenter::new(connector, ConsoleView::stdout());
    player.initialize(tracks, start)?;

    let deadline = async {
        match seconds {
            Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = player.next_event() => {
                let finished = matches!(event, ConnectorEvent::Session(SessionEvent::QueueFinished));
                player.handle(event);
                if finished {
                    break;
                }
            }
            () = &mut deadline => {
                info!("Time limit reached");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    player.detach_view();
    handle.shutdown();
    handle.closed().await;
    Ok(())
}
