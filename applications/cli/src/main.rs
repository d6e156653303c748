/// Cadence - headless music player
use anyhow::Context;
use cadence_cli::{
    catalog::JsonCatalog,
    commands::{self, Input},
    config::CliConfig,
    media::ConsoleElement,
};
use cadence_playback::{FavoriteToggle, FileStore, MediaSync, PlayerSession};
use clap::Parser;
use std::{io::Stdout, path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Headless Cadence player driven from stdin", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON file listing the tracks
    #[arg(short, long)]
    tracks: Option<PathBuf>,

    /// Directory for the persisted player snapshot
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info,cadence_cli=info,cadence_core=info,cadence_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?.with_overrides(cli.tracks, cli.state_dir);
    config.validate()?;

    let catalog = Arc::new(
        JsonCatalog::open(&config.tracks_file)
            .await
            .with_context(|| format!("failed to open {}", config.tracks_file.display()))?,
    );
    let store = FileStore::open(&config.state_dir)?;

    let mut session = PlayerSession::start(config.player.clone(), catalog.clone(), store).await?;
    let _changes = session.subscribe(|_, events| {
        for event in events {
            tracing::debug!(?event, "Player event");
        }
    });

    let mut media = ConsoleElement::new(std::io::stdout());
    let mut sync = MediaSync::new();
    sync.sync(session.state(), &mut media);
    println!("{}", commands::describe(session.state()));

    run(&mut session, &catalog, &mut sync, &mut media).await?;

    session.shutdown()?;
    Ok(())
}

async fn run(
    session: &mut PlayerSession<FileStore>,
    catalog: &Arc<JsonCatalog>,
    sync: &mut MediaSync,
    media: &mut ConsoleElement<Stdout>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = match commands::parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e} (try `help`)");
                continue;
            }
        };

        match input {
            Input::Player(command) => {
                session.dispatch(command);
            }
            Input::Tick(position) => {
                sync.element_reported(position);
                session.on_time_advanced(position);
            }
            Input::Ended => {
                sync.element_ended();
                session.on_track_ended();
            }
            Input::Favorite(id) => {
                let Some(track) = session.state().track(id) else {
                    eprintln!("no track with id {id}");
                    continue;
                };
                let mut toggle = FavoriteToggle::new(id, track.favorite);
                let state = toggle.toggle(catalog.as_ref()).await;
                println!("track {id}: {}", serde_json::to_string(&state)?);
                session.refresh_tracks().await;
            }
            Input::Refresh => {
                session.refresh_tracks().await;
            }
            Input::State => {}
            Input::Help => {
                println!("{}", commands::HELP);
                continue;
            }
            Input::Quit => break,
        }

        sync.sync(session.state(), media);
        println!("{}", commands::describe(session.state()));
    }

    Ok(())
}
