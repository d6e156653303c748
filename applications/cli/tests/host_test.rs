//! End-to-end host tests
//!
//! Drives a session the way the binary does: parsed lines in, media
//! instructions and state summaries out.

use cadence_cli::{
    catalog::JsonCatalog,
    commands::{describe, parse_line, Input},
    media::ConsoleElement,
};
use cadence_playback::{
    FavoriteState, FavoriteToggle, FileStore, MediaSync, PlayerConfig, PlayerSession, PlayerStatus,
};
use cadence_core::TrackId;
use std::path::Path;
use std::sync::Arc;

const LIBRARY: &str = r#"[
    {"id": 1, "file": "/music/1.mp3", "duration": 10, "name": "First"},
    {"id": 2, "file": "/music/2.mp3", "duration": 20, "name": "Second"}
]"#;

async fn start(dir: &Path) -> (PlayerSession<FileStore>, Arc<JsonCatalog>) {
    let tracks = dir.join("tracks.json");
    if !tracks.exists() {
        std::fs::write(&tracks, LIBRARY).unwrap();
    }

    let catalog = Arc::new(JsonCatalog::open(&tracks).await.unwrap());
    let store = FileStore::open(dir.join("state")).unwrap();
    let session = PlayerSession::start(PlayerConfig::default(), catalog.clone(), store)
        .await
        .unwrap();
    (session, catalog)
}

async fn feed(
    session: &mut PlayerSession<FileStore>,
    catalog: &JsonCatalog,
    sync: &mut MediaSync,
    media: &mut ConsoleElement<Vec<u8>>,
    script: &str,
) {
    for line in script.lines() {
        match parse_line(line).unwrap() {
            Some(Input::Player(command)) => {
                session.dispatch(command);
            }
            Some(Input::Tick(t)) => {
                sync.element_reported(t);
                session.on_time_advanced(t);
            }
            Some(Input::Ended) => {
                sync.element_ended();
                session.on_track_ended();
            }
            Some(Input::Favorite(id)) => {
                let favorite = session.state().track(id).is_some_and(|t| t.favorite);
                FavoriteToggle::new(id, favorite).toggle(catalog).await;
                session.refresh_tracks().await;
            }
            _ => {}
        }
        sync.sync(session.state(), media);
    }
}

#[tokio::test]
async fn scripted_listening_session() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, catalog) = start(dir.path()).await;
    let mut sync = MediaSync::new();
    let mut media = ConsoleElement::new(Vec::new());

    feed(
        &mut session,
        &catalog,
        &mut sync,
        &mut media,
        "play\ntick 4\ntick 10\nended\nvolume 30\n",
    )
    .await;

    assert_eq!(
        describe(session.state()),
        "[playing] #2 Second 0.0/20.0s | vol 30 | loop all | 2 queued"
    );

    let out = String::from_utf8(media.into_inner()).unwrap();
    assert!(out.contains("media: load /music/1.mp3"));
    assert!(out.contains("media: load /music/2.mp3"));
    assert!(out.contains("media: volume 0.30"));
    assert!(!out.contains("seek"));
}

#[tokio::test]
async fn repeat_one_replays_after_ended() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, catalog) = start(dir.path()).await;
    let mut sync = MediaSync::new();
    let mut media = ConsoleElement::new(Vec::new());

    feed(&mut session, &catalog, &mut sync, &mut media, "loop\nloop\nloop\nplay\ntick 10").await;
    assert_eq!(session.state().loop_mode().as_str(), "one");
    let before = String::from_utf8(media.into_inner()).unwrap();
    let mut media = ConsoleElement::new(Vec::new());
    assert!(before.contains("media: play"));

    feed(&mut session, &catalog, &mut sync, &mut media, "ended").await;
    let out = String::from_utf8(media.into_inner()).unwrap();
    assert_eq!(out, "  media: seek 0.0s\n  media: play\n");
}

#[tokio::test]
async fn favorite_round_trips_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, catalog) = start(dir.path()).await;
    let mut sync = MediaSync::new();
    let mut media = ConsoleElement::new(Vec::new());

    feed(&mut session, &catalog, &mut sync, &mut media, "favorite 2").await;
    assert!(session.state().track(TrackId::new(2)).unwrap().favorite);

    let toggle = FavoriteToggle::new(TrackId::new(2), true);
    assert_eq!(toggle.state(), FavoriteState::Favorite);

    let saved = std::fs::read_to_string(dir.path().join("tracks.json")).unwrap();
    assert!(saved.contains("\"favorite\": true"));
}

#[tokio::test]
async fn restart_resumes_stopped_where_it_left_off() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (mut session, catalog) = start(dir.path()).await;
        let mut sync = MediaSync::new();
        let mut media = ConsoleElement::new(Vec::new());
        feed(&mut session, &catalog, &mut sync, &mut media, "track 2\nplay\ntick 12.5\nloop").await;
        session.shutdown().unwrap();
    }

    let (session, _catalog) = start(dir.path()).await;
    let state = session.state();
    assert_eq!(state.status(), PlayerStatus::Stopped);
    assert_eq!(state.current_track_id(), Some(TrackId::new(2)));
    assert_eq!(state.position(), 12.5);
    assert_eq!(state.loop_mode().as_str(), "shuffle");
}
