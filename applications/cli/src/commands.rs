//! Line command parser
//!
//! Maps one line of user input to a player command or a host action.

use cadence_core::TrackId;
use cadence_playback::{PlayerCommand, PlayerState};
use std::fmt::Write;
use thiserror::Error;

/// Help text printed by `help`
pub const HELP: &str = "\
commands:
  play | pause | toggle | stop     transport
  next | prev                      navigate the queue
  track <id>                       select a track
  loop                             cycle none -> one -> all -> shuffle
  volume <0-100> | mute | unmute | togglemute
  seek <seconds>                   jump within the current track
  tick <seconds>                   simulate media progress
  ended                            simulate end of track
  favorite <id>                    toggle a favorite
  refresh                          reload the track list
  state | help | quit";

/// One parsed line
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Send straight to the player
    Player(PlayerCommand),
    /// Media element progress report
    Tick(f64),
    /// Media element reached the end
    Ended,
    Favorite(TrackId),
    Refresh,
    State,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command} expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid {expected} for {command}: {value}")]
    InvalidArgument {
        command: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Parse a line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<Input>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let input = match word.to_ascii_lowercase().as_str() {
        "play" => Input::Player(PlayerCommand::Play),
        "pause" => Input::Player(PlayerCommand::Pause),
        "toggle" => Input::Player(PlayerCommand::TogglePlay),
        "stop" => Input::Player(PlayerCommand::Stop),
        "next" => Input::Player(PlayerCommand::PlayNext),
        "prev" => Input::Player(PlayerCommand::PlayPrev),
        "loop" => Input::Player(PlayerCommand::SwitchLoop),
        "mute" => Input::Player(PlayerCommand::Mute),
        "unmute" => Input::Player(PlayerCommand::Unmute),
        "togglemute" => Input::Player(PlayerCommand::ToggleMute),
        "track" => Input::Player(PlayerCommand::SetTrack(track_id("track", arg)?)),
        "volume" => Input::Player(PlayerCommand::SetVolume(number("volume", "a level", arg)?)),
        "seek" => Input::Player(PlayerCommand::SetTime(seconds("seek", arg)?)),
        "tick" => Input::Tick(seconds("tick", arg)?),
        "ended" => Input::Ended,
        "favorite" => Input::Favorite(track_id("favorite", arg)?),
        "refresh" => Input::Refresh,
        "state" => Input::State,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => return Err(ParseError::Unknown(word.to_string())),
    };

    Ok(Some(input))
}

fn number<T: std::str::FromStr>(
    command: &'static str,
    expected: &'static str,
    arg: Option<&str>,
) -> Result<T, ParseError> {
    let value = arg.ok_or(ParseError::MissingArgument { command, expected })?;
    value.parse().map_err(|_| ParseError::InvalidArgument {
        command,
        expected,
        value: value.to_string(),
    })
}

fn track_id(command: &'static str, arg: Option<&str>) -> Result<TrackId, ParseError> {
    number::<i64>(command, "a track id", arg).map(TrackId::new)
}

fn seconds(command: &'static str, arg: Option<&str>) -> Result<f64, ParseError> {
    number(command, "seconds", arg)
}

/// One-line summary of the player state
pub fn describe(state: &PlayerState) -> String {
    let mut line = format!("[{}]", state.status());

    match state.current_track() {
        Some(track) => {
            let _ = write!(line, " #{}", track.id);
            if !track.name.is_empty() {
                let _ = write!(line, " {}", track.name);
            }
            if let Some(artist) = &track.artist {
                let _ = write!(line, " - {artist}");
            }
            if track.favorite {
                line.push_str(" *");
            }
            let _ = write!(line, " {:.1}/{:.1}s", state.position(), track.duration_secs());
        }
        None => line.push_str(" no track"),
    }

    let _ = write!(line, " | vol {}", state.volume());
    if let Some(muted) = state.muted_volume() {
        let _ = write!(line, " (muted {muted})");
    }
    let _ = write!(
        line,
        " | loop {} | {} queued",
        state.loop_mode(),
        state.tracks().len()
    );

    line
}
