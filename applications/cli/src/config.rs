/// CLI configuration
use anyhow::{Context, Result};
use cadence_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub player: PlayerConfig,

    /// JSON file listing the tracks
    #[serde(default = "default_tracks_file")]
    pub tracks_file: PathBuf,

    /// Directory holding the persisted player snapshot
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `cadence.toml` is read if
    /// present. Environment variables prefixed with `CADENCE_` override the
    /// file, with `__` separating nested keys (`CADENCE_PLAYER__VOLUME=40`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build().context("failed to read configuration")?;
        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, tracks_file: Option<PathBuf>, state_dir: Option<PathBuf>) -> Self {
        if let Some(tracks_file) = tracks_file {
            self.tracks_file = tracks_file;
        }
        if let Some(state_dir) = state_dir {
            self.state_dir = state_dir;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.player.validate()?;

        if self.tracks_file.as_os_str().is_empty() {
            anyhow::bail!("tracks_file must not be empty");
        }
        if self.state_dir.as_os_str().is_empty() {
            anyhow::bail!("state_dir must not be empty");
        }

        Ok(())
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            tracks_file: default_tracks_file(),
            state_dir: default_state_dir(),
        }
    }
}

fn default_tracks_file() -> PathBuf {
    PathBuf::from("tracks.json")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".cadence")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_playback::LoopMode;
    use std::io::Write;

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
tracks_file = "library.json"

[player]
volume = 40
loop_mode = "shuffle"
shuffle_seed = 9
"#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.tracks_file, PathBuf::from("library.json"));
        assert_eq!(config.state_dir, PathBuf::from(".cadence"));
        assert_eq!(config.player.volume, 40);
        assert_eq!(config.player.loop_mode, LoopMode::Shuffle);
        assert_eq!(config.player.shuffle_seed, Some(9));
        assert_eq!(config.player.snapshot_key, "player-snapshot");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn overrides_win() {
        let config = CliConfig::default()
            .with_overrides(Some(PathBuf::from("a.json")), Some(PathBuf::from("/tmp/s")));
        assert_eq!(config.tracks_file, PathBuf::from("a.json"));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/s"));

        let untouched = CliConfig::default().with_overrides(None, None);
        assert_eq!(untouched, CliConfig::default());
    }

    #[test]
    fn validate_rejects_bad_player_config() {
        let mut config = CliConfig::default();
        assert!(config.validate().is_ok());

        config.player.volume = 101;
        assert!(config.validate().is_err());
    }
}
