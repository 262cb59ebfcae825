//! Configuration loading for Curtain.
//!
//! A TOML file with optional sections; every field falls back to a default,
//! so a missing file is a fully usable configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::gate::GateConfig;

/// Default exit-fade length for the reveal surface.
pub const DEFAULT_FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CurtainConfig {
    pub timing: Option<TimingConfig>,
    pub ui: Option<UiConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimingConfig {
    /// Minimum time the loading screen stays up, in milliseconds.
    pub min_display_ms: Option<u64>,
    /// Hard cap on the loading screen, in milliseconds.
    pub max_display_ms: Option<u64>,
    /// Pause at 100% before revealing, in milliseconds.
    pub settle_ms: Option<u64>,
    /// Image census cadence, in milliseconds.
    pub image_poll_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UiConfig {
    /// Exit fade duration, in milliseconds.
    pub fade_ms: Option<u64>,
    /// Skip the exit fade entirely.
    #[serde(default)]
    pub reduced_motion: bool,
    /// ASCII-only glyphs for the progress bar and wordmark.
    #[serde(default)]
    pub ascii_only: bool,
}

impl CurtainConfig {
    /// Load from the default path.
    ///
    /// `Ok(None)` when no file exists or no config directory can be
    /// resolved on this platform.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = Self::path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };
        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    /// Default config file location.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("curtain").join("config.toml"))
    }

    /// Gate timings with file values layered over defaults.
    #[must_use]
    pub fn gate_config(&self) -> GateConfig {
        let defaults = GateConfig::default();
        let timing = self.timing.as_ref();
        let ms = |value: Option<u64>, fallback: Duration| {
            value.map_or(fallback, Duration::from_millis)
        };
        GateConfig {
            min_display: ms(timing.and_then(|t| t.min_display_ms), defaults.min_display),
            max_display: ms(timing.and_then(|t| t.max_display_ms), defaults.max_display),
            settle: ms(timing.and_then(|t| t.settle_ms), defaults.settle),
            image_poll: ms(timing.and_then(|t| t.image_poll_ms), defaults.image_poll),
        }
    }

    /// Exit fade duration; zero under reduced motion.
    #[must_use]
    pub fn fade(&self) -> Duration {
        let ui = self.ui.as_ref();
        if ui.is_some_and(|ui| ui.reduced_motion) {
            return Duration::ZERO;
        }
        ui.and_then(|ui| ui.fade_ms)
            .map_or(DEFAULT_FADE, Duration::from_millis)
    }

    #[must_use]
    pub fn ascii_only(&self) -> bool {
        self.ui.as_ref().is_some_and(|ui| ui.ascii_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_empty() {
        let config = CurtainConfig::default();
        let gate = config.gate_config();
        assert_eq!(gate.min_display, Duration::from_millis(1000));
        assert_eq!(gate.max_display, Duration::from_millis(5000));
        assert_eq!(gate.settle, Duration::from_millis(200));
        assert_eq!(gate.image_poll, Duration::from_millis(100));
        assert_eq!(config.fade(), DEFAULT_FADE);
        assert!(!config.ascii_only());
    }

    #[test]
    fn file_values_layer_over_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[timing]\nmin_display_ms = 1500\nimage_poll_ms = 50\n\n[ui]\nfade_ms = 250\nascii_only = true\n",
        )
        .expect("seed config");

        let config = CurtainConfig::load_from(&path).expect("load");
        let gate = config.gate_config();
        assert_eq!(gate.min_display, Duration::from_millis(1500));
        assert_eq!(gate.image_poll, Duration::from_millis(50));
        // Unspecified fields keep their defaults.
        assert_eq!(gate.max_display, Duration::from_millis(5000));
        assert_eq!(config.fade(), Duration::from_millis(250));
        assert!(config.ascii_only());
    }

    #[test]
    fn reduced_motion_zeroes_the_fade() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui]\nfade_ms = 800\nreduced_motion = true\n").expect("seed config");

        let config = CurtainConfig::load_from(&path).expect("load");
        assert_eq!(config.fade(), Duration::ZERO);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("absent.toml");
        let err = CurtainConfig::load_from(&path).expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "timing = \"not a table\"").expect("seed config");
        let err = CurtainConfig::load_from(&path).expect_err("bad toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
