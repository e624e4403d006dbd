use std::path::{Path, PathBuf};

use courtside_core::ffmpeg::FfmpegTools;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults that match a dataset laid out in the current
/// directory. Command-line flags override individual values.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root of the dataset tree (default: `.`).
    pub data_dir: PathBuf,
    /// Frame rate shared by every replay (default: `30`).
    pub fps: f64,
    /// Upper bound on videos processed at once (default: available parallelism).
    pub max_parallel: usize,
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    /// Where `{game_id}_failed_videos.txt` ledgers are appended (default: `.`).
    pub failure_dir: PathBuf,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default               |
    /// |--------------------------|-----------------------|
    /// | `COURTSIDE_DATA_DIR`     | `.`                   |
    /// | `COURTSIDE_FPS`          | `30`                  |
    /// | `COURTSIDE_MAX_PARALLEL` | available parallelism |
    /// | `FFMPEG_BIN`             | `ffmpeg`              |
    /// | `FFPROBE_BIN`            | `ffprobe`             |
    /// | `COURTSIDE_FAILURE_DIR`  | `.`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = |name: &str, default: &str| PathBuf::from(lookup(name).unwrap_or_else(|| default.into()));

        let fps = match lookup("COURTSIDE_FPS") {
            Some(value) => match value.trim().parse::<f64>() {
                Ok(fps) if fps.is_finite() && fps > 0.0 => fps,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "COURTSIDE_FPS",
                        expected: "a positive number",
                        value,
                    })
                }
            },
            None => 30.0,
        };

        let max_parallel = match lookup("COURTSIDE_MAX_PARALLEL") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "COURTSIDE_MAX_PARALLEL",
                        expected: "a positive integer",
                        value,
                    })
                }
            },
            None => default_parallelism(),
        };

        Ok(Self {
            data_dir: path("COURTSIDE_DATA_DIR", "."),
            fps,
            max_parallel,
            ffmpeg_bin: path("FFMPEG_BIN", "ffmpeg"),
            ffprobe_bin: path("FFPROBE_BIN", "ffprobe"),
            failure_dir: path("COURTSIDE_FAILURE_DIR", "."),
        })
    }

    pub fn dataset(&self) -> DatasetPaths {
        DatasetPaths::under(&self.data_dir)
    }

    pub fn tools(&self) -> FfmpegTools {
        FfmpegTools {
            ffmpeg: self.ffmpeg_bin.clone(),
            ffprobe: self.ffprobe_bin.clone(),
        }
    }
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Standard sub-directories of the dataset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub replays: PathBuf,
    pub game_logs: PathBuf,
    pub annotations: PathBuf,
    pub clip_annotations: PathBuf,
    pub clips: PathBuf,
    pub positions: PathBuf,
    pub boxes: PathBuf,
}

impl DatasetPaths {
    pub fn under(root: &Path) -> Self {
        Self {
            replays: root.join("game-replays"),
            game_logs: root.join("hudl-game-logs"),
            annotations: root.join("annotations"),
            clip_annotations: root.join("clip-annotations"),
            clips: root.join("clips"),
            positions: root.join("2d-player-positions"),
            boxes: root.join("player-tracklets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = WorkerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.fps, 30.0);
        assert!(config.max_parallel >= 1);
        assert_eq!(config.ffmpeg_bin, PathBuf::from("ffmpeg"));
        assert_eq!(config.tools().ffprobe, PathBuf::from("ffprobe"));
    }

    #[test]
    fn overrides() {
        let config = WorkerConfig::from_lookup(lookup(&[
            ("COURTSIDE_DATA_DIR", "/data/nba"),
            ("COURTSIDE_FPS", "25"),
            ("COURTSIDE_MAX_PARALLEL", "4"),
            ("FFMPEG_BIN", "/opt/ffmpeg"),
        ]))
        .unwrap();
        assert_eq!(config.fps, 25.0);
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.ffmpeg_bin, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(
            config.dataset().game_logs,
            PathBuf::from("/data/nba/hudl-game-logs")
        );
    }

    #[test]
    fn invalid_numbers_are_errors() {
        assert_matches!(
            WorkerConfig::from_lookup(lookup(&[("COURTSIDE_FPS", "fast")])),
            Err(ConfigError::Invalid { name: "COURTSIDE_FPS", .. })
        );
        assert_matches!(
            WorkerConfig::from_lookup(lookup(&[("COURTSIDE_MAX_PARALLEL", "0")])),
            Err(ConfigError::Invalid { name: "COURTSIDE_MAX_PARALLEL", .. })
        );
    }
}
