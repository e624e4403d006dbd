//! FFmpeg/FFprobe command utilities.
//!
//! Clips are cut with stream copy (no re-encode). Argument lists are built by
//! plain functions so they can be checked without running the binaries.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;

use crate::error::CoreError;
use crate::types::FrameIndex;

/// Error type for FFmpeg/FFprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("ffmpeg produced no output at {0}")]
    OutputMissing(String),
}

impl From<FfmpegError> for CoreError {
    fn from(err: FfmpegError) -> Self {
        match err {
            FfmpegError::VideoNotFound(path) => CoreError::NotFound {
                entity: "video",
                key: path,
            },
            other => CoreError::Internal(other.to_string()),
        }
    }
}

/// Locations of the two binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Result of a clip cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutOutcome {
    Written,
    AlreadyExists,
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// The parts of `ffprobe -print_format json -show_format -show_streams`
/// output that frame counting needs.
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    /// e.g. "30/1" or "30000/1001"
    pub r_frame_rate: Option<String>,
    pub duration: Option<String>,
    pub nb_frames: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Argument builders
// ---------------------------------------------------------------------------

/// Arguments for a stream-copy cut of `duration` seconds starting at `offset`.
/// `-n` makes ffmpeg refuse to overwrite an existing output.
pub fn cut_clip_args(src: &Path, dst: &Path, offset: f64, duration: f64) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-ss".into(),
        format!("{}", offset.max(0.0)).into(),
        "-t".into(),
        format!("{duration}").into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-n".into(),
        "-i".into(),
    ];
    args.push(src.as_os_str().to_owned());
    args.extend(
        ["-vcodec", "copy", "-acodec", "copy"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(dst.as_os_str().to_owned());
    args
}

/// Arguments that write frame `index` of `video` to stdout as PNG.
pub fn grab_frame_args(video: &Path, index: FrameIndex) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into(), "-i".into()];
    args.push(video.as_os_str().to_owned());
    args.extend(
        [
            "-vf".to_string(),
            format!("select=eq(n\\,{index})"),
            "-vframes".to_string(),
            "1".to_string(),
            "-f".to_string(),
            "image2pipe".to_string(),
            "-vcodec".to_string(),
            "png".to_string(),
            "-".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl FfmpegTools {
    /// Cut `[offset, offset + duration)` of `src` into `dst`.
    ///
    /// An existing `dst` is left alone. A run that exits cleanly but leaves
    /// no `dst` behind is reported as [`FfmpegError::OutputMissing`].
    pub async fn cut_clip(
        &self,
        src: &Path,
        dst: &Path,
        offset: f64,
        duration: f64,
    ) -> Result<CutOutcome, FfmpegError> {
        if dst.exists() {
            return Ok(CutOutcome::AlreadyExists);
        }
        if !src.exists() {
            return Err(FfmpegError::VideoNotFound(src.display().to_string()));
        }

        run(Command::new(&self.ffmpeg).args(cut_clip_args(src, dst, offset, duration))).await?;

        if !dst.exists() {
            return Err(FfmpegError::OutputMissing(dst.display().to_string()));
        }
        Ok(CutOutcome::Written)
    }

    /// Run `ffprobe` on a video file and return the parsed JSON output.
    pub async fn probe_video(&self, path: &Path) -> Result<FfprobeOutput, FfmpegError> {
        if !path.exists() {
            return Err(FfmpegError::VideoNotFound(path.display().to_string()));
        }
        let output = run(
            Command::new(&self.ffprobe)
                .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
                .arg(path),
        )
        .await?;
        parse_probe_output(&output)
    }

    /// Decode one frame of `video` as PNG bytes.
    pub async fn grab_frame_png(&self, video: &Path, index: FrameIndex) -> Result<Vec<u8>, FfmpegError> {
        if !video.exists() {
            return Err(FfmpegError::VideoNotFound(video.display().to_string()));
        }
        let png = run(Command::new(&self.ffmpeg).args(grab_frame_args(video, index))).await?;
        if png.is_empty() {
            return Err(FfmpegError::ExecutionFailed {
                exit_code: Some(0),
                stderr: format!("no frame {index} in {}", video.display()),
            });
        }
        Ok(png)
    }
}

/// Run a command to completion and return its stdout.
async fn run(command: &mut Command) -> Result<Vec<u8>, FfmpegError> {
    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;
    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

// ---------------------------------------------------------------------------
// Probe parsing
// ---------------------------------------------------------------------------

pub fn parse_probe_output(stdout: &[u8]) -> Result<FfprobeOutput, FfmpegError> {
    serde_json::from_slice(stdout).map_err(|e| {
        FfmpegError::ParseError(format!("{e}: {}", String::from_utf8_lossy(stdout)))
    })
}

fn first_video_stream(probe: &FfprobeOutput) -> Option<&FfprobeStream> {
    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
}

/// Parse a fraction string like `"30000/1001"`; plain numbers are accepted.
pub fn parse_fraction(s: &str) -> Option<f64> {
    let value = match s.split_once('/') {
        Some((num, den)) => {
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Frame count of the first video stream: `nb_frames` when reported,
/// otherwise estimated from duration and frame rate.
pub fn parse_total_frames(probe: &FfprobeOutput) -> Option<i64> {
    let stream = first_video_stream(probe)?;
    if let Some(n) = stream.nb_frames.as_deref().and_then(|n| n.parse::<i64>().ok()) {
        return Some(n);
    }
    let duration = stream
        .duration
        .as_deref()
        .or(probe.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())?;
    let fps = stream.r_frame_rate.as_deref().and_then(parse_fraction)?;
    (duration > 0.0 && fps > 0.0).then(|| (duration * fps).round() as i64)
}
