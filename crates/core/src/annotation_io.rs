//! Loading and saving video annotation files.
//!
//! Files are pretty-printed JSON with 4-space indentation. Field order
//! follows the struct definitions and action types are written as their log
//! codes, so saving the same annotation twice produces identical bytes.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;
use crate::schema::VideoAnnotation;

/// Parse and validate an annotation file.
///
/// A missing or unreadable file is `CoreError::Io`; malformed JSON or a
/// schema violation is `CoreError::Validation`.
pub fn load_video_annotation(path: &Path) -> Result<VideoAnnotation, CoreError> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    let annotation: VideoAnnotation = serde_json::from_slice(&bytes).map_err(|e| {
        CoreError::Validation(format!("{}: malformed annotation: {e}", path.display()))
    })?;
    annotation
        .validate()
        .map_err(|e| match e {
            CoreError::Validation(msg) => {
                CoreError::Validation(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
    Ok(annotation)
}

/// Serialize an annotation to its canonical JSON text.
pub fn to_json_string(annotation: &VideoAnnotation) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    annotation.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| CoreError::Internal(format!("non-UTF-8 JSON output: {e}")))
}

/// Validate and write an annotation, replacing any existing file.
///
/// The parent directory must already exist.
pub fn save_video_annotation(annotation: &VideoAnnotation, path: &Path) -> Result<(), CoreError> {
    annotation.validate()?;
    let json = to_json_string(annotation)?;
    let mut file = fs::File::create(path).map_err(|e| CoreError::io(path, e))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|e| CoreError::io(path, e))?;
    tracing::debug!(path = %path.display(), frames = annotation.frames.len(), "Saved annotation");
    Ok(())
}
