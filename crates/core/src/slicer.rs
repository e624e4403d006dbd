//! Cutting a video-level annotation down to one clip.
//!
//! A clip window ends at `start_second` and reaches back `duration` seconds.
//! Frames inside the half-open window `[start_frame, end_frame)` are copied
//! and renumbered so the clip's frame ids are relative to `start_frame`.

use crate::error::CoreError;
use crate::schema::{ActionType, VideoAnnotation};
use crate::threshold_validation::validate_non_negative;
use crate::types::FrameIndex;

/// Time window of a clip, in seconds of source video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    /// End of the window (exclusive).
    pub start_second: f64,
    /// Length of the window, counted backwards from `start_second`.
    pub duration: f64,
    pub fps: f64,
}

impl ClipWindow {
    pub fn new(start_second: f64, duration: f64, fps: f64) -> Result<Self, CoreError> {
        let window = Self {
            start_second,
            duration,
            fps,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_non_negative(self.start_second, "start_second")?;
        validate_non_negative(self.duration, "duration")?;
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(CoreError::Validation(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        Ok(())
    }

    /// First frame of the window. May be negative; it is never clamped.
    pub fn start_frame(&self) -> FrameIndex {
        ((self.start_second - self.duration) * self.fps).floor() as FrameIndex
    }

    /// First frame after the window.
    pub fn end_frame(&self) -> FrameIndex {
        (self.start_second * self.fps).floor() as FrameIndex
    }

    pub fn contains(&self, frame: FrameIndex) -> bool {
        (self.start_frame()..self.end_frame()).contains(&frame)
    }

    /// Seek offset for the transcoder: window start in seconds, not before 0.
    pub fn seek_offset(&self) -> f64 {
        (self.start_second - self.duration).max(0.0)
    }
}

/// Naming inputs for the clip annotation produced by [`slice_video_annotation`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClipIdentity {
    pub event_id: i64,
    pub action: ActionType,
    pub actor_name: String,
    /// Reference to the clip's video file.
    pub video_path: String,
}

impl ClipIdentity {
    /// Caption of the form `"Turnover by Kyrie Irving"`.
    pub fn caption(&self) -> String {
        format!("{} by {}", self.action, self.actor_name)
    }
}

/// Clip video id: the source id's digits followed by the event id's digits.
pub fn clip_video_id(source_video_id: i64, event_id: i64) -> Result<i64, CoreError> {
    let joined = format!("{source_video_id}{event_id}");
    joined.parse::<i64>().map_err(|_| {
        CoreError::Validation(format!(
            "clip id {joined} (video {source_video_id}, event {event_id}) is not a valid 64-bit id"
        ))
    })
}

/// Produce the clip annotation for `window` without touching `source`.
///
/// An empty window yields a clip with no frames. The returned annotation has
/// no action attached; the caller decides what event it belongs to.
pub fn slice_video_annotation(
    source: &VideoAnnotation,
    window: &ClipWindow,
    identity: &ClipIdentity,
) -> Result<VideoAnnotation, CoreError> {
    window.validate()?;
    let start_frame = window.start_frame();
    let end_frame = window.end_frame();

    let frames = source
        .frames
        .iter()
        .filter(|f| (start_frame..end_frame).contains(&f.frame_id))
        .map(|f| {
            let mut frame = f.clone();
            frame.rebase(start_frame);
            frame
        })
        .collect::<Vec<_>>();

    tracing::trace!(
        source_video_id = source.video_id,
        start_frame,
        end_frame,
        kept = frames.len(),
        "Sliced clip window",
    );

    Ok(VideoAnnotation {
        video_id: clip_video_id(source.video_id, identity.event_id)?,
        video_path: identity.video_path.clone(),
        frames,
        caption: Some(identity.caption()),
        action: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DetectionBox, FrameAnnotation};

    fn video_with_frames(ids: impl IntoIterator<Item = FrameIndex>) -> VideoAnnotation {
        let frames = ids
            .into_iter()
            .map(|id| {
                let mut frame = FrameAnnotation::new(id);
                frame.bbox.push(DetectionBox {
                    frame_number: id,
                    player_id: 7,
                    x: 5.0,
                    y: 5.0,
                    width: 10.0,
                    height: 10.0,
                    confidence: 0.9,
                    keypoints: None,
                });
                frame
            })
            .collect();
        VideoAnnotation {
            video_id: 17601,
            video_path: "game.mp4".into(),
            frames,
            caption: None,
            action: None,
        }
    }

    fn identity() -> ClipIdentity {
        ClipIdentity {
            event_id: 42,
            action: ActionType::Steal,
            actor_name: "Kyle Lowry".into(),
            video_path: "17601_period1_Steal_42.mp4".into(),
        }
    }

    // -- ClipWindow -----------------------------------------------------------

    #[test]
    fn window_frames_floor() {
        let w = ClipWindow::new(13.5, 10.0, 30.0).unwrap();
        assert_eq!(w.start_frame(), 105);
        assert_eq!(w.end_frame(), 405);
        let w = ClipWindow::new(3.5, 10.0, 30.0).unwrap();
        assert_eq!(w.start_frame(), -195);
        assert_eq!(w.seek_offset(), 0.0);
    }

    #[test]
    fn window_rejects_negative_inputs() {
        assert!(ClipWindow::new(-1.0, 10.0, 30.0).is_err());
        assert!(ClipWindow::new(1.0, -10.0, 30.0).is_err());
        assert!(ClipWindow::new(1.0, 10.0, 0.0).is_err());
    }

    // -- slice_video_annotation -----------------------------------------------

    #[test]
    fn window_is_half_open() {
        // start_frame = 10, end_frame = 20
        let window = ClipWindow::new(2.0, 1.0, 10.0).unwrap();
        let clip = slice_video_annotation(&video_with_frames([9, 10, 19, 20]), &window, &identity())
            .unwrap();
        let ids: Vec<_> = clip.frames.iter().map(|f| f.frame_id).collect();
        assert_eq!(ids, vec![0, 9]);
    }

    #[test]
    fn rebases_every_owned_index() {
        let window = ClipWindow::new(2.0, 1.0, 10.0).unwrap();
        let clip =
            slice_video_annotation(&video_with_frames(12..15), &window, &identity()).unwrap();
        for (frame, source_id) in clip.frames.iter().zip(12..15) {
            assert_eq!(frame.frame_id, source_id - 10);
            assert_eq!(frame.bbox[0].frame_number, source_id - 10);
        }
    }

    #[test]
    fn empty_window_gives_empty_clip() {
        let window = ClipWindow::new(100.0, 1.0, 30.0).unwrap();
        let clip = slice_video_annotation(&video_with_frames(0..5), &window, &identity()).unwrap();
        assert!(clip.frames.is_empty());
        assert_eq!(clip.caption.as_deref(), Some("Steal by Kyle Lowry"));
    }

    #[test]
    fn source_is_untouched() {
        let source = video_with_frames(12..15);
        let before = source.clone();
        let window = ClipWindow::new(2.0, 1.0, 10.0).unwrap();
        slice_video_annotation(&source, &window, &identity()).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn clip_identity_fields() {
        let window = ClipWindow::new(2.0, 1.0, 10.0).unwrap();
        let clip = slice_video_annotation(&video_with_frames(Vec::new()), &window, &identity()).unwrap();
        assert_eq!(clip.video_id, 1760142);
        assert_eq!(clip.video_path, "17601_period1_Steal_42.mp4");
        assert!(clip.action.is_none());
    }

    #[test]
    fn clip_id_overflow_rejected() {
        assert!(clip_video_id(9_223_372_036, 854_775_808_000).is_err());
        assert_eq!(clip_video_id(17601, 77129201).unwrap(), 1760177129201);
    }
}
