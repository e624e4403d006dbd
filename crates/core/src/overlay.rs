//! Drawing annotation boxes onto decoded frames for visual spot-checks.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use rand::seq::index::sample;
use rand::Rng;

use crate::error::CoreError;
use crate::schema::{DetectionBox, FrameAnnotation};
use crate::types::FrameIndex;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const BOX_THICKNESS: u32 = 2;
pub const JPEG_QUALITY: u8 = 90;

/// Pick `count` distinct frame indices in `[0, total_frames)`, sorted.
/// Fewer are returned when the video is shorter than `count`.
pub fn sample_frame_indices<R: Rng + ?Sized>(
    rng: &mut R,
    total_frames: i64,
    count: usize,
) -> Vec<FrameIndex> {
    let Ok(total) = usize::try_from(total_frames) else {
        return Vec::new();
    };
    let amount = count.min(total);
    let mut picked: Vec<FrameIndex> = sample(rng, total, amount)
        .into_iter()
        .map(|i| i as FrameIndex)
        .collect();
    picked.sort_unstable();
    picked
}

/// Outline `detection` on `image`, clipped to the image bounds.
pub fn draw_box_outline(image: &mut RgbImage, detection: &DetectionBox, color: Rgb<u8>, thickness: u32) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    if detection.x >= f64::from(width)
        || detection.y >= f64::from(height)
        || detection.right() < 0.0
        || detection.bottom() < 0.0
    {
        return;
    }
    let clamp_x = |v: f64| v.floor().clamp(0.0, f64::from(width - 1)) as u32;
    let clamp_y = |v: f64| v.floor().clamp(0.0, f64::from(height - 1)) as u32;
    let (x0, y0) = (clamp_x(detection.x), clamp_y(detection.y));
    let (x1, y1) = (clamp_x(detection.right()), clamp_y(detection.bottom()));

    for t in 0..thickness {
        let (left, top) = (x0 + t, y0 + t);
        let (right, bottom) = (x1.saturating_sub(t), y1.saturating_sub(t));
        if left > right || top > bottom {
            break;
        }
        for x in left..=right {
            image.put_pixel(x, top, color);
            image.put_pixel(x, bottom, color);
        }
        for y in top..=bottom {
            image.put_pixel(left, y, color);
            image.put_pixel(right, y, color);
        }
    }
}

/// Decode a PNG frame and draw every box of `frame` onto it.
pub fn render_frame_overlay(png: &[u8], frame: Option<&FrameAnnotation>) -> Result<RgbImage, CoreError> {
    let mut image = image::load_from_memory(png)
        .map_err(|e| CoreError::Validation(format!("undecodable frame image: {e}")))?
        .to_rgb8();
    if let Some(frame) = frame {
        for detection in &frame.bbox {
            draw_box_outline(&mut image, detection, BOX_COLOR, BOX_THICKNESS);
        }
    }
    Ok(image)
}

pub fn save_jpeg(image: &RgbImage, path: &Path) -> Result<(), CoreError> {
    let file = File::create(path).map_err(|e| CoreError::io(path, e))?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
    image
        .write_with_encoder(encoder)
        .map_err(|e| CoreError::Internal(format!("{}: JPEG encoding failed: {e}", path.display())))
}

/// Output name for a sampled frame: `{annotation_stem}_frame_{index:04}.jpg`.
pub fn overlay_file_name(annotation_stem: &str, index: FrameIndex) -> String {
    format!("{annotation_stem}_frame_{index:04}.jpg")
}
