/*!
 * Mapping of caption tracks to timed overlay descriptors.
 *
 * The compositor receives one descriptor per caption entry, in index order.
 * Index order is paint order: overlapping captions are not stacked or
 * merged, the later entry is simply drawn on top at the same anchor.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::RenderError;
use crate::subtitle_processor::CaptionTrack;

/// Video frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        FrameSize { width, height }
    }
}

/// Where an overlay is pinned on the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    BottomCenter,
}

/// One timed, positioned caption for the compositor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayDescriptor {
    /// Caption index the overlay was made from
    pub index: usize,
    pub text: String,
    pub anchor: Anchor,
    /// Seconds from the start of the video
    pub start_time: f64,
    /// Seconds the overlay stays visible, always > 0
    pub duration: f64,
    /// Maximum line width in pixels
    pub wrap_width: u32,
}

impl OverlayDescriptor {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Map every entry of `track` to an overlay sized for `frame`.
///
/// Fails on the first entry whose duration is zero or negative; no entry is
/// dropped or clamped.
pub fn to_overlays(track: &CaptionTrack, frame: FrameSize) -> Result<Vec<OverlayDescriptor>, RenderError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(RenderError::InvalidFrameSize {
            width: frame.width,
            height: frame.height,
        });
    }

    let overlays = track
        .entries()
        .iter()
        .map(|entry| {
            let duration = entry.span.duration();
            if duration.is_nan() || duration <= 0.0 {
                return Err(RenderError::DegenerateSpan {
                    index: entry.index,
                    start: entry.span.start(),
                    end: entry.span.end(),
                });
            }
            Ok(OverlayDescriptor {
                index: entry.index,
                text: entry.text.clone(),
                anchor: Anchor::BottomCenter,
                start_time: entry.span.start(),
                duration,
                wrap_width: frame.width,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Mapped {} caption(s) to overlays for a {}x{} frame",
        overlays.len(),
        frame.width,
        frame.height
    );

    Ok(overlays)
}

/// Greedy word wrap so that each line fits `wrap_width` pixels.
///
/// Glyph width is approximated as 0.6 of the font size, which holds for
/// monospaced fonts and overestimates slightly for proportional ones. Words
/// longer than a full line are left unbroken. Existing line breaks are kept.
pub fn wrap_text(text: &str, wrap_width: u32, font_size: u32) -> String {
    let glyph_width = (f64::from(font_size) * 0.6).max(1.0);
    let max_chars = ((f64::from(wrap_width) / glyph_width).floor() as usize).max(1);

    let mut wrapped = Vec::new();
    for line in text.lines() {
        let mut current = String::new();
        for word in line.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        wrapped.push(current);
    }

    wrapped.join("\n")
}
