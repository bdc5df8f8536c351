use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::{Compositor, MediaExtractor, run_tool};
use crate::errors::ProviderError;
use crate::render::{Anchor, FrameSize, OverlayDescriptor, wrap_text};

/// Text appearance for burned-in captions
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Fontconfig family name
    pub font: String,
    pub font_size: u32,
    pub font_color: String,
    /// Gap between the caption and the frame edge, in pixels
    pub margin: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            font: "Courier".to_string(),
            font_size: 24,
            font_color: "white".to_string(),
            margin: 10,
        }
    }
}

/// ffmpeg/ffprobe backed media extraction and compositing
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg_binary: String,
    ffprobe_binary: String,
    video_codec: String,
    style: OverlayStyle,
}

impl Ffmpeg {
    pub fn new(
        ffmpeg_binary: impl Into<String>,
        ffprobe_binary: impl Into<String>,
        video_codec: impl Into<String>,
        style: OverlayStyle,
    ) -> Self {
        Ffmpeg {
            ffmpeg_binary: ffmpeg_binary.into(),
            ffprobe_binary: ffprobe_binary.into(),
            video_codec: video_codec.into(),
            style,
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }
}

/// Escape a value for use inside a quoted filter option
pub fn escape_filter_value(value: &str) -> String {
    let normalized = value.replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 12);
    for ch in normalized.chars() {
        match ch {
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("\\'"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '[' => escaped.push_str("\\["),
            ']' => escaped.push_str("\\]"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// (x, y) drawtext expressions for an anchor
fn anchor_position(anchor: Anchor, margin: u32) -> (String, String) {
    match anchor {
        Anchor::BottomCenter => ("(w-text_w)/2".to_string(), format!("h-text_h-{}", margin)),
    }
}

/// Build the drawtext filter for one overlay whose text lives in `text_file`
pub fn drawtext_filter(overlay: &OverlayDescriptor, text_file: &Path, style: &OverlayStyle) -> String {
    let (x, y) = anchor_position(overlay.anchor, style.margin);
    format!(
        "drawtext=font='{}':textfile='{}':expansion=none:fontsize={}:fontcolor={}:x={}:y={}:enable='between(t,{:.3},{:.3})'",
        escape_filter_value(&style.font),
        escape_filter_value(&text_file.to_string_lossy()),
        style.font_size,
        style.font_color,
        x,
        y,
        overlay.start_time,
        overlay.end_time(),
    )
}

/// Read the first stream's size from `ffprobe -of json` output
pub fn parse_probe_output(json: &str) -> Result<FrameSize, ProviderError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ProviderError::ParseError(format!("Invalid ffprobe output: {}", e)))?;

    let stream = value
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| streams.first())
        .ok_or_else(|| ProviderError::ParseError("ffprobe found no video stream".to_string()))?;

    let dimension = |key: &str| {
        stream
            .get(key)
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ProviderError::ParseError(format!("ffprobe output has no {}", key)))
    };

    Ok(FrameSize::new(dimension("width")?, dimension("height")?))
}

#[async_trait]
impl MediaExtractor for Ffmpeg {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<(), ProviderError> {
        if let Some(parent) = audio_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProviderError::RequestFailed(format!("Cannot create {:?}: {}", parent, e)))?;
        }

        info!("Extracting audio from {:?}", video_path);
        run_tool(
            &self.ffmpeg_binary,
            [
                OsStr::new("-y"),
                OsStr::new("-i"),
                video_path.as_os_str(),
                OsStr::new("-vn"),
                audio_path.as_os_str(),
            ],
        )
        .await?;

        if !audio_path.is_file() {
            return Err(ProviderError::MissingOutput(audio_path.to_path_buf()));
        }
        Ok(())
    }

    async fn probe_frame_size(&self, video_path: &Path) -> Result<FrameSize, ProviderError> {
        let output = run_tool(
            &self.ffprobe_binary,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-select_streams"),
                OsStr::new("v:0"),
                OsStr::new("-show_entries"),
                OsStr::new("stream=width,height"),
                OsStr::new("-of"),
                OsStr::new("json"),
                video_path.as_os_str(),
            ],
        )
        .await?;

        let frame = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!("Frame size of {:?}: {}x{}", video_path, frame.width, frame.height);
        Ok(frame)
    }
}

#[async_trait]
impl Compositor for Ffmpeg {
    async fn render(
        &self,
        base_video: &Path,
        overlays: &[OverlayDescriptor],
        output_path: &Path,
    ) -> Result<PathBuf, ProviderError> {
        let scratch = TempDir::new()
            .map_err(|e| ProviderError::RequestFailed(format!("Cannot create scratch dir: {}", e)))?;
        let write_err = |path: &Path, e: std::io::Error| {
            ProviderError::RequestFailed(format!("Cannot write {:?}: {}", path, e))
        };

        let mut filters = Vec::with_capacity(overlays.len());
        for overlay in overlays {
            let text_file = scratch.path().join(format!("caption_{:05}.txt", overlay.index));
            let line_width = overlay.wrap_width.saturating_sub(2 * self.style.margin).max(1);
            let text = wrap_text(&overlay.text, line_width, self.style.font_size);
            tokio::fs::write(&text_file, text)
                .await
                .map_err(|e| write_err(&text_file, e))?;
            filters.push(drawtext_filter(overlay, &text_file, &self.style));
        }

        let mut args = vec![OsString::from("-y"), OsString::from("-i"), base_video.as_os_str().to_os_string()];
        if !filters.is_empty() {
            let script = scratch.path().join("filters.txt");
            tokio::fs::write(&script, filters.join(",\n"))
                .await
                .map_err(|e| write_err(&script, e))?;
            args.push(OsString::from("-filter_script:v"));
            args.push(script.into_os_string());
        }
        args.extend([
            OsString::from("-c:v"),
            OsString::from(&self.video_codec),
            OsString::from("-c:a"),
            OsString::from("copy"),
            output_path.as_os_str().to_os_string(),
        ]);

        info!("Compositing {} overlay(s) onto {:?}", overlays.len(), base_video);
        run_tool(&self.ffmpeg_binary, &args).await?;

        if !output_path.is_file() {
            return Err(ProviderError::MissingOutput(output_path.to_path_buf()));
        }
        Ok(output_path.to_path_buf())
    }
}
