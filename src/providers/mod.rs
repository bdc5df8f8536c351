/*!
 * External collaborators of the caption pipeline.
 *
 * Each collaborator is an opaque service behind a trait so the pipeline can
 * be driven by real tools or by test doubles:
 * - `whisper`: speech-to-text through the whisper CLI
 * - `demucs`: vocal separation through the demucs CLI
 * - `libretranslate`: batch translation over a LibreTranslate-compatible HTTP API
 * - `ffmpeg`: audio extraction, frame probing and overlay compositing
 */

use async_trait::async_trait;
use log::debug;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

use crate::errors::ProviderError;
use crate::render::{FrameSize, OverlayDescriptor};
use crate::subtitle_processor::RawSegment;

pub mod demucs;
pub mod ffmpeg;
pub mod libretranslate;
pub mod whisper;

/// Result of a transcription call
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Detected language tag
    pub language: String,
    /// Segments in the order the model produced them
    pub segments: Vec<RawSegment>,
}

/// Speech-to-text collaborator
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, ProviderError>;
}

/// Vocal separation collaborator
#[async_trait]
pub trait VocalSeparator: Send + Sync + Debug {
    /// Returns the path of the isolated vocals track
    async fn separate_vocals(&self, audio_path: &Path) -> Result<PathBuf, ProviderError>;
}

/// Batch translation collaborator.
///
/// Implementations must be index-preserving: the result has the same length
/// as `texts` and element `i` is the translation of `texts[i]`. Providers
/// that answer in another order have to be adapted before they are used here
/// (see [`ReversedBatch`]).
#[async_trait]
pub trait BatchTranslator: Send + Sync + Debug {
    async fn translate_batch(
        &self,
        source_language: &str,
        target_language: &str,
        texts: &[String],
    ) -> Result<Vec<String>, ProviderError>;
}

/// Audio extraction and frame probing
#[async_trait]
pub trait MediaExtractor: Send + Sync + Debug {
    /// Write the audio track of `video_path` to `audio_path`
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<(), ProviderError>;

    /// Dimensions of the first video stream
    async fn probe_frame_size(&self, video_path: &Path) -> Result<FrameSize, ProviderError>;
}

/// Burns overlays into a video
#[async_trait]
pub trait Compositor: Send + Sync + Debug {
    /// Paint `overlays` in order over `base_video` and write `output_path`
    async fn render(
        &self,
        base_video: &Path,
        overlays: &[OverlayDescriptor],
        output_path: &Path,
    ) -> Result<PathBuf, ProviderError>;
}

/// Adapts a provider that returns its batch in reverse submission order to the
/// index-preserving [`BatchTranslator`] contract.
#[derive(Debug)]
pub struct ReversedBatch<T> {
    inner: T,
}

impl<T> ReversedBatch<T> {
    pub fn new(inner: T) -> Self {
        ReversedBatch { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: BatchTranslator> BatchTranslator for ReversedBatch<T> {
    async fn translate_batch(
        &self,
        source_language: &str,
        target_language: &str,
        texts: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let mut translated = self
            .inner
            .translate_batch(source_language, target_language, texts)
            .await?;
        translated.reverse();
        Ok(translated)
    }
}

/// Run an external tool to completion, mapping launch failures and non-zero
/// exits to [`ProviderError`].
pub(crate) async fn run_tool<I, S>(program: &str, args: I) -> Result<Output, ProviderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    debug!("Running {:?}", command.as_std());

    let output = command.output().await.map_err(|e| ProviderError::ToolNotFound {
        tool: program.to_string(),
        message: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::ProcessFailed {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: tail_lines(&stderr, 8),
        });
    }

    Ok(output)
}

// Last `count` non-empty lines; tool banners and progress bars come first
fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return "no output on stderr".to_string();
    }
    lines[lines.len().saturating_sub(count)..].join("\n")
}
