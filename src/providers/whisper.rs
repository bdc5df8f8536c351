use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::{Transcriber, Transcription, run_tool};
use crate::errors::ProviderError;
use crate::subtitle_processor::RawSegment;

/// Transcriber backed by the `whisper` command line tool
#[derive(Debug, Clone)]
pub struct WhisperCli {
    /// Binary to invoke
    binary: String,
    /// Model name (e.g. "turbo", "small")
    model: String,
    /// Spoken language hint; detected when absent
    language: Option<String>,
}

// Subset of whisper's JSON output
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    language: String,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

impl WhisperCli {
    pub fn new(binary: impl Into<String>, model: impl Into<String>) -> Self {
        WhisperCli {
            binary: binary.into(),
            model: model.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    // whisper names its output after the input stem
    fn output_file(output_dir: &Path, audio_path: &Path) -> Result<PathBuf, ProviderError> {
        let stem = audio_path
            .file_stem()
            .ok_or_else(|| ProviderError::MissingOutput(audio_path.to_path_buf()))?;
        Ok(output_dir.join(format!("{}.json", stem.to_string_lossy())))
    }
}

/// Parse whisper's `--output_format json` document
pub fn parse_whisper_json(json: &str) -> Result<Transcription, ProviderError> {
    let output: WhisperOutput = serde_json::from_str(json)
        .map_err(|e| ProviderError::ParseError(format!("Invalid whisper output: {}", e)))?;

    Ok(Transcription {
        language: output.language,
        segments: output.segments,
    })
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, ProviderError> {
        let output_dir = TempDir::new()
            .map_err(|e| ProviderError::RequestFailed(format!("Cannot create scratch dir: {}", e)))?;

        let mut args = vec![
            audio_path.as_os_str().to_os_string(),
            "--model".into(),
            self.model.clone().into(),
            "--output_format".into(),
            "json".into(),
            "--output_dir".into(),
            output_dir.path().as_os_str().to_os_string(),
        ];
        if let Some(language) = &self.language {
            args.push("--language".into());
            args.push(language.into());
        }

        info!("Transcribing {:?} with whisper model '{}'", audio_path, self.model);
        run_tool(&self.binary, &args).await?;

        let json_path = Self::output_file(output_dir.path(), audio_path)?;
        let json = tokio::fs::read_to_string(&json_path)
            .await
            .map_err(|_| ProviderError::MissingOutput(json_path.clone()))?;

        let transcription = parse_whisper_json(&json)?;
        debug!(
            "whisper returned {} segment(s), language '{}'",
            transcription.segments.len(),
            transcription.language
        );
        Ok(transcription)
    }
}
