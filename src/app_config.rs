use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::providers::ffmpeg::OverlayStyle;

/// Application configuration module
/// This module handles loading, validating and saving the pipeline settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory for extracted audio
    #[serde(default = "default_input_directory")]
    pub input_directory: PathBuf,

    /// Directory for subtitle files and captioned videos
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Isolate vocals before transcription
    #[serde(default)]
    pub separate_vocals: bool,

    /// Target language tag; captions stay in the spoken language when absent
    #[serde(default)]
    pub translate_to: Option<String>,

    /// What to do when the translation stage fails
    #[serde(default)]
    pub translation_failure: TranslationFailurePolicy,

    /// Speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Vocal separation settings
    #[serde(default)]
    pub separation: SeparationConfig,

    /// Translation service settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Caption rendering and encoding settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Behaviour when translation fails or returns a mismatched batch
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationFailurePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log the failure and burn in the untranslated captions
    KeepOriginal,
}

/// Speech-to-text configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// whisper executable
    #[serde(default = "default_whisper_binary")]
    pub binary: String,

    /// Model name (e.g. "turbo", "small", "large-v3")
    #[serde(default = "default_whisper_model")]
    pub model: String,

    /// Spoken language hint; detected when absent
    #[serde(default)]
    pub language: Option<String>,

    /// Deadline for one transcription call
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            binary: default_whisper_binary(),
            model: default_whisper_model(),
            language: None,
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

/// Vocal separation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeparationConfig {
    /// demucs executable
    #[serde(default = "default_demucs_binary")]
    pub binary: String,

    /// demucs model name
    #[serde(default = "default_demucs_model")]
    pub model: String,

    /// Root directory demucs writes stems into
    #[serde(default = "default_separated_directory")]
    pub output_directory: PathBuf,

    /// Deadline for one separation call
    #[serde(default = "default_separation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            binary: default_demucs_binary(),
            model: default_demucs_model(),
            output_directory: default_separated_directory(),
            timeout_secs: default_separation_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Root URL of a LibreTranslate-compatible server
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    /// API key, if the server requires one
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_translation_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum captions per HTTP request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translation_endpoint(),
            api_key: String::new(),
            timeout_secs: default_translation_timeout_secs(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Caption rendering and encoding configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Fontconfig family name
    #[serde(default = "default_font")]
    pub font: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Distance between captions and the bottom edge, in pixels
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: u32,

    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,

    #[serde(default = "default_ffprobe_binary")]
    pub ffprobe_binary: String,

    /// Encoder for the captioned video
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Container extension for extracted audio
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Deadline for one ffmpeg call
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font: default_font(),
            font_size: default_font_size(),
            font_color: default_font_color(),
            bottom_margin: default_bottom_margin(),
            ffmpeg_binary: default_ffmpeg_binary(),
            ffprobe_binary: default_ffprobe_binary(),
            video_codec: default_video_codec(),
            audio_format: default_audio_format(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

impl RenderConfig {
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            font: self.font.clone(),
            font_size: self.font_size,
            font_color: self.font_color.clone(),
            margin: self.bottom_margin,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_input_directory() -> PathBuf {
    PathBuf::from("audio")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("subtitles")
}

fn default_whisper_binary() -> String {
    "whisper".to_string()
}

fn default_whisper_model() -> String {
    "turbo".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    3600
}

fn default_demucs_binary() -> String {
    "demucs".to_string()
}

fn default_demucs_model() -> String {
    "mdx_extra".to_string()
}

fn default_separated_directory() -> PathBuf {
    PathBuf::from("separated")
}

fn default_separation_timeout_secs() -> u64 {
    1800
}

fn default_translation_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_translation_timeout_secs() -> u64 {
    30
}

fn default_max_batch_size() -> usize {
    50
}

fn default_font() -> String {
    "Courier".to_string()
}

fn default_font_size() -> u32 {
    24
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_bottom_margin() -> u32 {
    10
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_binary() -> String {
    "ffprobe".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_render_timeout_secs() -> u64 {
    3600
}

impl Config {
    /// Load a configuration file, or write the defaults there when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            log::warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if let Some(target) = &self.translate_to {
            crate::language_utils::validate_language_tag(target)
                .context("Invalid translation target language")?;
        }
        if let Some(spoken) = &self.transcription.language {
            crate::language_utils::validate_language_tag(spoken)
                .context("Invalid transcription language hint")?;
        }

        if self.render.font_size == 0 {
            return Err(anyhow!("Font size must be greater than zero"));
        }
        if self.render.font.trim().is_empty() {
            return Err(anyhow!("Font name must not be empty"));
        }
        if self.render.audio_format.trim().is_empty() {
            return Err(anyhow!("Audio format must not be empty"));
        }
        if self.translation.max_batch_size == 0 {
            return Err(anyhow!("Translation batch size must be greater than zero"));
        }

        let timeouts = [
            ("transcription", self.transcription.timeout_secs),
            ("separation", self.separation.timeout_secs),
            ("translation", self.translation.timeout_secs),
            ("render", self.render.timeout_secs),
        ];
        if let Some((stage, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(anyhow!("Timeout for {} must be greater than zero", stage));
        }

        if self.translate_to.is_some() {
            Url::parse(&self.translation.endpoint)
                .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            input_directory: default_input_directory(),
            output_directory: default_output_directory(),
            separate_vocals: false,
            translate_to: None,
            translation_failure: TranslationFailurePolicy::default(),
            transcription: TranscriptionConfig::default(),
            separation: SeparationConfig::default(),
            translation: TranslationConfig::default(),
            render: RenderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
