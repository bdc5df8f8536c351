/*!
 * # capsync - burned-in, optionally translated captions for spoken video
 *
 * A Rust library that turns the speech in a video into a time-synchronized
 * SRT caption track and burns it into the picture.
 *
 * ## Features
 *
 * - Transcribe speech with whisper, optionally after isolating vocals with demucs
 * - Build, write and strictly re-parse SRT caption tracks
 * - Translate captions through a batch translation service while keeping every
 *   caption's timing and index
 * - Burn captions into the video at the bottom center with ffmpeg
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: `HH:MM:SS,mmm` formatting and parsing
 * - `subtitle_processor`: caption track model, SRT writer and parser
 * - `translation`: translation alignment for caption tracks
 * - `render`: caption track to overlay descriptor mapping
 * - `pipeline`: sequential run over an immutable pipeline context
 * - `providers`: external collaborators (whisper, demucs, LibreTranslate, ffmpeg)
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod render;
pub mod subtitle_processor;
pub mod timecode;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AlignmentError, AppError, ProviderError, RenderError, SubtitleError, TimecodeError};
pub use pipeline::{CaptionPipeline, Collaborators, PipelineContext};
pub use render::{Anchor, FrameSize, OverlayDescriptor, to_overlays};
pub use subtitle_processor::{CaptionEntry, CaptionTrack, RawSegment, TimeSpan};
pub use translation::TranslationAligner;
