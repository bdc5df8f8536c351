/*!
 * Sequential caption pipeline.
 *
 * A run moves one `PipelineContext` value through the stages
 * extract audio -> (separate vocals) -> transcribe -> write captions ->
 * (translate) -> composite. Each stage reads the context it is given and
 * returns a new one; nothing is shared between runs except the files they
 * write, which are named after the video and language.
 *
 * Every collaborator call runs under a deadline taken from the
 * configuration, since the collaborators themselves define none.
 */

use log::{debug, info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::{Config, TranslationFailurePolicy};
use crate::errors::{AppError, SubtitleError};
use crate::file_utils::FileManager;
use crate::language_utils::{get_language_name, language_codes_match};
use crate::providers::{BatchTranslator, Compositor, MediaExtractor, Transcriber, VocalSeparator};
use crate::render::{self, FrameSize};
use crate::subtitle_processor::{CaptionTrack, RawSegment};
use crate::translation::TranslationAligner;

/// State of one pipeline run, replaced (never mutated) by every stage
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    /// Identifies the run in logs and scratch files
    pub run_id: Uuid,
    pub video_path: PathBuf,
    /// Video file name up to its first dot
    pub base_name: String,
    /// Language of the current captions
    pub language: Option<String>,
    pub frame_size: Option<FrameSize>,
    /// Audio the transcriber will hear
    pub audio_path: Option<PathBuf>,
    /// Current subtitle file
    pub subtitle_path: Option<PathBuf>,
    /// Captioned video, once composited
    pub output_path: Option<PathBuf>,
}

impl PipelineContext {
    pub fn new<P: AsRef<Path>>(video_path: P) -> Result<Self, AppError> {
        let video_path = video_path.as_ref();
        Ok(PipelineContext {
            run_id: Uuid::new_v4(),
            video_path: video_path.to_path_buf(),
            base_name: FileManager::base_name(video_path)?,
            language: None,
            frame_size: None,
            audio_path: None,
            subtitle_path: None,
            output_path: None,
        })
    }

    pub fn with_audio(&self, audio_path: PathBuf, frame_size: FrameSize) -> Self {
        PipelineContext {
            audio_path: Some(audio_path),
            frame_size: Some(frame_size),
            ..self.clone()
        }
    }

    pub fn with_vocals(&self, vocals_path: PathBuf) -> Self {
        PipelineContext {
            audio_path: Some(vocals_path),
            ..self.clone()
        }
    }

    pub fn with_captions(&self, language: &str, subtitle_path: PathBuf) -> Self {
        PipelineContext {
            language: Some(language.to_string()),
            subtitle_path: Some(subtitle_path),
            ..self.clone()
        }
    }

    pub fn with_output(&self, output_path: PathBuf) -> Self {
        PipelineContext {
            output_path: Some(output_path),
            ..self.clone()
        }
    }

    fn require<'a, T>(&self, value: &'a Option<T>, what: &str) -> Result<&'a T, AppError> {
        value
            .as_ref()
            .ok_or_else(|| AppError::Config(format!("Run {}: {} is not available yet", self.run_id, what)))
    }
}

/// The external services a pipeline run talks to
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub media: Arc<dyn MediaExtractor>,
    pub separator: Arc<dyn VocalSeparator>,
    pub transcriber: Arc<dyn Transcriber>,
    pub translator: Arc<dyn BatchTranslator>,
    pub compositor: Arc<dyn Compositor>,
}

// Run a collaborator call under a deadline
async fn with_deadline<F: Future>(stage: &'static str, secs: u64, future: F) -> Result<F::Output, AppError> {
    tokio::time::timeout(Duration::from_secs(secs), future)
        .await
        .map_err(|_| AppError::Timeout { stage, secs })
}

/// Video-to-captioned-video pipeline
#[derive(Debug, Clone)]
pub struct CaptionPipeline {
    config: Config,
    collaborators: Collaborators,
}

impl CaptionPipeline {
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        CaptionPipeline { config, collaborators }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage for one video and return the final context
    pub async fn run<P: AsRef<Path>>(&self, video_path: P) -> Result<PipelineContext, AppError> {
        let video_path = video_path.as_ref();
        if !FileManager::file_exists(video_path) {
            return Err(AppError::File(format!("Input video does not exist: {:?}", video_path)));
        }
        FileManager::ensure_dir(&self.config.input_directory)?;
        FileManager::ensure_dir(&self.config.output_directory)?;

        let ctx = PipelineContext::new(video_path)?;
        info!("Run {}: captioning {:?}", ctx.run_id, video_path);

        let ctx = self.extract_audio(&ctx).await?;
        let ctx = if self.config.separate_vocals {
            self.separate_vocals(&ctx).await?
        } else {
            ctx
        };
        let (ctx, segments) = self.transcribe(&ctx).await?;
        let ctx = self.write_captions(&ctx, &segments)?;

        let ctx = match &self.config.translate_to {
            Some(target) if ctx.language.as_deref().is_some_and(|spoken| language_codes_match(spoken, target)) => {
                info!("Run {}: captions are already in '{}', skipping translation", ctx.run_id, target);
                ctx
            }
            Some(target) => match self.translate(&ctx, target).await {
                Ok(translated) => translated,
                Err(e) if self.config.translation_failure == TranslationFailurePolicy::KeepOriginal => {
                    warn!("Run {}: translation failed, keeping original captions: {}", ctx.run_id, e);
                    ctx
                }
                Err(e) => return Err(e),
            },
            None => ctx,
        };

        let ctx = self.composite(&ctx).await?;
        info!("Run {}: wrote {:?}", ctx.run_id, ctx.output_path.as_deref().unwrap_or(Path::new("")));
        Ok(ctx)
    }

    /// Extract the audio track and probe the frame size
    pub async fn extract_audio(&self, ctx: &PipelineContext) -> Result<PipelineContext, AppError> {
        let audio_path = self
            .config
            .input_directory
            .join(format!("{}.{}", ctx.base_name, self.config.render.audio_format));
        let secs = self.config.render.timeout_secs;

        with_deadline("audio extraction", secs, self.collaborators.media.extract_audio(&ctx.video_path, &audio_path))
            .await?
            .map_err(AppError::AudioExtraction)?;
        let frame = with_deadline("frame probe", secs, self.collaborators.media.probe_frame_size(&ctx.video_path))
            .await?
            .map_err(AppError::AudioExtraction)?;

        debug!("Run {}: audio at {:?}, frame {}x{}", ctx.run_id, audio_path, frame.width, frame.height);
        Ok(ctx.with_audio(audio_path, frame))
    }

    /// Replace the audio with its isolated vocals
    pub async fn separate_vocals(&self, ctx: &PipelineContext) -> Result<PipelineContext, AppError> {
        let audio_path = ctx.require(&ctx.audio_path, "audio")?;
        let vocals = with_deadline(
            "vocal separation",
            self.config.separation.timeout_secs,
            self.collaborators.separator.separate_vocals(audio_path),
        )
        .await?
        .map_err(AppError::Separation)?;

        debug!("Run {}: vocals at {:?}", ctx.run_id, vocals);
        Ok(ctx.with_vocals(vocals))
    }

    /// Transcribe the current audio; the context picks up the detected language
    pub async fn transcribe(&self, ctx: &PipelineContext) -> Result<(PipelineContext, Vec<RawSegment>), AppError> {
        let audio_path = ctx.require(&ctx.audio_path, "audio")?;
        let transcription = with_deadline(
            "transcription",
            self.config.transcription.timeout_secs,
            self.collaborators.transcriber.transcribe(audio_path),
        )
        .await?
        .map_err(AppError::Transcription)?;

        info!(
            "Run {}: transcribed {} segment(s), language '{}'",
            ctx.run_id,
            transcription.segments.len(),
            transcription.language
        );
        let ctx = PipelineContext {
            language: Some(transcription.language),
            ..ctx.clone()
        };
        Ok((ctx, transcription.segments))
    }

    /// Build the caption track and write `{base}.{lang}.srt`
    pub fn write_captions(&self, ctx: &PipelineContext, segments: &[RawSegment]) -> Result<PipelineContext, AppError> {
        let language = ctx.require(&ctx.language, "language")?;
        let track = CaptionTrack::build(segments, language)?;

        let path = FileManager::subtitle_path(&self.config.output_directory, &ctx.base_name, language);
        track.write_to_file(&path)?;

        info!("Run {}: wrote {} caption(s) to {:?}", ctx.run_id, track.len(), path);
        Ok(ctx.with_captions(language, path))
    }

    /// Translate the current subtitle file into `target_language`
    pub async fn translate(&self, ctx: &PipelineContext, target_language: &str) -> Result<PipelineContext, AppError> {
        let source_path = ctx.require(&ctx.subtitle_path, "subtitle file")?;
        let source_language = ctx.require(&ctx.language, "language")?;

        info!(
            "Run {}: translating captions to {}",
            ctx.run_id,
            get_language_name(target_language).unwrap_or_else(|_| target_language.to_string())
        );
        let translated = self.translate_file(source_path, source_language, target_language).await?;
        let path = FileManager::subtitle_path(&self.config.output_directory, &ctx.base_name, target_language);
        translated.write_to_file(&path)?;

        info!("Run {}: wrote translated captions to {:?}", ctx.run_id, path);
        Ok(ctx.with_captions(target_language, path))
    }

    /// Translate a standalone `{base}.{lang}.srt` file next to itself
    pub async fn translate_subtitle_file<P: AsRef<Path>>(&self, srt_path: P, target_language: &str) -> Result<PathBuf, AppError> {
        let srt_path = srt_path.as_ref();
        let source_language = FileManager::subtitle_language(srt_path).ok_or_else(|| {
            AppError::Config(format!("Cannot tell the language of {:?}; expected <name>.<lang>.srt", srt_path))
        })?;

        let translated = self.translate_file(srt_path, &source_language, target_language).await?;
        let dir = srt_path.parent().unwrap_or(Path::new("."));
        let path = FileManager::subtitle_path(dir, &FileManager::base_name(srt_path)?, target_language);
        translated.write_to_file(&path)?;

        info!("Wrote translated captions to {:?}", path);
        Ok(path)
    }

    async fn translate_file(&self, path: &Path, source_language: &str, target_language: &str) -> Result<CaptionTrack, AppError> {
        let serialized = FileManager::read_to_string(path).map_err(|e| SubtitleError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        // One request per chunk, each bounded by the configured timeout
        let captions = serialized.matches("-->").count().max(1);
        let chunks = captions.div_ceil(self.config.translation.max_batch_size.max(1)) as u64;
        let secs = self.config.translation.timeout_secs.saturating_mul(chunks);

        let aligner = TranslationAligner::new(self.collaborators.translator.as_ref());
        let translated = with_deadline(
            "translation",
            secs,
            aligner.align_serialized(&serialized, source_language, target_language),
        )
        .await??;

        Ok(translated)
    }

    /// Parse the current subtitle file, map it to overlays and burn them in
    pub async fn composite(&self, ctx: &PipelineContext) -> Result<PipelineContext, AppError> {
        let subtitle_path = ctx.require(&ctx.subtitle_path, "subtitle file")?;
        let language = ctx.require(&ctx.language, "language")?;
        let frame = *ctx.require(&ctx.frame_size, "frame size")?;

        let content = FileManager::read_to_string(subtitle_path).map_err(|e| SubtitleError::Io {
            path: subtitle_path.clone(),
            message: format!("{:#}", e),
        })?;
        let track = CaptionTrack::parse(&content, language)?;
        let overlays = render::to_overlays(&track, frame)?;

        let extension = ctx
            .video_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "mp4".to_string());
        let output_path =
            FileManager::output_video_path(&self.config.output_directory, &ctx.base_name, language, &extension);

        let written = with_deadline(
            "composition",
            self.config.render.timeout_secs,
            self.collaborators.compositor.render(&ctx.video_path, &overlays, &output_path),
        )
        .await?
        .map_err(AppError::Composition)?;

        Ok(ctx.with_output(written))
    }
}
