use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::pipeline::{CaptionPipeline, Collaborators};
use crate::providers::demucs::DemucsCli;
use crate::providers::ffmpeg::Ffmpeg;
use crate::providers::libretranslate::LibreTranslate;
use crate::providers::whisper::WhisperCli;

// @module: Application controller for caption runs

/// Main application controller: picks what to do for an input path
pub struct Controller {
    // @field: Configured pipeline
    pipeline: CaptionPipeline,
}

impl Controller {
    // @method: Create a controller wired to the external tools named in the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let ffmpeg = Arc::new(Ffmpeg::new(
            config.render.ffmpeg_binary.clone(),
            config.render.ffprobe_binary.clone(),
            config.render.video_codec.clone(),
            config.render.overlay_style(),
        ));
        let translator = LibreTranslate::new(
            &config.translation.endpoint,
            Some(config.translation.api_key.clone()),
            config.translation.timeout_secs,
            config.translation.max_batch_size,
        )
        .context("Failed to create translation client")?;

        let collaborators = Collaborators {
            media: ffmpeg.clone(),
            separator: Arc::new(DemucsCli::new(
                config.separation.binary.clone(),
                config.separation.model.clone(),
                config.separation.output_directory.clone(),
                config.render.audio_format.clone(),
            )),
            transcriber: Arc::new(
                WhisperCli::new(config.transcription.binary.clone(), config.transcription.model.clone())
                    .with_language(config.transcription.language.clone()),
            ),
            translator: Arc::new(translator),
            compositor: ffmpeg,
        };

        Ok(Self::with_collaborators(config, collaborators))
    }

    /// Create a controller around caller-supplied collaborators
    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Self {
        Self {
            pipeline: CaptionPipeline::new(config, collaborators),
        }
    }

    pub fn pipeline(&self) -> &CaptionPipeline {
        &self.pipeline
    }

    /// Process a video, a subtitle file, or every video in a directory.
    ///
    /// Returns the files produced.
    pub async fn run(&self, input_path: &Path, force_overwrite: bool) -> Result<Vec<PathBuf>> {
        if FileManager::dir_exists(input_path) {
            return self.run_folder(input_path, force_overwrite).await;
        }
        if !FileManager::file_exists(input_path) {
            return Err(anyhow!("Input path does not exist: {:?}", input_path));
        }

        match FileManager::detect_file_type(input_path) {
            FileType::Subtitle => self.translate_subtitle(input_path).await.map(|path| vec![path]),
            FileType::Video => Ok(self.run_video(input_path, force_overwrite).await?.into_iter().collect()),
            FileType::Unknown => Err(anyhow!("Unsupported input file: {:?}", input_path)),
        }
    }

    /// Caption one video; `None` when skipped because a captioned copy exists
    pub async fn run_video(&self, video_path: &Path, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let config = self.pipeline.config();

        if !force_overwrite {
            let base = FileManager::base_name(video_path)?;
            let extension = video_path
                .extension()
                .map(|ext| ext.to_string_lossy().to_string())
                .unwrap_or_else(|| "mp4".to_string());

            // The spoken language is unknown until transcription, so any language counts
            let existing = match &config.translate_to {
                Some(target) => {
                    let path = FileManager::output_video_path(&config.output_directory, &base, target, &extension);
                    if FileManager::file_exists(&path) { vec![path] } else { Vec::new() }
                }
                None => FileManager::existing_outputs(&config.output_directory, &base, &extension)?,
            };
            if let Some(first) = existing.first() {
                warn!("Skipping {:?}, {:?} already exists (use -f to force overwrite)", video_path, first);
                return Ok(None);
            }
        }

        let spinner = Self::spinner(&format!("Captioning {}", video_path.display()));
        let start_time = std::time::Instant::now();
        let result = self.pipeline.run(video_path).await;
        spinner.finish_and_clear();

        let ctx = result.with_context(|| format!("Captioning failed for {:?}", video_path))?;
        info!(
            "Captioned {:?} in {}",
            video_path,
            Self::format_duration(start_time.elapsed())
        );
        Ok(ctx.output_path)
    }

    /// Translate an existing `{base}.{lang}.srt` file to the configured target
    pub async fn translate_subtitle(&self, srt_path: &Path) -> Result<PathBuf> {
        let target = self
            .pipeline
            .config()
            .translate_to
            .clone()
            .ok_or_else(|| anyhow!("A target language is required to translate {:?}", srt_path))?;

        let spinner = Self::spinner(&format!("Translating {}", srt_path.display()));
        let result = self.pipeline.translate_subtitle_file(srt_path, &target).await;
        spinner.finish_and_clear();

        result.with_context(|| format!("Translation failed for {:?}", srt_path))
    }

    /// Caption every video below `input_dir`, one run at a time.
    ///
    /// The working directories are skipped so captioned videos are never picked
    /// up as input. Fails after the whole folder is processed if any video failed.
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<Vec<PathBuf>> {
        let config = self.pipeline.config();
        let excluded = [
            config.output_directory.clone(),
            config.input_directory.clone(),
            config.separation.output_directory.clone(),
        ];
        let videos = FileManager::find_videos(input_dir, &excluded)?;
        info!("Found {} video(s) in {:?}", videos.len(), input_dir);

        let mut produced = Vec::new();
        let mut failures = 0;
        for video in &videos {
            match self.run_video(video, force_overwrite).await {
                Ok(Some(path)) => produced.push(path),
                Ok(None) => {}
                Err(e) => {
                    error!("{:#}", e);
                    failures += 1;
                }
            }
        }

        info!("Finished: {} captioned, {} failed", produced.len(), failures);
        if failures > 0 {
            return Err(anyhow!("{} of {} video(s) in {:?} failed", failures, videos.len(), input_dir));
        }
        Ok(produced)
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Format a duration as "1h 2m 3s", "2m 3s" or "3.045s"
    pub fn format_duration(duration: Duration) -> String {
        let total = duration.as_secs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
