/*!
 * Tests for the application controller
 */

use anyhow::Result;
use std::fs;
use std::time::Duration;
use capsync::app_controller::Controller;
use crate::common;
use crate::common::mock_providers::{MockSetup, TranslatorBehavior};

/// Test duration formatting
#[test]
fn test_format_duration_withVariousDurations_shouldFormatCorrectly() {
    assert_eq!(Controller::format_duration(Duration::from_millis(3_045)), "3.045s");
    assert_eq!(Controller::format_duration(Duration::from_secs(123)), "2m 3s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3_723)), "1h 2m 3s");
}

/// Test captioning every video in a folder
#[tokio::test]
async fn test_run_withFolder_shouldCaptionEveryVideo() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let videos = temp_dir.path().join("videos");
    fs::create_dir(&videos)?;
    common::create_test_file(&videos, "one.mp4", "v")?;
    common::create_test_file(&videos, "two.mkv", "v")?;
    common::create_test_file(&videos, "notes.txt", "n")?;

    let config = common::test_config(temp_dir.path());
    let mocks = MockSetup::new("en", common::sample_segments());
    let controller = Controller::with_collaborators(config.clone(), mocks.collaborators());

    let produced = controller.run(&videos, false).await?;

    assert_eq!(
        produced,
        vec![
            config.output_directory.join("one_en.mp4"),
            config.output_directory.join("two_en.mkv"),
        ]
    );
    assert!(config.output_directory.join("one.en.srt").is_file());
    assert!(config.output_directory.join("two.en.srt").is_file());
    Ok(())
}

/// Test that a second folder run does not caption its own output
#[tokio::test]
async fn test_run_withFolderContainingOutputDir_shouldNotRecaptionOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "one.mp4", "v")?;

    let config = common::test_config(temp_dir.path());
    assert!(config.output_directory.starts_with(temp_dir.path()));
    let mocks = MockSetup::new("en", common::sample_segments());
    let controller = Controller::with_collaborators(config.clone(), mocks.collaborators());

    let first = controller.run(temp_dir.path(), false).await?;
    assert_eq!(first, vec![config.output_directory.join("one_en.mp4")]);
    let calls_after_first = mocks.calls().len();

    let second = controller.run(temp_dir.path(), false).await?;
    assert!(second.is_empty());
    assert_eq!(mocks.calls().len(), calls_after_first);
    assert!(!config.output_directory.join("one_en_en.mp4").exists());
    Ok(())
}

/// Test that an untranslated video is skipped when a caption in any language exists
#[tokio::test]
async fn test_run_video_withOutputInAnyLanguage_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "talk.mp4", "v")?;
    let config = common::test_config(temp_dir.path());
    fs::create_dir_all(&config.output_directory)?;
    common::create_test_file(&config.output_directory, "talk_de.mp4", "old")?;

    let mocks = MockSetup::new("en", common::sample_segments());
    let controller = Controller::with_collaborators(config.clone(), mocks.collaborators());

    assert_eq!(controller.run_video(&video, false).await?, None);
    assert!(mocks.calls().is_empty());

    let forced = controller.run_video(&video, true).await?;
    assert_eq!(forced, Some(config.output_directory.join("talk_en.mp4")));
    Ok(())
}

/// Test that a folder run reports failure when a video fails
#[tokio::test]
async fn test_run_withFolderAndFailingVideo_shouldReturnError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let videos = temp_dir.path().join("videos");
    fs::create_dir(&videos)?;
    common::create_test_file(&videos, "one.mp4", "v")?;
    common::create_test_file(&videos, "two.mp4", "v")?;

    let mut config = common::test_config(temp_dir.path());
    config.translate_to = Some("fr".to_string());
    let mocks = MockSetup::new("en", common::sample_segments()).translator(TranslatorBehavior::Fail);
    let controller = Controller::with_collaborators(config.clone(), mocks.collaborators());

    let err = controller.run(&videos, false).await.unwrap_err();
    assert!(err.to_string().contains("2 of 2"));
    // Every video was attempted before failing
    assert_eq!(mocks.calls().iter().filter(|c| *c == "translate_batch").count(), 2);
    assert!(!config.output_directory.join("one_fr.mp4").exists());
    Ok(())
}

/// Test that existing translated output is skipped unless forced
#[tokio::test]
async fn test_run_video_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "talk.mp4", "v")?;
    let mut config = common::test_config(temp_dir.path());
    config.translate_to = Some("fr".to_string());
    fs::create_dir_all(&config.output_directory)?;
    common::create_test_file(&config.output_directory, "talk_fr.mp4", "old")?;

    let mocks = MockSetup::new("en", common::sample_segments());
    let controller = Controller::with_collaborators(config.clone(), mocks.collaborators());

    assert_eq!(controller.run_video(&video, false).await?, None);
    assert!(mocks.calls().is_empty());

    let forced = controller.run_video(&video, true).await?;
    assert_eq!(forced, Some(config.output_directory.join("talk_fr.mp4")));
    Ok(())
}

/// Test that a subtitle input is translated instead of captioned
#[tokio::test]
async fn test_run_withSubtitleFile_shouldTranslateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.en.srt")?;
    let mut config = common::test_config(temp_dir.path());
    config.translate_to = Some("it".to_string());

    let mocks = MockSetup::new("en", Vec::new());
    let controller = Controller::with_collaborators(config, mocks.collaborators());

    let produced = controller.run(&srt, false).await?;
    assert_eq!(produced, vec![temp_dir.path().join("talk.it.srt")]);
    assert_eq!(mocks.calls(), vec!["translate_batch"]);
    Ok(())
}

/// Test that translating a subtitle requires a target language
#[tokio::test]
async fn test_translate_subtitle_withoutTarget_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.en.srt")?;
    let mocks = MockSetup::new("en", Vec::new());
    let controller = Controller::with_collaborators(common::test_config(temp_dir.path()), mocks.collaborators());

    assert!(controller.translate_subtitle(&srt).await.is_err());
    Ok(())
}

/// Test unsupported and missing inputs
#[tokio::test]
async fn test_run_withUnsupportedInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let notes = common::create_test_file(temp_dir.path(), "notes.txt", "n")?;
    let mocks = MockSetup::new("en", Vec::new());
    let controller = Controller::with_collaborators(common::test_config(temp_dir.path()), mocks.collaborators());

    assert!(controller.run(&notes, false).await.is_err());
    assert!(controller.run(&temp_dir.path().join("missing.mp4"), false).await.is_err());
    Ok(())
}

/// Test that a real-tool controller can be built from the default configuration
#[test]
fn test_with_config_withDefaults_shouldBuildController() -> Result<()> {
    let controller = Controller::with_config(capsync::Config::default())?;
    assert_eq!(controller.pipeline().config().translation.max_batch_size, 50);
    Ok(())
}
