/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::path::PathBuf;
use capsync::app_config::{Config, LogLevel, TranslationFailurePolicy};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoInput_shouldUseDefaults() {
    let config = Config::default();

    assert_eq!(config.input_directory, PathBuf::from("audio"));
    assert_eq!(config.output_directory, PathBuf::from("subtitles"));
    assert!(!config.separate_vocals);
    assert_eq!(config.translate_to, None);
    assert_eq!(config.translation_failure, TranslationFailurePolicy::Abort);
    assert_eq!(config.transcription.model, "turbo");
    assert_eq!(config.separation.model, "mdx_extra");
    assert_eq!(config.translation.max_batch_size, 50);
    assert_eq!(config.render.font, "Courier");
    assert_eq!(config.render.font_size, 24);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test that a partial JSON document fills in defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "translate_to": "fr",
        "translation_failure": "keep_original",
        "render": { "font_size": 32 },
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.translate_to.as_deref(), Some("fr"));
    assert_eq!(config.translation_failure, TranslationFailurePolicy::KeepOriginal);
    assert_eq!(config.render.font_size, 32);
    assert_eq!(config.render.font, "Courier");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(config.translation.endpoint, "http://localhost:5000");
    Ok(())
}

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.render.video_codec, "libx264");

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.output_directory, config.output_directory);
    Ok(())
}

/// Test loading an existing config file
#[test]
fn test_load_or_create_withExistingFile_shouldReadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "separate_vocals": true, "output_directory": "out" }"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert!(config.separate_vocals);
    assert_eq!(config.output_directory, PathBuf::from("out"));
    Ok(())
}

/// Test that a malformed config file is an error
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Test validation failures
#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = Config::default();
    config.translate_to = Some("klingonese".to_string());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.render.font_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.max_batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.transcription.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.transcription.language = Some("zz".to_string());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translate_to = Some("fr".to_string());
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// Test that a bad endpoint only matters when translating
#[test]
fn test_validate_withBadEndpointAndNoTarget_shouldSucceed() {
    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_ok());
}

/// Test overlay style derivation
#[test]
fn test_overlay_style_withRenderConfig_shouldCopyFields() {
    let mut config = Config::default();
    config.render.font = "DejaVu Sans".to_string();
    config.render.bottom_margin = 40;

    let style = config.render.overlay_style();
    assert_eq!(style.font, "DejaVu Sans");
    assert_eq!(style.margin, 40);
    assert_eq!(style.font_size, 24);
}
