/*!
 * Tests for file and directory utilities
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use capsync::file_utils::{FileManager, FileType};
use crate::common;

/// Test file and directory existence checks
#[test]
fn test_exists_withFileAndDirectory_shouldDistinguish() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.txt", "x")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::dir_exists(&file));
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.txt")));
    Ok(())
}

/// Test directory creation including parents
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested)?;
    assert!(nested.is_dir());

    // Existing directory is fine
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

/// Test atomic writes create and replace files
#[test]
fn test_write_atomic_withExistingFile_shouldReplaceWithoutLeftovers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "out.srt", "old")?;

    FileManager::write_atomic(&path, "new content")?;

    assert_eq!(FileManager::read_to_string(&path)?, "new content");
    let entries: Vec<_> = fs::read_dir(temp_dir.path())?.collect();
    assert_eq!(entries.len(), 1);
    Ok(())
}

/// Test reading a missing file
#[test]
fn test_read_to_string_withMissingFile_shouldReturnError() {
    assert!(FileManager::read_to_string("/definitely/not/here.srt").is_err());
}

/// Test base name derivation
#[test]
fn test_base_name_withDottedNames_shouldStopAtFirstDot() -> Result<()> {
    assert_eq!(FileManager::base_name("videos/talk.mp4")?, "talk");
    assert_eq!(FileManager::base_name("talk.en.srt")?, "talk");
    assert_eq!(FileManager::base_name("/tmp/archive.tar.gz")?, "archive");
    assert_eq!(FileManager::base_name("noext")?, "noext");
    assert!(FileManager::base_name(".hidden").is_err());
    Ok(())
}

/// Test output path naming
#[test]
fn test_output_paths_withBaseAndLanguage_shouldFollowNamingScheme() {
    let dir = Path::new("subtitles");

    assert_eq!(
        FileManager::subtitle_path(dir, "talk", "fr"),
        PathBuf::from("subtitles/talk.fr.srt")
    );
    assert_eq!(
        FileManager::output_video_path(dir, "talk", "pt-BR", "mkv"),
        PathBuf::from("subtitles/talk_pt-BR.mkv")
    );
    assert_eq!(
        FileManager::output_video_path(dir, "talk", "en", ".mp4"),
        PathBuf::from("subtitles/talk_en.mp4")
    );
}

/// Test language extraction from subtitle file names
#[test]
fn test_subtitle_language_withVariousNames_shouldExtractTag() {
    assert_eq!(FileManager::subtitle_language("talk.en.srt"), Some("en".to_string()));
    assert_eq!(FileManager::subtitle_language("dir/talk.pt-BR.SRT"), Some("pt-BR".to_string()));
    assert_eq!(FileManager::subtitle_language("talk.srt"), None);
    assert_eq!(FileManager::subtitle_language("talk.en.txt"), None);
}

/// Test file type detection by extension
#[test]
fn test_detect_file_type_withExtensions_shouldClassify() {
    assert_eq!(FileManager::detect_file_type("a.srt"), FileType::Subtitle);
    assert_eq!(FileManager::detect_file_type("a.MP4"), FileType::Video);
    assert_eq!(FileManager::detect_file_type("a.mkv"), FileType::Video);
    assert_eq!(FileManager::detect_file_type("a.txt"), FileType::Unknown);
    assert_eq!(FileManager::detect_file_type("noext"), FileType::Unknown);
}

/// Test recursive video discovery
#[test]
fn test_find_videos_withMixedFiles_shouldReturnSortedVideos() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sub_dir = temp_dir.path().join("season1");
    fs::create_dir(&sub_dir)?;

    common::create_test_file(temp_dir.path(), "b.mp4", "v")?;
    common::create_test_file(temp_dir.path(), "a.mkv", "v")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "t")?;
    common::create_test_subtitle(temp_dir.path(), "a.en.srt")?;
    common::create_test_file(&sub_dir, "c.webm", "v")?;

    let videos = FileManager::find_videos(temp_dir.path(), &[])?;
    let names: Vec<String> = videos
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.mkv", "b.mp4", "season1/c.webm"]);
    Ok(())
}

/// Test that excluded directories are not searched for videos
#[test]
fn test_find_videos_withExcludedOutputDir_shouldSkipCaptionedVideos() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("subtitles");
    fs::create_dir(&output_dir)?;
    common::create_test_file(temp_dir.path(), "one.mp4", "v")?;
    common::create_test_file(&output_dir, "one_en.mp4", "v")?;

    let all = FileManager::find_videos(temp_dir.path(), &[])?;
    assert_eq!(all.len(), 2);

    let videos = FileManager::find_videos(temp_dir.path(), &[output_dir, temp_dir.path().join("missing")])?;
    assert_eq!(videos, vec![temp_dir.path().join("one.mp4")]);
    Ok(())
}

/// Test listing captioned videos written for a base name in any language
#[test]
fn test_existing_outputs_withSeveralFiles_shouldMatchBaseAndExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "talk_en.mp4", "v")?;
    common::create_test_file(dir, "talk_pt-BR.mp4", "v")?;
    common::create_test_file(dir, "talk_en.mkv", "v")?;
    common::create_test_file(dir, "talkshow_en.mp4", "v")?;
    common::create_test_file(dir, "talk_notalanguage.mp4", "v")?;
    common::create_test_file(dir, "talk.en.srt", "s")?;

    let outputs = FileManager::existing_outputs(dir, "talk", "mp4")?;
    assert_eq!(outputs, vec![dir.join("talk_en.mp4"), dir.join("talk_pt-BR.mp4")]);

    assert!(FileManager::existing_outputs(dir, "other", "mp4")?.is_empty());
    assert!(FileManager::existing_outputs(dir.join("missing"), "talk", "mp4")?.is_empty());
    Ok(())
}
