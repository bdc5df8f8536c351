/*!
 * Common test utilities for the capsync test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use capsync::app_config::Config;
use capsync::subtitle_processor::RawSegment;


/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sample subtitle content with three entries, the second one on two lines
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains
multiple lines.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.

";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Two back-to-back segments
pub fn sample_segments() -> Vec<RawSegment> {
    vec![
        RawSegment::new(0.0, 1.5, "hello"),
        RawSegment::new(1.5, 3.2, "world"),
    ]
}

/// Configuration whose working directories live inside `root`
pub fn test_config(root: &Path) -> Config {
    Config {
        input_directory: root.join("audio"),
        output_directory: root.join("subtitles"),
        ..Config::default()
    }
}

/// Assert two floating point offsets are equal to the microsecond
pub fn assert_seconds_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}s, got {}s",
        expected,
        actual
    );
}
