/*!
 * Tests for error types and their conversions
 */

use std::error::Error;
use capsync::errors::{
    AlignmentError, AppError, ProviderError, RenderError, SubtitleError, TimecodeError,
};

/// Test error messages carry their context
#[test]
fn test_display_withContext_shouldIncludeDetails() {
    let err = SubtitleError::NonSequentialIndex { line: 9, expected: 3, found: 4 };
    assert_eq!(err.to_string(), "Line 9: expected entry index 3, found 4");

    let err = AlignmentError::LengthMismatch { submitted: 3, returned: 2 };
    assert_eq!(err.to_string(), "Translation batch length mismatch: submitted 3, received 2");

    let err = RenderError::DegenerateSpan { index: 2, start: 5.0, end: 5.0 };
    assert_eq!(err.to_string(), "Entry 2 has a degenerate span (5s -> 5s)");

    let err = AppError::Timeout { stage: "transcription", secs: 10 };
    assert_eq!(err.to_string(), "Stage 'transcription' timed out after 10s");
}

/// Test source chaining of wrapped errors
#[test]
fn test_source_withWrappedTimecodeError_shouldExposeCause() {
    let err = SubtitleError::InvalidTimestamp {
        line: 2,
        source: TimecodeError::Malformed("bad".to_string()),
    };
    let source = err.source().expect("timestamp error should have a source");
    assert_eq!(source.to_string(), "Malformed timestamp: 'bad'");

    let app = AppError::Transcription(ProviderError::ParseError("oops".to_string()));
    assert!(app.source().is_some());
    assert!(app.to_string().contains("oops"));
}

/// Test automatic conversions into the pipeline error
#[test]
fn test_from_withComponentErrors_shouldMapToVariants() {
    let app: AppError = TimecodeError::NonFinite.into();
    assert!(matches!(app, AppError::Timecode(_)));

    let app: AppError = SubtitleError::UnterminatedEntry { index: 1 }.into();
    assert!(matches!(app, AppError::Subtitle(_)));

    let app: AppError = AlignmentError::from(ProviderError::ConnectionError("down".to_string())).into();
    assert!(matches!(app, AppError::Alignment(AlignmentError::TranslationService(_))));

    let app: AppError = RenderError::InvalidFrameSize { width: 0, height: 0 }.into();
    assert!(matches!(app, AppError::Render(_)));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("context").context("outer").into();
    match app {
        AppError::File(message) => assert_eq!(message, "outer: context"),
        other => panic!("expected File, got {:?}", other),
    }
}

/// Test provider error messages
#[test]
fn test_provider_error_display_withToolFailure_shouldNameTool() {
    let err = ProviderError::ProcessFailed {
        tool: "ffmpeg".to_string(),
        status: "exit status: 1".to_string(),
        stderr: "No such file".to_string(),
    };
    assert_eq!(err.to_string(), "ffmpeg exited with exit status: 1: No such file");

    let err = ProviderError::ApiError { status_code: 429, message: "slow down".to_string() };
    assert_eq!(err.to_string(), "API responded with error: 429 - slow down");
}
