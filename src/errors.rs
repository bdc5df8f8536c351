/*!
 * Error types for the capsync pipeline.
 *
 * One enum per concern, using the thiserror crate. Every error here is
 * unrecoverable at the component that raises it; callers decide whether a
 * failed optional stage (vocal separation, translation) aborts the run.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while formatting or parsing a timecode
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    /// A time offset below zero
    #[error("Negative time value: {0}")]
    Negative(f64),

    /// NaN or infinite time offset
    #[error("Time value is not finite")]
    NonFinite,

    /// Text that does not look like `HH:MM:SS,mmm`
    #[error("Malformed timestamp: '{0}'")]
    Malformed(String),

    /// Minutes or seconds above 59
    #[error("Timestamp component out of range: '{0}'")]
    ComponentOutOfRange(String),

    /// A span whose end precedes its start
    #[error("Invalid time span: end {end} precedes start {start}")]
    InvertedSpan {
        /// Span start in seconds
        start: f64,
        /// Span end in seconds
        end: f64,
    },
}

/// Structural violations of the subtitle grammar
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Index line that is not a positive integer
    #[error("Line {line}: expected entry index, found '{found}'")]
    InvalidIndex {
        /// 1-based line number
        line: usize,
        /// Offending text
        found: String,
    },

    /// Index that breaks the 1, 2, 3... sequence
    #[error("Line {line}: expected entry index {expected}, found {found}")]
    NonSequentialIndex {
        /// 1-based line number
        line: usize,
        /// Index the sequence required
        expected: usize,
        /// Index found in the file
        found: usize,
    },

    /// Input ended right after an index line
    #[error("Entry {index} has no timing line")]
    MissingTiming {
        /// Entry index
        index: usize,
    },

    /// Timing line without a `-->` arrow
    #[error("Line {line}: expected '<start> --> <end>', found '{text}'")]
    InvalidTiming {
        /// 1-based line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// Timing line whose timestamps do not parse
    #[error("Line {line}: {source}")]
    InvalidTimestamp {
        /// 1-based line number
        line: usize,
        /// Underlying timecode error
        #[source]
        source: TimecodeError,
    },

    /// Timing line whose end precedes its start
    #[error("Entry {index}: end time precedes start time")]
    InvertedSpan {
        /// Entry index
        index: usize,
    },

    /// Entry not closed by a blank line before end of input
    #[error("Entry {index} is not terminated by a blank line")]
    UnterminatedEntry {
        /// Entry index
        index: usize,
    },

    /// Reading or writing a subtitle file failed
    #[error("Subtitle file error for {path:?}: {message}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error text
        message: String,
    },
}

/// Errors that can occur when working with external collaborators
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a collaborator response fails
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// External tool could not be started
    #[error("Failed to launch {tool}: {message}")]
    ToolNotFound {
        /// Binary name
        tool: String,
        /// Launch error
        message: String,
    },

    /// External tool exited unsuccessfully
    #[error("{tool} exited with {status}: {stderr}")]
    ProcessFailed {
        /// Binary name
        tool: String,
        /// Exit status as text
        status: String,
        /// Filtered stderr
        stderr: String,
    },

    /// Tool reported success but its output file is missing
    #[error("Expected output not found: {0:?}")]
    MissingOutput(PathBuf),
}

/// Errors from replacing a track's text with its translation
#[derive(Error, Debug)]
pub enum AlignmentError {
    /// Translation batch length disagrees with the entry count
    #[error("Translation batch length mismatch: submitted {submitted}, received {returned}")]
    LengthMismatch {
        /// Number of texts sent
        submitted: usize,
        /// Number of texts received
        returned: usize,
    },

    /// Failure reported by the translation collaborator
    #[error("Translation service error: {0}")]
    TranslationService(#[from] ProviderError),

    /// The serialized track could not be parsed
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

/// Errors from mapping a track to overlay descriptors
#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    /// Zero or negative duration entry reached the render stage
    #[error("Entry {index} has a degenerate span ({start}s -> {end}s)")]
    DegenerateSpan {
        /// Entry index
        index: usize,
        /// Span start in seconds
        start: f64,
        /// Span end in seconds
        end: f64,
    },

    /// Frame with zero width or height
    #[error("Invalid frame size {width}x{height}")]
    InvalidFrameSize {
        /// Frame width in pixels
        width: u32,
        /// Frame height in pixels
        height: u32,
    },
}

/// Pipeline-level error that records which stage failed
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration or arguments
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio extraction or frame probing failed
    #[error("Audio extraction error: {0}")]
    AudioExtraction(#[source] ProviderError),

    /// Vocal separation collaborator failed
    #[error("Separation service error: {0}")]
    Separation(#[source] ProviderError),

    /// Transcription collaborator failed
    #[error("Transcription service error: {0}")]
    Transcription(#[source] ProviderError),

    /// Compositor failed
    #[error("Composition error: {0}")]
    Composition(#[source] ProviderError),

    /// A collaborator call exceeded its deadline
    #[error("Stage '{stage}' timed out after {secs}s")]
    Timeout {
        /// Stage name
        stage: &'static str,
        /// Deadline in seconds
        secs: u64,
    },

    /// Error from timecode handling
    #[error("Timing error: {0}")]
    Timecode(#[from] TimecodeError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation alignment
    #[error("Translation error: {0}")]
    Alignment(#[from] AlignmentError),

    /// Error from overlay mapping
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::File(format!("{:#}", error))
    }
}
