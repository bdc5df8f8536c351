use std::fmt;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{AlignmentError, SubtitleError, TimecodeError};
use crate::file_utils::FileManager;
use crate::timecode;

// @module: Caption track model and SRT serialization

/// Time range of a caption, in fractional seconds.
///
/// Only built through [`TimeSpan::new`] or [`TimeSpan::from_millis`], so both
/// offsets are always finite, non-negative and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSpan {
    start: f64,
    end: f64,
}

impl TimeSpan {
    // @validates: Finite, non-negative, end >= start
    pub fn new(start: f64, end: f64) -> Result<Self, TimecodeError> {
        for value in [start, end] {
            if !value.is_finite() {
                return Err(TimecodeError::NonFinite);
            }
            if value < 0.0 {
                return Err(TimecodeError::Negative(value));
            }
        }
        if end < start {
            return Err(TimecodeError::InvertedSpan { start, end });
        }
        Ok(TimeSpan { start, end })
    }

    /// Build a span from millisecond offsets
    pub fn from_millis(start_ms: u64, end_ms: u64) -> Result<Self, TimecodeError> {
        Self::new(start_ms as f64 / 1000.0, end_ms as f64 / 1000.0)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Start offset rounded to whole milliseconds
    pub fn start_millis(&self) -> u64 {
        timecode::round_millis(self.start)
    }

    /// End offset rounded to whole milliseconds
    pub fn end_millis(&self) -> u64 {
        timecode::round_millis(self.end)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the two spans share any instant
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One segment as produced by the transcription collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl RawSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        RawSegment { start, end, text: text.into() }
    }
}

// @struct: Single caption entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionEntry {
    // @field: 1-based position in the track
    pub index: usize,

    // @field: Display window
    pub span: TimeSpan,

    // @field: Caption text, never containing a blank line
    pub text: String,
}

impl CaptionEntry {
    /// Create an entry, normalizing its text.
    ///
    /// Lines are trimmed and blank lines dropped, since a blank line is the
    /// entry separator of the serialized form.
    pub fn new(index: usize, span: TimeSpan, text: &str) -> Self {
        CaptionEntry {
            index,
            span,
            text: normalize_text(text),
        }
    }

    pub fn format_start_time(&self) -> String {
        timecode::format_millis(self.span.start_millis())
    }

    pub fn format_end_time(&self) -> String {
        timecode::format_millis(self.span.end_millis())
    }
}

/// Trim every line and drop blank ones
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered caption entries in one language.
///
/// Entries are indexed 1..=n with no gaps. The track is only ever changed by
/// replacing whole entries, so a span and its text always travel together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionTrack {
    language: String,
    entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    /// Create an empty track
    pub fn new(language: impl Into<String>) -> Self {
        CaptionTrack {
            language: language.into(),
            entries: Vec::new(),
        }
    }

    /// Build a track from transcription segments.
    ///
    /// Input order is index order: nothing is sorted, merged or filtered, and
    /// overlapping segments are kept as they are.
    pub fn build(segments: &[RawSegment], language: &str) -> Result<Self, TimecodeError> {
        let mut track = CaptionTrack::new(language);

        for segment in segments {
            let span = TimeSpan::new(segment.start, segment.end)?;
            track.push(span, &segment.text);
        }

        let unordered = track
            .entries
            .windows(2)
            .filter(|pair| pair[1].span.start() < pair[0].span.start())
            .count();
        if unordered > 0 {
            warn!("{} segment(s) start before their predecessor; keeping input order", unordered);
        }

        debug!("Built {} caption entries ({})", track.len(), track.language);
        Ok(track)
    }

    /// Append an entry with the next index
    pub fn push(&mut self, span: TimeSpan, text: &str) {
        let index = self.entries.len() + 1;
        self.entries.push(CaptionEntry::new(index, span, text));
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn entries(&self) -> &[CaptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text of every entry, in index order
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.text.clone()).collect()
    }

    /// Produce a new track in `language` whose entry `i` keeps its index and
    /// span but takes `texts[i]` as its text.
    ///
    /// Fails without touching `self` when the lengths differ.
    pub fn with_texts(&self, language: &str, texts: Vec<String>) -> Result<Self, AlignmentError> {
        if texts.len() != self.entries.len() {
            return Err(AlignmentError::LengthMismatch {
                submitted: self.entries.len(),
                returned: texts.len(),
            });
        }

        let entries = self
            .entries
            .iter()
            .zip(texts)
            .map(|(entry, text)| CaptionEntry::new(entry.index, entry.span, &text))
            .collect();

        Ok(CaptionTrack {
            language: language.to_string(),
            entries,
        })
    }

    /// Number of adjacent entry pairs whose spans overlap
    pub fn overlap_count(&self) -> usize {
        self.entries
            .windows(2)
            .filter(|pair| pair[0].span.overlaps(&pair[1].span))
            .count()
    }

    /// Serialize to SRT text: index, timing, text, blank line per entry
    pub fn write(&self) -> String {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Write the serialized track to `path`, replacing any existing file atomically
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        FileManager::write_atomic(path, &self.write()).map_err(|e| SubtitleError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })
    }

    /// Parse SRT text.
    ///
    /// Indices must run 1, 2, 3... and every entry must be closed by a blank
    /// line. Leading and repeated blank lines between entries are allowed, as
    /// are CRLF line endings and a UTF-8 byte order mark.
    pub fn parse(content: &str, language: &str) -> Result<Self, SubtitleError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()));
        let mut track = CaptionTrack::new(language);

        while let Some((line_no, index_line)) = lines.find(|(_, line)| !line.is_empty()) {
            let expected = track.entries.len() + 1;
            let index: usize = index_line.parse().map_err(|_| SubtitleError::InvalidIndex {
                line: line_no,
                found: index_line.to_string(),
            })?;
            if index != expected {
                return Err(SubtitleError::NonSequentialIndex {
                    line: line_no,
                    expected,
                    found: index,
                });
            }

            let (timing_no, timing_line) = match lines.next() {
                Some((_, "")) | None => return Err(SubtitleError::MissingTiming { index }),
                Some(line) => line,
            };
            let (start_ms, end_ms) = parse_timing_line(timing_no, timing_line)?;
            let span = TimeSpan::from_millis(start_ms, end_ms)
                .map_err(|_| SubtitleError::InvertedSpan { index })?;

            let mut text_lines = Vec::new();
            let mut terminated = false;
            for (_, line) in lines.by_ref() {
                if line.is_empty() {
                    terminated = true;
                    break;
                }
                text_lines.push(line);
            }
            if !terminated {
                return Err(SubtitleError::UnterminatedEntry { index });
            }

            track.entries.push(CaptionEntry::new(index, span, &text_lines.join("\n")));
        }

        let overlaps = track.overlap_count();
        if overlaps > 0 {
            warn!("Found {} overlapping subtitle entries", overlaps);
        }

        Ok(track)
    }

    /// Parse an SRT file named `{base}.{language}.srt`
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path).map_err(|e| SubtitleError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;
        let language = FileManager::subtitle_language(path).ok_or_else(|| SubtitleError::Io {
            path: path.to_path_buf(),
            message: "file name carries no language tag".to_string(),
        })?;

        Self::parse(&content, &language)
    }
}

// @parses: "<start> --> <end>", ignoring anything after the end timestamp
fn parse_timing_line(line_no: usize, line: &str) -> Result<(u64, u64), SubtitleError> {
    let invalid = || SubtitleError::InvalidTiming {
        line: line_no,
        text: line.to_string(),
    };

    let (start, rest) = line.split_once("-->").ok_or_else(invalid)?;
    let end = rest.split_whitespace().next().ok_or_else(invalid)?;

    let to_ms = |text: &str| {
        timecode::parse_millis(text).map_err(|source| SubtitleError::InvalidTimestamp {
            line: line_no,
            source,
        })
    };

    Ok((to_ms(start.trim())?, to_ms(end)?))
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Caption Track")?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
