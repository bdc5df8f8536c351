use anyhow::{Result, Context, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

// Common video containers ffmpeg reads
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
    "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a whole file through a temporary sibling and rename it into place,
    /// so readers never observe a half-written file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
        temp.as_file().sync_all()?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to move file into place at {}: {}", path.display(), e.error))?;

        Ok(())
    }

    /// Base name of a video: its file name up to the first dot
    pub fn base_name<P: AsRef<Path>>(video_path: P) -> Result<String> {
        let path = video_path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("Path has no file name: {:?}", path))?;

        match file_name.split('.').next() {
            Some(base) if !base.is_empty() => Ok(base.to_string()),
            _ => Err(anyhow!("Cannot derive a base name from {:?}", path)),
        }
    }

    // @generates: {dir}/{base}.{lang}.srt
    pub fn subtitle_path<P: AsRef<Path>>(output_dir: P, base_name: &str, language: &str) -> PathBuf {
        output_dir.as_ref().join(format!("{}.{}.srt", base_name, language))
    }

    // @generates: {dir}/{base}_{lang}.{ext}
    pub fn output_video_path<P: AsRef<Path>>(
        output_dir: P,
        base_name: &str,
        language: &str,
        extension: &str,
    ) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        output_dir.as_ref().join(format!("{}_{}.{}", base_name, language, extension))
    }

    /// Captioned videos already written for `base_name`, in any language:
    /// `{dir}/{base}_{lang}.{ext}` where `{lang}` is a valid language tag
    pub fn existing_outputs<P: AsRef<Path>>(
        output_dir: P,
        base_name: &str,
        extension: &str,
    ) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        if !Self::dir_exists(output_dir) {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_", base_name);
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut outputs = Vec::new();

        for entry in fs::read_dir(output_dir)
            .with_context(|| format!("Failed to list directory: {}", output_dir.display()))?
        {
            let path = entry.context("Failed to read directory entry")?.path();
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            let language = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(&suffix));
            if let Some(language) = language {
                if Self::file_exists(&path) && crate::language_utils::validate_language_tag(language).is_ok() {
                    outputs.push(path);
                }
            }
        }

        outputs.sort();
        Ok(outputs)
    }

    /// Language tag embedded in a `{base}.{lang}.srt` file name
    pub fn subtitle_language<P: AsRef<Path>>(path: P) -> Option<String> {
        let path = path.as_ref();
        let is_srt = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"));
        if !is_srt {
            return None;
        }

        let stem = path.file_stem()?.to_string_lossy().to_string();
        let (_, language) = stem.rsplit_once('.')?;
        if language.is_empty() {
            None
        } else {
            Some(language.to_string())
        }
    }

    /// Find video files below a directory, sorted by path.
    ///
    /// Directories in `excluded` (typically where captioned videos are
    /// written) are not descended into.
    pub fn find_videos<P: AsRef<Path>>(dir: P, excluded: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let excluded: Vec<PathBuf> = excluded
            .iter()
            .filter_map(|path| fs::canonicalize(path).ok())
            .collect();
        let mut result = Vec::new();

        let walker = WalkDir::new(dir.as_ref())
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir()
                    || fs::canonicalize(entry.path()).map_or(true, |path| !excluded.contains(&path))
            });

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && Self::detect_file_type(path) == FileType::Video {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Classify a path by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let Some(ext) = path.as_ref().extension() else {
            return FileType::Unknown;
        };
        let ext = ext.to_string_lossy().to_lowercase();

        if ext == "srt" {
            FileType::Subtitle
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Video
        } else {
            FileType::Unknown
        }
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT)
    Subtitle,
    /// Video file supported by ffmpeg
    Video,
    /// Unknown file type
    Unknown,
}
