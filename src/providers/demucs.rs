use async_trait::async_trait;
use log::info;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{VocalSeparator, run_tool};
use crate::errors::ProviderError;

/// Vocal separator backed by the `demucs` command line tool
#[derive(Debug, Clone)]
pub struct DemucsCli {
    binary: String,
    model: String,
    output_dir: PathBuf,
    audio_format: String,
}

impl DemucsCli {
    pub fn new(
        binary: impl Into<String>,
        model: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        audio_format: impl Into<String>,
    ) -> Self {
        DemucsCli {
            binary: binary.into(),
            model: model.into(),
            output_dir: output_dir.into(),
            audio_format: audio_format.into(),
        }
    }

    /// Where demucs leaves the vocals stem: `{out}/{model}/{stem}/vocals.{ext}`
    pub fn vocals_path(&self, audio_path: &Path) -> Result<PathBuf, ProviderError> {
        let stem = audio_path
            .file_stem()
            .ok_or_else(|| ProviderError::MissingOutput(audio_path.to_path_buf()))?;
        let extension = if self.audio_format == "mp3" { "mp3" } else { "wav" };

        Ok(self
            .output_dir
            .join(&self.model)
            .join(stem)
            .join(format!("vocals.{}", extension)))
    }
}

#[async_trait]
impl VocalSeparator for DemucsCli {
    async fn separate_vocals(&self, audio_path: &Path) -> Result<PathBuf, ProviderError> {
        let mut args: Vec<OsString> = Vec::new();
        if self.audio_format == "mp3" {
            args.push(OsString::from("--mp3"));
        }
        args.extend([
            OsString::from("--two-stems"),
            OsString::from("vocals"),
            OsString::from("-n"),
            OsString::from(&self.model),
            OsString::from("-o"),
            self.output_dir.as_os_str().to_os_string(),
            audio_path.as_os_str().to_os_string(),
        ]);

        info!("Separating vocals from {:?} with demucs model '{}'", audio_path, self.model);
        run_tool(&self.binary, &args).await?;

        let vocals = self.vocals_path(audio_path)?;
        if !vocals.is_file() {
            return Err(ProviderError::MissingOutput(vocals));
        }
        Ok(vocals)
    }
}
