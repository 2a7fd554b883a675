//! Upload staging
//!
//! Uploaded recordings are written to a per-request file, read back, and
//! removed before `stage` returns. Removal is tied to a guard so the file is
//! gone on every exit path, including early returns and panics.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use voice_turn_config::StagingConfig;
use voice_turn_core::AudioFormat;

use crate::PipelineError;

/// An uploaded file that can persist itself to a path
#[async_trait]
pub trait AudioUpload: Send + Sync {
    /// Write the upload's bytes to `path`
    async fn save_to(&self, path: &Path) -> std::io::Result<()>;

    /// Container format, used for the staged file's extension
    fn format(&self) -> AudioFormat;
}

/// Upload held in memory, as produced by multipart parsing
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub file_name: Option<String>,
}

impl UploadedAudio {
    /// Build an upload, resolving the format from the content type first and
    /// the file name second
    pub fn new(bytes: Vec<u8>, content_type: Option<&str>, file_name: Option<String>) -> Self {
        let mut format = content_type
            .map(AudioFormat::from_mime)
            .unwrap_or(AudioFormat::Unknown);
        if format == AudioFormat::Unknown {
            if let Some(name) = file_name.as_deref() {
                format = AudioFormat::from_filename(name);
            }
        }

        Self {
            bytes,
            format,
            file_name,
        }
    }
}

#[async_trait]
impl AudioUpload for UploadedAudio {
    async fn save_to(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::write(path, &self.bytes).await
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}

/// Staged recording, ready for a provider
#[derive(Debug, Clone)]
pub struct StagedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    /// Where the file lived while staged; already removed
    pub staged_path: PathBuf,
}

/// Removes the staged file when dropped
struct StagingGuard {
    path: PathBuf,
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed staged audio"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove staged audio"
            ),
        }
    }
}

/// Writes uploads to uniquely named files and reads them back
#[derive(Debug, Clone)]
pub struct AudioStagingArea {
    directory: PathBuf,
    file_prefix: String,
}

impl AudioStagingArea {
    pub fn new(directory: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &StagingConfig) -> Self {
        Self::new(config.resolved_directory(), config.file_prefix.clone())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn unique_path(&self, format: AudioFormat) -> PathBuf {
        self.directory.join(format!(
            "{}{}.{}",
            self.file_prefix,
            uuid::Uuid::new_v4(),
            format.extension()
        ))
    }

    /// Stage an upload and return its bytes
    ///
    /// The staged file never outlives this call.
    pub async fn stage(&self, upload: &dyn AudioUpload) -> Result<StagedAudio, PipelineError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                PipelineError::Staging(format!(
                    "Failed to create staging directory {}: {}",
                    self.directory.display(),
                    e
                ))
            })?;

        let format = upload.format();
        let path = self.unique_path(format);
        let guard = StagingGuard { path: path.clone() };

        upload
            .save_to(&guard.path)
            .await
            .map_err(|e| PipelineError::Staging(format!("Failed to save upload: {}", e)))?;

        if !tokio::fs::try_exists(&guard.path).await.unwrap_or(false) {
            return Err(PipelineError::Staging(format!(
                "Upload was not written to {}",
                guard.path.display()
            )));
        }

        let bytes = tokio::fs::read(&guard.path)
            .await
            .map_err(|e| PipelineError::Staging(format!("Failed to read staged upload: {}", e)))?;

        tracing::debug!(
            path = %guard.path.display(),
            bytes = bytes.len(),
            format = ?format,
            "Staged audio upload"
        );

        drop(guard);

        Ok(StagedAudio {
            bytes,
            format,
            staged_path: path,
        })
    }
}
