//! Upload handling
//!
//! Uploads are validated against the extension allow-list, written to the
//! upload directory under a sanitized name, read back as UTF-8 text and
//! removed again whether or not processing succeeds.

use crate::types::{IngressError, IngressResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const NO_FILE_SELECTED: &str = "No file selected";
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload a .txt file.";

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploads are staged in while being processed
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Accepted file extensions, compared case-insensitively
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            allowed_extensions: default_allowed_extensions(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

impl UploadConfig {
    /// Whether `filename` has an allowed extension
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    /// Check a client-supplied filename before anything touches the disk
    pub fn validate(&self, filename: Option<&str>) -> IngressResult<()> {
        match filename {
            None | Some("") => Err(IngressError::Validation(NO_FILE_SELECTED.to_string())),
            Some(name) if !self.is_allowed(name) => {
                Err(IngressError::Validation(INVALID_FILE_TYPE.to_string()))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`; whitespace becomes `_`;
/// anything else is dropped. Leading dots and underscores are stripped so the
/// result can never be hidden or walk out of the upload directory.
pub fn sanitize_filename(filename: &str) -> String {
    // Only the last path component counts, for both separator styles
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Staged upload file that is removed when dropped
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
}

impl StagedUpload {
    /// Write `data` into `directory` under a unique sanitized name
    pub async fn write(directory: &Path, filename: &str, data: &[u8]) -> IngressResult<Self> {
        tokio::fs::create_dir_all(directory).await?;

        let mut name = sanitize_filename(filename);
        if name.is_empty() {
            name = "upload.txt".to_string();
        }
        let path = directory.join(format!("{}_{}", uuid::Uuid::new_v4().simple(), name));

        // Guard first so a failed write is still cleaned up
        let staged = Self { path };
        tokio::fs::write(&staged.path, data).await?;
        debug!("Staged upload at {}", staged.path.display());

        Ok(staged)
    }

    /// Read the staged file as UTF-8 text
    pub async fn read_text(&self) -> IngressResult<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        String::from_utf8(bytes).map_err(|e| {
            IngressError::Processing(format!("Uploaded file is not valid UTF-8: {}", e))
        })
    }

    /// Location of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove upload {}: {}", self.path.display(), e);
            }
        }
    }
}
