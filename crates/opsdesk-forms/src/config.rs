//! Component configuration

use crate::error::{FormsError, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

/// Upload pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Endpoint receiving the multipart POST
    pub endpoint: String,
    /// Ceiling on uploaded + in-flight files
    pub max_files: usize,
    /// Max size per file in bytes
    pub max_size: u64,
    /// Accepted MIME types (`image/*` wildcards allowed) or extensions (`.pdf`).
    /// Empty accepts everything.
    pub accept: Vec<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Multipart field carrying the file body
    pub field_name: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/uploads".into(),
            max_files: 5,
            max_size: 10 * 1024 * 1024,
            accept: vec!["image/*".into(), "application/pdf".into()],
            timeout_secs: 30,
            field_name: "file".into(),
        }
    }
}

impl UploadConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref())
    }
}

/// Signature pad configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub width: u32,
    pub height: u32,
    /// Stroke thickness in pixels
    pub pen_width: u32,
    /// RGBA pen colour
    pub pen_color: [u8; 4],
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 160,
            pen_width: 2,
            pen_color: [0, 0, 0, 255],
        }
    }
}

impl SignatureConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref())
    }
}

/// Whether a form creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).map_err(|e| FormsError::Config(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| FormsError::Config(e.to_string()))
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| FormsError::Config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| FormsError::Config(e.to_string()))
}
