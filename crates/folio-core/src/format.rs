//! Structured data file formats.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{CoreError, Result};

/// Format of a structured data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Yaml,
    Json,
    Toml,
}

impl DataFormat {
    /// Extensions recognised for data files, in lookup order.
    pub const EXTENSIONS: [&'static str; 4] = ["yml", "yaml", "json", "toml"];

    /// Determine the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Determine the format of a file from its path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Decode `text` into `T`, attributing failures to `path`.
    pub fn decode<T: DeserializeOwned>(&self, text: &str, path: &Path) -> Result<T> {
        let decoded = match self {
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| CoreError::parse(path, message))
    }
}

/// Read and decode a data file, choosing the format from its extension.
pub fn read_data_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DataFormat::from_path(path)
        .ok_or_else(|| CoreError::parse(path, "unsupported data file extension"))?;
    let text = std::fs::read_to_string(path)?;
    format.decode(&text, path)
}
