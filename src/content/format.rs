//! File formats understood by the loader.

use std::path::Path;

use serde_json::Value;

use crate::error::{ContentError, Result};

/// Parser selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Json,
    Toml,
}

impl ContentFormat {
    /// Pick the parser for `path`; unknown extensions are rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(ContentFormat::Json),
            "toml" => Ok(ContentFormat::Toml),
            _ => Err(ContentError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "<none>".to_string()
                } else {
                    extension
                },
            }),
        }
    }

    /// Parse raw text into a JSON value.
    pub fn parse(self, path: &Path, raw: &str) -> Result<Value> {
        let parsed = match self {
            ContentFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            ContentFormat::Toml => toml::from_str::<Value>(raw).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ContentError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}
