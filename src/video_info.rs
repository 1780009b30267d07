//! Video metadata written next to the download by the downloader
//! (`--write-info-json`, optionally `--write-comments`).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SplitError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoComment {
    #[serde(default)]
    pub text: String,
}

/// The subset of the info JSON the splitter reads. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Seconds, as reported by the hosting site
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub comments: Option<Vec<VideoComment>>,
}

impl VideoInfo {
    /// Load the info JSON. A missing file yields empty info.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no video info file");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| SplitError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn comment_texts(&self) -> Vec<String> {
        self.comments
            .iter()
            .flatten()
            .map(|c| c.text.clone())
            .collect()
    }
}
