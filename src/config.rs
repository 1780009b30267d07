use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};
use crate::ffmpeg::Codec;
use crate::sources::TranscriptScan;

/// User-wide defaults that can be saved to a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<Codec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename_template: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_gap: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_db: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_silence: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_scan: Option<TranscriptScan>,
}

impl Config {
    /// Create a new empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the config file path (~/.state/albumsplit/defaults.toml)
    pub fn get_config_path() -> io::Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set")
        })?;

        let config_dir = Path::new(&home).join(".state").join("albumsplit");
        Ok(config_dir.join("defaults.toml"))
    }

    /// Load defaults from the user config file, or empty defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path =
            Self::get_config_path().map_err(|e| SplitError::io("~/.state/albumsplit", e))?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::new());
        }

        let content =
            fs::read_to_string(config_path).map_err(|e| SplitError::io(config_path, e))?;
        toml::from_str(&content).map_err(|source| SplitError::Config {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path =
            Self::get_config_path().map_err(|e| SplitError::io("~/.state/albumsplit", e))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SplitError::io(parent, e))?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(config_path, toml_string).map_err(|e| SplitError::io(config_path, e))
    }

    /// Merge this config with another, preferring values from other
    pub fn merge(&mut self, other: &Config) {
        if other.codec.is_some() {
            self.codec = other.codec;
        }
        if other.filename_template.is_some() {
            self.filename_template = other.filename_template.clone();
        }
        if other.min_gap.is_some() {
            self.min_gap = other.min_gap;
        }
        if other.noise_db.is_some() {
            self.noise_db = other.noise_db.clone();
        }
        if other.min_silence.is_some() {
            self.min_silence = other.min_silence;
        }
        if other.transcript_scan.is_some() {
            self.transcript_scan = other.transcript_scan;
        }
    }

    /// Print the config in a human-readable format
    pub fn print(&self, title: &str) {
        println!("{}:", title);

        if let Some(codec) = self.codec {
            println!("  Codec:              {}", codec.extension());
        }
        if let Some(template) = &self.filename_template {
            println!("  Filename template:  {}", template);
        }
        if let Some(min_gap) = self.min_gap {
            println!("  Min silence gap:    {} seconds", min_gap);
        }
        if let Some(noise_db) = &self.noise_db {
            println!("  Noise floor:        {}", noise_db);
        }
        if let Some(min_silence) = self.min_silence {
            println!("  Min silence:        {} seconds", min_silence);
        }
        if let Some(scan) = self.transcript_scan {
            println!("  Transcript scan:    {:?}", scan);
        }
    }
}
