//! Project files.
//!
//! A project is a directory holding a `project.toml`, the downloaded source
//! audio and the downloader's sidecar files. Settings resolve in this order:
//! command-line overrides, then the project file, then the user defaults
//! ([`Config`]), then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::cuefile::CUE_FILE_NAME;
use crate::error::{Result, SplitError};
use crate::export::{TRACKLIST_CSV, TRACKLIST_JSON};
use crate::ffmpeg::{Codec, DEFAULT_FILENAME_TEMPLATE};
use crate::silence::{DEFAULT_MIN_GAP, DEFAULT_MIN_SILENCE, DEFAULT_NOISE_DB};
use crate::sources::{SourceKind, TranscriptScan};
use crate::tags::AlbumMetadata;
use crate::tracklist::TrackEntry;

pub const DEFAULT_AUDIO: &str = "source.m4a";
pub const DEFAULT_INFO_JSON: &str = "source.info.json";
pub const DEFAULT_OUTDIR: &str = "output";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub url: Option<String>,
    pub audio: Option<PathBuf>,
    pub info_json: Option<PathBuf>,
    pub transcript: Option<PathBuf>,
    pub prefer: Option<Vec<SourceKind>>,
    pub fallback_silence: Option<bool>,
    pub min_gap: Option<f64>,
    pub noise_db: Option<String>,
    pub min_silence: Option<f64>,
    pub transcript_scan: Option<TranscriptScan>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub outdir: Option<PathBuf>,
    pub codec: Option<Codec>,
    pub cover: Option<PathBuf>,
    pub filename_template: Option<String>,
}

/// On-disk layout of `project.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    pub slug: Option<String>,
    pub source: SourceSection,
    pub output: OutputSection,
    pub metadata: AlbumMetadata,
    /// Explicit entries; when present they replace every automatic source.
    pub tracklist: Option<Vec<TrackEntry>>,
}

#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
    file: ProjectFile,
    defaults: Config,
    overrides: Config,
}

impl Project {
    /// Load a project from its `project.toml` (or from a directory holding one).
    pub fn load(path: &Path) -> Result<Self> {
        let path = if path.is_dir() {
            path.join("project.toml")
        } else {
            path.to_path_buf()
        };
        let content = fs::read_to_string(&path).map_err(|e| SplitError::io(&path, e))?;
        let file: ProjectFile = toml::from_str(&content).map_err(|source| SplitError::Config {
            path: path.clone(),
            source,
        })?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Ok(Self::from_parts(dir, file))
    }

    pub fn from_parts(dir: PathBuf, file: ProjectFile) -> Self {
        Self {
            dir,
            file,
            defaults: Config::new(),
            overrides: Config::new(),
        }
    }

    /// Use `defaults` for anything the project file leaves unset.
    pub fn with_defaults(mut self, defaults: Config) -> Self {
        self.defaults = defaults;
        self
    }

    /// Values that win over the project file (command-line flags).
    pub fn with_overrides(mut self, overrides: Config) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }

    pub fn slug(&self) -> String {
        if let Some(slug) = &self.file.slug {
            return slug.clone();
        }
        self.dir
            .canonicalize()
            .ok()
            .and_then(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "album".to_string())
    }

    pub fn url(&self) -> &str {
        self.file.source.url.as_deref().unwrap_or("")
    }

    pub fn preferred_sources(&self) -> Vec<SourceKind> {
        self.file
            .source
            .prefer
            .clone()
            .unwrap_or_else(|| SourceKind::ALL.to_vec())
    }

    pub fn fallback_silence(&self) -> bool {
        self.file.source.fallback_silence.unwrap_or(true)
    }

    pub fn min_gap(&self) -> f64 {
        self.overrides
            .min_gap
            .or(self.file.source.min_gap)
            .or(self.defaults.min_gap)
            .unwrap_or(DEFAULT_MIN_GAP)
    }

    pub fn noise_db(&self) -> String {
        self.overrides
            .noise_db
            .clone()
            .or_else(|| self.file.source.noise_db.clone())
            .or_else(|| self.defaults.noise_db.clone())
            .unwrap_or_else(|| DEFAULT_NOISE_DB.to_string())
    }

    pub fn min_silence(&self) -> f64 {
        self.overrides
            .min_silence
            .or(self.file.source.min_silence)
            .or(self.defaults.min_silence)
            .unwrap_or(DEFAULT_MIN_SILENCE)
    }

    pub fn transcript_scan(&self) -> TranscriptScan {
        self.overrides
            .transcript_scan
            .or(self.file.source.transcript_scan)
            .or(self.defaults.transcript_scan)
            .unwrap_or_default()
    }

    pub fn codec(&self) -> Codec {
        self.overrides
            .codec
            .or(self.file.output.codec)
            .or(self.defaults.codec)
            .unwrap_or_default()
    }

    pub fn filename_template(&self) -> String {
        self.overrides
            .filename_template
            .clone()
            .or_else(|| self.file.output.filename_template.clone())
            .or_else(|| self.defaults.filename_template.clone())
            .unwrap_or_else(|| DEFAULT_FILENAME_TEMPLATE.to_string())
    }

    pub fn cover(&self) -> Option<PathBuf> {
        self.file.output.cover.as_deref().map(|c| self.resolve(c))
    }

    pub fn metadata(&self) -> &AlbumMetadata {
        &self.file.metadata
    }

    pub fn explicit_tracklist(&self) -> Option<&[TrackEntry]> {
        self.file
            .tracklist
            .as_deref()
            .filter(|entries| !entries.is_empty())
    }

    pub fn source_audio_path(&self) -> PathBuf {
        let audio = self.file.source.audio.as_deref().unwrap_or(Path::new(DEFAULT_AUDIO));
        self.resolve(audio)
    }

    pub fn info_json_path(&self) -> PathBuf {
        let info = self
            .file
            .source
            .info_json
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_INFO_JSON));
        self.resolve(info)
    }

    /// The configured transcript, or the first `.vtt` file in the project
    /// directory by name.
    pub fn transcript_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.file.source.transcript {
            return Some(self.resolve(path));
        }
        let mut vtts: Vec<PathBuf> = fs::read_dir(&self.dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "vtt"))
            .collect();
        vtts.sort();
        vtts.into_iter().next()
    }

    pub fn outdir(&self) -> PathBuf {
        let outdir = self
            .file
            .output
            .outdir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_OUTDIR));
        self.resolve(outdir)
    }

    pub fn tracklist_json_path(&self) -> PathBuf {
        self.dir.join(TRACKLIST_JSON)
    }

    pub fn tracklist_csv_path(&self) -> PathBuf {
        self.dir.join(TRACKLIST_CSV)
    }

    pub fn cue_path(&self) -> PathBuf {
        self.dir.join(CUE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
slug = "live-at-home"

[source]
url = "https://example.invalid/watch?v=abc"
prefer = ["comments", "description"]
fallback_silence = false
min_gap = 2.0

[output]
codec = "mp3"
cover = "cover.jpg"

[metadata]
album = "Live at Home"
artist = "The Band"

[[tracklist]]
start = "00:00:00"
title = "Opener"

[[tracklist]]
start = "00:04:10"
"#;

    #[test]
    fn test_load_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("project.toml"), PROJECT).unwrap();
        let project = Project::load(dir.path()).unwrap();

        assert_eq!(project.slug(), "live-at-home");
        assert_eq!(project.url(), "https://example.invalid/watch?v=abc");
        assert_eq!(
            project.preferred_sources(),
            vec![SourceKind::Comments, SourceKind::Description]
        );
        assert!(!project.fallback_silence());
        assert_eq!(project.min_gap(), 2.0);
        assert_eq!(project.codec(), Codec::Mp3);
        assert_eq!(project.cover(), Some(dir.path().join("cover.jpg")));
        assert_eq!(project.source_audio_path(), dir.path().join("source.m4a"));
        assert_eq!(project.outdir(), dir.path().join("output"));
        assert_eq!(project.metadata().album.as_deref(), Some("Live at Home"));

        let entries = project.explicit_tracklist().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].title, None);
    }

    #[test]
    fn test_defaults_and_overrides() {
        let project = Project::from_parts(PathBuf::from("/tmp/x"), ProjectFile::default());
        assert_eq!(project.codec(), Codec::Flac);
        assert_eq!(project.url(), "");
        assert_eq!(project.min_gap(), DEFAULT_MIN_GAP);
        assert_eq!(project.noise_db(), "-30dB");
        assert_eq!(project.preferred_sources(), SourceKind::ALL.to_vec());
        assert_eq!(project.transcript_scan(), TranscriptScan::Full);
        assert!(project.explicit_tracklist().is_none());

        let project = project
            .with_defaults(Config {
                codec: Some(Codec::Wav),
                min_gap: Some(3.0),
                ..Config::new()
            })
            .with_overrides(Config {
                min_gap: Some(4.0),
                ..Config::new()
            });
        assert_eq!(project.codec(), Codec::Wav);
        assert_eq!(project.min_gap(), 4.0);
    }

    #[test]
    fn test_transcript_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::from_parts(dir.path().to_path_buf(), ProjectFile::default());
        assert!(project.transcript_path().is_none());

        fs::write(dir.path().join("source.en.vtt"), "WEBVTT").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        assert_eq!(project.transcript_path(), Some(dir.path().join("source.en.vtt")));
    }

    #[test]
    fn test_bad_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.toml");
        fs::write(&path, "[output]\ncodec = \"ogg\"\n").unwrap();
        assert!(matches!(Project::load(&path), Err(SplitError::Config { .. })));
    }
}
