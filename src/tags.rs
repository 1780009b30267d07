//! Album tags and cover art for split tracks.
//!
//! Tags are written by remuxing each file through ffmpeg (`-c copy`) into a
//! temporary file in the same directory, which then replaces the original.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{Result, SplitError};
use crate::tools::{check_status, Toolchain};

/// Metadata shared by every track of the album.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub artist: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
}

impl AlbumMetadata {
    /// `key=value` pairs for a track at 1-based position `track`.
    /// Album artist falls back to artist.
    pub fn tag_pairs(&self, track: usize) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(album) = &self.album {
            pairs.push(("album", album.clone()));
        }
        if let Some(album_artist) = self.album_artist.as_ref().or(self.artist.as_ref()) {
            pairs.push(("album_artist", album_artist.clone()));
        }
        if let Some(artist) = &self.artist {
            pairs.push(("artist", artist.clone()));
        }
        pairs.push(("track", track.to_string()));
        if let Some(year) = &self.year {
            pairs.push(("date", year.clone()));
        }
        if let Some(genre) = &self.genre {
            pairs.push(("genre", genre.clone()));
        }
        if let Some(comment) = &self.comment {
            pairs.push(("comment", comment.clone()));
        }
        pairs
    }
}

/// Apply album metadata and optional cover art to `files`.
///
/// Track numbers follow the order of `files`. A cover path that does not
/// exist is skipped with a warning.
pub fn apply_tags(
    files: &[PathBuf],
    metadata: &AlbumMetadata,
    cover: Option<&Path>,
    tools: &Toolchain,
) -> Result<()> {
    tools.require_ffmpeg()?;

    let cover = match cover {
        Some(path) if path.exists() => Some(path),
        Some(path) => {
            warn!(cover = %path.display(), "cover image not found, tagging without it");
            None
        }
        None => None,
    };

    for (i, file) in files.iter().enumerate() {
        tag_file(file, &metadata.tag_pairs(i + 1), cover)?;
    }
    info!(files = files.len(), "tagged tracks");
    Ok(())
}

fn tag_file(file: &Path, tags: &[(&'static str, String)], cover: Option<&Path>) -> Result<()> {
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let suffix = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let temp = tempfile::Builder::new()
        .prefix(".albumsplit-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| SplitError::io(dir, e))?;

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner").arg("-y").arg("-i").arg(file);
    if let Some(cover) = cover {
        cmd.arg("-i")
            .arg(cover)
            .args(["-map", "0:a", "-map", "1:v", "-disposition:v:0", "attached_pic"]);
        if suffix == ".mp3" {
            cmd.args(["-id3v2_version", "3"]);
        }
    } else {
        cmd.args(["-map", "0"]);
    }
    cmd.args(["-c", "copy"]);
    for (key, value) in tags {
        cmd.arg("-metadata").arg(format!("{}={}", key, value));
    }
    cmd.arg(temp.path());

    let output = cmd.output().map_err(|e| SplitError::io(file, e))?;
    check_status("ffmpeg", &output)?;

    replace_file(temp, file)
}

/// Move `temp` over `file`, keeping the permissions of the file it replaces.
fn replace_file(temp: NamedTempFile, file: &Path) -> Result<()> {
    let permissions = fs::metadata(file)
        .map_err(|e| SplitError::io(file, e))?
        .permissions();
    fs::set_permissions(temp.path(), permissions).map_err(|e| SplitError::io(temp.path(), e))?;
    temp.persist(file)
        .map_err(|e| SplitError::io(file, e.error))?;
    Ok(())
}
