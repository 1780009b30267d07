//! CUE sheet generation for split albums.
//!
//! This module renders a resolved tracklist as a CUE sheet pointing at the
//! unsplit source audio, and writes it next to the project file as
//! `album.cue`.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};
use crate::timestamp::Timestamp;
use crate::tracklist::Track;

/// File name of the CUE sheet inside a project directory.
pub const CUE_FILE_NAME: &str = "album.cue";

/// Convert a start time to CUE `MM:SS:FF`.
///
/// Hours fold into the minutes field. Frames are always `00` because
/// tracklist times are whole seconds.
pub fn cue_index(start: Timestamp) -> String {
    let (hours, minutes, seconds) = start.hms();
    let total_minutes = hours * 60 + minutes;
    format!("{:02}:{:02}:00", total_minutes, seconds)
}

/// Generate CUE file content from a normalized tracklist.
///
/// # Arguments
/// * `audio_file` - Path to the source audio (only the file name is used)
/// * `tracks` - Normalized tracks, in order
///
/// # Returns
/// Complete CUE file content as a string, newline terminated
pub fn generate_cue_file(audio_file: &Path, tracks: &[Track]) -> String {
    let audio_name = audio_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.wav");

    let mut cue = String::new();
    cue.push_str(&format!("FILE \"{}\" WAVE\n", audio_name));

    for track in tracks {
        cue.push_str(&format!("  TRACK {:02} AUDIO\n", track.index));
        cue.push_str(&format!("    TITLE \"{}\"\n", track.title));
        cue.push_str(&format!("    INDEX 01 {}\n", cue_index(track.start)));
    }

    cue
}

/// Write CUE file content to `album.cue` inside `dir`.
///
/// # Returns
/// Path to the created CUE file, or an error
pub fn write_cue_file(dir: &Path, cue_content: &str) -> Result<PathBuf> {
    let cue_path = dir.join(CUE_FILE_NAME);
    let mut file = File::create(&cue_path).map_err(|e| SplitError::io(&cue_path, e))?;
    file.write_all(cue_content.as_bytes())
        .map_err(|e| SplitError::io(&cue_path, e))?;
    Ok(cue_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(index: usize, title: &str, start: &str) -> Track {
        Track {
            index,
            title: title.to_string(),
            start: start.parse().unwrap(),
            end: None,
        }
    }

    #[test]
    fn test_cue_index_folds_hours() {
        assert_eq!(cue_index("00:03:45".parse().unwrap()), "03:45:00");
        assert_eq!(cue_index("01:02:10".parse().unwrap()), "62:10:00");
        assert_eq!(cue_index(Timestamp::ZERO), "00:00:00");
    }

    #[test]
    fn test_generate_cue_file() {
        let tracks = vec![
            track(1, "Intro", "00:00:00"),
            track(2, "Second Song", "00:03:45"),
            track(3, "Outro", "01:02:10"),
        ];
        let cue = generate_cue_file(Path::new("/projects/live/source.m4a"), &tracks);
        let expected = concat!(
            "FILE \"source.m4a\" WAVE\n",
            "  TRACK 01 AUDIO\n",
            "    TITLE \"Intro\"\n",
            "    INDEX 01 00:00:00\n",
            "  TRACK 02 AUDIO\n",
            "    TITLE \"Second Song\"\n",
            "    INDEX 01 03:45:00\n",
            "  TRACK 03 AUDIO\n",
            "    TITLE \"Outro\"\n",
            "    INDEX 01 62:10:00\n",
        );
        assert_eq!(cue, expected);
    }

    #[test]
    fn test_write_cue_file() {
        let dir = tempfile::tempdir().unwrap();
        let content = generate_cue_file(Path::new("source.m4a"), &[track(1, "A", "00:00:00")]);
        let path = write_cue_file(dir.path(), &content).unwrap();
        assert_eq!(path, dir.path().join("album.cue"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), content);
    }
}
