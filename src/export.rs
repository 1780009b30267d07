//! Tracklist renderings: JSON, CSV and CUE.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cuefile::generate_cue_file;
use crate::error::{Result, SplitError};
use crate::tracklist::Track;

pub const TRACKLIST_JSON: &str = "tracklist.json";
pub const TRACKLIST_CSV: &str = "tracklist.csv";

/// Output format for `detect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Emit {
    #[default]
    Json,
    Csv,
    Cue,
}

pub fn tracks_to_json(tracks: &[Track]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(tracks)?;
    json.push('\n');
    Ok(json)
}

/// `index,title,start,end` with commas removed from titles and an empty
/// field for an unknown end.
pub fn tracks_to_csv(tracks: &[Track]) -> String {
    let mut csv = String::from("index,title,start,end\n");
    for track in tracks {
        let end = track.end.map(|e| e.to_string()).unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{}\n",
            track.index,
            track.title.replace(',', ""),
            track.start,
            end
        ));
    }
    csv
}

/// Render `tracks` in the requested format. `audio_file` names the FILE
/// line of a CUE sheet.
pub fn render(tracks: &[Track], emit: Emit, audio_file: &Path) -> Result<String> {
    match emit {
        Emit::Json => tracks_to_json(tracks),
        Emit::Csv => Ok(tracks_to_csv(tracks)),
        Emit::Cue => Ok(generate_cue_file(audio_file, tracks)),
    }
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| SplitError::io(path, e))
}

/// Load a tracklist previously written as JSON.
pub fn read_tracklist_json(path: &Path) -> Result<Vec<Track>> {
    if !path.exists() {
        return Err(SplitError::NoTracklist(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| SplitError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Track> {
        vec![
            Track {
                index: 1,
                title: "Hello, World".to_string(),
                start: "00:00:00".parse().unwrap(),
                end: Some("00:02:00".parse().unwrap()),
            },
            Track {
                index: 2,
                title: "Finale".to_string(),
                start: "00:02:00".parse().unwrap(),
                end: None,
            },
        ]
    }

    #[test]
    fn test_csv() {
        let csv = tracks_to_csv(&sample());
        assert_eq!(
            csv,
            "index,title,start,end\n1,Hello World,00:00:00,00:02:00\n2,Finale,00:02:00,\n"
        );
    }

    #[test]
    fn test_json_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TRACKLIST_JSON);
        write_text(&path, &tracks_to_json(&sample()).unwrap()).unwrap();
        assert_eq!(read_tracklist_json(&path).unwrap(), sample());
    }

    #[test]
    fn test_missing_tracklist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_tracklist_json(&dir.path().join(TRACKLIST_JSON)),
            Err(SplitError::NoTracklist(_))
        ));
    }

    #[test]
    fn test_render_cue() {
        let cue = render(&sample(), Emit::Cue, Path::new("source.m4a")).unwrap();
        assert!(cue.starts_with("FILE \"source.m4a\" WAVE\n"));
        assert!(cue.contains("    INDEX 01 02:00:00\n"));
    }
}
