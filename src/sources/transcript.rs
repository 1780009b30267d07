//! Tracklists spoken or captioned in a WebVTT transcript.
//!
//! Cue timing lines (`00:00:01.000 --> 00:00:04.000`) and header lines
//! (`WEBVTT`, `Kind:`, `Language`) are dropped before scanning, otherwise
//! every cue timing would be taken for a track start.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MarkerSource, SourceKind};
use crate::error::{Result, SplitError};
use crate::timestamp::{parse_timestamps, RawMarker};

static CUE_TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}\s+-->\s+[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}")
        .expect("cue timing pattern is valid")
});

const HEADER_PREFIXES: [&str; 3] = ["WEBVTT", "Kind:", "Language"];

/// How much caption text is scanned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptScan {
    /// Every caption line.
    #[default]
    Full,
    /// Only the first line left after filtering, even if it is blank.
    /// Reproduces the historical behaviour of the splitter.
    FirstLine,
}

fn is_excluded(line: &str) -> bool {
    if CUE_TIMING.is_match(line) {
        return true;
    }
    let trimmed = line.trim();
    HEADER_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

/// Extract markers from WebVTT text.
pub fn extract_from_transcript(vtt_text: &str, scan: TranscriptScan) -> Vec<RawMarker> {
    if vtt_text.is_empty() {
        return Vec::new();
    }
    let mut captions = vtt_text.lines().filter(|line| !is_excluded(line));
    let text = match scan {
        TranscriptScan::Full => captions.collect::<Vec<_>>().join("\n"),
        TranscriptScan::FirstLine => captions.next().unwrap_or_default().to_string(),
    };
    parse_timestamps(&text)
}

/// Read a `.vtt` file and extract markers from it.
pub fn extract_from_transcript_file(path: &Path, scan: TranscriptScan) -> Result<Vec<RawMarker>> {
    let markers = TranscriptSource::load(path, scan)?.markers();
    debug!(path = %path.display(), count = markers.len(), "transcript markers");
    Ok(markers)
}

pub struct TranscriptSource {
    pub text: String,
    pub scan: TranscriptScan,
}

impl TranscriptSource {
    /// Read a `.vtt` file. Invalid UTF-8 is replaced rather than rejected.
    pub fn load(path: &Path, scan: TranscriptScan) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| SplitError::io(path, e))?;
        Ok(Self {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            scan,
        })
    }
}

impl MarkerSource for TranscriptSource {
    fn markers(&self) -> Vec<RawMarker> {
        extract_from_transcript(&self.text, self.scan)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VTT: &str = "WEBVTT\n\
Kind: captions\n\
Language: en\n\
\n\
00:00:01.000 --> 00:00:04.000\n\
0:00 Welcome\n\
\n\
00:03:45.000 --> 00:03:48.000\n\
3:45 next up is the title track\n";

    #[test]
    fn test_full_scan_skips_cue_timings() {
        let markers = extract_from_transcript(VTT, TranscriptScan::Full);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].time.to_string(), "00:00:00");
        assert_eq!(markers[0].label, "Welcome");
        assert_eq!(markers[1].time.to_string(), "00:03:45");
    }

    #[test]
    fn test_first_line_scan_stops_early() {
        // The first surviving line is the blank separator after the header.
        assert!(extract_from_transcript(VTT, TranscriptScan::FirstLine).is_empty());

        let compact = "WEBVTT\n00:00:01.000 --> 00:00:02.000\n1:30 Song\n2:30 Other";
        let markers = extract_from_transcript(compact, TranscriptScan::FirstLine);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].label, "Song");
    }

    #[test]
    fn test_empty_transcript() {
        assert!(extract_from_transcript("", TranscriptScan::Full).is_empty());
    }

    #[test]
    fn test_transcript_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.en.vtt");
        fs::write(&path, VTT).unwrap();
        let markers = extract_from_transcript_file(&path, TranscriptScan::Full).unwrap();
        assert_eq!(markers.len(), 2);

        let missing = dir.path().join("missing.vtt");
        assert!(matches!(
            extract_from_transcript_file(&missing, TranscriptScan::Full),
            Err(SplitError::Io { .. })
        ));
    }

    #[test]
    fn test_load_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.vtt");
        let mut bytes = b"WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n2:15 Caf".to_vec();
        bytes.extend_from_slice(&[0xff, b'\n']);
        fs::write(&path, bytes).unwrap();

        let source = TranscriptSource::load(&path, TranscriptScan::Full).unwrap();
        assert_eq!(source.kind(), SourceKind::Transcript);
        let markers = source.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].time.to_string(), "00:02:15");
        assert_eq!(markers[0].label, "Caf\u{fffd}");
    }

    #[test]
    fn test_scan_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            scan: TranscriptScan,
        }
        let w: Wrapper = toml::from_str("scan = \"first-line\"").unwrap();
        assert_eq!(w.scan, TranscriptScan::FirstLine);
    }
}
