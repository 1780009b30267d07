//! Silence-based track boundary hints.
//!
//! The pipeline has three pure steps plus one I/O step:
//! 1. **Parse**: scrape `silence_start` / `silence_end` events from a
//!    silencedetect log ([`parse_silence_log`])
//! 2. **Pair**: turn the event stream into closed spans ([`pair_silence_spans`])
//! 3. **Suggest**: keep spans at least `min_gap` long and emit their end as a
//!    candidate track start ([`suggest_cuts_from_silence`])
//!
//! Running the detector is behind the [`SilenceDetector`] trait so the
//! pure steps can be tested without ffmpeg.

use std::collections::HashSet;
use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SplitError};
use crate::timestamp::Timestamp;
use crate::tools::{check_status, Toolchain};

pub const DEFAULT_MIN_GAP: f64 = 1.5;
pub const DEFAULT_NOISE_DB: &str = "-30dB";
pub const DEFAULT_MIN_SILENCE: f64 = 0.8;

/// Label given to every silence-derived suggestion.
pub const CANDIDATE_LABEL: &str = "Candidate";

static SILENCE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"silence_start:\s*(?P<start>[0-9.]+)|silence_end:\s*(?P<end>[0-9.]+)")
        .expect("silence pattern is valid")
});

/// One line of detector output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SilenceEvent {
    Start(f64),
    End(f64),
}

/// A closed silence interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SilenceSpan {
    pub start: f64,
    pub end: f64,
}

impl SilenceSpan {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Suggested track start at the trailing edge of a long silence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateCut {
    pub time: Timestamp,
    pub label: String,
}

/// Scrape silence events from detector output, in log order.
///
/// Lines without an event are ignored. A captured value that is not a
/// valid number (`1.2.3`) is logged and skipped.
pub fn parse_silence_log(log: &str) -> Vec<SilenceEvent> {
    let mut events = Vec::new();
    for line in log.lines() {
        let Some(caps) = SILENCE_LINE.captures(line) else {
            continue;
        };
        let (raw, is_start) = match (caps.name("start"), caps.name("end")) {
            (Some(start), _) => (start.as_str(), true),
            (None, Some(end)) => (end.as_str(), false),
            (None, None) => continue,
        };
        match raw.parse::<f64>() {
            Ok(secs) if is_start => events.push(SilenceEvent::Start(secs)),
            Ok(secs) => events.push(SilenceEvent::End(secs)),
            Err(_) => warn!(line, "skipping unparsable silence value"),
        }
    }
    events
}

/// Pair start/end events into spans.
///
/// At most one span is open at a time. A new start replaces an unclosed
/// one, and an end with nothing open is dropped.
pub fn pair_silence_spans(events: &[SilenceEvent]) -> Vec<SilenceSpan> {
    let mut spans = Vec::new();
    let mut open: Option<f64> = None;
    for event in events {
        match *event {
            SilenceEvent::Start(start) => open = Some(start),
            SilenceEvent::End(end) => {
                if let Some(start) = open.take() {
                    spans.push(SilenceSpan { start, end });
                }
            }
        }
    }
    spans
}

/// Candidate cuts from spans lasting at least `min_gap` seconds.
///
/// The span end is truncated to whole seconds; later spans landing on an
/// already suggested second are dropped.
pub fn suggest_cuts_from_silence(spans: &[SilenceSpan], min_gap: f64) -> Vec<CandidateCut> {
    let mut seen = HashSet::new();
    let mut cuts = Vec::new();
    for span in spans {
        if span.duration() < min_gap {
            continue;
        }
        let time = Timestamp::from_secs_f64(span.end);
        if seen.insert(time) {
            cuts.push(CandidateCut {
                time,
                label: CANDIDATE_LABEL.to_string(),
            });
        }
    }
    debug!(spans = spans.len(), cuts = cuts.len(), min_gap, "silence candidates");
    cuts
}

/// Anything that can produce silence events for an audio file.
pub trait SilenceDetector {
    fn detect(&self, audio: &Path) -> Result<Vec<SilenceEvent>>;
}

/// Runs ffmpeg's `silencedetect` filter and parses its stderr.
#[derive(Debug, Clone)]
pub struct FfmpegSilenceDetector {
    pub noise_db: String,
    pub min_silence: f64,
    pub tools: Toolchain,
}

impl FfmpegSilenceDetector {
    pub fn new(tools: Toolchain) -> Self {
        Self {
            noise_db: DEFAULT_NOISE_DB.to_string(),
            min_silence: DEFAULT_MIN_SILENCE,
            tools,
        }
    }

    fn filter(&self) -> String {
        format!("silencedetect=noise={}:d={}", self.noise_db, self.min_silence)
    }
}

impl SilenceDetector for FfmpegSilenceDetector {
    fn detect(&self, audio: &Path) -> Result<Vec<SilenceEvent>> {
        self.tools.require_ffmpeg()?;
        info!(audio = %audio.display(), filter = %self.filter(), "running silence detection");

        let output = Command::new("ffmpeg")
            .arg("-hide_banner")
            .arg("-i")
            .arg(audio)
            .arg("-af")
            .arg(self.filter())
            .arg("-f")
            .arg("null")
            .arg("-")
            .output()
            .map_err(|e| SplitError::io(audio, e))?;
        check_status("ffmpeg", &output)?;

        // silencedetect reports on stderr
        let log = String::from_utf8_lossy(&output.stderr);
        Ok(parse_silence_log(&log))
    }
}

/// Detect silences in `audio` and turn them into candidate cuts.
pub fn suggest_cuts<D: SilenceDetector + ?Sized>(
    detector: &D,
    audio: &Path,
    min_gap: f64,
) -> Result<Vec<CandidateCut>> {
    let events = detector.detect(audio)?;
    let spans = pair_silence_spans(&events);
    Ok(suggest_cuts_from_silence(&spans, min_gap))
}
