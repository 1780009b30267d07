//! Tracklist normalization.
//!
//! Raw entries come from a text source, the silence analyzer or a project
//! file. They may be unordered and usually lack end times. [`normalize_track_ends`]
//! sorts them, closes every gap, and numbers the result so the cutter and
//! tagger can consume it directly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SplitError};
use crate::silence::CandidateCut;
use crate::timestamp::{RawMarker, Timestamp};

/// A partial track as supplied by a source or typed by the user.
///
/// `title: None` means the title was never given, which is different from
/// an explicitly empty title: only the former receives a `Track {n}`
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackEntry {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TrackEntry {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }
}

impl From<RawMarker> for TrackEntry {
    fn from(marker: RawMarker) -> Self {
        TrackEntry::new(marker.time.to_string()).with_title(marker.label)
    }
}

/// Silence candidates become untitled starts so the normalizer numbers them.
impl From<CandidateCut> for TrackEntry {
    fn from(cut: CandidateCut) -> Self {
        TrackEntry::new(cut.time.to_string())
    }
}

/// A finalized, numbered segment of the source recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// 1-based position in the sorted list
    pub index: usize,
    pub title: String,
    pub start: Timestamp,
    /// Absent only on the last track when the total duration is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
}

/// Sort entries, infer missing ends and default missing titles.
///
/// * Entries are stably sorted by start, so equal starts keep input order.
/// * A missing or empty end becomes the next entry's start; on the last
///   entry it becomes `total_duration` truncated to whole seconds, or stays
///   absent when no duration is known.
/// * A title that was never set becomes `Track {n}` (1-based sorted position).
///
/// Any start or end that is not `H:M:S` aborts with
/// [`SplitError::MalformedTimestamp`]. An empty input is not an error.
pub fn normalize_track_ends(
    entries: Vec<TrackEntry>,
    total_duration: Option<f64>,
) -> Result<Vec<Track>> {
    if let Some(total) = total_duration {
        if !total.is_finite() || total < 0.0 {
            return Err(SplitError::InvalidDuration(total));
        }
    }

    let mut parsed = entries
        .into_iter()
        .map(|entry| -> Result<(Timestamp, TrackEntry)> {
            Ok((entry.start.parse()?, entry))
        })
        .collect::<Result<Vec<_>>>()?;
    parsed.sort_by_key(|(start, _)| *start);

    let starts: Vec<Timestamp> = parsed.iter().map(|(start, _)| *start).collect();
    let count = parsed.len();
    let mut tracks = Vec::with_capacity(count);

    for (i, (start, entry)) in parsed.into_iter().enumerate() {
        let end = match entry.end.as_deref() {
            Some(end) if !end.is_empty() => Some(end.parse::<Timestamp>()?),
            _ if i + 1 < count => Some(starts[i + 1]),
            _ => total_duration.map(Timestamp::from_secs_f64),
        };
        let index = i + 1;
        let title = entry.title.unwrap_or_else(|| format!("Track {}", index));
        tracks.push(Track {
            index,
            title,
            start,
            end,
        });
    }

    debug!(tracks = tracks.len(), ?total_duration, "normalized tracklist");
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_description_scenario_without_duration() {
        let entries = vec![
            TrackEntry::new("00:00:00").with_title("Intro"),
            TrackEntry::new("00:03:45").with_title("Second Song"),
            TrackEntry::new("01:02:10").with_title("Outro"),
        ];
        let tracks = normalize_track_ends(entries, None).unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].end, Some(ts("00:03:45")));
        assert_eq!(tracks[1].end, Some(ts("01:02:10")));
        assert_eq!(tracks[2].title, "Outro");
        assert_eq!(tracks[2].end, None);
    }

    #[test]
    fn test_last_end_from_total_duration() {
        let entries = vec![TrackEntry::new("00:00:00"), TrackEntry::new("00:02:00")];
        let tracks = normalize_track_ends(entries, Some(3725.9)).unwrap();
        assert_eq!(tracks[1].end.unwrap().to_string(), "01:02:05");

        let tracks = normalize_track_ends(vec![TrackEntry::new("0:0:0")], Some(0.0)).unwrap();
        assert_eq!(tracks[0].end, Some(Timestamp::ZERO));
    }

    #[test]
    fn test_sorting_and_indices() {
        let entries = vec![
            TrackEntry::new("00:05:00").with_title("C"),
            TrackEntry::new("00:00:00").with_title("A"),
            TrackEntry::new("00:02:30").with_title("B"),
        ];
        let tracks = normalize_track_ends(entries, Some(600.0)).unwrap();
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        let indices: Vec<usize> = tracks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let entries = vec![
            TrackEntry::new("00:10:00").with_title("first"),
            TrackEntry::new("00:10:00").with_title("second"),
        ];
        let tracks = normalize_track_ends(entries, None).unwrap();
        assert_eq!(tracks[0].title, "first");
        assert_eq!(tracks[0].index, 1);
        assert_eq!(tracks[1].title, "second");
        assert_eq!(tracks[1].index, 2);
        assert_eq!(tracks[0].end, Some(ts("00:10:00")));
    }

    #[test]
    fn test_explicit_end_kept_and_empty_end_inferred() {
        let entries = vec![
            TrackEntry::new("00:00:00").with_end("0:1:30"),
            TrackEntry::new("00:02:00").with_end(""),
            TrackEntry::new("00:04:00"),
        ];
        let tracks = normalize_track_ends(entries, None).unwrap();
        assert_eq!(tracks[0].end, Some(ts("00:01:30")));
        assert_eq!(tracks[1].end, Some(ts("00:04:00")));
    }

    #[test]
    fn test_title_default_only_when_absent() {
        let entries = vec![
            TrackEntry::new("00:00:00").with_title(""),
            TrackEntry::new("00:01:00"),
        ];
        let tracks = normalize_track_ends(entries, None).unwrap();
        assert_eq!(tracks[0].title, "");
        assert_eq!(tracks[1].title, "Track 2");
    }

    #[test]
    fn test_malformed_timestamps() {
        let bad_start = vec![TrackEntry::new("3:45")];
        assert!(matches!(
            normalize_track_ends(bad_start, None),
            Err(SplitError::MalformedTimestamp(s)) if s == "3:45"
        ));

        let bad_end = vec![TrackEntry::new("00:00:00").with_end("soon")];
        assert!(matches!(
            normalize_track_ends(bad_end, None),
            Err(SplitError::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn test_overflowing_start_is_malformed() {
        let huge = vec![TrackEntry::new("18446744073709551615:0:0")];
        assert!(matches!(
            normalize_track_ends(huge, None),
            Err(SplitError::MalformedTimestamp(s)) if s == "18446744073709551615:0:0"
        ));
    }

    #[test]
    fn test_invalid_duration() {
        let entries = vec![TrackEntry::new("00:00:00")];
        assert!(matches!(
            normalize_track_ends(entries, Some(-1.0)),
            Err(SplitError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_track_ends(Vec::new(), Some(100.0)).unwrap().is_empty());
    }

    #[test]
    fn test_entry_from_toml_distinguishes_empty_title() {
        #[derive(Deserialize)]
        struct Wrapper {
            tracklist: Vec<TrackEntry>,
        }
        let w: Wrapper = toml::from_str(
            "[[tracklist]]\nstart = \"00:00:00\"\ntitle = \"\"\n\n[[tracklist]]\nstart = \"00:01:00\"\n",
        )
        .unwrap();
        assert_eq!(w.tracklist[0].title, Some(String::new()));
        assert_eq!(w.tracklist[1].title, None);
    }

    #[test]
    fn test_track_json_shape() {
        let track = Track {
            index: 1,
            title: "Intro".to_string(),
            start: ts("00:00:00"),
            end: None,
        };
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["start"], "00:00:00");
        assert!(json.get("end").is_none());
    }

    proptest! {
        #[test]
        fn prop_output_sorted_and_gap_free(
            starts in proptest::collection::vec(0u64..20_000, 1..30),
            total in proptest::option::of(20_000.0f64..30_000.0),
        ) {
            let entries: Vec<TrackEntry> = starts
                .iter()
                .map(|&s| TrackEntry::new(Timestamp::from_secs(s).to_string()))
                .collect();
            let tracks = normalize_track_ends(entries, total).unwrap();

            prop_assert_eq!(tracks.len(), starts.len());
            for pair in tracks.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
                prop_assert_eq!(pair[0].end, Some(pair[1].start));
            }
            for (i, track) in tracks.iter().enumerate() {
                prop_assert_eq!(track.index, i + 1);
            }
            let last = tracks.last().unwrap();
            prop_assert_eq!(last.end, total.map(Timestamp::from_secs_f64));
        }
    }
}
