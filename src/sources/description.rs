//! Tracklists typed into a video description.

use super::{MarkerSource, SourceKind};
use crate::timestamp::{parse_timestamps, RawMarker};

/// Extract markers from a description blob. Empty text yields no markers.
pub fn extract_from_description(description: &str) -> Vec<RawMarker> {
    if description.is_empty() {
        return Vec::new();
    }
    parse_timestamps(description)
}

pub struct DescriptionSource {
    pub text: String,
}

impl MarkerSource for DescriptionSource {
    fn markers(&self) -> Vec<RawMarker> {
        extract_from_description(&self.text)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Description
    }
}
