//! Tracklists posted as viewer comments.
//!
//! Fetching the comments is the caller's job; this module only joins and
//! scans them.

use super::{MarkerSource, SourceKind};
use crate::timestamp::{parse_timestamps, RawMarker};

/// Join comments with newlines and scan the result as one text.
pub fn extract_from_comments<S: AsRef<str>>(comments: &[S]) -> Vec<RawMarker> {
    if comments.is_empty() {
        return Vec::new();
    }
    let blob = comments
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    parse_timestamps(&blob)
}

pub struct CommentSource {
    pub comments: Vec<String>,
}

impl MarkerSource for CommentSource {
    fn markers(&self) -> Vec<RawMarker> {
        extract_from_comments(&self.comments)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Comments
    }
}
