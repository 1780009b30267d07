//! Text sources that can carry a tracklist.
//!
//! Each source reduces its input to lines and hands them to
//! [`parse_timestamps`](crate::timestamp::parse_timestamps):
//! - Video description (one multi-line blob)
//! - Viewer comments (joined with newlines)
//! - Transcript cues (WebVTT text, timing and header lines removed)

pub mod comments;
pub mod description;
pub mod transcript;

use serde::{Deserialize, Serialize};

use crate::timestamp::RawMarker;

pub use comments::{extract_from_comments, CommentSource};
pub use description::{extract_from_description, DescriptionSource};
pub use transcript::{
    extract_from_transcript, extract_from_transcript_file, TranscriptScan, TranscriptSource,
};

/// Which kind of text a tracklist was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Description,
    Comments,
    Transcript,
}

impl SourceKind {
    /// Default lookup order.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Description,
        SourceKind::Comments,
        SourceKind::Transcript,
    ];
}

/// Common trait for all tracklist text sources
pub trait MarkerSource {
    /// Extract markers in encounter order. Never fails; no timestamps
    /// means an empty list.
    fn markers(&self) -> Vec<RawMarker>;

    fn kind(&self) -> SourceKind;
}
