pub mod config;
pub mod cuefile;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod pipeline;
pub mod probe;
pub mod project;
pub mod silence;
pub mod sources;
pub mod tags;
pub mod timestamp;
pub mod tools;
pub mod tracklist;
pub mod video_info;

pub use config::Config;
pub use error::{Result, SplitError};
pub use export::Emit;
pub use project::Project;
pub use silence::{
    pair_silence_spans, parse_silence_log, suggest_cuts_from_silence, CandidateCut,
    FfmpegSilenceDetector, SilenceDetector, SilenceEvent, SilenceSpan,
};
pub use sources::{extract_from_comments, extract_from_description, extract_from_transcript};
pub use timestamp::{find_timestamp, parse_timestamps, RawMarker, Timestamp};
pub use tools::Toolchain;
pub use tracklist::{normalize_track_ends, Track, TrackEntry};
