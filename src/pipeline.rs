//! End-to-end operations behind the command-line subcommands.
//!
//! Tracklist resolution tries, in order:
//! 1. the explicit `[[tracklist]]` of the project file
//! 2. each preferred text source; the first that yields markers wins
//! 3. silence candidates, when enabled and ffmpeg is available
//!
//! The result is normalized against the source duration when it is known.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::cuefile::{generate_cue_file, write_cue_file};
use crate::error::{Result, SplitError};
use crate::export::{read_tracklist_json, render, tracks_to_csv, tracks_to_json, write_text, Emit};
use crate::ffmpeg::cut_segments;
use crate::probe::probe_duration;
use crate::project::Project;
use crate::silence::{suggest_cuts, FfmpegSilenceDetector, SilenceDetector};
use crate::sources::{
    CommentSource, DescriptionSource, MarkerSource, SourceKind, TranscriptSource,
};
use crate::tags::apply_tags;
use crate::timestamp::Timestamp;
use crate::tools::Toolchain;
use crate::tracklist::{normalize_track_ends, Track, TrackEntry};
use crate::video_info::VideoInfo;

/// Where a resolved tracklist came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracklistOrigin {
    Project,
    Text(SourceKind),
    Silence,
    /// Nothing found anywhere
    Empty,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub tracks: Vec<Track>,
    pub origin: TracklistOrigin,
}

fn build_source(
    kind: SourceKind,
    project: &Project,
    info: &VideoInfo,
) -> Result<Option<Box<dyn MarkerSource>>> {
    let source: Box<dyn MarkerSource> = match kind {
        SourceKind::Description => Box::new(DescriptionSource {
            text: info.description().to_string(),
        }),
        SourceKind::Comments => Box::new(CommentSource {
            comments: info.comment_texts(),
        }),
        SourceKind::Transcript => {
            let Some(path) = project.transcript_path().filter(|p| p.exists()) else {
                return Ok(None);
            };
            Box::new(TranscriptSource::load(&path, project.transcript_scan())?)
        }
    };
    Ok(Some(source))
}

/// Gather raw entries for `project` without normalizing them.
pub fn collect_entries(
    project: &Project,
    info: &VideoInfo,
    detector: Option<&dyn SilenceDetector>,
) -> Result<(Vec<TrackEntry>, TracklistOrigin)> {
    if let Some(entries) = project.explicit_tracklist() {
        info!(count = entries.len(), "using tracklist from project file");
        return Ok((entries.to_vec(), TracklistOrigin::Project));
    }

    for kind in project.preferred_sources() {
        let Some(source) = build_source(kind, project, info)? else {
            continue;
        };
        let markers = source.markers();
        info!(source = ?source.kind(), count = markers.len(), "scanned text source");
        if !markers.is_empty() {
            let entries = markers.into_iter().map(TrackEntry::from).collect();
            return Ok((entries, TracklistOrigin::Text(kind)));
        }
    }

    let audio = project.source_audio_path();
    match detector {
        Some(detector) if project.fallback_silence() && audio.exists() => {
            let cuts = suggest_cuts(detector, &audio, project.min_gap())?;
            info!(count = cuts.len(), "using silence candidates");
            let mut entries: Vec<TrackEntry> = Vec::with_capacity(cuts.len() + 1);
            if !cuts.iter().any(|c| c.time == Timestamp::ZERO) {
                entries.push(TrackEntry::new(Timestamp::ZERO.to_string()));
            }
            entries.extend(cuts.into_iter().map(TrackEntry::from));
            Ok((entries, TracklistOrigin::Silence))
        }
        _ => {
            warn!("no timestamps found in any source");
            Ok((Vec::new(), TracklistOrigin::Empty))
        }
    }
}

/// Total duration: probed from the source audio, else the duration in the
/// video info, else unknown.
pub fn total_duration(project: &Project, info: &VideoInfo) -> Option<f64> {
    let audio = project.source_audio_path();
    if audio.exists() {
        match probe_duration(&audio) {
            Ok(seconds) => return Some(seconds),
            Err(e) => warn!(error = %e, "falling back to reported duration"),
        }
    }
    info.duration
}

/// Resolve the final tracklist for `project`.
pub fn resolve_tracklist(project: &Project, tools: &Toolchain) -> Result<Resolution> {
    info!(project = %project.slug(), url = project.url(), "resolving tracklist");
    let info = VideoInfo::load(&project.info_json_path())?;
    let detector = tools.ffmpeg.then(|| FfmpegSilenceDetector {
        noise_db: project.noise_db(),
        min_silence: project.min_silence(),
        tools: *tools,
    });
    let detector_ref = detector.as_ref().map(|d| d as &dyn SilenceDetector);

    let (entries, origin) = collect_entries(project, &info, detector_ref)?;
    let tracks = normalize_track_ends(entries, total_duration(project, &info))?;
    Ok(Resolution { tracks, origin })
}

/// Write `tracklist.json`, `tracklist.csv` and `album.cue` into the project.
pub fn write_tracklist_files(project: &Project, tracks: &[Track]) -> Result<()> {
    write_text(&project.tracklist_json_path(), &tracks_to_json(tracks)?)?;
    write_text(&project.tracklist_csv_path(), &tracks_to_csv(tracks))?;
    let cue = generate_cue_file(&project.source_audio_path(), tracks);
    write_cue_file(project.dir(), &cue)?;
    Ok(())
}

/// Resolve, export, cut and tag.
pub fn run(project: &Project, tools: &Toolchain) -> Result<Vec<PathBuf>> {
    let resolution = resolve_tracklist(project, tools)?;
    write_tracklist_files(project, &resolution.tracks)?;

    let files = cut_segments(
        &project.source_audio_path(),
        &resolution.tracks,
        &project.outdir(),
        &project.filename_template(),
        project.codec(),
        tools,
    )?;
    apply_tags(&files, project.metadata(), project.cover().as_deref(), tools)?;
    Ok(files)
}

/// Resolve and render without touching audio.
pub fn detect(project: &Project, tools: &Toolchain, emit: Emit) -> Result<String> {
    let resolution = resolve_tracklist(project, tools)?;
    info!(origin = ?resolution.origin, tracks = resolution.tracks.len(), "resolved tracklist");
    render(&resolution.tracks, emit, &project.source_audio_path())
}

/// Cut using a previously written `tracklist.json`.
pub fn split(project: &Project, tools: &Toolchain) -> Result<Vec<PathBuf>> {
    let audio = project.source_audio_path();
    if !audio.exists() {
        return Err(SplitError::NoSourceAudio(audio));
    }
    let tracks = read_tracklist_json(&project.tracklist_json_path())?;
    cut_segments(
        &audio,
        &tracks,
        &project.outdir(),
        &project.filename_template(),
        project.codec(),
        tools,
    )
}

/// Output files for the project's codec, sorted by name.
pub fn output_files(project: &Project) -> Result<Vec<PathBuf>> {
    let outdir = project.outdir();
    if !outdir.exists() {
        return Ok(Vec::new());
    }
    let ext = project.codec().extension();
    let mut files: Vec<PathBuf> = fs::read_dir(&outdir)
        .map_err(|e| SplitError::io(&outdir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    Ok(files)
}

/// Re-apply album metadata to existing output files.
pub fn tag(project: &Project, tools: &Toolchain) -> Result<Vec<PathBuf>> {
    let files = output_files(project)?;
    if files.is_empty() {
        info!(outdir = %project.outdir().display(), "no files found to tag");
        return Ok(files);
    }
    apply_tags(&files, project.metadata(), project.cover().as_deref(), tools)?;
    Ok(files)
}
