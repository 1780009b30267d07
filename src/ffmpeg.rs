//! Cutting the source recording into per-track files with ffmpeg.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SplitError};
use crate::tools::{check_status, Toolchain};
use crate::tracklist::Track;

pub const DEFAULT_FILENAME_TEMPLATE: &str = "{index:02} - {title}.{ext}";

/// Output encoding for split tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Flac,
    Mp3,
    /// Apple Lossless in an `.m4a` container
    Alac,
    Wav,
}

impl Codec {
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Flac => "flac",
            Codec::Mp3 => "mp3",
            Codec::Alac => "m4a",
            Codec::Wav => "wav",
        }
    }

    fn encoder_args(&self) -> &'static [&'static str] {
        match self {
            Codec::Flac => &["-c:a", "flac"],
            Codec::Mp3 => &["-c:a", "libmp3lame", "-b:a", "320k"],
            Codec::Alac => &["-c:a", "alac", "-movflags", "+faststart"],
            Codec::Wav => &["-c:a", "pcm_s16le"],
        }
    }
}

/// Drop characters that are invalid in file names on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\n' | '\r' | '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Expand `{index}`, `{index:0N}` (`{index:0Nd}` also accepted), `{title}`
/// and `{ext}`. Unknown placeholders are left untouched.
pub fn render_filename(template: &str, index: usize, title: &str, ext: &str) -> String {
    let mut out = String::with_capacity(template.len() + title.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match key {
            "index" => out.push_str(&index.to_string()),
            "title" => out.push_str(title),
            "ext" => out.push_str(ext),
            _ => match key.strip_prefix("index:").and_then(parse_width) {
                Some(width) => out.push_str(&format!("{:0width$}", index, width = width)),
                None => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            },
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn parse_width(spec: &str) -> Option<usize> {
    let spec = spec.strip_suffix('d').unwrap_or(spec);
    spec.parse().ok()
}

/// Cut one file per track from `src` into `outdir`.
///
/// # Returns
/// Written file paths in track order
pub fn cut_segments(
    src: &Path,
    tracks: &[Track],
    outdir: &Path,
    filename_template: &str,
    codec: Codec,
    tools: &Toolchain,
) -> Result<Vec<PathBuf>> {
    tools.require_ffmpeg()?;
    if !src.exists() {
        return Err(SplitError::NoSourceAudio(src.to_path_buf()));
    }
    fs::create_dir_all(outdir).map_err(|e| SplitError::io(outdir, e))?;

    let mut written = Vec::with_capacity(tracks.len());
    for track in tracks {
        let filename = render_filename(
            filename_template,
            track.index,
            &sanitize_filename(&track.title),
            codec.extension(),
        );
        let mut dest = outdir.join(filename);
        if codec == Codec::Alac {
            dest.set_extension("m4a");
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-hide_banner")
            .arg("-y")
            .arg("-i")
            .arg(src)
            .arg("-ss")
            .arg(track.start.to_string());
        if let Some(end) = track.end {
            cmd.arg("-to").arg(end.to_string());
        }
        cmd.args(codec.encoder_args()).arg(&dest);

        info!(track = track.index, dest = %dest.display(), "cutting segment");
        let output = cmd.output().map_err(|e| SplitError::io(src, e))?;
        check_status("ffmpeg", &output)?;
        written.push(dest);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_template() {
        assert_eq!(
            render_filename(DEFAULT_FILENAME_TEMPLATE, 3, "Song", "flac"),
            "03 - Song.flac"
        );
    }

    #[test]
    fn test_render_template_variants() {
        assert_eq!(render_filename("{index:03d}_{title}.{ext}", 7, "x", "mp3"), "007_x.mp3");
        assert_eq!(render_filename("{index}-{title}", 12, "y", "wav"), "12-y");
        assert_eq!(render_filename("{album}/{title}.{ext}", 1, "z", "m4a"), "{album}/z.m4a");
        assert_eq!(render_filename("broken {title", 1, "z", "m4a"), "broken {title");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(" AC/DC: Live? "), "ACDC Live");
        assert_eq!(sanitize_filename("plain"), "plain");
    }

    #[test]
    fn test_codec_extensions() {
        assert_eq!(Codec::Alac.extension(), "m4a");
        assert_eq!(Codec::default(), Codec::Flac);
        assert!(Codec::Mp3.encoder_args().contains(&"libmp3lame"));
    }

    #[test]
    fn test_cut_requires_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let result = cut_segments(
            &dir.path().join("source.m4a"),
            &[],
            dir.path(),
            DEFAULT_FILENAME_TEMPLATE,
            Codec::Flac,
            &Toolchain::default(),
        );
        assert!(matches!(result, Err(SplitError::ToolMissing("ffmpeg"))));
    }

    #[test]
    fn test_cut_requires_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = cut_segments(
            &dir.path().join("source.m4a"),
            &[],
            dir.path(),
            DEFAULT_FILENAME_TEMPLATE,
            Codec::Flac,
            &Toolchain { ffmpeg: true },
        );
        assert!(matches!(result, Err(SplitError::NoSourceAudio(_))));
    }
}
