//! Split a long recording into tracks using timestamps found in its
//! description, comments or transcript.

use std::path::{Path, PathBuf};

use albumsplit::ffmpeg::Codec;
use albumsplit::pipeline;
use albumsplit::silence::{suggest_cuts, DEFAULT_MIN_GAP};
use albumsplit::sources::TranscriptScan;
use albumsplit::{Config, Emit, FfmpegSilenceDetector, Project, Toolchain};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Smart album splitter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output codec (overrides project and saved defaults)
    #[arg(long, global = true, value_parser = parse_codec)]
    codec: Option<Codec>,

    /// Minimum silence length in seconds for a candidate cut
    #[arg(long, global = true)]
    min_gap: Option<f64>,

    /// Transcript scan mode: full or first-line
    #[arg(long, global = true, value_parser = parse_scan)]
    transcript_scan: Option<TranscriptScan>,

    /// Save the override flags above to ~/.state/albumsplit/defaults.toml
    #[arg(long, global = true)]
    save_defaults: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full pipeline: detect tracklist, write exports, split, tag
    Run { project: PathBuf },
    /// Detect timestamps and print or export the tracklist
    Detect {
        project: PathBuf,
        #[arg(long, value_enum, default_value_t = Emit::Json)]
        emit: Emit,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Split audio using a previously written tracklist.json
    Split { project: PathBuf },
    /// Reapply album metadata and cover art
    Tag { project: PathBuf },
    /// Print candidate cuts found from silences in an audio file
    Silence {
        audio: PathBuf,
        /// Noise floor, e.g. -30dB
        #[arg(long)]
        noise: Option<String>,
        /// Shortest silence ffmpeg reports, in seconds
        #[arg(long)]
        min_silence: Option<f64>,
    },
    /// Show saved defaults
    Defaults,
}

fn parse_codec(s: &str) -> Result<Codec, String> {
    match s {
        "flac" => Ok(Codec::Flac),
        "mp3" => Ok(Codec::Mp3),
        "alac" => Ok(Codec::Alac),
        "wav" => Ok(Codec::Wav),
        _ => Err(format!("unknown codec '{}' (flac, mp3, alac, wav)", s)),
    }
}

fn parse_scan(s: &str) -> Result<TranscriptScan, String> {
    match s {
        "full" => Ok(TranscriptScan::Full),
        "first-line" => Ok(TranscriptScan::FirstLine),
        _ => Err(format!("unknown transcript scan '{}' (full, first-line)", s)),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "albumsplit=debug,info" } else { "albumsplit=info,warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_project(path: &Path, defaults: &Config, overrides: &Config) -> Result<Project> {
    let project = Project::load(path)
        .with_context(|| format!("loading project {}", path.display()))?;
    Ok(project
        .with_defaults(defaults.clone())
        .with_overrides(overrides.clone()))
}

fn print_written(files: &[PathBuf]) {
    println!("Wrote:");
    for file in files {
        println!("  {}", file.display());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let saved = Config::load().context("loading saved defaults")?;
    let overrides = Config {
        codec: cli.codec,
        min_gap: cli.min_gap,
        transcript_scan: cli.transcript_scan,
        ..Config::new()
    };
    if cli.save_defaults {
        let mut merged = saved.clone();
        merged.merge(&overrides);
        merged.save().context("saving defaults")?;
        merged.print("Saved defaults");
    }

    let tools = Toolchain::detect();

    match &cli.command {
        Command::Run { project } => {
            let project = load_project(project, &saved, &overrides)?;
            let files = pipeline::run(&project, &tools)?;
            print_written(&files);
        }
        Command::Detect { project, emit, out } => {
            let project = load_project(project, &saved, &overrides)?;
            let rendered = pipeline::detect(&project, &tools, *emit)?;
            match out {
                Some(out) => {
                    albumsplit::export::write_text(out, &rendered)?;
                    println!("Wrote {}", out.display());
                }
                None => print!("{}", rendered),
            }
        }
        Command::Split { project } => {
            let project = load_project(project, &saved, &overrides)?;
            let files = pipeline::split(&project, &tools)?;
            print_written(&files);
        }
        Command::Tag { project } => {
            let project = load_project(project, &saved, &overrides)?;
            let files = pipeline::tag(&project, &tools)?;
            if files.is_empty() {
                println!("No files found");
            } else {
                print_written(&files);
            }
        }
        Command::Silence {
            audio,
            noise,
            min_silence,
        } => {
            let mut detector = FfmpegSilenceDetector::new(tools);
            if let Some(noise) = noise.clone().or_else(|| saved.noise_db.clone()) {
                detector.noise_db = noise;
            }
            if let Some(min_silence) = min_silence.or(saved.min_silence) {
                detector.min_silence = min_silence;
            }
            let min_gap = overrides.min_gap.or(saved.min_gap).unwrap_or(DEFAULT_MIN_GAP);
            let cuts = suggest_cuts(&detector, audio, min_gap)?;
            for cut in cuts {
                println!("{}  {}", cut.time, cut.label);
            }
        }
        Command::Defaults => saved.print("Saved defaults"),
    }

    Ok(())
}
