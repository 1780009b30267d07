//! Source duration probing.

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{Result, SplitError};

/// Length of the first audio track in seconds, read from container
/// headers without decoding.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let file = File::open(path).map_err(|e| SplitError::io(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SplitError::Probe(format!("{}: {}", path.display(), e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SplitError::Probe(format!("{}: no audio tracks found", path.display())))?;

    let params = &track.codec_params;
    let n_frames = params
        .n_frames
        .ok_or_else(|| SplitError::Probe(format!("{}: frame count unknown", path.display())))?;

    let seconds = if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(n_frames);
        time.seconds as f64 + time.frac
    } else if let Some(rate) = params.sample_rate {
        n_frames as f64 / rate as f64
    } else {
        return Err(SplitError::Probe(format!(
            "{}: neither time base nor sample rate known",
            path.display()
        )));
    };

    debug!(path = %path.display(), seconds, "probed duration");
    Ok(seconds)
}
