//! External tool availability.
//!
//! The binary checks `PATH` once at startup and passes the resulting
//! [`Toolchain`] to every operation that shells out.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Output;

use tracing::debug;

use crate::error::{Result, SplitError};

/// Which external tools can be invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toolchain {
    pub ffmpeg: bool,
}

impl Toolchain {
    /// Look the tools up in `PATH`.
    pub fn detect() -> Self {
        let tools = Toolchain {
            ffmpeg: find_in_path("ffmpeg").is_some(),
        };
        debug!(?tools, "detected external tools");
        tools
    }

    /// Fail with [`SplitError::ToolMissing`] unless ffmpeg is available.
    pub fn require_ffmpeg(&self) -> Result<()> {
        if self.ffmpeg {
            Ok(())
        } else {
            Err(SplitError::ToolMissing("ffmpeg"))
        }
    }
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Turn a non-zero exit into [`SplitError::ToolFailed`].
pub(crate) fn check_status(tool: &'static str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    // ffmpeg prints its banner first; the cause is at the end.
    let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
    Err(SplitError::ToolFailed {
        tool,
        status: output.status.to_string(),
        stderr: tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
    })
}
