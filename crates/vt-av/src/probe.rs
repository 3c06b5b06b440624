//! Duration probing through ffprobe.
//!
//! Shells out to `ffprobe -v error -show_entries format=duration -of json`
//! and reads the container duration. Every failure (missing binary,
//! unreadable container, unparsable output) surfaces as
//! [`vt_core::Error::Probe`] carrying the tool's message verbatim.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::tools::ToolRegistry;

/// Determines the duration of a media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Duration of the file at `path`, in seconds.
    async fn probe_duration(&self, path: &Path) -> vt_core::Result<f64>;
}

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    tools: Arc<ToolRegistry>,
}

impl FfprobeProber {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProber {
    async fn probe_duration(&self, path: &Path) -> vt_core::Result<f64> {
        let mut cmd = self.tools.command("ffprobe").map_err(into_probe_error)?;
        cmd.args([
            "-v", "error",
            "-show_entries", "format=duration",
            "-of", "json",
        ]);
        cmd.arg(path.to_string_lossy().as_ref());

        let output = cmd.execute().await.map_err(into_probe_error)?;
        let duration = parse_duration_json(&output.stdout)?;

        tracing::debug!(path = %path.display(), duration, "probed duration");
        Ok(duration)
    }
}

fn into_probe_error(e: vt_core::Error) -> vt_core::Error {
    match e {
        vt_core::Error::Tool { message, .. } => vt_core::Error::Probe(message),
        other => vt_core::Error::Probe(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

fn parse_duration_json(stdout: &str) -> vt_core::Result<f64> {
    let ff: FfprobeOutput = serde_json::from_str(stdout)
        .map_err(|e| vt_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    let raw = ff
        .format
        .duration
        .ok_or_else(|| vt_core::Error::Probe("ffprobe reported no duration".into()))?;

    match raw.parse::<f64>() {
        Ok(d) if d.is_finite() && d >= 0.0 => Ok(d),
        _ => Err(vt_core::Error::Probe(format!(
            "ffprobe reported an invalid duration: {raw}"
        ))),
    }
}
