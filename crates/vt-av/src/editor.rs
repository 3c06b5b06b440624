//! Trim and concatenation through ffmpeg.
//!
//! Both operations re-encode (libx264 + aac) so the output is a single
//! well-formed MP4 regardless of keyframe positions or differing sources.
//! Concatenation uses ffmpeg's concat demuxer with a list file written to
//! a temporary directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// A `[start, end)` window in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl TrimRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the window in seconds.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Produces new media files from existing ones.
#[async_trait]
pub trait MediaEditor: Send + Sync {
    /// Write the `range` portion of `input` to `output`.
    async fn trim(&self, input: &Path, range: TrimRange, output: &Path) -> vt_core::Result<()>;

    /// Write `inputs`, played back-to-back in the given order, to `output`.
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> vt_core::Result<()>;
}

/// An editor backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEditor {
    tools: Arc<ToolRegistry>,
}

impl FfmpegEditor {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl MediaEditor for FfmpegEditor {
    async fn trim(&self, input: &Path, range: TrimRange, output: &Path) -> vt_core::Result<()> {
        ensure_parent(output).await?;

        let mut cmd = self.tools.command("ffmpeg")?;
        push_trim_args(&mut cmd, input, range, output);

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            start = range.start,
            end = range.end,
            "trimming"
        );
        cmd.execute().await?;
        Ok(())
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> vt_core::Result<()> {
        if inputs.is_empty() {
            return Err(vt_core::Error::Validation(
                "nothing to concatenate".into(),
            ));
        }
        ensure_parent(output).await?;

        // The demuxer resolves relative entries against the list file's
        // directory, so every entry must be absolute.
        let mut absolute = Vec::with_capacity(inputs.len());
        for input in inputs {
            absolute.push(tokio::fs::canonicalize(input).await?);
        }

        let temp_dir = tempfile::tempdir()?;
        let list_path = temp_dir.path().join("concat_list.txt");
        tokio::fs::write(&list_path, concat_list(&absolute)).await?;

        let mut cmd = self.tools.command("ffmpeg")?;
        push_concat_args(&mut cmd, &list_path, output);

        tracing::info!(
            inputs = inputs.len(),
            output = %output.display(),
            "concatenating"
        );
        cmd.execute().await?;
        Ok(())
    }
}

async fn ensure_parent(output: &Path) -> vt_core::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

fn push_encode_args(cmd: &mut ToolCommand) {
    cmd.args([
        "-c:v", "libx264",
        "-preset", "veryfast",
        "-crf", "20",
        "-c:a", "aac",
        "-avoid_negative_ts", "make_zero",
    ]);
}

fn push_trim_args(cmd: &mut ToolCommand, input: &Path, range: TrimRange, output: &Path) {
    cmd.args(["-y", "-hide_banner", "-loglevel", "error"]);
    cmd.arg("-ss").arg(format!("{:.3}", range.start));
    cmd.arg("-i").arg(input.to_string_lossy().as_ref());
    cmd.arg("-t").arg(format!("{:.3}", range.length()));
    push_encode_args(cmd);
    cmd.arg(output.to_string_lossy().as_ref());
}

fn push_concat_args(cmd: &mut ToolCommand, list: &Path, output: &Path) {
    cmd.args(["-y", "-hide_banner", "-loglevel", "error"]);
    cmd.args(["-f", "concat", "-safe", "0"]);
    cmd.arg("-i").arg(list.to_string_lossy().as_ref());
    push_encode_args(cmd);
    cmd.arg(output.to_string_lossy().as_ref());
}

/// Render a concat demuxer list. Single quotes are closed, escaped, and
/// reopened.
fn concat_list(inputs: &[PathBuf]) -> String {
    let mut list = String::new();
    for input in inputs {
        let escaped = input.to_string_lossy().replace('\'', r"'\''");
        let _ = writeln!(list, "file '{escaped}'");
    }
    list
}
