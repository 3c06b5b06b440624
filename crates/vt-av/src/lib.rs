//! # vt-av
//!
//! The external media-processing capability: everything that shells out to
//! ffmpeg or ffprobe lives here.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support; the child process is killed if the caller stops waiting.
//! - **Probing** ([`MediaProbe`], [`FfprobeProber`]) -- duration of a file.
//! - **Editing** ([`MediaEditor`], [`FfmpegEditor`]) -- time-bounded trim and
//!   ordered concatenation into a new file.

pub mod command;
pub mod editor;
pub mod probe;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use editor::{FfmpegEditor, MediaEditor, TrimRange};
pub use probe::{FfprobeProber, MediaProbe};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
