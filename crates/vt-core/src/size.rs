//! Human-readable size strings ("5mb", "1GB") to byte counts.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static SIZE_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(kb|mb|gb)$"));

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Parse `<integer><unit>` with unit one of `kb`, `mb`, `gb` (any case) into
/// bytes. Units are binary: `1kb` is 1024 bytes.
///
/// Surrounding whitespace is not tolerated. No upper bound is applied here;
/// magnitudes that overflow `u64` are rejected as malformed.
///
/// # Errors
///
/// Returns [`Error::InvalidSizeFormat`] for anything else.
pub fn parse_size(text: &str) -> Result<u64> {
    let lower = text.to_ascii_lowercase();
    let re = SIZE_RE
        .as_ref()
        .map_err(|e| Error::Internal(format!("size pattern: {e}")))?;
    let caps = re
        .captures(&lower)
        .ok_or_else(|| Error::InvalidSizeFormat(text.to_string()))?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|_| Error::InvalidSizeFormat(text.to_string()))?;
    let unit = match &caps[2] {
        "kb" => KB,
        "mb" => MB,
        _ => GB,
    };

    value
        .checked_mul(unit)
        .ok_or_else(|| Error::InvalidSizeFormat(text.to_string()))
}
