//! Size and duration policy applied to incoming uploads.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::size::parse_size;

/// Limits an upload must satisfy before it becomes a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Maximum size as a human-readable string, e.g. "20mb".
    pub max_size: String,
    /// Minimum duration in whole seconds (inclusive).
    pub min_duration_secs: u32,
    /// Maximum duration in whole seconds (inclusive).
    pub max_duration_secs: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size: "20mb".into(),
            min_duration_secs: 5,
            max_duration_secs: 60,
        }
    }
}

impl UploadPolicy {
    /// Maximum upload size in bytes.
    pub fn max_bytes(&self) -> Result<u64> {
        parse_size(&self.max_size)
    }

    /// Build a policy from optional caller overrides, falling back to `base`
    /// for every absent field.
    ///
    /// Durations arrive as raw text (query parameters) and must be
    /// non-negative integers.
    pub fn with_overrides(
        base: &UploadPolicy,
        max_size: Option<&str>,
        min_duration: Option<&str>,
        max_duration: Option<&str>,
    ) -> Result<Self> {
        let policy = Self {
            max_size: max_size.map_or_else(|| base.max_size.clone(), str::to_string),
            min_duration_secs: parse_secs("minDuration", min_duration)?
                .unwrap_or(base.min_duration_secs),
            max_duration_secs: parse_secs("maxDuration", max_duration)?
                .unwrap_or(base.max_duration_secs),
        };

        if policy.min_duration_secs > policy.max_duration_secs {
            return Err(Error::Validation(
                "minDuration must not be greater than maxDuration.".into(),
            ));
        }

        Ok(policy)
    }

    /// Whether `duration` lies within `[min_duration_secs, max_duration_secs]`.
    pub fn duration_allowed(&self, duration: f64) -> bool {
        duration >= f64::from(self.min_duration_secs)
            && duration <= f64::from(self.max_duration_secs)
    }
}

fn parse_secs(field: &str, raw: Option<&str>) -> Result<Option<u32>> {
    raw.map(|s| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| Error::Validation(format!("{field} must be a whole number of seconds.")))
    })
    .transpose()
}
