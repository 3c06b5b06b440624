//! Names and storage locators for new artifacts.
//!
//! Every generated locator carries a random component so concurrent
//! operations never write to the same file.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Display name given to every merged artifact.
pub const MERGED_NAME: &str = "merged_video.mp4";

const DEFAULT_EXT: &str = "mp4";

/// Display name of a trim of `source`.
pub fn trimmed_name(source: &str) -> String {
    format!("trimmed_{source}")
}

/// Where an upload named `original_name` is stored: `<dir>/<uuid><ext>`.
pub fn upload_locator(dir: &Path, original_name: &str) -> PathBuf {
    let ext = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    dir.join(format!("{}{ext}", Uuid::new_v4()))
}

/// Sibling of `source`: `<stem>_trimmed_<tag><ext>`.
pub fn trimmed_locator(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".into());
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXT.into());
    source.with_file_name(format!("{stem}_trimmed_{}.{ext}", short_tag()))
}

/// `<dir>/merged_<unix millis>_<tag>.mp4`.
pub fn merged_locator(dir: &Path) -> PathBuf {
    let millis = chrono::Utc::now().timestamp_millis();
    dir.join(format!("merged_{millis}_{}.{DEFAULT_EXT}", short_tag()))
}

/// A locator as stored in the catalog.
pub fn locator_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn short_tag() -> String {
    let mut s = Uuid::new_v4().simple().to_string();
    s.truncate(8);
    s
}
