//! Photo discovery.
//!
//! Scans a directory for image files and maps them to source references
//! under a URL-style prefix. Any failure degrades to an empty list; the
//! Memories phase then shows its fallback notice.

use std::path::Path;

use tracing::{debug, warn};

/// Image extensions recognized by the scan (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif", "gif"];

/// Returns `true` if `file_name` ends in a recognized image extension.
#[must_use]
pub fn is_image(file_name: &str) -> bool {
    file_name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Lists images in `dir` as `"{url_prefix}/{file_name}"`, sorted by file name.
///
/// Errors (missing directory, permissions, unreadable entries) are logged
/// and swallowed.
#[must_use]
pub fn discover_photos(dir: &Path, url_prefix: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "photo directory unreadable; montage disabled");
            return Vec::new();
        }
    };

    let prefix = url_prefix.trim_end_matches('/');
    let mut names: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_image(name))
        .collect();
    names.sort();

    debug!(dir = %dir.display(), count = names.len(), "photos discovered");
    names
        .into_iter()
        .map(|name| format!("{prefix}/{name}"))
        .collect()
}
