//! Folder-name slug helper
//!
//! Mirrors the storage service's own slugify rule so paths generated on the
//! client match what the service would produce for the same display name.

/// Slugify a display name into a storage-safe relative path segment
///
/// Lowercases, keeps alphanumeric runs and joins them with single dashes.
/// Leading and trailing separators are dropped.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}
