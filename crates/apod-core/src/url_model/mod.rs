//! Filename derivation for stored images.
//!
//! Derives safe local filenames from image URLs or caller-supplied names,
//! sanitized for Linux filesystems, and enumerates collision-free variants.

mod candidates;
mod path;
mod sanitize;

pub use candidates::candidate_names;
pub use path::filename_from_url_path;
pub use sanitize::{sanitize_filename_for_linux, NAME_MAX};

/// Fallback when neither the URL nor the suggested name yields anything usable.
pub const DEFAULT_FILENAME: &str = "apod-image";

/// Derives the suggested filename for an image URL (its last path segment).
///
/// # Examples
///
/// - `derive_filename("https://apod.nasa.gov/apod/image/2401/Orion_Hubble_960.jpg")` → `"Orion_Hubble_960.jpg"`
/// - `derive_filename("https://apod.nasa.gov/")` → `"apod-image"`
pub fn derive_filename(url: &str) -> String {
    match filename_from_url_path(url) {
        Some(raw) => storage_filename(&raw),
        None => DEFAULT_FILENAME.to_string(),
    }
}

/// Turns a caller-supplied name into a single safe path component.
/// Directory parts are never honored: `../../etc/passwd` becomes `etc_passwd`.
pub fn storage_filename(suggested: &str) -> String {
    let sanitized = sanitize_filename_for_linux(suggested);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_filename_from_image_url() {
        assert_eq!(
            derive_filename("https://apod.nasa.gov/apod/image/2401/Orion_Hubble_960.jpg"),
            "Orion_Hubble_960.jpg"
        );
        assert_eq!(
            derive_filename("https://apod.nasa.gov/apod/image/2401/pic.png?x=1"),
            "pic.png"
        );
    }

    #[test]
    fn derive_filename_empty_url_path_fallback() {
        assert_eq!(derive_filename("https://apod.nasa.gov/"), DEFAULT_FILENAME);
        assert_eq!(derive_filename("not a url"), DEFAULT_FILENAME);
    }

    #[test]
    fn storage_filename_strips_directories() {
        assert_eq!(storage_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(storage_filename("pic.jpg"), "pic.jpg");
    }

    #[test]
    fn storage_filename_reserved_and_empty() {
        assert_eq!(storage_filename(""), DEFAULT_FILENAME);
        assert_eq!(storage_filename(".."), DEFAULT_FILENAME);
        assert_eq!(storage_filename("  . "), DEFAULT_FILENAME);
    }
}
