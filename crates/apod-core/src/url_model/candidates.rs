//! Collision-free filename variants: `pic.jpg`, `pic_1.jpg`, `pic_2.jpg`, ...

use super::sanitize::{truncate_at_boundary, NAME_MAX};

/// Yields `name` first, then numbered variants with the counter inserted
/// before the extension. Every yielded name stays within `NAME_MAX` bytes.
pub fn candidate_names(name: &str) -> impl Iterator<Item = String> + '_ {
    let (stem, ext) = split_extension(name);
    std::iter::once(name.to_string()).chain((1u32..).map(move |n| {
        let suffix = format!("_{}{}", n, ext);
        let room = NAME_MAX.saturating_sub(suffix.len());
        format!("{}{}", truncate_at_boundary(stem, room), suffix)
    }))
}

/// `pic.jpg` → (`pic`, `.jpg`); names without a dot, or with only a leading
/// dot, have no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}
