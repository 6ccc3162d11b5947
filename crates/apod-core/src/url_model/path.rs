//! Filename extraction from URL path.

/// Extracts the last path segment from a URL for use as a filename hint.
/// Percent-encoded segments are decoded (`Moon%20Rise.jpg` → `Moon Rise.jpg`).
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment).ok()?.into_owned();
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            filename_from_url_path("https://apod.nasa.gov/apod/image/2312/a.jpg").as_deref(),
            Some("a.jpg")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
        assert_eq!(filename_from_url_path("https://example.com/a/.."), None);
    }

    #[test]
    fn with_query_and_trailing_slash() {
        assert_eq!(
            filename_from_url_path("https://example.com/file.jpg?token=abc").as_deref(),
            Some("file.jpg")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/dir/").as_deref(),
            Some("dir")
        );
    }

    #[test]
    fn percent_encoded() {
        assert_eq!(
            filename_from_url_path("https://example.com/Moon%20Rise+1.jpg").as_deref(),
            Some("Moon Rise+1.jpg")
        );
    }
}
