use percent_encoding::percent_decode_str;
use url::Url;

const FALLBACK_NAME: &str = "download";

/// Derives a destination file name from a request URL.
///
/// Tried in order: the first value of the form-encoded query string (or the
/// key itself when it has no value), the last non-empty path segment, the
/// host. Whatever is picked is reduced to a single path component so it
/// cannot escape the download directory.
///
/// ```
/// use rget_fetch::core::resolve_filename;
/// use url::Url;
///
/// let url = Url::parse("http://video.test/?file=clip.mp4").unwrap();
/// assert_eq!(resolve_filename(&url), "clip.mp4");
/// ```
pub fn resolve_filename(url: &Url) -> String {
    if let Some((key, value)) = url.query_pairs().next() {
        let candidate = if value.is_empty() { key } else { value };
        if let Some(name) = sanitize(&candidate) {
            return name;
        }
    }

    let from_path = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .and_then(|segment| sanitize(&percent_decode_str(segment).decode_utf8_lossy()));
    if let Some(name) = from_path {
        return name;
    }

    url.host_str()
        .and_then(sanitize)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

fn sanitize(candidate: &str) -> Option<String> {
    let name = candidate.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}
