use url::Url;

/// Path suffixes that mark image assets rather than crawlable pages
const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".gif"];

/// Normalizes a raw href found on the page at `base_url`
///
/// # Normalization Steps
///
/// 1. If the href has no scheme, resolve it against `base_url`
///    (`/path`, `../path`, `path`, `?query` and `//host/path` forms)
/// 2. Cut the fragment, but only when `#` sits past position 1
/// 3. Reject image assets (`.png`, `.jpg`, `.gif`, case-sensitive)
/// 4. Remove exactly one trailing slash
/// 5. Reject the empty string
///
/// Hrefs that already carry a scheme are kept verbatim apart from steps 2-5,
/// so normalizing an absolute result a second time returns it unchanged.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `base_url` - URL of the page the href was found on
///
/// # Returns
///
/// * `Some(String)` - The normalized URL
/// * `None` - The href should be skipped
///
/// # Examples
///
/// ```
/// use link_spider::url::normalize_href;
///
/// let url = normalize_href("/about/#team", "https://example.com/index.html");
/// assert_eq!(url.as_deref(), Some("https://example.com/about"));
///
/// assert_eq!(normalize_href("logo.png", "https://example.com/"), None);
/// ```
pub fn normalize_href(href: &str, base_url: &str) -> Option<String> {
    let mut url = if has_scheme(href) {
        href.to_string()
    } else {
        resolve_relative(href, base_url)?
    };

    strip_fragment(&mut url);

    if IMAGE_SUFFIXES.iter().any(|suffix| url.ends_with(suffix)) {
        return None;
    }

    if url.ends_with('/') {
        url.pop();
    }

    if url.is_empty() {
        return None;
    }

    Some(url)
}

/// Returns true if `href` starts with a URI scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`)
pub fn has_scheme(href: &str) -> bool {
    let Some(colon) = href.find(':') else {
        return false;
    };

    let scheme = &href[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Cuts `#` and everything after it when the `#` is past position 1
fn strip_fragment(url: &mut String) {
    if let Some(pos) = url.find('#') {
        if pos > 1 {
            url.truncate(pos);
        }
    }
}

/// Resolves a scheme-less href against the base URL
fn resolve_relative(href: &str, base_url: &str) -> Option<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Cannot resolve {:?}: bad base URL {}: {}", href, base_url, e);
            return None;
        }
    };

    match base.join(href) {
        Ok(joined) => Some(joined.to_string()),
        Err(e) => {
            tracing::debug!("Cannot resolve {:?} against {}: {}", href, base_url, e);
            None
        }
    }
}
