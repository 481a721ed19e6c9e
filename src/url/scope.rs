/// Root crawled when no seed URL is given
pub const FALLBACK_ROOT: &str = "https://en.wikipedia.org/";

/// A seed URL together with the scope prefix derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedScope {
    /// The seed page URL, minus a single trailing slash
    pub seed: String,

    /// The scope prefix to register, if it is long enough to be meaningful
    pub scope: Option<String>,
}

/// Returns true if `url` starts with at least one registered scope prefix
///
/// # Examples
///
/// ```
/// use link_spider::url::in_scope;
///
/// let webs = vec!["https://example.com".to_string()];
/// assert!(in_scope("https://example.com/about", &webs));
/// assert!(!in_scope("https://other.org/x", &webs));
/// ```
pub fn in_scope(url: &str, webs: &[String]) -> bool {
    webs.iter().any(|web| url.starts_with(web.as_str()))
}

/// Derives the crawl scope from a seed URL
///
/// An empty seed falls back to [`FALLBACK_ROOT`]. One trailing slash is
/// removed from the seed. A seed naming an `.htm`/`.html` document is scoped
/// to its directory (truncated at the last `/`); any other seed is its own
/// scope. Scopes of one character or less are not registered.
///
/// # Examples
///
/// ```
/// use link_spider::url::derive_scope;
///
/// let derived = derive_scope("https://example.com/index.html");
/// assert_eq!(derived.seed, "https://example.com/index.html");
/// assert_eq!(derived.scope.as_deref(), Some("https://example.com"));
/// ```
pub fn derive_scope(seed: &str) -> SeedScope {
    let mut seed = if seed.is_empty() {
        FALLBACK_ROOT.to_string()
    } else {
        seed.to_string()
    };

    if seed.ends_with('/') {
        seed.pop();
    }

    let scope = if seed.ends_with(".htm") || seed.ends_with(".html") {
        let cut = seed.rfind('/').unwrap_or(0);
        seed[..cut].to_string()
    } else {
        seed.clone()
    };

    SeedScope {
        seed,
        scope: (scope.len() > 1).then_some(scope),
    }
}
