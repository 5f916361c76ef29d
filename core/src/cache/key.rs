use url::Url;

/// Cache key for a navigation URL.
///
/// Absolute URLs are re-serialized so trivially different spellings
/// (`HTTPS://Example.com:443` vs `https://example.com/`) share one entry.
/// Anything that fails to parse is keyed by its trimmed text.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(u) => u.to_string(),
        Err(_) => trimmed.to_string(),
    }
}
