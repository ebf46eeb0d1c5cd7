//! URL normalization. Purely syntactic; nothing here touches the network.

/// Schemes accepted as-is by [`normalize_url`].
const WEB_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Prefixes that mark a URL as absolute when applying a base URL.
const ABSOLUTE_PREFIXES: [&str; 4] = ["http://", "https://", "file://", "//"];

/// Return `raw` unchanged if it starts with `http://` or `https://`,
/// otherwise prefix it with `https://`.
pub fn normalize_url(raw: &str) -> String {
    if WEB_SCHEMES.iter().any(|s| raw.starts_with(s)) {
        raw.to_string()
    } else {
        let url = format!("https://{raw}");
        tracing::warn!("URL doesn't start with http:// or https://: {raw}");
        tracing::info!("Trying with: {url}");
        url
    }
}

/// Append a relative `raw` URL to `baseurl`. Absolute URLs are returned as-is.
///
/// A leading `/` on `raw` is dropped when `baseurl` already ends with `/`.
pub fn apply_baseurl(raw: &str, baseurl: &str) -> String {
    if ABSOLUTE_PREFIXES.iter().any(|p| raw.starts_with(p)) {
        return raw.to_string();
    }
    let relative = if baseurl.ends_with('/') {
        raw.strip_prefix('/').unwrap_or(raw)
    } else {
        raw
    };
    let joined = format!("{baseurl}{relative}");
    tracing::info!("Applied baseurl to relative URL: {raw} -> {joined}");
    joined
}

/// Resolve the URL a fetch navigates to: base URL first, then normalization.
pub fn resolve_target(raw: &str, baseurl: Option<&str>) -> String {
    match baseurl {
        Some(base) if !base.is_empty() => normalize_url(&apply_baseurl(raw, base)),
        _ => normalize_url(raw),
    }
}
