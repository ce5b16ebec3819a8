use url::Url;

/// Path plus `?query` of `url`, with scheme, host and fragment stripped.
///
/// Strings that do not parse as absolute URLs are taken to be relative
/// already; only their fragment is dropped.
pub fn relative_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        Err(_) => url.split('#').next().unwrap_or_default().to_string(),
    }
}
