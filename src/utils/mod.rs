//! Utility functions and helpers.

pub mod console;
pub mod fs;
pub mod http;
pub mod json;

use url::Url;

/// Parse a resource URL, accepting only http(s).
pub fn parse_http_url(raw: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}

/// Join `/`-delimited store path segments, collapsing duplicate slashes.
pub fn join_store_path(base: &str, segments: &[&str]) -> String {
    let mut parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in segments {
        parts.extend(segment.split('/').filter(|s| !s.is_empty()));
    }
    format!("/{}", parts.join("/"))
}
