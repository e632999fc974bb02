//! Base URL resolution for outbound requests to this deployment.
//!
//! Resolution order:
//! 1. The configured `BASE_URL`
//! 2. `x-base-url` request header
//! 3. `x-url` request header
//! 4. `x-protocol` (default `http:`) + `x-host` request headers
//! 5. `Host` request header over plain HTTP
//! 6. `http://localhost:3000`
//!
//! Steps 2 to 4 read headers a fronting proxy sets, so they are only
//! consulted when the server is configured to trust that proxy. Candidates
//! that do not parse as absolute URLs are skipped.

use axum::http::{header::HOST, HeaderMap};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn forwarded_candidates(headers: &HeaderMap) -> [Option<String>; 3] {
    let forwarded_host = header_str(headers, "x-host").map(|host| {
        let protocol = header_str(headers, "x-protocol").unwrap_or("http:");
        let scheme = protocol.trim_end_matches('/').trim_end_matches(':');
        format!("{}://{}", scheme, host)
    });

    [
        header_str(headers, "x-base-url").map(str::to_string),
        header_str(headers, "x-url").map(str::to_string),
        forwarded_host,
    ]
}

/// Resolve the base URL for a request.
///
/// `trust_forwarded` enables the proxy-set `x-base-url`, `x-url` and
/// `x-host` headers. Without it a client cannot pick the host the server
/// fetches from beyond the `Host` it connected with.
pub fn resolve_base_url(
    configured: Option<&Url>,
    headers: &HeaderMap,
    trust_forwarded: bool,
) -> Option<Url> {
    if let Some(url) = configured {
        return Some(url.clone());
    }

    let forwarded = if trust_forwarded {
        forwarded_candidates(headers)
    } else {
        Default::default()
    };

    let candidates = forwarded.into_iter().chain([
        header_str(headers, HOST.as_str()).map(|host| format!("http://{}", host)),
        Some(DEFAULT_BASE_URL.to_string()),
    ]);

    candidates.flatten().find_map(|candidate| {
        match Url::parse(&candidate) {
            Ok(url) if url.has_host() => Some(url),
            _ => {
                tracing::debug!(candidate = %candidate, "Skipping invalid base URL");
                None
            }
        }
    })
}
