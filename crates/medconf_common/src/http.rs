// --- File: crates/medconf_common/src/http.rs ---

pub mod client;

/// Joins a configured base URL and an endpoint path with exactly one `/` between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Formats a bearer `Authorization` header value.
pub fn bearer(credential: &str) -> String {
    format!("Bearer {}", credential)
}
