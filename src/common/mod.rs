//! Common utilities shared by the runner, page objects and fixture client

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h:4444/", "/session"), "http://h:4444/session");
        assert_eq!(join_url("http://h/api", "workspace"), "http://h/api/workspace");
    }
}
