//! URL handling module for Forager
//!
//! This module provides URL normalization, origin resolution, and the
//! same-origin test used to keep a crawl inside its seed site.

mod normalize;

pub use normalize::normalize_url;

use crate::UrlError;
use url::Url;

/// Resolves the base origin of a URL as a `scheme://host[:port]` string
///
/// The origin is recorded once per crawl job and every discovered link is
/// compared against it.
///
/// # Arguments
///
/// * `url` - The URL to take the origin from
///
/// # Returns
///
/// * `Ok(String)` - The origin string, without a trailing slash
/// * `Err(UrlError)` - The URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use forager::url::base_origin;
///
/// let url = Url::parse("https://example.com/a/b?q=1").unwrap();
/// assert_eq!(base_origin(&url).unwrap(), "https://example.com");
///
/// let url = Url::parse("http://example.com:8080/").unwrap();
/// assert_eq!(base_origin(&url).unwrap(), "http://example.com:8080");
/// ```
pub fn base_origin(url: &Url) -> Result<String, UrlError> {
    let host = url.host_str().ok_or(UrlError::MissingHost)?;
    match url.port() {
        Some(port) => Ok(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Ok(format!("{}://{}", url.scheme(), host)),
    }
}

/// Checks whether two URLs share scheme, host, and port
///
/// Default ports are taken into account, so `https://example.com/` and
/// `https://example.com:443/x` are the same origin.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_base_origin_default_port() {
        assert_eq!(
            base_origin(&url("https://example.com/page")).unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_base_origin_explicit_port() {
        assert_eq!(
            base_origin(&url("http://127.0.0.1:4545/page")).unwrap(),
            "http://127.0.0.1:4545"
        );
    }

    #[test]
    fn test_same_origin_matches() {
        assert!(same_origin(
            &url("https://example.com/a"),
            &url("https://example.com/b?q=1")
        ));
    }

    #[test]
    fn test_same_origin_default_port_equivalence() {
        assert!(same_origin(
            &url("https://example.com/"),
            &url("https://example.com:443/x")
        ));
    }

    #[test]
    fn test_different_host_not_same_origin() {
        assert!(!same_origin(
            &url("https://example.com/"),
            &url("https://other.com/")
        ));
    }

    #[test]
    fn test_different_scheme_not_same_origin() {
        assert!(!same_origin(
            &url("http://example.com/"),
            &url("https://example.com/")
        ));
    }

    #[test]
    fn test_different_port_not_same_origin() {
        assert!(!same_origin(
            &url("http://example.com:8080/"),
            &url("http://example.com:9090/")
        ));
    }
}
