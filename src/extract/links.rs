//! Same-origin link discovery
//!
//! Links come from two sources: `a[href]` elements on fetched pages, and a
//! best-effort read of the site's `/sitemap.xml`. Both go through the same
//! pipeline: resolve against the page URL, normalize, keep same-origin
//! targets only, and drop anything matching the skip patterns (assets,
//! auth/admin paths, feeds, taxonomy pages, and so on). Deduplication against
//! visited and queued URLs stays with the frontier.

use crate::url::{base_origin, normalize_url, same_origin};
use reqwest::Client;
use scraper::{Html, Selector};
use sitemap::reader::{SiteMapEntity, SiteMapReader};
use std::collections::HashSet;
use std::io::Cursor;
use url::Url;

/// File extensions that are never crawlable pages
const SKIP_EXTENSIONS: &[&str] = &[
    // styles, scripts, machine formats
    ".css", ".js", ".mjs", ".json", ".xml", // images and fonts
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".avif", ".woff", ".woff2", ".ttf",
    ".eot", ".otf", // documents and archives
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".tar", ".gz", ".rar",
    ".7z", // media
    ".mp3", ".mp4", ".avi", ".mov", ".webm", ".wav", // binaries
    ".exe", ".dmg", ".apk",
];

/// Path substrings that mark non-content pages
const SKIP_PATH_MARKERS: &[&str] = &[
    // APIs and CMS internals
    "/api/",
    "/wp-admin",
    "/wp-json",
    "/wp-content/",
    "/cdn-cgi/",
    "/xmlrpc",
    // auth
    "/login",
    "/logout",
    "/signin",
    "/sign-in",
    "/signup",
    "/sign-up",
    "/register",
    "/admin",
    "/auth/",
    "/oauth",
    // commerce
    "/cart",
    "/checkout",
    "/account",
    // feeds
    "/feed",
    "/rss",
    "/atom",
    // pagination and taxonomy
    "/page/",
    "/tag/",
    "/tags/",
    "/category/",
    "/categories/",
    "/author/",
    // legal and contact
    "/privacy",
    "/terms",
    "/contact",
    "/cookie-policy",
    "/legal",
];

/// Query parameter names that carry session state
const SESSION_PARAMS: &[&str] = &["sessionid", "session_id", "phpsessid", "jsessionid", "sid"];

/// Extracts crawlable same-origin links from page HTML
///
/// # Arguments
///
/// * `html` - The page HTML
/// * `page_url` - The URL the page was fetched from, for resolving relative
///   hrefs and as the origin to filter against
///
/// # Returns
///
/// A set of normalized absolute URLs. May include URLs already visited or
/// queued.
pub fn discover_links(html: &str, page_url: &Url) -> HashSet<String> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_link(href, page_url) {
                if is_crawlable_link(&url, page_url) {
                    links.insert(url.to_string());
                }
            }
        }
    }

    links
}

/// Resolves a raw href to a normalized absolute URL
///
/// Returns None for hrefs that can never be pages: empty strings,
/// fragment-only anchors, and `mailto:`/`tel:`/`javascript:`/`data:` schemes.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}

/// Whether a resolved URL should enter the frontier
///
/// Checks same-origin against `base`, then the extension, path, and session
/// query skip lists.
pub fn is_crawlable_link(url: &Url, base: &Url) -> bool {
    if !same_origin(url, base) {
        return false;
    }

    let path = url.path().to_lowercase();

    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    if SKIP_PATH_MARKERS
        .iter()
        .any(|marker| path.contains(marker) || path == marker.trim_end_matches('/'))
    {
        return false;
    }

    if url
        .query_pairs()
        .any(|(key, _)| SESSION_PARAMS.contains(&key.to_lowercase().as_str()))
    {
        return false;
    }

    true
}

/// Fetches and parses `/sitemap.xml` for the origin of `base`
///
/// Best-effort: a missing sitemap, an HTTP error, or unparseable XML all
/// yield an empty set. Sitemap-index entries (nested sitemaps) are not
/// followed. Results pass through the same normalization and skip filtering
/// as in-page links.
pub async fn fetch_sitemap_links(client: &Client, base: &Url) -> HashSet<String> {
    let Ok(origin) = base_origin(base) else {
        return HashSet::new();
    };
    let sitemap_url = format!("{}/sitemap.xml", origin);

    let body = match client.get(&sitemap_url).send().await {
        Ok(response) if response.status().is_success() => match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Failed to read sitemap body from {}: {}", sitemap_url, e);
                return HashSet::new();
            }
        },
        Ok(response) => {
            tracing::debug!("No sitemap at {} (HTTP {})", sitemap_url, response.status());
            return HashSet::new();
        }
        Err(e) => {
            tracing::debug!("Failed to fetch sitemap from {}: {}", sitemap_url, e);
            return HashSet::new();
        }
    };

    let mut links = HashSet::new();
    for entity in SiteMapReader::new(Cursor::new(body)) {
        if let SiteMapEntity::Url(entry) = entity {
            if let Some(loc) = entry.loc.get_url() {
                if let Ok(url) = normalize_url(loc.as_str()) {
                    if is_crawlable_link(&url, base) {
                        links.insert(url.to_string());
                    }
                }
            }
        }
    }

    if !links.is_empty() {
        tracing::debug!("Sitemap contributed {} URLs", links.len());
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/start").unwrap()
    }

    #[test]
    fn test_same_origin_kept_cross_origin_dropped() {
        let html = r#"<html><body>
            <a href="https://example.com/a">Same</a>
            <a href="https://other.com/b">Other</a>
            <a href="https://example.com/style.css">Asset</a>
        </body></html>"#;
        let links = discover_links(html, &base());
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://example.com/a"));
    }

    #[test]
    fn test_relative_links_resolved() {
        let html = r#"<html><body><a href="/docs/intro">Docs</a><a href="sibling">Sib</a></body></html>"#;
        let links = discover_links(html, &base());
        assert!(links.contains("https://example.com/docs/intro"));
        assert!(links.contains("https://example.com/sibling"));
    }

    #[test]
    fn test_special_schemes_dropped() {
        let html = r#"<html><body>
            <a href="mailto:a@example.com">Mail</a>
            <a href="tel:+15551234">Call</a>
            <a href="javascript:void(0)">JS</a>
            <a href="data:text/html,hi">Data</a>
        </body></html>"#;
        assert!(discover_links(html, &base()).is_empty());
    }

    #[test]
    fn test_fragment_only_dropped() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(discover_links(html, &base()).is_empty());
    }

    #[test]
    fn test_download_attribute_dropped() {
        let html = r#"<html><body><a href="/report" download>Report</a></body></html>"#;
        assert!(discover_links(html, &base()).is_empty());
    }

    #[test]
    fn test_fragment_stripped_from_link() {
        let html = r##"<html><body><a href="/page#part">Part</a></body></html>"##;
        let links = discover_links(html, &base());
        assert!(links.contains("https://example.com/page"));
    }

    #[test]
    fn test_asset_extensions_dropped() {
        for asset in [
            "/app.js",
            "/theme.css",
            "/logo.png",
            "/photo.JPG",
            "/font.woff2",
            "/manual.pdf",
            "/backup.tar.gz",
            "/video.mp4",
        ] {
            let url = normalize_url(&format!("https://example.com{}", asset)).unwrap();
            assert!(!is_crawlable_link(&url, &base()), "case: {}", asset);
        }
    }

    #[test]
    fn test_auth_and_admin_paths_dropped() {
        for path in [
            "/login",
            "/logout",
            "/signup",
            "/admin/settings",
            "/wp-admin/options.php",
            "/api/v2/users",
            "/cart",
            "/checkout/step-1",
        ] {
            let url = normalize_url(&format!("https://example.com{}", path)).unwrap();
            assert!(!is_crawlable_link(&url, &base()), "case: {}", path);
        }
    }

    #[test]
    fn test_taxonomy_and_feed_paths_dropped() {
        for path in [
            "/tag/rust",
            "/category/news",
            "/author/jane",
            "/page/2",
            "/feed",
            "/rss",
            "/blog/atom",
        ] {
            let url = normalize_url(&format!("https://example.com{}", path)).unwrap();
            assert!(!is_crawlable_link(&url, &base()), "case: {}", path);
        }
    }

    #[test]
    fn test_legal_pages_dropped() {
        for path in ["/privacy", "/terms", "/contact", "/legal/imprint"] {
            let url = normalize_url(&format!("https://example.com{}", path)).unwrap();
            assert!(!is_crawlable_link(&url, &base()), "case: {}", path);
        }
    }

    #[test]
    fn test_session_query_dropped() {
        let url = normalize_url("https://example.com/page?PHPSESSID=abc123").unwrap();
        assert!(!is_crawlable_link(&url, &base()));
    }

    #[test]
    fn test_ordinary_pages_kept() {
        for path in ["/", "/docs/guide", "/blog/2024/hello-world", "/about-us"] {
            let url = normalize_url(&format!("https://example.com{}", path)).unwrap();
            assert!(is_crawlable_link(&url, &base()), "case: {}", path);
        }
    }

    #[test]
    fn test_tracking_params_normalized_away() {
        let html = r#"<html><body><a href="/page?utm_source=mail&utm_medium=x">Link</a></body></html>"#;
        let links = discover_links(html, &base());
        assert!(links.contains("https://example.com/page"));
    }
}
