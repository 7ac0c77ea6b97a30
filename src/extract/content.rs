//! HTML to clean prose text
//!
//! Extraction runs in two stages. First an ordered list of content-container
//! selectors is probed (article, main, and the usual CMS content classes);
//! the first container with enough text wins. When no container qualifies,
//! a filtered walk over every text node takes over, skipping hidden and
//! navigational subtrees and dropping fragments too short to be prose.

use crate::config::ExtractionConfig;
use crate::extract::ExtractError;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

/// Content-container selectors probed in order
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".article-body",
    "#content",
    ".content",
];

/// Tags whose entire subtree is never content
const SKIP_TAGS: &[&str] = &[
    "script", "style", "iframe", "nav", "footer", "header", "aside", "noscript", "svg", "form",
];

/// Class substrings that mark navigational or promotional chrome
const SKIP_CLASS_MARKERS: &[&str] = &[
    "nav",
    "menu",
    "sidebar",
    "banner",
    "cookie",
    "newsletter",
    "advert",
    "modal",
    "popup",
    "breadcrumb",
];

/// ARIA roles whose subtree is chrome rather than content
const SKIP_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "complementary",
    "contentinfo",
    "search",
];

/// Extracts clean prose text from an HTML document
///
/// # Arguments
///
/// * `html` - The raw page HTML
/// * `config` - Extraction thresholds
///
/// # Returns
///
/// * `Ok(String)` - Cleaned text, paragraphs separated by blank lines
/// * `Err(ExtractError)` - The page has no usable content
pub fn extract_content(html: &str, config: &ExtractionConfig) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);

    // Stage 1: probe content containers in order
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(container) = document.select(&selector).next() {
                let text = collect_filtered_text(*container, 1);
                if text.len() >= config.min_content_length {
                    tracing::trace!("Content matched container selector {}", selector_str);
                    return Ok(text);
                }
            }
        }
    }

    // Stage 2: fall back to a whole-body text walk with a fragment floor
    let root_text = if let Ok(body_selector) = Selector::parse("body") {
        match document.select(&body_selector).next() {
            Some(body) => collect_filtered_text(*body, config.min_fragment_length),
            None => collect_filtered_text(*document.root_element(), config.min_fragment_length),
        }
    } else {
        String::new()
    };

    if root_text.len() >= config.min_content_length {
        Ok(root_text)
    } else {
        Err(ExtractError::InsufficientContent {
            length: root_text.len(),
            required: config.min_content_length,
        })
    }
}

/// Extracts the page title from the `<title>` tag
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects text fragments under a node, skipping non-content subtrees
///
/// Fragments shorter than `min_fragment` are dropped; survivors are joined
/// with blank lines.
fn collect_filtered_text(node: NodeRef<Node>, min_fragment: usize) -> String {
    let mut fragments = Vec::new();
    walk(node, min_fragment, &mut fragments);
    fragments.join("\n\n")
}

fn walk(node: NodeRef<Node>, min_fragment: usize, fragments: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => {
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if collapsed.len() >= min_fragment {
                fragments.push(collapsed);
            }
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                if is_skipped_element(&element) {
                    return;
                }
            }
            for child in node.children() {
                walk(child, min_fragment, fragments);
            }
        }
        _ => {}
    }
}

/// Whether an element's subtree is excluded from extraction
fn is_skipped_element(element: &ElementRef) -> bool {
    let value = element.value();

    if SKIP_TAGS.contains(&value.name()) {
        return true;
    }

    if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
        return true;
    }

    if let Some(style) = value.attr("style") {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return true;
        }
    }

    if let Some(role) = value.attr("role") {
        if SKIP_ROLES.contains(&role) {
            return true;
        }
    }

    if let Some(class) = value.attr("class") {
        let class = class.to_ascii_lowercase();
        if SKIP_CLASS_MARKERS
            .iter()
            .any(|marker| class.contains(marker))
        {
            return true;
        }
    }

    false
}
