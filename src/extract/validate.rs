//! Crawl-side content validation
//!
//! Extraction can produce text that is technically long enough but is really
//! templated site chrome repeated on every page. Validation strips the usual
//! legal and navigation boilerplate lines and rejects pages whose lines are
//! mostly exact duplicates of each other.

use crate::config::ExtractionConfig;
use crate::extract::ExtractError;
use std::collections::HashSet;

/// Line-level markers for legal and navigation boilerplate
const BOILERPLATE_MARKERS: &[&str] = &[
    "copyright",
    "©",
    "all rights reserved",
    "skip to content",
    "skip to main content",
    "privacy policy",
    "terms of service",
    "terms of use",
    "cookie policy",
    "cookie settings",
    "accept cookies",
    "accept all cookies",
    "subscribe to our newsletter",
    "sign up for our newsletter",
];

/// Boilerplate lines longer than this are kept; real prose can mention
/// "copyright" without being chrome
const BOILERPLATE_MAX_LINE_LEN: usize = 120;

/// Validates extracted text and strips boilerplate lines
///
/// # Arguments
///
/// * `text` - Extracted page text
/// * `config` - Extraction thresholds
///
/// # Returns
///
/// * `Ok(String)` - Cleaned text that passed every check
/// * `Err(ExtractError)` - The page is boilerplate-dominated or too short
pub fn validate_content(text: &str, config: &ExtractionConfig) -> Result<String, ExtractError> {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_boilerplate_line(line))
        .collect();

    let total = kept.len();
    if total > 0 {
        let distinct = kept.iter().collect::<HashSet<_>>().len();
        let ratio = distinct as f64 / total as f64;
        if ratio < config.min_distinct_line_ratio {
            return Err(ExtractError::DuplicatedContent { distinct, total });
        }
    }

    let cleaned = kept.join("\n");
    if cleaned.len() < config.min_content_length {
        return Err(ExtractError::InsufficientContent {
            length: cleaned.len(),
            required: config.min_content_length,
        });
    }

    Ok(cleaned)
}

/// Whether a line is legal/navigation boilerplate
fn is_boilerplate_line(line: &str) -> bool {
    if line.len() > BOILERPLATE_MAX_LINE_LEN {
        return false;
    }

    let lower = line.to_lowercase();
    BOILERPLATE_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig {
            min_content_length: 40,
            min_fragment_length: 20,
            min_distinct_line_ratio: 0.5,
        }
    }

    const PROSE: &str = "The harbor was quiet that morning, and the fishing boats rocked gently against their moorings while gulls circled overhead.";

    #[test]
    fn test_clean_prose_passes() {
        let cleaned = validate_content(PROSE, &config()).unwrap();
        assert_eq!(cleaned, PROSE);
    }

    #[test]
    fn test_copyright_line_stripped() {
        let text = format!("{}\n© 2024 Example Corp. All rights reserved.", PROSE);
        let cleaned = validate_content(&text, &config()).unwrap();
        assert!(!cleaned.contains("Example Corp"));
        assert!(cleaned.contains("harbor"));
    }

    #[test]
    fn test_skip_to_content_stripped() {
        let text = format!("Skip to content\n{}", PROSE);
        let cleaned = validate_content(&text, &config()).unwrap();
        assert!(!cleaned.contains("Skip to content"));
    }

    #[test]
    fn test_policy_links_stripped() {
        let text = format!("{}\nPrivacy Policy\nTerms of Service\nCookie Settings", PROSE);
        let cleaned = validate_content(&text, &config()).unwrap();
        assert!(!cleaned.contains("Privacy Policy"));
        assert!(!cleaned.contains("Terms of Service"));
        assert!(!cleaned.contains("Cookie Settings"));
    }

    #[test]
    fn test_long_prose_mentioning_copyright_kept() {
        let line = "The history of copyright stretches back to the Statute of Anne in 1710, when publishers in London first gained legal protection for printed works.";
        let cleaned = validate_content(line, &config()).unwrap();
        assert!(cleaned.contains("Statute of Anne"));
    }

    #[test]
    fn test_duplicated_lines_rejected() {
        let repeated = "Read more\nRead more\nRead more\nRead more\nSomething unique here today";
        let result = validate_content(repeated, &config());
        assert!(matches!(
            result,
            Err(ExtractError::DuplicatedContent { .. })
        ));
    }

    #[test]
    fn test_half_distinct_passes() {
        // Exactly at the 0.5 ratio: 2 distinct of 4 total
        let text = format!("{}\n{}\nAnother distinct line of sufficient interest\nAnother distinct line of sufficient interest", PROSE, PROSE);
        let result = validate_content(&text, &config());
        assert!(result.is_ok());
    }

    #[test]
    fn test_too_short_after_stripping_rejected() {
        let text = "Privacy Policy\nCookie Settings\nShort.";
        let result = validate_content(text, &config());
        assert!(matches!(
            result,
            Err(ExtractError::InsufficientContent { .. })
        ));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let text = format!("{}\n\n\n{}", PROSE, "A second paragraph that differs from the first one in every meaningful way.");
        let cleaned = validate_content(&text, &config()).unwrap();
        assert_eq!(cleaned.lines().count(), 2);
    }
}
