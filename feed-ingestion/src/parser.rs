//! Request parser: pure text-to-structure extraction of the market
//! question and its two options. No side effects.

use lazy_static::lazy_static;
use regex::Regex;

use common::MarketRequest;

lazy_static! {
    // First double-quoted segment as the question, the literal keyword
    // `Options:`, then two slash-separated options. The second option
    // ends at a slash, a newline, or end of input.
    static ref REQUEST_RE: Regex =
        Regex::new(r#"(?i)"([^"]+)"\s*Options:\s*([^/]+)/([^/\n]+)"#).unwrap();
}

/// Extract a market request from a message body.
///
/// Only the first quoted segment and the first two slash-delimited
/// options are used; a third option separated by another slash is
/// silently dropped. That tolerance is a documented limitation of the
/// deployed format, preserved as-is. The `Options:` keyword is matched
/// case-insensitively.
///
/// Returns `None` when the pattern is absent, when the question or an
/// option trims to empty, or when both options are identical. `None`
/// is the normal "not a well-formed request" outcome, not a fault.
pub fn parse_request(text: &str) -> Option<MarketRequest> {
    let caps = REQUEST_RE.captures(text)?;

    let question = caps[1].trim().to_string();
    let option_a = caps[2].trim().to_string();
    let option_b = caps[3].trim().to_string();

    if question.is_empty() || option_a.is_empty() || option_b.is_empty() {
        return None;
    }
    if option_a == option_b {
        return None;
    }

    Some(MarketRequest {
        question,
        options: [option_a, option_b],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_request() {
        let parsed = parse_request("\"Will it rain tomorrow?\" Options: Yes/No").unwrap();
        assert_eq!(parsed.question, "Will it rain tomorrow?");
        assert_eq!(parsed.options, ["Yes".to_string(), "No".to_string()]);
    }

    #[test]
    fn trims_interior_whitespace() {
        let parsed =
            parse_request("@bot create market: \"  Will BTC hit 100k?  \" Options:   Yes  /  No  ")
                .unwrap();
        assert_eq!(parsed.question, "Will BTC hit 100k?");
        assert_eq!(parsed.options, ["Yes".to_string(), "No".to_string()]);
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let parsed = parse_request("\"Q?\" OPTIONS: Up/Down").unwrap();
        assert_eq!(parsed.options, ["Up".to_string(), "Down".to_string()]);
    }

    #[test]
    fn second_option_ends_at_newline() {
        let parsed = parse_request("\"Q?\" Options: Yes/No\nthanks in advance").unwrap();
        assert_eq!(parsed.options, ["Yes".to_string(), "No".to_string()]);
    }

    #[test]
    fn drops_third_option() {
        // Two-option-only behavior, kept as-is.
        let parsed = parse_request("\"Q?\" Options: A/B/C").unwrap();
        assert_eq!(parsed.options, ["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn rejects_missing_quotes() {
        assert!(parse_request("no quotes here Options: Yes/No").is_none());
    }

    #[test]
    fn rejects_missing_keyword() {
        assert!(parse_request("\"Q?\" Yes/No").is_none());
    }

    #[test]
    fn rejects_single_option() {
        assert!(parse_request("\"Q?\" Options: OnlyOne").is_none());
    }

    #[test]
    fn rejects_blank_option() {
        assert!(parse_request("\"Q?\" Options: Yes/   ").is_none());
    }

    #[test]
    fn rejects_identical_options() {
        assert!(parse_request("\"Q?\" Options: Yes/Yes").is_none());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_request("").is_none());
    }
}
