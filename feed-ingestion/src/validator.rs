//! Request validator: decides whether a message is addressed to the
//! agent with the creation trigger phrase.

use common::IncomingMessage;

/// True when the lower-cased message body contains the lower-cased
/// trigger substring (e.g. `@marketbot create market:`).
///
/// This is a plain substring match, not a word-boundary match: the
/// trigger appearing inside a longer run of text still counts. That is
/// a deliberate, permissive policy. Whitespace inside the trigger is
/// significant and must match exactly as configured.
pub fn is_creation_request(message: &IncomingMessage, trigger: &str) -> bool {
    message
        .text
        .to_lowercase()
        .contains(&trigger.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: &str = "@marketbot create market:";

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            id: "1".to_string(),
            text: text.to_string(),
            author_id: "99".to_string(),
            mentions: vec!["marketbot".to_string()],
            created_at: None,
        }
    }

    #[test]
    fn accepts_exact_trigger() {
        let msg = message("@marketbot create market: \"Will it rain?\" Options: Yes/No");
        assert!(is_creation_request(&msg, TRIGGER));
    }

    #[test]
    fn accepts_mixed_case() {
        let msg = message("@MarketBot CREATE Market: \"Q\" Options: A/B");
        assert!(is_creation_request(&msg, TRIGGER));
    }

    #[test]
    fn accepts_trigger_inside_longer_text() {
        // Substring policy: no word-boundary requirement.
        let msg = message("xx@marketbot create market:yy");
        assert!(is_creation_request(&msg, TRIGGER));
    }

    #[test]
    fn rejects_missing_trigger() {
        let msg = message("@marketbot what's the weather?");
        assert!(!is_creation_request(&msg, TRIGGER));
    }

    #[test]
    fn rejects_wrong_handle() {
        let msg = message("@otherbot create market: \"Q\" Options: A/B");
        assert!(!is_creation_request(&msg, TRIGGER));
    }

    #[test]
    fn rejects_extra_whitespace_inside_trigger() {
        // Interior whitespace must match exactly.
        let msg = message("@marketbot  create market: \"Q\" Options: A/B");
        assert!(!is_creation_request(&msg, TRIGGER));
    }
}
