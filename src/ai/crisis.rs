//! Keyword gate for high-risk language. Runs before any session is
//! touched or any model is called.

/// Phrases that indicate the user may be at risk of harming
/// themselves. Matched case-insensitively anywhere in a message.
pub const RISK_PHRASES: &[&str] = &["suicide", "kill myself", "self-harm", "end it all"];

pub const CRISIS_RESPONSE: &str = "**Emergency Alert:** It sounds like you're in intense distress. If you feel unsafe or are in immediate danger, please call your local emergency services or crisis hotline immediately.\n\nRemember, you deserve help and support.";

/// Returns true if `text` contains any of the `RISK_PHRASES`.
pub fn detect(text: &str) -> bool {
    let lowered = text.to_lowercase();
    RISK_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_matches_case_insensitively() {
        assert!(detect("I want to KILL MYSELF"));
        assert!(detect("Thinking about Suicide lately"));
    }

    #[test]
    fn it_matches_substrings() {
        assert!(detect("sometimes I just want to end it all."));
        assert!(detect("I've been doing self-harm again"));
    }

    #[test]
    fn it_ignores_ordinary_messages() {
        assert!(!detect("I had a stressful day at work"));
        assert!(!detect(""));
        // Hyphen is part of the phrase
        assert!(!detect("self harm"));
    }
}
