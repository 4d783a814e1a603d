//! Deterministic dialog summarization.
//!
//! Produces the short synopsis used when the inference service cannot: the
//! first sentence of the first customer turn. Dialogs carry `<br>` or newline
//! turn markers and `C:`/`A:` speaker prefixes.

use std::sync::LazyLock;

use regex::Regex;

static TURN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|\r?\n").expect("Invalid regex: turn split"));

static CUSTOMER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(c|customer)\s*:\s*").expect("Invalid regex: customer prefix")
});

static AGENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(a|agent|support)\s*:\s*").expect("Invalid regex: agent prefix")
});

/// Derives a one-sentence summary from a raw dialog.
///
/// Picks the first customer turn (falling back to the first non-empty turn
/// when no speaker prefixes are present), keeps its first sentence, and makes
/// sure it ends with a period. Empty dialogs summarize to a fixed marker
/// string rather than an empty summary.
pub fn summarize_dialog(dialog: &str) -> String {
    let first_turn = TURN_SPLIT
        .split(dialog)
        .map(str::trim)
        .filter(|turn| !turn.is_empty())
        .find(|turn| CUSTOMER_PREFIX.is_match(turn))
        .or_else(|| {
            TURN_SPLIT
                .split(dialog)
                .map(str::trim)
                .find(|turn| !turn.is_empty() && !AGENT_PREFIX.is_match(turn))
        });

    let Some(turn) = first_turn else {
        return "No customer dialog provided.".to_string();
    };

    let spoken = CUSTOMER_PREFIX.replace(turn, "");
    let sentence = first_sentence(spoken.trim());
    if sentence.is_empty() {
        return "No customer dialog provided.".to_string();
    }
    if sentence.ends_with(['.', '!', '?']) {
        sentence
    } else {
        format!("{}.", sentence)
    }
}

fn first_sentence(text: &str) -> String {
    match text.find(['.', '!', '?']) {
        Some(idx) => text[..=idx].trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_first_customer_sentence() {
        let dialog = "C: My fridge stopped cooling yesterday. It is still under warranty.<br>A: I am sorry to hear that.";
        assert_eq!(summarize_dialog(dialog), "My fridge stopped cooling yesterday.");
    }

    #[test]
    fn test_skips_leading_agent_turn() {
        let dialog = "A: How can I help you today?\nC: The dishwasher leaks on every cycle.";
        assert_eq!(summarize_dialog(dialog), "The dishwasher leaks on every cycle.");
    }

    #[test]
    fn test_plain_text_without_markers() {
        assert_eq!(
            summarize_dialog("The delivery never arrived and nobody called"),
            "The delivery never arrived and nobody called."
        );
    }

    #[test]
    fn test_br_variants() {
        let dialog = "C: Order 81 arrived damaged!<BR/>A: Let me check.";
        assert_eq!(summarize_dialog(dialog), "Order 81 arrived damaged!");
    }

    #[test]
    fn test_empty_dialog() {
        assert_eq!(summarize_dialog(""), "No customer dialog provided.");
        assert_eq!(summarize_dialog("  \n "), "No customer dialog provided.");
    }

    #[test]
    fn test_long_customer_prefix() {
        let dialog = "Customer: I was charged twice for the same order. Please refund one charge.";
        assert_eq!(summarize_dialog(dialog), "I was charged twice for the same order.");
    }
}
