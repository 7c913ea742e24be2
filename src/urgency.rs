use regex::Regex;
use std::sync::LazyLock;

/// Complaint phrases that mark feedback as needing prompt handling.
static URGENCY_PATTERNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(urgent|immediately|asap|right away|not working since|down since|2 days|two days|emergency|can[’']t access|unable to)",
    )
    .expect("urgency pattern is valid")
});

/// True when any urgency phrase occurs anywhere in `text`.
pub fn detect_urgency(text: &str) -> bool {
    URGENCY_PATTERNS.is_match(text)
}
