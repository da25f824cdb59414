//! Text normalisation for values pulled out of listing markup.

/// Trim surrounding whitespace (including non-breaking spaces).
pub fn clean_text(s: &str) -> String {
    s.trim().to_string()
}

/// First line of the trimmed block, itself trimmed. `None` if that is empty.
pub fn first_line(s: &str) -> Option<String> {
    let line = s.trim().lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
