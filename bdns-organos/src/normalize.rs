//! Text normalization for administrative names
//!
//! Every comparison in the engine happens on normalized text:
//! 1. NFKD decomposition, then everything outside ASCII is dropped
//!    (combining accents go with it: "Córdoba" -> "Cordoba")
//! 2. Upper-casing
//! 3. Trimming and collapsing whitespace runs to a single space
//! 4. Removing whitespace in front of `. , : ;`
//!
//! The result is idempotent and empty input maps to `None`.

use unicode_normalization::UnicodeNormalization;

const TIGHT_PUNCTUATION: [char; 4] = ['.', ',', ':', ';'];

/// Normalize an optional raw value
pub fn normalize(text: Option<&str>) -> Option<String> {
    text.and_then(normalize_str)
}

/// Normalize a raw value; `None` when nothing survives
pub fn normalize_str(text: &str) -> Option<String> {
    let folded: String = text
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() && !word.starts_with(&TIGHT_PUNCTUATION[..]) {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
