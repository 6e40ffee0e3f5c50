//! Character-level masking.
//!
//! Every alphanumeric character is replaced by the next character of a
//! fixed placeholder alphabet with the source character's case applied;
//! whitespace and punctuation pass through at the same position. The
//! alphabet is a single `x` today, but the cycle position is threaded
//! through so a longer alphabet drops in without touching callers.

/// The placeholder alphabet.
const PLACEHOLDER: &[char] = &['x'];

/// Mask one character.
///
/// Returns the replacement character and the next cycle position. The
/// position advances only when a substitution happened, never on
/// pass-through characters.
pub fn mask_char(source: char, position: usize) -> (char, usize) {
    if source.is_whitespace() || !source.is_alphanumeric() {
        return (source, position);
    }

    let placeholder = PLACEHOLDER[position % PLACEHOLDER.len()];
    let replacement = if source.is_uppercase() {
        placeholder.to_ascii_uppercase()
    } else if source.is_lowercase() {
        placeholder.to_ascii_lowercase()
    } else {
        // Caseless characters (digits) take the placeholder as-is.
        placeholder
    };
    (replacement, position + 1)
}

/// Mask a whole string, preserving character count exactly.
pub fn mask_text(input: &str) -> String {
    let mut position = 0;
    input
        .chars()
        .map(|c| {
            let (replacement, next) = mask_char(c, position);
            position = next;
            replacement
        })
        .collect()
}
