//! Formatting utilities

/// Mask a secret for display, one mask character per character of input
pub fn mask(secret: &str, mask_char: char) -> String {
    secret.chars().map(|_| mask_char).collect()
}
