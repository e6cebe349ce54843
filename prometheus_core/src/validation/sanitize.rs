//! Normalisation of untrusted strings

pub const MAX_IMAGE_PATH_LENGTH: usize = 500;

/// Strips control characters, trims, then truncates to `max_chars` characters.
pub fn sanitize_text(value: &str, max_chars: usize) -> String {
    let cleaned: String = value.chars().filter(|c| !c.is_control()).collect();
    truncate_chars(cleaned.trim(), max_chars)
}

/// Keeps digits, `+`, parentheses, `-` and spaces only.
pub fn sanitize_phone(value: &str, max_chars: usize) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | '-' | ' '))
        .collect();
    truncate_chars(cleaned.trim(), max_chars)
}

/// Returns the trimmed path when it is site-absolute or an http(s) URL, `""` otherwise.
pub fn sanitize_image_path(value: &str) -> String {
    let text = value.trim();
    if text.is_empty() || text.chars().count() > MAX_IMAGE_PATH_LENGTH {
        return String::new();
    }

    if is_allowed_image_path(text) {
        text.to_string()
    } else {
        String::new()
    }
}

fn is_allowed_image_path(value: &str) -> bool {
    value.starts_with('/') || value.starts_with("http://") || value.starts_with("https://")
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_strips_control_and_trims() {
        assert_eq!(sanitize_text("  Ana\u{0007}\n ", 50), "Ana");
        assert_eq!(sanitize_text("a\u{0000}b\tc", 50), "abc");
        assert_eq!(sanitize_text("", 10), "");
    }

    #[test]
    fn test_sanitize_text_truncates_on_char_boundaries() {
        assert_eq!(sanitize_text("éléphant", 3), "élé");
        assert_eq!(sanitize_text("abc", 3), "abc");
        assert_eq!(sanitize_text("abcd", 0), "");
    }

    #[test]
    fn test_sanitize_phone() {
        assert_eq!(sanitize_phone(" +33 (0)6-12 ab34 ", 80), "+33 (0)6-12 34");
        assert_eq!(sanitize_phone("call me", 80), "");
        assert_eq!(sanitize_phone("0612345678", 4), "0612");
    }

    #[test]
    fn test_sanitize_image_path() {
        assert_eq!(sanitize_image_path(" /images/hero.jpg "), "/images/hero.jpg");
        assert_eq!(
            sanitize_image_path("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(sanitize_image_path("http://x.test/b.png"), "http://x.test/b.png");
        assert_eq!(sanitize_image_path("not-a-path"), "");
        assert_eq!(sanitize_image_path("ftp://y"), "");
        assert_eq!(sanitize_image_path("javascript:alert(1)"), "");
        assert_eq!(sanitize_image_path("   "), "");

        let too_long = format!("/{}", "a".repeat(MAX_IMAGE_PATH_LENGTH));
        assert_eq!(sanitize_image_path(&too_long), "");
    }
}
