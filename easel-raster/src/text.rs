//! Greedy text wrapping against a painter's text metrics.

/// Wrap `text` to lines no wider than `max_width`, measuring with
/// `measure`. Explicit newlines always break; within a paragraph the wrap
/// is greedy per character so long unbroken runs still fit the box. Every
/// line keeps at least one character, so wrapping terminates even when a
/// single glyph exceeds `max_width`.
#[must_use]
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for c in paragraph.chars() {
            let mut candidate = current.clone();
            candidate.push(c);
            if !current.is_empty() && measure(&candidate) > max_width {
                lines.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn fixed(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        assert_eq!(wrap_text("hello", 100.0, fixed), vec!["hello"]);
    }

    #[test]
    fn test_wraps_at_width() {
        let lines = wrap_text("abcdefghij", 50.0, fixed);
        assert_eq!(lines, vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_explicit_newlines_break() {
        let lines = wrap_text("ab\n\ncd", 100.0, fixed);
        assert_eq!(lines, vec!["ab", "", "cd"]);
    }

    #[test]
    fn test_zero_width_box_keeps_one_char_per_line() {
        let lines = wrap_text("abc", 0.0, fixed);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
