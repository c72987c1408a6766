//! Text sanitizing for client-supplied strings (notes, names, chat)

/// Strip markup tags, escape HTML-unsafe characters, truncate to
/// `limit` characters and trim surrounding whitespace.
pub fn sanitize(dirty: &str, limit: usize) -> String {
    let stripped = strip_tags(dirty);
    let mut escaped = String::with_capacity(stripped.len());
    for ch in stripped.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    let truncated: String = escaped.chars().take(limit).collect();
    truncated.trim().to_string()
}

/// Remove `<...>` spans with at least one character between the brackets
fn strip_tags(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '<' {
            let close = chars[i + 1..]
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, c)| **c == '>')
                .map(|(offset, _)| i + 1 + offset);
            if let Some(end) = close {
                i = end + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        assert_eq!(sanitize("<b>hello</b> world", 100), "hello world");
        assert_eq!(sanitize("<script>alert(1)</script>", 100), "alert(1)");
    }

    #[test]
    fn test_escapes_unsafe_characters() {
        assert_eq!(sanitize("a & b", 100), "a &amp; b");
        assert_eq!(sanitize("it's \"fine\"", 100), "it&#039;s &quot;fine&quot;");
        // Lone brackets are not tags
        assert_eq!(sanitize("1 < 2", 100), "1 &lt; 2");
        assert_eq!(sanitize("<>", 100), "&lt;&gt;");
    }

    #[test]
    fn test_truncates_and_trims() {
        assert_eq!(sanitize("  padded  ", 100), "padded");
        assert_eq!(sanitize("abcdefgh", 4), "abcd");
        assert_eq!(sanitize("ab   cdef", 4), "ab");
    }
}
