//! Name scrubbing for strings that end up in headers or archive paths.
//!
//! # Design
//! - Only removes characters; never adds, reorders, or normalises.
//! - Callers pick their own fallback when nothing survives.

/// Characters stripped from every externally supplied name.
pub const UNSAFE_NAME_CHARS: &[char] = &['#', '<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Fallback name for the overall archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "download.zip";

/// Fallback name for an individual archive entry.
pub const DEFAULT_ENTRY_NAME: &str = "file";

/// Remove every header/path metacharacter from `raw`.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !UNSAFE_NAME_CHARS.contains(ch))
        .collect()
}

/// Sanitize `raw`, substituting `fallback` when the result is empty.
#[must_use]
pub fn sanitize_or(raw: &str, fallback: &str) -> String {
    let cleaned = sanitize(raw);
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_every_metacharacter() {
        let cleaned = sanitize(r#"a#b<c>d:e"f/g\h|i?j*k"#);
        assert_eq!(cleaned, "abcdefghijk");
        assert!(!cleaned.chars().any(|ch| UNSAFE_NAME_CHARS.contains(&ch)));
    }

    #[test]
    fn sanitize_preserves_order_and_other_characters() {
        assert_eq!(sanitize("Report (Final) v2.PDF"), "Report (Final) v2.PDF");
        assert_eq!(sanitize("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize("résumé?.txt"), "résumé.txt");
        assert_eq!(sanitize("line\r\nbreak"), "line\r\nbreak");
    }

    #[test]
    fn sanitize_output_is_a_subsequence_of_the_input() {
        let inputs = ["", "plain", "a/b/c", "??", "x*y*z", "\"quoted\" name"];
        for input in inputs {
            let cleaned = sanitize(input);
            let mut remaining = input.chars();
            for ch in cleaned.chars() {
                assert!(
                    remaining.any(|candidate| candidate == ch),
                    "{cleaned:?} is not a subsequence of {input:?}"
                );
            }
        }
    }

    #[test]
    fn sanitize_or_uses_fallback_when_nothing_survives() {
        assert_eq!(sanitize_or("", DEFAULT_ARCHIVE_NAME), "download.zip");
        assert_eq!(sanitize_or("/?*", DEFAULT_ARCHIVE_NAME), "download.zip");
        assert_eq!(sanitize_or("<>", DEFAULT_ENTRY_NAME), "file");
        assert_eq!(sanitize_or("a?.txt", DEFAULT_ENTRY_NAME), "a.txt");
    }
}
