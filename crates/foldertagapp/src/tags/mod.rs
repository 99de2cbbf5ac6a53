//! Tag normalization.
//!
//! Every tag the engine produces or compares goes through [`normalize_tag`]
//! first. Normal form is lowercase ASCII alphanumerics separated by single
//! hyphens, so `"Deep Work"`, `"deep_work"` and `"#deep-work"` all become
//! `"deep-work"`.
//!
//! Ordered tag sets are plain `Vec<String>` kept unique with [`push_unique`];
//! order matters for display (root-to-leaf) and for frontmatter output.

pub mod validation;

pub use validation::{validate_tag_name, TagValidationError};

/// Normalizes a raw string into tag form.
///
/// Returns `None` when nothing tag-worthy is left (e.g. `"---"` or `"🙂"`).
pub fn normalize_tag(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Appends `tag` unless it is already present. Returns true if it was added.
pub fn push_unique(tags: &mut Vec<String>, tag: String) -> bool {
    if tags.contains(&tag) {
        false
    } else {
        tags.push(tag);
        true
    }
}

/// Normalizes and deduplicates, keeping first-seen order.
pub fn normalize_all<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for tag in raw {
        if let Some(tag) = normalize_tag(tag.as_ref()) {
            push_unique(&mut out, tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple() {
        assert_eq!(normalize_tag("Health"), Some("health".to_string()));
        assert_eq!(normalize_tag("therapy"), Some("therapy".to_string()));
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_tag("Deep Work"), Some("deep-work".to_string()));
        assert_eq!(normalize_tag("deep_work"), Some("deep-work".to_string()));
        assert_eq!(normalize_tag("a  --  b"), Some("a-b".to_string()));
    }

    #[test]
    fn test_normalize_trims_edges() {
        assert_eq!(normalize_tag("#project"), Some("project".to_string()));
        assert_eq!(normalize_tag("  (Q3) "), Some("q3".to_string()));
    }

    #[test]
    fn test_normalize_empty_result() {
        assert_eq!(normalize_tag(""), None);
        assert_eq!(normalize_tag("---"), None);
        assert_eq!(normalize_tag("🙂"), None);
    }

    #[test]
    fn test_normalized_output_is_valid() {
        for raw in ["Health & Fitness", "2024 Q1", "x", "__a__b__"] {
            let tag = normalize_tag(raw).unwrap();
            assert!(validate_tag_name(&tag).is_ok(), "{} -> {}", raw, tag);
        }
    }

    #[test]
    fn test_normalize_all_dedupes_in_order() {
        let tags = normalize_all(["Work", "home", "work", "Home Office"]);
        assert_eq!(tags, vec!["work", "home", "home-office"]);
    }

    #[test]
    fn test_push_unique() {
        let mut tags = vec!["a".to_string()];
        assert!(!push_unique(&mut tags, "a".to_string()));
        assert!(push_unique(&mut tags, "b".to_string()));
        assert_eq!(tags, vec!["a", "b"]);
    }
}
