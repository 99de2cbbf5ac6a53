//! Tag name validation.
//!
//! Valid tags:
//! - Lowercase ASCII letters, digits and hyphens (`-`)
//! - Cannot start or end with a hyphen
//! - Cannot have consecutive hyphens (`--`)
//!
//! These are exactly the strings [`super::normalize_tag`] produces, so a tag
//! that passes validation is already in normal form.

/// Validates a tag name according to the rule tag naming rules.
///
/// # Examples
/// ```
/// use foldertagapp::tags::validation::validate_tag_name;
///
/// assert!(validate_tag_name("health").is_ok());
/// assert!(validate_tag_name("deep-work").is_ok());
/// assert!(validate_tag_name("2024").is_ok());
///
/// assert!(validate_tag_name("").is_err());
/// assert!(validate_tag_name("Health").is_err());
/// assert!(validate_tag_name("-foo").is_err());
/// assert!(validate_tag_name("foo--bar").is_err());
/// assert!(validate_tag_name("foo_bar").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), TagValidationError> {
    if name.is_empty() {
        return Err(TagValidationError::Empty);
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(TagValidationError::EdgeHyphen);
    }

    let mut prev_was_hyphen = false;
    for ch in name.chars() {
        if !is_valid_tag_char(ch) {
            return Err(TagValidationError::InvalidCharacter(ch));
        }

        if ch == '-' {
            if prev_was_hyphen {
                return Err(TagValidationError::ConsecutiveHyphens);
            }
            prev_was_hyphen = true;
        } else {
            prev_was_hyphen = false;
        }
    }

    Ok(())
}

fn is_valid_tag_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'
}

/// Error type for tag name validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    /// Tag name is empty
    Empty,
    /// Tag name starts or ends with a hyphen
    EdgeHyphen,
    /// Tag name contains consecutive hyphens
    ConsecutiveHyphens,
    /// Tag name contains an invalid character (uppercase letters included)
    InvalidCharacter(char),
}

impl std::fmt::Display for TagValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValidationError::Empty => write!(f, "tag name cannot be empty"),
            TagValidationError::EdgeHyphen => {
                write!(f, "tag name cannot start or end with a hyphen")
            }
            TagValidationError::ConsecutiveHyphens => {
                write!(f, "tag name cannot contain consecutive hyphens")
            }
            TagValidationError::InvalidCharacter(ch) => {
                write!(
                    f,
                    "tag name contains invalid character '{}' (only lowercase letters, digits, and hyphen allowed)",
                    ch
                )
            }
        }
    }
}

impl std::error::Error for TagValidationError {}
