//! YAML frontmatter: the `tags:` key of a markdown note.
//!
//! A note carries frontmatter when it starts with a `---` line and has a
//! closing `---` line. Only the `tags` key is read or written; every other
//! key and the body are preserved as they were.

use crate::error::{FolderTagError, Result};
use serde::de::Error as _;
use serde_yaml::{Mapping, Value};

const FENCE: &str = "---";

/// Splits `content` into raw YAML (without fences) and body.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let rest = match content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    {
        Some(rest) => rest,
        None => return (None, content),
    };

    if let Some(body) = rest.strip_prefix("---\n").or_else(|| rest.strip_prefix("---\r\n")) {
        return (Some(""), body);
    }

    let closing = rest
        .find("\n---\n")
        .map(|i| (i, i + 5))
        .or_else(|| rest.find("\n---\r\n").map(|i| (i, i + 6)))
        .or_else(|| rest.strip_suffix("\n---").map(|yaml| (yaml.len(), rest.len())));

    match closing {
        Some((yaml_end, body_start)) => (Some(&rest[..yaml_end]), &rest[body_start..]),
        None => (None, content),
    }
}

fn parse_mapping(yaml: &str) -> Result<Mapping> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FolderTagError::Yaml(serde_yaml::Error::custom(
            "frontmatter is not a YAML mapping",
        ))),
    }
}

/// Tags listed in the frontmatter, in file order.
///
/// Accepts a YAML list or a single comma/space separated string. A leading
/// `#` is stripped.
pub fn read_tags(content: &str) -> Result<Vec<String>> {
    let (Some(yaml), _) = split(content) else {
        return Ok(Vec::new());
    };
    let mapping = parse_mapping(yaml)?;
    let mut tags = Vec::new();
    match mapping.get("tags") {
        Some(Value::Sequence(items)) => {
            for item in items {
                match item {
                    Value::String(s) => push_raw(&mut tags, s),
                    Value::Number(n) => push_raw(&mut tags, &n.to_string()),
                    _ => {}
                }
            }
        }
        Some(Value::String(s)) => {
            for part in s.split(|c: char| c == ',' || c.is_whitespace()) {
                push_raw(&mut tags, part);
            }
        }
        _ => {}
    }
    Ok(tags)
}

fn push_raw(tags: &mut Vec<String>, raw: &str) {
    let tag = raw.trim().trim_start_matches('#');
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

/// Rewrites the `tags` key. An empty list removes the key, and the whole
/// block when nothing else is left in it.
pub fn write_tags(content: &str, tags: &[String]) -> Result<String> {
    let (yaml, body) = split(content);
    let mut mapping = match yaml {
        Some(yaml) => parse_mapping(yaml)?,
        None => Mapping::new(),
    };

    if tags.is_empty() {
        mapping.remove("tags");
    } else {
        let list = tags.iter().cloned().map(Value::String).collect();
        mapping.insert(Value::String("tags".to_string()), Value::Sequence(list));
    }

    if mapping.is_empty() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(&Value::Mapping(mapping))?;
    Ok(format!(
        "{}\n{}\n{}\n{}",
        FENCE,
        yaml.trim_end_matches('\n'),
        FENCE,
        body
    ))
}
