//! Vault-relative path helpers.
//!
//! Paths are strings, not `PathBuf`s: they are map keys in the ledger and the
//! rule set, and they must compare equal regardless of the host platform.

/// Converts user or watcher input into canonical vault-relative form.
///
/// Backslashes become `/`, `.` segments and empty segments are dropped, and
/// leading/trailing slashes are removed.
pub fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Parent folder of a path; the vault root is `""`.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Number of folders between the vault root and `folder` (root is 0).
pub fn depth(folder: &str) -> usize {
    if folder.is_empty() {
        0
    } else {
        folder.split('/').count()
    }
}

/// Folder prefixes of `folder`, shallowest first.
///
/// `"A/B/C"` yields `["A", "A/B", "A/B/C"]`.
pub fn folder_chain(folder: &str) -> Vec<String> {
    let mut chain = Vec::new();
    if folder.is_empty() {
        return chain;
    }
    let mut current = String::new();
    for segment in folder.split('/') {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        chain.push(current.clone());
    }
    chain
}

/// True when `path` equals `prefix` or lies inside it on a segment boundary.
///
/// `"Archive/2023/x.md"` is under `"Archive"`, `"Archived/x.md"` is not.
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'/')
}
