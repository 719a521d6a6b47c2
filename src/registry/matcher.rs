//! Namespace prefix matching.
//!
//! # Rules
//! A stored namespace key `K` matches a request path `P` when
//! - `P == K`, or
//! - `P` starts with `K/` (a key without a trailing slash is a directory boundary), or
//! - `K` ends with `/` and `P/` starts with `K`.
//!
//! Among all matching keys the longest one wins. `/chtc` matches `/chtc/PUBLIC`
//! but not `/chtcX`, and `/chtc/PUBLIC2/` matches `/chtc/PUBLIC2`.
//!
//! # Segment form
//! Splitting both sides on `/` turns the three rules into a single one: a key
//! matches when its segments are a prefix of the path's segments. A key with a
//! trailing slash contributes the same segments as the key without it, and at
//! equal depth the trailing-slash key is the longer string. The trie index is
//! built on this equivalence.

/// Returns true if namespace `key` covers request `path`.
pub fn matches_prefix(key: &str, path: &str) -> bool {
    if key.ends_with('/') {
        path.starts_with(key) || key.strip_suffix('/') == Some(path)
    } else {
        path == key
            || path
                .strip_prefix(key)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Picks the longest key in `keys` that matches `path`.
pub fn longest_match<'a, I>(keys: I, path: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter(|key| matches_prefix(key, path))
        .max_by_key(|key| key.len())
}

/// Splits a namespace key into its segments and a trailing-slash flag.
///
/// `/` yields no segments with the flag set. Returns `None` for keys that are
/// not absolute.
pub(crate) fn key_segments(key: &str) -> Option<(Vec<&str>, bool)> {
    let body = key.strip_prefix('/')?;
    let mut segments: Vec<&str> = body.split('/').collect();
    let trailing = segments.last() == Some(&"");
    if trailing {
        segments.pop();
    }
    Some((segments, trailing))
}

/// Splits a request path into raw segments, keeping empty ones.
///
/// The empty path has no segments. Other relative paths cannot match any
/// absolute key and yield `None`.
pub(crate) fn path_segments(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return Some(Vec::new());
    }
    path.strip_prefix('/').map(|body| body.split('/').collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_boundary() {
        assert!(matches_prefix("/chtc", "/chtc"));
        assert!(matches_prefix("/chtc", "/chtc/"));
        assert!(matches_prefix("/chtc", "/chtc/PUBLIC/file.txt"));
        assert!(!matches_prefix("/chtc", "/chtcX"));
        assert!(!matches_prefix("/chtc/PUBLIC", "/chtc/PUBLI"));
        assert!(!matches_prefix("/chtc/PUBLIC", "/chtc/PUBLIC2"));
    }

    #[test]
    fn test_trailing_slash_key() {
        assert!(matches_prefix("/chtc/PUBLIC2/", "/chtc/PUBLIC2"));
        assert!(matches_prefix("/chtc/PUBLIC2/", "/chtc/PUBLIC2/"));
        assert!(matches_prefix("/chtc/PUBLIC2/", "/chtc/PUBLIC2/a"));
        assert!(!matches_prefix("/chtc/PUBLIC2/", "/chtc/PUBLIC"));
        assert!(!matches_prefix("/chtc/PUBLIC2/", "/chtc/PUBLIC22"));
    }

    #[test]
    fn test_root_key() {
        assert!(matches_prefix("/", "/"));
        assert!(matches_prefix("/", "/anything/at/all"));
        assert!(!matches_prefix("/", "relative"));
    }

    #[test]
    fn test_longest_match() {
        let keys = ["/chtc", "/chtc/PUBLIC", "/chtc/PUBLIC2/"];
        assert_eq!(longest_match(keys, "/chtc/PUBLIC/x"), Some("/chtc/PUBLIC"));
        assert_eq!(longest_match(keys, "/chtc/PUBLI"), Some("/chtc"));
        assert_eq!(longest_match(keys, "/chtc/PUBLIC2"), Some("/chtc/PUBLIC2/"));
        assert_eq!(longest_match(keys, "/osg"), None);
    }

    #[test]
    fn test_segments() {
        assert_eq!(key_segments("/"), Some((vec![], true)));
        assert_eq!(key_segments("/chtc"), Some((vec!["chtc"], false)));
        assert_eq!(key_segments("/chtc/PUBLIC2/"), Some((vec!["chtc", "PUBLIC2"], true)));
        assert_eq!(key_segments("chtc"), None);

        assert_eq!(path_segments(""), Some(vec![]));
        assert_eq!(path_segments("/chtc/"), Some(vec!["chtc", ""]));
        assert_eq!(path_segments("chtc"), None);
    }
}
