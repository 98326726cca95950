// ── Constants ───────────────────────────────────────────────────────────────

pub const ROOT: &str = "/";

// ── Limits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VfsLimits {
    pub max_path_depth: usize,
    pub max_name_length: usize,
    pub max_node_count: usize,
}

impl Default for VfsLimits {
    fn default() -> Self {
        Self {
            max_path_depth: 32,
            max_name_length: 255,
            max_node_count: 10_000,
        }
    }
}

// ── Path functions ──────────────────────────────────────────────────────────

/// Normalize a path: drop empty segments, discard `.`, let `..` pop the last
/// retained segment (a no-op at root), and rebuild with one leading `/`.
///
/// Never fails. Idempotent: `normalize_path(&normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(input: &str) -> String {
    let mut resolved: Vec<&str> = Vec::new();

    for seg in input.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }

    format!("/{}", resolved.join("/"))
}

/// Resolve `path` against `cwd`. Absolute inputs are normalized as-is,
/// relative inputs are appended to `cwd` first.
pub fn resolve_path(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize_path(path)
    } else {
        normalize_path(&format!("{}/{}", cwd, path))
    }
}

/// Split a normalized path into its parent path and final segment.
/// Root yields `("/", "")`.
pub fn split_parent(normalized_path: &str) -> (&str, &str) {
    match normalized_path.rfind('/') {
        Some(0) => (ROOT, &normalized_path[1..]),
        Some(pos) => (&normalized_path[..pos], &normalized_path[pos + 1..]),
        None => (ROOT, normalized_path),
    }
}

/// Iterate the segments of a normalized path, root first.
pub fn segments(normalized_path: &str) -> impl Iterator<Item = &str> {
    normalized_path.split('/').filter(|s| !s.is_empty())
}

/// Root has depth 0, `/foo` has depth 1, `/foo/bar` has depth 2, etc.
pub fn path_depth(normalized_path: &str) -> usize {
    segments(normalized_path).count()
}

/// True when `path` equals `ancestor` or lies underneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

fn has_forbidden_chars(segment: &str) -> bool {
    segment.bytes().any(|b| b <= 0x1f)
}

/// Validate a single name. Returns `Some(error_message)` if invalid.
pub fn validate_segment(segment: &str, max_name_length: usize) -> Option<String> {
    if segment.is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if segment.len() > max_name_length {
        return Some(format!(
            "Name exceeds max length ({})",
            max_name_length
        ));
    }
    if has_forbidden_chars(segment) {
        return Some("Name contains control characters".to_string());
    }
    None
}

/// Validate a normalized path against limits. Returns `Some(error_message)` if invalid.
pub fn validate_path(normalized_path: &str, limits: &VfsLimits) -> Option<String> {
    let depth = path_depth(normalized_path);
    if depth > limits.max_path_depth {
        return Some(format!(
            "Path exceeds max depth ({})",
            limits.max_path_depth
        ));
    }
    segments(normalized_path).find_map(|seg| validate_segment(seg, limits.max_name_length))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── normalize_path ──────────────────────────────────────────────────

    #[test]
    fn normalize_basic_path() {
        assert_eq!(normalize_path("/foo/bar"), "/foo/bar");
    }

    #[test]
    fn normalize_root() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn normalize_dot_segments() {
        assert_eq!(normalize_path("/foo/./bar"), "/foo/bar");
    }

    #[test]
    fn normalize_dotdot_segments() {
        assert_eq!(normalize_path("/foo/bar/../baz"), "/foo/baz");
    }

    #[test]
    fn normalize_dotdot_past_root() {
        assert_eq!(normalize_path("/foo/../../bar"), "/bar");
        assert_eq!(normalize_path("/../../.."), "/");
    }

    #[test]
    fn normalize_trailing_and_double_slashes() {
        assert_eq!(normalize_path("//foo//bar/"), "/foo/bar");
    }

    #[test]
    fn normalize_without_leading_slash() {
        assert_eq!(normalize_path("foo/bar"), "/foo/bar");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "",
            "/",
            "a/b/../c",
            "/../x/./y//z/..",
            "././..",
            "/home/guest/../../etc/",
            "...",
            "a/.../b",
        ];
        for input in inputs {
            let once = normalize_path(input);
            assert_eq!(normalize_path(&once), once, "input {:?}", input);
        }
    }

    // ── resolve_path ────────────────────────────────────────────────────

    #[test]
    fn resolve_absolute_ignores_cwd() {
        assert_eq!(resolve_path("/home/guest", "/etc/../tmp"), "/tmp");
    }

    #[test]
    fn resolve_relative_joins_cwd() {
        assert_eq!(resolve_path("/home/guest", "projects"), "/home/guest/projects");
        assert_eq!(resolve_path("/home/guest", "../other/./x"), "/home/other/x");
    }

    #[test]
    fn resolve_relative_matches_normalized_concat() {
        let cwds = ["/", "/a", "/a/b"];
        let rels = ["x", "..", "../..", "./y/../z", "."];
        for cwd in cwds {
            for rel in rels {
                assert_eq!(
                    resolve_path(cwd, rel),
                    normalize_path(&format!("{}/{}", cwd, rel))
                );
            }
        }
    }

    #[test]
    fn resolve_dotdot_at_root_stays_at_root() {
        assert_eq!(resolve_path("/", ".."), "/");
    }

    // ── split_parent ────────────────────────────────────────────────────

    #[test]
    fn split_root() {
        assert_eq!(split_parent("/"), ("/", ""));
    }

    #[test]
    fn split_top_level() {
        assert_eq!(split_parent("/foo"), ("/", "foo"));
    }

    #[test]
    fn split_nested() {
        assert_eq!(split_parent("/foo/bar/baz"), ("/foo/bar", "baz"));
    }

    // ── depth / ancestry ────────────────────────────────────────────────

    #[test]
    fn depth_counts_segments() {
        assert_eq!(path_depth("/"), 0);
        assert_eq!(path_depth("/foo"), 1);
        assert_eq!(path_depth("/a/b/c"), 3);
    }

    #[test]
    fn within_requires_segment_boundary() {
        assert!(is_within("/a/b", "/a"));
        assert!(is_within("/a", "/a"));
        assert!(is_within("/anything", "/"));
        assert!(!is_within("/ab", "/a"));
        assert!(!is_within("/a", "/a/b"));
    }

    // ── validation ──────────────────────────────────────────────────────

    #[test]
    fn validate_segment_rules() {
        assert_eq!(validate_segment("hello", 255), None);
        assert!(validate_segment("", 255).is_some());
        assert!(validate_segment(&"a".repeat(256), 255).is_some());
        assert!(validate_segment("foo\x01bar", 255).is_some());
    }

    #[test]
    fn validate_path_too_deep() {
        let limits = VfsLimits {
            max_path_depth: 2,
            ..VfsLimits::default()
        };
        assert!(validate_path("/a/b/c", &limits).is_some());
        assert_eq!(validate_path("/a/b", &limits), None);
    }
}
