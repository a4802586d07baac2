//! Dotted names of nested schema nodes.

/// Append a segment to a path; an empty parent yields the bare segment.
pub fn build_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Normalize a path for display by dropping empty segments.
pub fn render_path(path: &str) -> String {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Text of the Name cell.
///
/// The rendered path, or `fallback` when the path is empty, followed by the
/// parenthesized note if there is one.
pub fn display_name(path: &str, fallback: &str, note: Option<&str>) -> String {
    let rendered = render_path(path);
    let base = if rendered.is_empty() {
        fallback.to_string()
    } else {
        rendered
    };

    match note {
        Some(note) if base.is_empty() => format!("({})", note),
        Some(note) => format!("{} ({})", base, note),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path() {
        assert_eq!(build_path("", "a"), "a");
        assert_eq!(build_path("a", "b"), "a.b");
        assert_eq!(build_path("x", "0"), "x.0");
    }

    #[test]
    fn test_render_path_drops_empty_segments() {
        assert_eq!(render_path(""), "");
        assert_eq!(render_path("a..b."), "a.b");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("", "(root)", None), "(root)");
        assert_eq!(display_name("tags", "", Some("single item")), "tags (single item)");
        assert_eq!(display_name("", "", Some("single item")), "(single item)");
        assert_eq!(display_name("x.0", "", Some("index")), "x.0 (index)");
        assert_eq!(display_name("dimensions.length", "", None), "dimensions.length");
    }
}
