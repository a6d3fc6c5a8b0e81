//! Input readers - parse build files into targets.

#[cfg(feature = "gn")]
mod gn_lexer;

#[cfg(feature = "gn")]
pub mod gn;

#[cfg(feature = "gn")]
pub use gn::{GN_READER, GnReader, parse_gn, parse_list, read_gn, unquote};

#[cfg(feature = "cmake")]
pub mod cmake;

#[cfg(feature = "cmake")]
pub use cmake::{CMAKE_READER, CmakeReader, parse_cmake, read_cmake};

/// 1-based line and column (in characters) of byte offset `pos`.
#[cfg(any(feature = "gn", feature = "cmake"))]
pub(crate) fn line_col(src: &str, pos: usize) -> (usize, usize) {
    let mut pos = pos.min(src.len());
    while !src.is_char_boundary(pos) {
        pos -= 1;
    }
    let before = &src[..pos];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Decode `\"` and `\\` in the body of a quoted string. Any other
/// backslash is kept together with the character after it.
#[cfg(any(feature = "gn", feature = "cmake"))]
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// How one syntax spells negation and conjunction in a condition.
///
/// Used to give every branch of an `if` / `else if` / `else` chain a
/// standalone predicate, since the IR has no `else`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PredicateSyntax {
    not: &'static str,
    and: &'static str,
}

#[cfg(feature = "gn")]
pub(crate) const GN_PREDICATES: PredicateSyntax = PredicateSyntax {
    not: "!",
    and: " && ",
};

#[cfg(feature = "cmake")]
pub(crate) const CMAKE_PREDICATES: PredicateSyntax = PredicateSyntax {
    not: "NOT ",
    and: " AND ",
};

impl PredicateSyntax {
    /// Predicate for a branch that follows the branches guarded by
    /// `earlier`. `own` is the branch's own predicate, `None` for `else`.
    pub(crate) fn branch(&self, earlier: &[String], own: Option<&str>) -> String {
        let mut parts: Vec<String> = earlier
            .iter()
            .map(|p| format!("{}({p})", self.not))
            .collect();
        if let Some(own) = own {
            if parts.is_empty() {
                return own.to_string();
            }
            parts.push(format!("({own})"));
        }
        parts.join(self.and)
    }
}

#[cfg(all(test, feature = "gn", feature = "cmake"))]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_counts_characters() {
        let src = "a\né b\n";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 2), (2, 1));
        // Byte 5 is `b`, after the two-byte `é` and a space.
        assert_eq!(line_col(src, 5), (2, 3));
        // Inside `é`: clamps back to its first byte.
        assert_eq!(line_col(src, 3), (2, 1));
        assert_eq!(line_col(src, 99), (3, 1));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\"b\\c"#), r#"a"b\c"#);
        assert_eq!(unescape(r"\$x\n"), r"\$x\n");
    }

    #[test]
    fn test_first_branch_is_verbatim() {
        assert_eq!(GN_PREDICATES.branch(&[], Some("is_linux")), "is_linux");
    }

    #[test]
    fn test_else_chains() {
        let earlier = vec!["is_linux".to_string(), "is_mac".to_string()];
        assert_eq!(
            GN_PREDICATES.branch(&earlier[..1], Some("is_mac")),
            "!(is_linux) && (is_mac)"
        );
        assert_eq!(
            GN_PREDICATES.branch(&earlier, None),
            "!(is_linux) && !(is_mac)"
        );
        assert_eq!(CMAKE_PREDICATES.branch(&earlier[..1], None), "NOT (is_linux)");
        assert_eq!(
            CMAKE_PREDICATES.branch(&earlier[..1], Some("APPLE")),
            "NOT (is_linux) AND (APPLE)"
        );
    }
}
