//! Nearest-tag resolution.
//!
//! Given a cursor line, the resolver picks the closest tag declared at or
//! above it and checks that the cursor is still inside that tag's body. The
//! body has no explicit end: it is left as soon as a code line appears at an
//! indentation less than or equal to the tag's own. When that happens the
//! next tag up is tried, until one survives or none are left.
//!
//! ```text
//! Scanning ──> Validating ──ok──> Resolved(tag)
//!    ^             │
//!    └──dedent─────┘   (no candidates left) ──> Unresolved
//! ```

use crate::classifier::LineClassifier;
use crate::types::{LineContent, Tag, TagIndex};

/// Finds the most specific tag enclosing a cursor line
pub struct NearestTagResolver<'a> {
    classifier: &'a LineClassifier,
}

impl<'a> NearestTagResolver<'a> {
    pub fn new(classifier: &'a LineClassifier) -> Self {
        Self { classifier }
    }

    /// Resolve the tag enclosing `cursor_line` (1-indexed), if any
    pub fn resolve<'t, S: AsRef<str>>(
        &self,
        cursor_line: usize,
        index: &'t TagIndex,
        lines: &[S],
    ) -> Option<&'t Tag> {
        if cursor_line == 0 || cursor_line > lines.len() {
            log::trace!("cursor line {cursor_line} outside buffer of {} lines", lines.len());
            return None;
        }

        if self.in_trailing_blank_region(cursor_line, lines) {
            log::trace!("cursor line {cursor_line} is in the trailing blank region");
            return None;
        }

        // Anything written at column 0 is outside every scope unless it
        // declares one itself
        let cursor = self.classifier.classify(lines[cursor_line - 1].as_ref());
        if cursor.content != LineContent::Blank && cursor.indent == 0 {
            log::trace!("cursor line {cursor_line} is at column 0");
            return index.get(cursor_line);
        }

        // Tag lines are sorted: stop at the first one past the cursor
        let candidates = index
            .line_numbers
            .iter()
            .take_while(|&&line| line <= cursor_line)
            .count();

        for &candidate_line in index.line_numbers[..candidates].iter().rev() {
            let Some(candidate) = index.get(candidate_line) else {
                continue;
            };

            if self.encloses(candidate, cursor_line, lines) {
                log::trace!(
                    "line {cursor_line} resolved to {} (line {candidate_line})",
                    candidate.full_name
                );
                return Some(candidate);
            }

            log::trace!(
                "line {cursor_line} left the body of {} (line {candidate_line})",
                candidate.full_name
            );
        }

        None
    }

    /// Whether no code line between the tag and the cursor dedents out of it
    ///
    /// The walk covers the lines after the declaration up to and including
    /// the cursor line. Blank and comment-only lines are skipped.
    fn encloses<S: AsRef<str>>(&self, tag: &Tag, cursor_line: usize, lines: &[S]) -> bool {
        if cursor_line == tag.line_number {
            return true;
        }

        for line_number in (tag.line_number + 1)..=cursor_line {
            let Some(line) = lines.get(line_number - 1) else {
                break;
            };
            let classified = self.classifier.classify(line.as_ref());
            if classified.is_code() && classified.indent <= tag.indent_level {
                return false;
            }
        }

        true
    }

    /// Whether the cursor line and everything after it is blank
    fn in_trailing_blank_region<S: AsRef<str>>(&self, cursor_line: usize, lines: &[S]) -> bool {
        lines[cursor_line - 1..]
            .iter()
            .all(|line| line.as_ref().trim().is_empty())
    }
}

/// Resolve the tag enclosing `cursor_line` (1-indexed) in an already built index
pub fn resolve_cursor_tag<'t, S: AsRef<str>>(
    classifier: &LineClassifier,
    cursor_line: usize,
    index: &'t TagIndex,
    lines: &[S],
) -> Option<&'t Tag> {
    NearestTagResolver::new(classifier).resolve(cursor_line, index, lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TagTreeBuilder;
    use crate::config::TaggerConfig;
    use crate::types::TagKind;

    fn resolve(source: &str, cursor_line: usize) -> Option<(String, TagKind)> {
        let classifier = LineClassifier::new(&TaggerConfig::default()).unwrap();
        let lines: Vec<&str> = source.lines().collect();
        let index = TagTreeBuilder::new(&classifier).build(&lines);
        resolve_cursor_tag(&classifier, cursor_line, &index, &lines)
            .map(|tag| (tag.full_name.clone(), tag.kind))
    }

    fn named(full_name: &str, kind: TagKind) -> Option<(String, TagKind)> {
        Some((full_name.to_string(), kind))
    }

    const CLASS_WITH_METHODS: &str = "\
class C:
    '''doc'''

    def a(self):
        x = 1

        return x
    # a comment
    y = 2

    def b(self):
        pass
";

    #[test]
    fn test_declaration_line_resolves_to_itself() {
        assert_eq!(resolve(CLASS_WITH_METHODS, 1), named("C", TagKind::Class));
        assert_eq!(resolve(CLASS_WITH_METHODS, 4), named("C.a", TagKind::Method));
        assert_eq!(resolve(CLASS_WITH_METHODS, 11), named("C.b", TagKind::Method));
    }

    #[test]
    fn test_body_lines() {
        assert_eq!(resolve(CLASS_WITH_METHODS, 2), named("C", TagKind::Class));
        assert_eq!(resolve(CLASS_WITH_METHODS, 5), named("C.a", TagKind::Method));
        assert_eq!(resolve(CLASS_WITH_METHODS, 7), named("C.a", TagKind::Method));
        assert_eq!(resolve(CLASS_WITH_METHODS, 12), named("C.b", TagKind::Method));
    }

    #[test]
    fn test_blank_line_inside_scope() {
        assert_eq!(resolve(CLASS_WITH_METHODS, 6), named("C.a", TagKind::Method));
        assert_eq!(resolve(CLASS_WITH_METHODS, 3), named("C", TagKind::Class));
    }

    #[test]
    fn test_comment_does_not_close_scope() {
        assert_eq!(resolve(CLASS_WITH_METHODS, 8), named("C.a", TagKind::Method));
    }

    #[test]
    fn test_dedented_code_falls_back_to_parent() {
        assert_eq!(resolve(CLASS_WITH_METHODS, 9), named("C", TagKind::Class));
        assert_eq!(resolve(CLASS_WITH_METHODS, 10), named("C", TagKind::Class));
    }

    #[test]
    fn test_column_zero_code_is_outside() {
        let source = "def f():\n    pass\nx = f()\n";
        assert_eq!(resolve(source, 3), None);
    }

    #[test]
    fn test_column_zero_comment_cursor_is_outside() {
        let source = "def f():\n    pass\n# section: helpers\nx = 1\n";
        assert_eq!(resolve(source, 3), None);
        assert_eq!(resolve(source, 4), None);
    }

    #[test]
    fn test_column_zero_comment_inside_body_is_skipped() {
        let source = "def f():\n# note\n    pass\n";
        assert_eq!(resolve(source, 3), named("f", TagKind::Function));
    }

    #[test]
    fn test_code_under_bare_block_is_outside() {
        let source = "def f():\n    pass\n\nif True:\n    f()\n";
        assert_eq!(resolve(source, 5), None);
        assert_eq!(resolve(source, 4), None);
        assert_eq!(resolve(source, 3), named("f", TagKind::Function));
    }

    #[test]
    fn test_before_first_tag() {
        let source = "import os\n\ndef f():\n    pass\n";
        assert_eq!(resolve(source, 1), None);
        assert_eq!(resolve(source, 2), None);
    }

    #[test]
    fn test_out_of_range_cursor() {
        let source = "def f():\n    pass\n";
        assert_eq!(resolve(source, 0), None);
        assert_eq!(resolve(source, 3), None);
        assert_eq!(resolve(source, 100), None);
    }

    #[test]
    fn test_trailing_blank_region() {
        let lines = ["def f():", "    pass", "", "   "];
        let classifier = LineClassifier::new(&TaggerConfig::default()).unwrap();
        let index = TagTreeBuilder::new(&classifier).build(&lines);
        assert!(resolve_cursor_tag(&classifier, 3, &index, &lines).is_none());
        assert!(resolve_cursor_tag(&classifier, 4, &index, &lines).is_none());
        assert_eq!(
            resolve_cursor_tag(&classifier, 2, &index, &lines).map(|t| t.name.as_str()),
            Some("f")
        );
    }

    #[test]
    fn test_stale_index_is_bounded_by_lines() {
        // Index built from a longer buffer than the lines handed to the resolver
        let classifier = LineClassifier::new(&TaggerConfig::default()).unwrap();
        let long = ["def f():", "    pass", "def g():", "    pass"];
        let index = TagTreeBuilder::new(&classifier).build(&long);
        let short = ["def f():", "    pass"];
        assert_eq!(
            resolve_cursor_tag(&classifier, 2, &index, &short).map(|t| t.name.as_str()),
            Some("f")
        );
    }

    #[test]
    fn test_deeply_nested_function() {
        let source = "\
class A:
    def m(self):
        def inner():
            return 1
        return inner
";
        assert_eq!(resolve(source, 4), named("A.m.inner", TagKind::Function));
        assert_eq!(resolve(source, 5), named("A.m", TagKind::Method));
    }
}
