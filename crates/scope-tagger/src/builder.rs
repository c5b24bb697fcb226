use crate::classifier::LineClassifier;
use crate::types::{Tag, TagIndex, TagKind};

/// Builds the tag index of a buffer in one top-to-bottom pass
///
/// Nesting is tracked with a stack of open tags ordered by strictly
/// increasing indent level. No parent links are stored in the output; the
/// nesting survives only in each tag's `full_name` and `indent_level`.
pub struct TagTreeBuilder<'a> {
    classifier: &'a LineClassifier,
}

impl<'a> TagTreeBuilder<'a> {
    pub fn new(classifier: &'a LineClassifier) -> Self {
        Self { classifier }
    }

    /// Scan every line and collect declarations (line numbers are 1-indexed)
    pub fn build<S: AsRef<str>>(&self, lines: &[S]) -> TagIndex {
        let mut index = TagIndex::default();
        let mut stack: Vec<Tag> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let classified = self.classifier.classify(line.as_ref());
            let Some(declaration) = classified.declaration else {
                continue;
            };
            let indent_level = classified.indent;

            // Siblings close siblings: `>=`, not `>`
            while stack
                .last()
                .is_some_and(|open| open.indent_level >= indent_level)
            {
                stack.pop();
            }

            let parent = stack.last();
            let kind = TagKind::classify(declaration.kind, parent.map(|p| p.kind));
            let full_name = match parent {
                Some(parent) => format!("{}.{}", parent.full_name, declaration.name),
                None => declaration.name.clone(),
            };

            let tag = Tag {
                kind,
                name: declaration.name,
                full_name,
                line_number: idx + 1,
                indent_level,
            };
            log::trace!(
                "tag {} {} at line {} (indent {})",
                tag.kind,
                tag.full_name,
                tag.line_number,
                tag.indent_level
            );

            index.push(tag.clone());
            stack.push(tag);
        }

        log::debug!("built {} tags from {} lines", index.len(), lines.len());
        index
    }
}
