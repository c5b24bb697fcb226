use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a discovered symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Class definition
    Class,
    /// Function defined directly inside a class
    Method,
    /// Any other function
    Function,
}

impl TagKind {
    /// Decide the kind of a declaration from its keyword and its parent's kind
    #[must_use]
    pub const fn classify(declaration: DeclarationKind, parent: Option<TagKind>) -> Self {
        match (declaration, parent) {
            (DeclarationKind::Class, _) => Self::Class,
            (DeclarationKind::FunctionLike, Some(Self::Class)) => Self::Method,
            (DeclarationKind::FunctionLike, _) => Self::Function,
        }
    }

    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration keyword found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `class <name>`
    Class,
    /// `def <name>(`
    FunctionLike,
}

impl DeclarationKind {
    /// Map a declaration keyword to its kind
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(Self::Class),
            "def" => Some(Self::FunctionLike),
            _ => None,
        }
    }
}

/// A declaration extracted from a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
}

/// What remains on a line once indentation is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineContent {
    /// Nothing but whitespace
    Blank,
    /// Only a comment after the indentation
    Comment,
    /// Anything else
    Code,
}

/// Result of classifying one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// Indent level of the line
    pub indent: usize,

    /// Blank, comment-only or code
    pub content: LineContent,

    /// Declaration on this line, if any
    pub declaration: Option<Declaration>,
}

impl ClassifiedLine {
    /// Whether this line can end the body of an enclosing tag
    #[must_use]
    pub const fn is_code(&self) -> bool {
        matches!(self.content, LineContent::Code)
    }
}

/// A recorded symbol declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Class, method or function
    pub kind: TagKind,

    /// Declared identifier
    pub name: String,

    /// Dotted path from the outermost enclosing tag (e.g. "Outer.Inner.method")
    pub full_name: String,

    /// Line of the declaration keyword (1-indexed)
    pub line_number: usize,

    /// Indent level of the declaration line
    pub indent_level: usize,
}

impl Tag {
    /// Number of dot-separated components in the full name
    #[must_use]
    pub fn depth(&self) -> usize {
        self.full_name.split('.').count()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.kind)
    }
}

/// Tags of one buffer: ordered declaration lines plus a line-keyed map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIndex {
    /// Declaration lines in increasing order
    pub line_numbers: Vec<usize>,

    /// Tags keyed by declaration line
    pub tags: BTreeMap<usize, Tag>,
}

impl TagIndex {
    /// Record a tag; tags must arrive in increasing line order
    pub(crate) fn push(&mut self, tag: Tag) {
        debug_assert!(self
            .line_numbers
            .last()
            .map_or(true, |&last| last < tag.line_number));
        self.line_numbers.push(tag.line_number);
        self.tags.insert(tag.line_number, tag);
    }

    /// Get the tag declared on a line
    #[must_use]
    pub fn get(&self, line_number: usize) -> Option<&Tag> {
        self.tags.get(&line_number)
    }

    /// Number of tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.line_numbers.len()
    }

    /// Whether no tags were found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_numbers.is_empty()
    }

    /// Tags in line order
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// Tags in line order paired with their nesting depth (0 = top level)
    ///
    /// Depth is recomputed by indentation comparison, the same way the
    /// builder nests tags.
    #[must_use]
    pub fn outline(&self) -> Vec<(usize, &Tag)> {
        let mut open: Vec<usize> = Vec::new();
        self.iter()
            .map(|tag| {
                while open.last().is_some_and(|&indent| indent >= tag.indent_level) {
                    open.pop();
                }
                let depth = open.len();
                open.push(tag.indent_level);
                (depth, tag)
            })
            .collect()
    }
}

/// The three display fields a host renders for the cursor position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    /// "<full_name> (<kind>)"
    pub combined: String,

    /// Full dotted name
    pub tag: String,

    /// Kind word
    pub kind: String,
}

impl StatusLine {
    /// Render a resolved tag, or empty fields when there is none
    #[must_use]
    pub fn from_tag(tag: Option<&Tag>) -> Self {
        match tag {
            Some(tag) => Self {
                combined: tag.to_string(),
                tag: tag.full_name.clone(),
                kind: tag.kind.as_str().to_string(),
            },
            None => Self::default(),
        }
    }

    /// Whether no tag was resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}
