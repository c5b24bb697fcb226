use crate::config::{IndentMode, TaggerConfig};
use crate::error::{Result, TaggerError};
use crate::types::{ClassifiedLine, Declaration, DeclarationKind, LineContent};
use regex::Regex;

/// `class <name>` or `def <name>`; the name stops at `(`, `:` or whitespace.
const DECLARATION_PATTERN: &str = r"^(def|class)[ \t]+([^(:\s]+)";

/// Classifies single source lines by indentation and declaration keyword
///
/// This is a best-effort scanner, not a tokenizer: a `def` inside a string
/// or docstring is reported like any other declaration.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    indent_mode: IndentMode,
    tab_width: usize,
    comment_marker: char,
    declaration: Regex,
}

impl LineClassifier {
    /// Create a classifier from configuration
    pub fn new(config: &TaggerConfig) -> Result<Self> {
        config.validate().map_err(TaggerError::invalid_config)?;

        Ok(Self {
            indent_mode: config.indent_mode,
            tab_width: config.tab_width,
            comment_marker: config.comment_marker,
            declaration: Regex::new(DECLARATION_PATTERN)?,
        })
    }

    /// Classify one raw source line
    pub fn classify(&self, line: &str) -> ClassifiedLine {
        let (leading, rest) = split_indent(line);
        let indent = self.indent_mode.measure(leading, self.tab_width);

        let code = self.strip_comment(rest).trim();
        let content = if !code.is_empty() {
            LineContent::Code
        } else if rest.trim().is_empty() {
            LineContent::Blank
        } else {
            LineContent::Comment
        };

        let declaration = self.declaration.captures(code).and_then(|caps| {
            let kind = DeclarationKind::from_keyword(caps.get(1)?.as_str())?;
            let name = caps.get(2)?.as_str().to_string();
            Some(Declaration { kind, name })
        });

        ClassifiedLine {
            indent,
            content,
            declaration,
        }
    }

    /// Indent level of a line, without looking at its content
    pub fn indent_of(&self, line: &str) -> usize {
        self.indent_mode.measure(split_indent(line).0, self.tab_width)
    }

    /// Drop everything from the first comment marker not preceded by a backslash
    fn strip_comment<'a>(&self, text: &'a str) -> &'a str {
        let mut escaped = false;
        for (idx, ch) in text.char_indices() {
            if ch == self.comment_marker && !escaped {
                return &text[..idx];
            }
            escaped = ch == '\\' && !escaped;
        }
        text
    }
}

/// Split a line into its leading spaces/tabs and the remainder
fn split_indent(line: &str) -> (&str, &str) {
    let end = line
        .find(|ch: char| ch != ' ' && ch != '\t')
        .unwrap_or(line.len());
    line.split_at(end)
}
