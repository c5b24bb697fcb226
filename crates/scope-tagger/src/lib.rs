//! # Pyscope Tagger
//!
//! Indentation-driven symbol outline for Python-like source, and the answer
//! to "which class, method or function is the cursor in?".
//!
//! ## Philosophy
//!
//! No grammar, no tokenizer. Lines are classified by their leading
//! whitespace and a `class`/`def` keyword match, which is fast, tolerant of
//! broken code and good enough for a status line:
//! - Scopes are implied by indentation; nothing marks where a body ends
//! - Nesting lives in each tag's dotted `full_name`, not in parent links
//! - Strings and docstrings are not understood (`def` inside one is a tag)
//!
//! ## Architecture
//!
//! ```text
//! Host (buffer id, change counter, lines, cursor)
//!     │
//!     ├──> Tag Cache ── counter unchanged? ──> cached TagIndex
//!     │        │
//!     │        └──> Tag Tree Builder
//!     │               └─> Line Classifier (indent, class/def, name)
//!     │
//!     └──> Nearest-Tag Resolver
//!            ├─> Pick the closest tag at or above the cursor
//!            ├─> Walk down to the cursor looking for dedented code
//!            └─> Fall back to enclosing tags, or None
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pyscope_tagger::{Cursor, ScopeFinder, TagKind, TaggerConfig};
//!
//! let mut finder: ScopeFinder<u32> = ScopeFinder::new(TaggerConfig::default()).unwrap();
//!
//! let source = "class C:\n    def m(self):\n        pass\n";
//! let lines: Vec<&str> = source.lines().collect();
//!
//! let tag = finder.find_tag(1, 1, &lines, Cursor::new(3, 9)).unwrap();
//! assert_eq!(tag.full_name, "C.m");
//! assert_eq!(tag.kind, TagKind::Method);
//! ```

mod builder;
mod cache;
mod classifier;
mod config;
mod error;
mod finder;
mod resolver;
mod types;

pub use builder::TagTreeBuilder;
pub use cache::{CacheStats, TagCache};
pub use classifier::LineClassifier;
pub use config::{IndentMode, TaggerConfig};
pub use error::{Result, TaggerError};
pub use finder::{read_source_lines, Cursor, ScopeFinder};
pub use resolver::{resolve_cursor_tag, NearestTagResolver};
pub use types::{
    ClassifiedLine, Declaration, DeclarationKind, LineContent, StatusLine, Tag, TagIndex,
    TagKind,
};
