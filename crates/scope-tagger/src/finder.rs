use crate::builder::TagTreeBuilder;
use crate::cache::{CacheStats, TagCache};
use crate::classifier::LineClassifier;
use crate::config::TaggerConfig;
use crate::error::{Result, TaggerError};
use crate::resolver::NearestTagResolver;
use crate::types::{StatusLine, Tag, TagIndex};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// Cursor position as reported by the host (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub line: usize,
    /// Not used for resolution
    pub column: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Main interface for hosts: cached tagging plus cursor resolution
///
/// One finder serves many buffers; `K` is whatever the host uses to
/// identify a buffer.
pub struct ScopeFinder<K: Hash + Eq> {
    config: TaggerConfig,
    classifier: LineClassifier,
    cache: TagCache<K>,
}

impl<K: Hash + Eq + std::fmt::Debug> ScopeFinder<K> {
    /// Create a new finder with configuration
    pub fn new(config: TaggerConfig) -> Result<Self> {
        let classifier = LineClassifier::new(&config)?;
        let capacity = NonZeroUsize::new(config.cache_capacity)
            .ok_or_else(|| TaggerError::invalid_config("cache_capacity must be > 0"))?;

        Ok(Self {
            config,
            classifier,
            cache: TagCache::new(capacity),
        })
    }

    /// Tags for a buffer, rescanned only when `change_counter` moved
    pub fn get_or_build_tags<S: AsRef<str>>(
        &mut self,
        buffer_id: K,
        change_counter: u64,
        lines: &[S],
    ) -> Arc<TagIndex> {
        let classifier = &self.classifier;
        self.cache.get_or_build(buffer_id, change_counter, || {
            TagTreeBuilder::new(classifier).build(lines)
        })
    }

    /// Resolve the tag enclosing `cursor_line` in an already built index
    pub fn resolve_cursor_tag<'t, S: AsRef<str>>(
        &self,
        cursor_line: usize,
        index: &'t TagIndex,
        lines: &[S],
    ) -> Option<&'t Tag> {
        NearestTagResolver::new(&self.classifier).resolve(cursor_line, index, lines)
    }

    /// Find the tag for a cursor position in a buffer
    pub fn find_tag<S: AsRef<str>>(
        &mut self,
        buffer_id: K,
        change_counter: u64,
        lines: &[S],
        cursor: Cursor,
    ) -> Option<Tag> {
        let index = self.get_or_build_tags(buffer_id, change_counter, lines);
        self.resolve_cursor_tag(cursor.line, &index, lines).cloned()
    }

    /// Display fields for a cursor position in a buffer
    pub fn status_line<S: AsRef<str>>(
        &mut self,
        buffer_id: K,
        change_counter: u64,
        lines: &[S],
        cursor: Cursor,
    ) -> StatusLine {
        let tag = self.find_tag(buffer_id, change_counter, lines, cursor);
        StatusLine::from_tag(tag.as_ref())
    }

    /// Forget a buffer, e.g. when the host closes it
    pub fn evict(&mut self, buffer_id: &K) {
        self.cache.evict(buffer_id);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Get configuration
    pub const fn config(&self) -> &TaggerConfig {
        &self.config
    }

    pub const fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }
}

/// Read a source file as lines, without line terminators
pub fn read_source_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagKind;
    use std::io::Write;

    const SOURCE: &str = "class C:\n    def m(self):\n        pass\n";

    fn finder() -> ScopeFinder<u64> {
        ScopeFinder::new(TaggerConfig::default()).unwrap()
    }

    #[test]
    fn test_find_tag() {
        let lines: Vec<&str> = SOURCE.lines().collect();
        let tag = finder().find_tag(1, 1, &lines, Cursor::new(3, 9)).unwrap();
        assert_eq!(tag.full_name, "C.m");
        assert_eq!(tag.kind, TagKind::Method);
    }

    #[test]
    fn test_status_line() {
        let lines: Vec<&str> = SOURCE.lines().collect();
        let mut finder = finder();
        let status = finder.status_line(1, 1, &lines, Cursor::new(1, 1));
        assert_eq!(status.combined, "C (class)");

        let empty = finder.status_line(2, 1, &["x = 1"], Cursor::new(1, 1));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_repeated_queries_use_cache() {
        let lines: Vec<&str> = SOURCE.lines().collect();
        let mut finder = finder();
        for line in 1..=3 {
            finder.find_tag(9, 4, &lines, Cursor::new(line, 1));
        }
        let stats = finder.cache_stats();
        assert_eq!(stats.rebuilds, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_invalid_config() {
        let config = TaggerConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(ScopeFinder::<u64>::new(config).is_err());
    }

    #[test]
    fn test_read_source_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "def f():\r\n    pass\r\n").unwrap();
        let lines = read_source_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["def f():", "    pass"]);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_source_lines("/definitely/not/here.py");
        assert!(matches!(result, Err(TaggerError::Io(_))));
    }
}
