use serde::{Deserialize, Serialize};

/// Configuration for line classification and tag caching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaggerConfig {
    /// How leading whitespace is turned into an indent level
    pub indent_mode: IndentMode,

    /// Tab stop width used by [`IndentMode::Visual`]
    pub tab_width: usize,

    /// Character that starts a line comment
    pub comment_marker: char,

    /// Maximum number of buffers kept in the tag cache
    pub cache_capacity: usize,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            indent_mode: IndentMode::Raw,
            tab_width: 8,
            comment_marker: '#',
            cache_capacity: 64,
        }
    }
}

impl TaggerConfig {
    /// Create config that measures indentation by display column
    pub fn visual() -> Self {
        Self {
            indent_mode: IndentMode::Visual,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tab_width == 0 {
            return Err("tab_width must be > 0".to_string());
        }

        if self.comment_marker.is_whitespace() {
            return Err(format!(
                "comment_marker ({:?}) cannot be whitespace",
                self.comment_marker
            ));
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be > 0".to_string());
        }

        Ok(())
    }
}

/// Strategy for measuring indentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentMode {
    /// Every leading space or tab counts as one column
    #[default]
    Raw,

    /// Tabs advance to the next tab stop
    Visual,
}

impl IndentMode {
    /// Measure the indent level of a run of leading whitespace
    #[must_use]
    pub fn measure(self, leading: &str, tab_width: usize) -> usize {
        match self {
            Self::Raw => leading.chars().count(),
            Self::Visual => leading.chars().fold(0, |col, ch| {
                if ch == '\t' {
                    (col / tab_width + 1) * tab_width
                } else {
                    col + 1
                }
            }),
        }
    }
}
