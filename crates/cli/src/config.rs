use anyhow::{anyhow, Context, Result};
use pyscope_tagger::{IndentMode, TaggerConfig};
use std::fs;
use std::path::Path;

/// Command-line settings layered over the config file
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConfigOverrides {
    pub tab_width: Option<usize>,
    pub visual_indent: bool,
}

/// Load tagger configuration from an optional JSON/TOML file plus flag overrides
pub(crate) fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<TaggerConfig> {
    let mut config = match path {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            parse_config(&bytes).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => TaggerConfig::default(),
    };

    if let Some(tab_width) = overrides.tab_width {
        config.tab_width = tab_width;
    }
    if overrides.visual_indent {
        config.indent_mode = IndentMode::Visual;
    }

    config
        .validate()
        .map_err(|err| anyhow!("Invalid configuration: {err}"))?;
    log::debug!("using config {config:?}");
    Ok(config)
}

/// Parse JSON, falling back to TOML
fn parse_config(bytes: &[u8]) -> Result<TaggerConfig> {
    match serde_json::from_slice(bytes) {
        Ok(config) => Ok(config),
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            toml::from_str(utf8).map_err(|toml_err| {
                anyhow!("Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None, ConfigOverrides::default()).unwrap();
        assert_eq!(config, TaggerConfig::default());
    }

    #[test]
    fn test_parse_json() {
        let config = parse_config(br#"{"tab_width": 4, "indent_mode": "visual"}"#).unwrap();
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.indent_mode, IndentMode::Visual);
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_config(b"tab_width = 2\ncomment_marker = \";\"\n").unwrap();
        assert_eq!(config.tab_width, 2);
        assert_eq!(config.comment_marker, ';');
        assert_eq!(config.indent_mode, IndentMode::Raw);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_config(b"tabwidth = 2\n").unwrap_err();
        assert!(err.to_string().contains("TOML"), "{err}");
    }

    #[test]
    fn test_overrides_applied_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tab_width = 4").unwrap();

        let config = load_config(
            Some(file.path()),
            ConfigOverrides {
                tab_width: Some(2),
                visual_indent: true,
            },
        )
        .unwrap();
        assert_eq!(config.tab_width, 2);
        assert_eq!(config.indent_mode, IndentMode::Visual);

        let invalid = load_config(
            None,
            ConfigOverrides {
                tab_width: Some(0),
                visual_indent: false,
            },
        );
        assert!(invalid.is_err());
    }
}
