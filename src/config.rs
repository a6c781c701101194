//! Configuration loading and persistence.
//!
//! Settings live in a TOML file under the platform config directory and are
//! threaded through the TOC engine as an explicit, immutable value; nothing
//! reads them from ambient state. A malformed file, or a malformed
//! `default_expansion_level` inside an otherwise valid file, falls back to
//! documented defaults rather than failing.

use log::warn;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub outline: OutlineSettings,

    #[serde(default)]
    pub output: OutputConfig,
}

/// The outline settings surface consumed by [`TocView`](crate::toc::TocView).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSettings {
    /// Children at this nesting level or deeper start collapsed.
    #[serde(
        default = "default_expansion_level",
        deserialize_with = "lenient_expansion_level"
    )]
    pub default_expansion_level: usize,

    /// Maximum depth to descend from the traversal root.
    #[serde(default = "default_levels")]
    pub levels: usize,

    /// Restrict the outline to heading-classified blocks only.
    #[serde(default)]
    pub headings_only: bool,

    /// Hide the "go to page" control on every row.
    #[serde(default)]
    pub no_page_jump: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "tree", "plain" or "json"
    #[serde(default = "default_format")]
    pub format: String,

    /// Maximum label width in terminal cells; 0 disables truncation
    #[serde(default)]
    pub width: usize,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            default_expansion_level: default_expansion_level(),
            levels: default_levels(),
            headings_only: false,
            no_page_jump: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            width: 0,
        }
    }
}

fn default_expansion_level() -> usize {
    1
}

fn default_levels() -> usize {
    1
}

fn default_format() -> String {
    "tree".to_string()
}

/// Accept an integer, a numeric string, or fall back to the default on
/// anything else (negative numbers, non-numeric strings, wrong types).
fn lenient_expansion_level<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
        #[allow(dead_code)]
        Other(IgnoredAny),
    }

    let level = match Raw::deserialize(deserializer)? {
        Raw::Number(n) if n >= 0 => n as usize,
        Raw::Text(s) => match s.trim().parse::<usize>() {
            Ok(n) => n,
            Err(_) => {
                warn!("ignoring malformed default_expansion_level {s:?}");
                default_expansion_level()
            }
        },
        _ => {
            warn!("ignoring malformed default_expansion_level");
            default_expansion_level()
        }
    };
    Ok(level)
}

impl Config {
    /// Get the XDG-style config file path (~/.config/tocgen/config.toml)
    /// This is preferred on macOS for CLI tools and cross-platform dotfiles
    #[cfg(target_os = "macos")]
    fn xdg_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("tocgen").join("config.toml"))
    }

    /// Get the platform-specific config file path
    /// - macOS: ~/Library/Application Support/tocgen/config.toml
    /// - Linux: ~/.config/tocgen/config.toml
    /// - Windows: %APPDATA%/tocgen/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tocgen").join("config.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    /// On macOS, checks ~/.config/tocgen first, then falls back to
    /// ~/Library/Application Support
    pub fn load() -> Self {
        #[cfg(target_os = "macos")]
        {
            if let Some(xdg_path) = Self::xdg_config_path() {
                if let Some(config) = Self::load_from(&xdg_path) {
                    return config;
                }
            }
        }

        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load config from a specific file. `None` if the file is missing or
    /// does not parse as TOML.
    pub fn load_from(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!("malformed config {}: {err}", path.display());
                None
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.outline.default_expansion_level, 1);
        assert_eq!(config.outline.levels, 1);
        assert!(!config.outline.headings_only);
        assert!(!config.outline.no_page_jump);
        assert_eq!(config.output.format, "tree");
        assert_eq!(config.output.width, 0);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [outline]
            default_expansion_level = 2
            levels = 4
            headings_only = true
            no_page_jump = true

            [output]
            format = "json"
            width = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.outline.default_expansion_level, 2);
        assert_eq!(config.outline.levels, 4);
        assert!(config.outline.headings_only);
        assert!(config.outline.no_page_jump);
        assert_eq!(config.output.format, "json");
        assert_eq!(config.output.width, 60);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.outline.levels, 1);
    }

    #[test]
    fn test_expansion_level_from_string() {
        let config: Config = toml::from_str("[outline]\ndefault_expansion_level = \"2\"").unwrap();
        assert_eq!(config.outline.default_expansion_level, 2);
    }

    #[test]
    fn test_expansion_level_malformed_falls_back() {
        for value in ["\"abc\"", "-3", "true", "1.5"] {
            let toml = format!("[outline]\ndefault_expansion_level = {value}");
            let config: Config = toml::from_str(&toml).unwrap();
            assert_eq!(
                config.outline.default_expansion_level, 1,
                "value {value} should fall back to the default"
            );
        }
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(Config::load_from(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[outline]\nlevels = 3\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.outline.levels, 3);
        assert_eq!(config.outline.default_expansion_level, 1);
    }

    #[test]
    fn test_load_from_garbage_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not [ valid toml").unwrap();
        assert!(Config::load_from(&path).is_none());
    }
}
