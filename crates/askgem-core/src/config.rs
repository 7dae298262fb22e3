//! Configuration management for askgem.
//!
//! Loads configuration from ${ASKGEM_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::providers::GeminiConfig;
use crate::providers::gemini::DEFAULT_MODEL;
use crate::theme::Theme;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template stay present while the user's
/// values are preserved.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for askgem configuration.
    //!
    //! ASKGEM_HOME resolution order:
    //! 1. ASKGEM_HOME environment variable (if set)
    //! 2. ~/.config/askgem (default)

    use std::path::PathBuf;

    /// Returns the askgem home directory.
    pub fn askgem_home() -> PathBuf {
        if let Ok(home) = std::env::var("ASKGEM_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".askgem"),
            |h| h.join(".config").join("askgem"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        askgem_home().join("config.toml")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The Gemini model to use
    pub model: String,

    /// Maximum output tokens (optional)
    pub max_output_tokens: Option<u32>,

    /// Wrap raw code spans before formatting
    pub prewrap_code: bool,

    /// Saved page theme; unset follows the system preference
    pub theme: Option<Theme>,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    /// Effective page theme (saved, else system preference).
    pub fn effective_theme(&self) -> Theme {
        Theme::resolve(self.theme)
    }

    /// Builds the Gemini client config for `model`.
    ///
    /// # Errors
    /// Returns an error if no API key is available or the base URL is invalid.
    pub fn gemini_config(&self, model: &str) -> Result<GeminiConfig> {
        let provider = &self.providers.gemini;
        GeminiConfig::from_env(
            model.to_string(),
            self.max_output_tokens,
            provider.effective_base_url(),
            provider.effective_api_key(),
        )
    }

    /// Saves only the theme field to the config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or written.
    pub fn save_theme(theme: Theme) -> Result<()> {
        Self::save_theme_to(&paths::config_path(), theme)
    }

    /// Saves only the theme field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or written.
    pub fn save_theme_to(path: &Path, theme: Theme) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["theme"] = value(theme.as_str());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: None,
            prewrap_code: true,
            theme: None,
            providers: ProvidersConfig::default(),
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: ProviderConfig,
}

/// Provider configuration entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    /// Optional API key (overrides environment variable).
    pub api_key: Option<String>,
    /// Optional API base URL (for proxies).
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Returns the effective API key if set and non-empty.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns the effective base URL if set and non-empty.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_output_tokens, None);
        assert!(config.prewrap_code);
        assert_eq!(config.theme, None);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "model = \"gemini-2.5-flash\"\ntheme = \"dark\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.theme, Some(Theme::Dark));
        assert!(config.prewrap_code);
    }

    #[test]
    fn test_load_invalid_theme_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "theme = \"sepia\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed.model, Config::default().model);
        assert_eq!(parsed.prewrap_code, Config::default().prewrap_code);
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("gemini-2.0-flash"));
        assert!(contents.contains("# max_output_tokens ="));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_save_theme_preserves_other_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "model = \"gemini-2.5-pro\"\n\n[providers.gemini]\nbase_url = \"http://localhost:9\"\n",
        )
        .unwrap();

        Config::save_theme_to(&config_path, Theme::Dark).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.theme, Some(Theme::Dark));
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.providers.gemini.effective_base_url(),
            Some("http://localhost:9")
        );
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# askgem configuration"));
    }

    #[test]
    fn test_save_theme_creates_missing_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        Config::save_theme_to(&config_path, Theme::Light).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.theme, Some(Theme::Light));
    }

    #[test]
    fn test_gemini_config_uses_config_key() {
        let config = Config {
            providers: ProvidersConfig {
                gemini: ProviderConfig {
                    api_key: Some("cfg-key".to_string()),
                    base_url: Some("http://127.0.0.1:1234".to_string()),
                },
            },
            max_output_tokens: Some(512),
            ..Default::default()
        };

        let gemini = config.gemini_config("gemini-2.5-flash").unwrap();
        assert_eq!(gemini.api_key, "cfg-key");
        assert_eq!(gemini.model, "gemini-2.5-flash");
        assert_eq!(gemini.max_output_tokens, Some(512));
    }

    #[test]
    fn test_blank_provider_values_are_ignored() {
        let provider = ProviderConfig {
            api_key: Some("   ".to_string()),
            base_url: Some(String::new()),
        };
        assert_eq!(provider.effective_api_key(), None);
        assert_eq!(provider.effective_base_url(), None);
    }
}
