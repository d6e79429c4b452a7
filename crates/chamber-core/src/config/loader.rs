//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.openchamber.toml` in the project root or the
//! user config directory.

use super::types::ChamberConfig;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.openchamber.toml`
/// 2. User-level `~/.config/openchamber/config.toml`
/// 3. Default configuration
///
/// Environment overrides apply on top of whichever source wins.
pub fn load_config(project_dir: &Path) -> Result<ChamberConfig, ConfigError> {
    let project_config = project_dir.join(".openchamber.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    if let Some(user_config) = get_user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    Ok(apply_env_overrides(ChamberConfig::default(), env_lookup))
}

/// Get user config directory path
fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("openchamber").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<ChamberConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: ChamberConfig = toml::from_str(&content)?;

    expand_env_vars(&mut config);

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(apply_env_overrides(config, env_lookup))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Expand ${VAR} patterns in string values
fn expand_env_vars(config: &mut ChamberConfig) {
    let env_regex = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

    if let Some(ref path) = config.persistence.path {
        config.persistence.path = Some(expand_string(path, &env_regex));
    }
}

/// Expand environment variables in a single string
fn expand_string(s: &str, regex: &Regex) -> String {
    regex
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

/// Apply environment variable overrides
///
/// Supports:
/// - OPENCHAMBER_STRICT -> strict (`1`, `true`, `yes`)
/// - OPENCHAMBER_LAYOUT_PATH -> persistence.path
fn apply_env_overrides(
    mut config: ChamberConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ChamberConfig {
    if let Some(value) = lookup("OPENCHAMBER_STRICT") {
        config.strict = matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }

    if let Some(path) = lookup("OPENCHAMBER_LAYOUT_PATH") {
        config.persistence.path = Some(path);
    }

    config
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# OpenChamber Configuration
# Place this file in your project root as .openchamber.toml
# or in ~/.config/openchamber/config.toml for global settings

# Report operations on unknown tabs as errors instead of ignoring them
strict = false

[layout]
right_pane_visible = true
# Clamped to 280..=800
right_pane_width = 400

[persistence]
enabled = true
debounce_ms = 250
# path = "${HOME}/.config/openchamber/layout.json"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_parses() {
        let config: ChamberConfig = toml::from_str(sample_config()).unwrap();
        assert!(!config.strict);
        assert_eq!(config.layout.right_pane_width, 400);
        assert!(config.persistence.path.is_none());
    }

    #[test]
    fn test_expand_env_var() {
        let regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
        std::env::set_var("OPENCHAMBER_TEST_VAR", "test_value");
        let result = expand_string("prefix_${OPENCHAMBER_TEST_VAR}_suffix", &regex);
        assert_eq!(result, "prefix_test_value_suffix");
        std::env::remove_var("OPENCHAMBER_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
        let result = expand_string("${OPENCHAMBER_NONEXISTENT_VAR}", &regex);
        assert_eq!(result, "${OPENCHAMBER_NONEXISTENT_VAR}");
    }

    #[test]
    fn test_env_overrides() {
        let lookup = |name: &str| match name {
            "OPENCHAMBER_STRICT" => Some("TRUE".to_string()),
            "OPENCHAMBER_LAYOUT_PATH" => Some("/tmp/x.json".to_string()),
            _ => None,
        };
        let config = apply_env_overrides(ChamberConfig::default(), lookup);
        assert!(config.strict);
        assert_eq!(config.persistence.path.as_deref(), Some("/tmp/x.json"));
    }

    #[test]
    fn test_project_config_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".openchamber.toml"),
            "[persistence]\ndebounce_ms = 10\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.persistence.debounce_ms, 10);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "strict = [").unwrap();
        assert!(matches!(load_from_file(&path), Err(ConfigError::ParseError(_))));
    }
}
