use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.github.com/repos/Kron4ek/Wine-Builds/releases";
pub const DEFAULT_INFO_URL: &str = "https://github.com/Kron4ek/Wine-Builds/releases/tag/";
pub const DEFAULT_RELEASE_FORMAT: &str = "tar.xz";
pub const DEFAULT_USER_AGENT: &str = concat!("wine-builds/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Main App Config
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub releases endpoint of the Wine-Builds repository
    pub api_url: String,
    /// Prefix of the human-readable release page, the tag is appended
    pub info_url: String,
    pub release_format: String,
    pub per_page: u32,
    pub user_agent: String,
    pub github_token: Option<String>,
    pub probe_timeout_secs: u64,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            info_url: DEFAULT_INFO_URL.to_string(),
            release_format: DEFAULT_RELEASE_FORMAT.to_string(),
            per_page: 100,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            github_token: None,
            probe_timeout_secs: 10,
            log_to_file: true,
        }
    }
}

impl AppConfig {
    pub fn get_path() -> PathBuf {
        crate::wb_path!("config.json")
    }

    pub fn load() -> Self {
        let path = Self::get_path();
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => crate::logging::log_warning(&format!(
                        "Ignoring malformed config {}: {}",
                        path.display(),
                        e
                    )),
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        let path = Self::get_path();
        // Ensure parent dir exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Token from the config file, else from `GITHUB_TOKEN`
    pub fn effective_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "per_page": 30 }"#).unwrap();
        assert_eq!(config.per_page, 30);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.release_format, "tar.xz");
        assert!(config.github_token.is_none());
    }

    #[test]
    fn test_config_roundtrip_keeps_token() {
        let config = AppConfig {
            github_token: Some("abc".to_string()),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.effective_token().as_deref(), Some("abc"));
    }
}
