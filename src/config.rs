use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_NOTIFICATION_MS: u64 = 3000;
const DEFAULT_AVATAR_SIZE: u32 = 40;
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings resolved once at startup and handed to the client and shell.
#[derive(Clone)]
pub struct Config {
    /// Bearer credential sent with every API request.
    pub token: Option<String>,
    pub api_url: String,
    /// How long a notification stays on screen before it hides itself.
    pub notification_timeout: Duration,
    /// Edge length of avatar thumbnails; `0` disables avatar downloads.
    pub avatar_size: u32,
    pub log_filter: String,
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty());

        let api_url = lookup("GITHUB_API_URL")
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let notification_ms = match lookup("EXPLORER_NOTIFICATION_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("EXPLORER_NOTIFICATION_MS is not a number: {raw:?}"))?,
            None => DEFAULT_NOTIFICATION_MS,
        };

        let avatar_size = match lookup("EXPLORER_AVATAR_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("EXPLORER_AVATAR_SIZE is not a number: {raw:?}"))?,
            None => DEFAULT_AVATAR_SIZE,
        };

        let log_filter = lookup("EXPLORER_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            token,
            api_url,
            notification_timeout: Duration::from_millis(notification_ms),
            avatar_size,
            log_filter,
        })
    }

    pub fn avatars_enabled(&self) -> bool {
        self.avatar_size > 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            notification_timeout: Duration::from_millis(DEFAULT_NOTIFICATION_MS),
            avatar_size: DEFAULT_AVATAR_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &self.token.as_deref().map(mask_token))
            .field("api_url", &self.api_url)
            .field("notification_timeout", &self.notification_timeout)
            .field("avatar_size", &self.avatar_size)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.token, None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.notification_timeout, Duration::from_millis(3000));
        assert_eq!(config.avatar_size, 40);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let config = config_from(&[("GITHUB_TOKEN", "  ")]).unwrap();
        assert_eq!(config.token, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("GITHUB_TOKEN", "ghp_secret"),
            ("GITHUB_API_URL", "http://localhost:8080/"),
            ("EXPLORER_NOTIFICATION_MS", "1500"),
            ("EXPLORER_AVATAR_SIZE", "0"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("ghp_secret"));
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.notification_timeout, Duration::from_millis(1500));
        assert!(!config.avatars_enabled());
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn explorer_log_wins_over_rust_log() {
        let config = config_from(&[("EXPLORER_LOG", "trace"), ("RUST_LOG", "warn")]).unwrap();
        assert_eq!(config.log_filter, "trace");
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = config_from(&[("EXPLORER_NOTIFICATION_MS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("EXPLORER_NOTIFICATION_MS"));
    }

    #[test]
    fn debug_output_masks_the_token() {
        let config = config_from(&[("GITHUB_TOKEN", "ghp_abcdefghijklmnop")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_abcdefghijklmnop"));
        assert!(rendered.contains("ghp_****mnop"));
    }
}
