use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Config file read when `DMCAST_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Process configuration, loaded once at startup and immutable thereafter.
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Command prefix, e.g. `!`.
    pub prefix: String,
    /// Number of direct messages sent between pacing pauses.
    pub rate_limit: usize,
    /// Bot token; the `DISCORD_TOKEN` environment variable takes priority.
    #[serde(default)]
    pub token: Option<String>,
}

/// Loads the configuration file from `path`.
///
/// A missing file or malformed JSON is a fatal startup error; the caller is
/// expected to log it and terminate before any network connection is made.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {path_ref:?}: {e}")))?;
    parse_config(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse config file {path_ref:?}: {e}")))
}

fn parse_config(contents: &str) -> std::result::Result<AppConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Resolves the bot token: environment variable first, config file second.
///
/// Blank values count as absent. Returns a fatal [`Error::Config`] when
/// neither source yields a non-empty token.
pub fn resolve_token(env_token: Option<String>, config_token: Option<&str>) -> Result<String> {
    env_token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| {
            config_token
                .map(str::to_owned)
                .filter(|token| !token.trim().is_empty())
        })
        .ok_or_else(|| {
            Error::Config(
                "No Discord token found. Set the DISCORD_TOKEN environment variable \
                 or add a `token` entry to the config file."
                    .to_owned(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_with_all_keys() {
        let config = parse_config(r#"{"prefix": "!", "rate_limit": 5, "token": "abc"}"#).unwrap();
        assert_eq!(config.prefix, "!");
        assert_eq!(config.rate_limit, 5);
        assert_eq!(config.token.as_deref(), Some("abc"));
    }

    #[test]
    fn parse_config_token_is_optional() {
        let config = parse_config(r#"{"prefix": "?", "rate_limit": 10}"#).unwrap();
        assert_eq!(config.prefix, "?");
        assert!(config.token.is_none());
    }

    #[test]
    fn parse_config_rejects_missing_prefix() {
        assert!(parse_config(r#"{"rate_limit": 5}"#).is_err());
    }

    #[test]
    fn parse_config_rejects_malformed_json() {
        assert!(parse_config("{not json").is_err());
    }

    #[test]
    fn load_config_missing_file_is_config_error() {
        let result = load_config("definitely/does/not/exist.json");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn resolve_token_prefers_environment() {
        let token = resolve_token(Some("from-env".to_owned()), Some("from-file")).unwrap();
        assert_eq!(token, "from-env");
    }

    #[test]
    fn resolve_token_falls_back_to_config() {
        let token = resolve_token(None, Some("from-file")).unwrap();
        assert_eq!(token, "from-file");
    }

    #[test]
    fn resolve_token_skips_blank_environment_value() {
        let token = resolve_token(Some("   ".to_owned()), Some("from-file")).unwrap();
        assert_eq!(token, "from-file");
    }

    #[test]
    fn resolve_token_fails_when_both_sources_empty() {
        assert!(matches!(
            resolve_token(None, Some("")),
            Err(Error::Config(_))
        ));
        assert!(matches!(resolve_token(None, None), Err(Error::Config(_))));
    }
}
