//! Secrets management for reviewbot
//!
//! In CI every credential comes from the environment. For local runs the same
//! values can be kept in `~/.config/reviewbot/secrets.toml`, which must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GH_API_TOKEN / GITHUB_TOKEN, GEMINI_API_KEY, DISCORD_WEBHOOK_URL)
//! 2. Secrets file (~/.config/reviewbot/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Environment variables checked for the GitHub token, in order
pub const GITHUB_TOKEN_VARS: [&str; 2] = ["GH_API_TOKEN", "GITHUB_TOKEN"];
/// Environment variable holding the Gemini API key
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the Discord webhook URL
pub const DISCORD_WEBHOOK_VAR: &str = "DISCORD_WEBHOOK_URL";

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub github: GitHubSecrets,
    pub gemini: GeminiSecrets,
    pub discord: DiscordSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// Token with read access to the repository
    pub token: Option<String>,
}

/// Gemini-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiSecrets {
    pub api_key: Option<String>,
}

/// Discord-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscordSecrets {
    /// Full webhook URL, which embeds its own token
    pub webhook_url: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // readable by group or others
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/reviewbot/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reviewbot").join("secrets.toml"))
    }

    /// GitHub token, environment first
    pub fn github_token(&self) -> Option<String> {
        self.github_token_from(env_lookup)
    }

    /// Gemini API key, environment first
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini_api_key_from(env_lookup)
    }

    /// Discord webhook URL, environment first
    pub fn discord_webhook_url(&self) -> Option<String> {
        self.discord_webhook_url_from(env_lookup)
    }

    fn github_token_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        GITHUB_TOKEN_VARS
            .into_iter()
            .find_map(|var| {
                let value = non_empty(lookup(var))?;
                debug!(var, "Using GitHub token from environment");
                Some(value)
            })
            .or_else(|| non_empty(self.github.token.clone()))
    }

    fn gemini_api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        non_empty(lookup(GEMINI_KEY_VAR)).or_else(|| non_empty(self.gemini.api_key.clone()))
    }

    fn discord_webhook_url_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        non_empty(lookup(DISCORD_WEBHOOK_VAR))
            .or_else(|| non_empty(self.discord.webhook_url.clone()))
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Trim, and treat blank values as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_secrets() {
        let secrets = Secrets::default();
        assert!(secrets.github.token.is_none());
        assert!(secrets.gemini.api_key.is_none());
        assert!(secrets.discord.webhook_url.is_none());
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[github]
token = "ghp_xxxxxxxxxxxx"

[gemini]
api_key = "AIza-test"

[discord]
webhook_url = "https://discord.com/api/webhooks/1/abc"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.github_token_from(no_env), Some("ghp_xxxxxxxxxxxx".to_string()));
        assert_eq!(secrets.gemini_api_key_from(no_env), Some("AIza-test".to_string()));
        assert_eq!(
            secrets.discord_webhook_url_from(no_env),
            Some("https://discord.com/api/webhooks/1/abc".to_string())
        );
    }

    #[test]
    fn test_env_takes_priority() {
        let secrets = Secrets {
            github: GitHubSecrets {
                token: Some("from_file".to_string()),
            },
            ..Default::default()
        };

        let token = secrets.github_token_from(|k| (k == "GITHUB_TOKEN").then(|| "from_env".into()));
        assert_eq!(token, Some("from_env".to_string()));

        let token = secrets.github_token_from(|k| match k {
            "GH_API_TOKEN" => Some("primary".into()),
            "GITHUB_TOKEN" => Some("fallback".into()),
            _ => None,
        });
        assert_eq!(token, Some("primary".to_string()));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let secrets = Secrets {
            github: GitHubSecrets {
                token: Some("   ".to_string()),
            },
            ..Default::default()
        };
        assert!(secrets.github_token_from(|_| Some("  ".into())).is_none());
        assert!(secrets.gemini_api_key_from(|_| Some(String::new())).is_none());
    }

    #[test]
    fn test_token_whitespace_trimmed() {
        let secrets = Secrets::default();
        let key = secrets.gemini_api_key_from(|_| Some("  AIza-key\n".into()));
        assert_eq!(key, Some("AIza-key".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[gemini]\napi_key = \"AIza-test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.gemini.api_key, Some("AIza-test".to_string()));
    }
}
