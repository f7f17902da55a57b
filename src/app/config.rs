//! Loads the relay configuration.
//!
//! Settings are layered with `figment`: built-in defaults, then
//! `config/relay.toml`, then `relay.toml` in the user's config directory
//! (e.g. `~/.config/emote-relay/` on Linux), then environment variables.
//! The result is validated once at startup and is read-only afterwards.

use eyre::{Context, eyre};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{fmt, net::SocketAddr, path::PathBuf};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.twitch.tv/helix";
pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

const BASE_CONFIG_PATH: &str = "config/relay.toml";
const USER_CONFIG_FILE: &str = "relay.toml";

/// Environment variables recognised as overrides, matched case-insensitively.
const ENV_KEYS: [&str; 6] = [
    "api_base_url",
    "client_id",
    "client_secret",
    "token_url",
    "listen_addr",
    "log_file",
];

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: String,
    pub listen_addr: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_id: None,
            client_secret: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            log_file: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("token_url", &self.token_url)
            .field("listen_addr", &self.listen_addr)
            .field("log_file", &self.log_file)
            .finish()
    }
}

/// OAuth client credentials. Never leaves the process.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration after validation, ready to hand to the server.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub api_base_url: String,
    pub token_url: String,
    pub credentials: Credentials,
    pub listen_addr: SocketAddr,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Checks the loaded values and converts them into [`RelaySettings`].
    pub fn validate(self) -> Result<RelaySettings, eyre::Report> {
        let client_id = non_empty(self.client_id)
            .ok_or_else(|| eyre!("CLIENT_ID is not configured"))?;
        let client_secret = non_empty(self.client_secret)
            .ok_or_else(|| eyre!("CLIENT_SECRET is not configured"))?;

        Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API_BASE_URL {:?}", self.api_base_url))?;
        Url::parse(&self.token_url)
            .with_context(|| format!("Invalid TOKEN_URL {:?}", self.token_url))?;

        let listen_addr: SocketAddr = self
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid LISTEN_ADDR {:?}", self.listen_addr))?;

        Ok(RelaySettings {
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            token_url: self.token_url,
            credentials: Credentials {
                client_id,
                client_secret,
            },
            listen_addr,
            log_file: self.log_file,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join(USER_CONFIG_FILE))
}

/// Builds the layered figment without extracting it.
pub fn figment() -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(BASE_CONFIG_PATH));

    if let Some(user_config_path) = get_user_config_path() {
        tracing::debug!("User config path: {:?}", user_config_path);
        figment = figment.merge(Toml::file(user_config_path));
    }

    figment.merge(Env::raw().only(&ENV_KEYS))
}

pub fn load() -> Result<RelaySettings, eyre::Report> {
    let config: Config = figment().extract().context("Could not load config")?;
    tracing::debug!("Loaded config: {:?}", config);

    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn base() -> Config {
        Config {
            client_id: Some("cid".into()),
            client_secret: Some("secret".into()),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_point_at_twitch() {
        let settings = base().validate().unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn missing_credentials_fail_fast() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("CLIENT_ID"));

        let err = Config {
            client_secret: Some("   ".into()),
            ..base()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("CLIENT_SECRET"));
    }

    #[test]
    fn rejects_bad_urls_and_addresses() {
        let bad_api = Config {
            api_base_url: "not a url".into(),
            ..base()
        };
        assert!(bad_api.validate().is_err());

        let bad_addr = Config {
            listen_addr: "localhost".into(),
            ..base()
        };
        assert!(bad_addr.validate().is_err());
    }

    #[test]
    fn trims_trailing_slash_from_api_base() {
        let settings = Config {
            api_base_url: "http://127.0.0.1:9000/helix/".into(),
            ..base()
        }
        .validate()
        .unwrap();
        assert_eq!(settings.api_base_url, "http://127.0.0.1:9000/helix");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", base());
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));

        let settings = base().validate().unwrap();
        assert!(!format!("{:?}", settings).contains("\"secret\""));
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            std::fs::create_dir_all(jail.directory().join("config")).map_err(|e| e.to_string())?;
            jail.create_file(
                BASE_CONFIG_PATH,
                r#"
                    api_base_url = "http://file.example/helix"
                    client_id = "from-file"
                    client_secret = "file-secret"
                "#,
            )?;
            jail.set_env("CLIENT_ID", "from-env");
            jail.set_env("LISTEN_ADDR", "0.0.0.0:9999");

            let config: Config = figment().extract()?;
            let settings = config.validate().map_err(|e| e.to_string())?;

            assert_eq!(settings.api_base_url, "http://file.example/helix");
            assert_eq!(settings.credentials.client_id, "from-env");
            assert_eq!(settings.credentials.client_secret, "file-secret");
            assert_eq!(settings.listen_addr.port(), 9999);
            Ok(())
        });
    }

    #[test]
    fn unrelated_environment_is_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("CLIENT_SECRET", "env-secret");
            jail.set_env("CLIENT_ID", "env-id");
            jail.set_env("SOME_OTHER_SETTING", "ignored");

            let config: Config = figment().extract()?;
            assert_eq!(config.client_secret.as_deref(), Some("env-secret"));
            assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
            Ok(())
        });
    }
}
