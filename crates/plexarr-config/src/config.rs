use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PLACEHOLDER_TOKEN: &str = "YOUR_PLEX_TOKEN";
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub plex: PlexConfig,
    #[serde(default)]
    pub radarr: Option<ArrConfig>,
    #[serde(default)]
    pub sonarr: Option<ArrConfig>,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub base_url: String,
    pub token: String,
    /// Read the account watchlist at all
    #[serde(default = "default_true")]
    pub watchlist: bool,
    /// Personal watchlist RSS feed (`https://rss.plex.tv/...`), read in
    /// preference to the discover service when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchlist_rss: Option<String>,
}

/// Connection settings shared by Radarr and Sonarr
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Pause between consecutive delete calls
    #[serde(default = "default_delete_delay_ms")]
    pub delete_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_delete_delay_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            delete_delay_ms: default_delete_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl ArrConfig {
    fn validate(&self, service: &str) -> anyhow::Result<()> {
        validate_url(service, &self.base_url)?;
        if self.api_key.trim().is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(anyhow::anyhow!("{} api_key is not configured", service));
        }
        Ok(())
    }
}

fn validate_url(service: &str, url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        return Err(anyhow::anyhow!("{} base_url is empty", service));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(anyhow::anyhow!(
            "{} base_url must start with http:// or https:// (got '{}')",
            service,
            url
        ));
    }
    Ok(())
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Configuration written by `config create`
    pub fn template() -> Self {
        Self {
            plex: PlexConfig {
                base_url: "http://localhost:32400".to_string(),
                token: PLACEHOLDER_TOKEN.to_string(),
                watchlist: true,
                watchlist_rss: None,
            },
            radarr: Some(ArrConfig {
                base_url: "http://localhost:7878".to_string(),
                api_key: PLACEHOLDER_API_KEY.to_string(),
            }),
            sonarr: Some(ArrConfig {
                base_url: "http://localhost:8989".to_string(),
                api_key: PLACEHOLDER_API_KEY.to_string(),
            }),
            actions: ActionsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_url("Plex", &self.plex.base_url)?;
        if self.plex.token.trim().is_empty() || self.plex.token == PLACEHOLDER_TOKEN {
            return Err(anyhow::anyhow!("Plex token is not configured"));
        }
        if let Some(ref feed) = self.plex.watchlist_rss {
            if !(feed.starts_with("http://") || feed.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "Plex watchlist_rss must start with http:// or https:// (got '{}')",
                    feed
                ));
            }
        }

        if let Some(ref radarr) = self.radarr {
            radarr.validate("Radarr")?;
        }
        if let Some(ref sonarr) = self.sonarr {
            sonarr.validate("Sonarr")?;
        }

        Ok(())
    }

    pub fn radarr(&self) -> anyhow::Result<&ArrConfig> {
        self.radarr
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Radarr is not configured. Add a [radarr] section to your config"))
    }

    pub fn sonarr(&self) -> anyhow::Result<&ArrConfig> {
        self.sonarr
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Sonarr is not configured. Add a [sonarr] section to your config"))
    }

    /// Get list of configured services
    pub fn get_configured_services(&self) -> Vec<String> {
        let mut services = vec!["plex".to_string()];
        if self.radarr.is_some() {
            services.push("radarr".to_string());
        }
        if self.sonarr.is_some() {
            services.push("sonarr".to_string());
        }
        services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn valid_config() -> Config {
        Config {
            plex: PlexConfig {
                base_url: "http://plex.local:32400".to_string(),
                token: "abc123".to_string(),
                watchlist: true,
                watchlist_rss: None,
            },
            radarr: Some(ArrConfig {
                base_url: "http://radarr.local:7878".to_string(),
                api_key: "radarr-key".to_string(),
            }),
            sonarr: None,
            actions: ActionsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = valid_config();

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.plex.token, "abc123");
        assert_eq!(loaded.radarr.as_ref().unwrap().api_key, "radarr-key");
        assert!(loaded.sonarr.is_none());
        assert_eq!(loaded.actions.delete_delay_ms, 500);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [plex]
            base_url = "http://localhost:32400"
            token = "t"
            "#,
        )
        .unwrap();

        assert!(config.plex.watchlist);
        assert!(config.plex.watchlist_rss.is_none());
        assert!(config.radarr.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.get_configured_services(), vec!["plex".to_string()]);
        assert!(config.radarr().is_err());
    }

    #[test]
    fn test_config_validate() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.plex.token = PLACEHOLDER_TOKEN.to_string();
        assert!(config.validate().is_err());

        config.plex.token = "abc123".to_string();
        config.radarr.as_mut().unwrap().base_url = "radarr.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watchlist_rss_setting() {
        let config: Config = toml::from_str(
            r#"
            [plex]
            base_url = "http://localhost:32400"
            token = "t"
            watchlist_rss = "https://rss.plex.tv/0f1e2d3c"
            "#,
        )
        .unwrap();
        assert_eq!(config.plex.watchlist_rss.as_deref(), Some("https://rss.plex.tv/0f1e2d3c"));
        assert!(config.validate().is_ok());

        let file = NamedTempFile::new().unwrap();
        config.save_to_file(file.path()).unwrap();
        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.plex.watchlist_rss, config.plex.watchlist_rss);

        let mut config = valid_config();
        config.plex.watchlist_rss = Some("rss.plex.tv/0f1e2d3c".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_template_is_not_valid_until_edited() {
        let template = Config::template();
        assert!(template.validate().is_err());
        assert!(template.sonarr.is_some());
    }
}
