use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV_VAR: &str = "PLEXARR_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("plexarr");

        Ok(Self {
            config_dir: base_dir.clone(),
            log_dir: base_dir.join("logs"),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("plexarr.log")
    }

    /// Places a config file is looked for, in priority order
    pub fn candidate_config_files(&self, explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = explicit {
            candidates.push(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                candidates.push(PathBuf::from(path));
            }
        }
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(CONFIG_FILE_NAME));
        }
        candidates.push(self.config_file());
        if cfg!(unix) {
            candidates.push(PathBuf::from("/etc/plexarr").join(CONFIG_FILE_NAME));
        }
        candidates
    }

    /// First existing config file. An explicit path is returned even when
    /// missing so the caller reports the path the user asked for.
    pub fn find_config_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let candidates = self.candidate_config_files(None);
        for candidate in &candidates {
            debug!("Looking for config at {}", candidate.display());
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }

        Err(anyhow::anyhow!(
            "No configuration file found. Create one with 'plexarr config create' or place config.toml in one of:\n{}",
            candidates
                .iter()
                .map(|p| format!("  {}", p.display()))
                .collect::<Vec<_>>()
                .join("\n")
        ))
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| {
            let base = PathBuf::from(".plexarr");
            Self {
                config_dir: base.clone(),
                log_dir: base.join("logs"),
            }
        })
    }
}
