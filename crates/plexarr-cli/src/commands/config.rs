use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use plexarr_config::{ArrConfig, Config, PathManager};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn run_config(cmd: ConfigCommands, explicit: Option<&Path>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Create { path, force } => create_config(path.as_deref().or(explicit), force, output),
        ConfigCommands::Validate => validate_config(explicit, output),
        ConfigCommands::Show { full } => show_config(explicit, full, output),
    }
}

fn create_config(path: Option<&Path>, force: bool, output: &Output) -> Result<()> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => PathManager::new().map_err(|e| eyre!("{}", e))?.config_file(),
    };

    if path.exists() && !force {
        let overwrite = output.is_human()
            && prompts::prompt_yes_no(&format!("{} already exists. Overwrite?", path.display()), Some(false))?;
        if !overwrite {
            return Err(eyre!("{} already exists. Pass --force to overwrite it", path.display()));
        }
    }

    Config::template()
        .save_to_file(&path)
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;

    output.success(format!("Created {}", path.display()));
    output.info("Fill in your Plex token and the Radarr/Sonarr API keys, then run 'plexarr config validate'");
    Ok(())
}

fn validate_config(explicit: Option<&Path>, output: &Output) -> Result<()> {
    let config = super::load_config(explicit)?;
    let services = config.get_configured_services();
    match output.format() {
        OutputFormat::Human => output.success(format!("Configuration is valid ({})", services.join(", "))),
        _ => output.data(&json!({ "valid": true, "services": services })),
    }
    Ok(())
}

fn show_config(explicit: Option<&Path>, full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::new().map_err(|e| eyre!("{}", e))?;
    let path = path_manager.find_config_file(explicit).map_err(|e| eyre!("{}", e))?;
    let config = Config::load_from_file(&path).map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?;

    let secret = |s: &str| if full { s.to_string() } else { mask_string(s) };

    if !output.is_human() {
        let arr = |c: &Option<ArrConfig>| {
            c.as_ref()
                .map(|c| json!({ "base_url": c.base_url, "api_key": secret(&c.api_key) }))
        };
        output.data(&json!({
            "path": path,
            "plex": {
                "base_url": config.plex.base_url,
                "token": secret(&config.plex.token),
                "watchlist": config.plex.watchlist,
                "watchlist_rss": config.plex.watchlist_rss.as_deref().map(secret),
            },
            "radarr": arr(&config.radarr),
            "sonarr": arr(&config.sonarr),
            "actions": { "delete_delay_ms": config.actions.delete_delay_ms },
            "logging": { "level": config.logging.level, "file": config.logging.file },
        }));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(path.display().to_string()).fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec!["plex.base_url".to_string(), config.plex.base_url.clone()]);
    table.add_row(vec!["plex.token".to_string(), secret(&config.plex.token)]);
    table.add_row(vec!["plex.watchlist".to_string(), config.plex.watchlist.to_string()]);
    if let Some(ref feed) = config.plex.watchlist_rss {
        table.add_row(vec!["plex.watchlist_rss".to_string(), secret(feed)]);
    }
    for (name, section) in [("radarr", &config.radarr), ("sonarr", &config.sonarr)] {
        match section {
            Some(arr) => {
                table.add_row(vec![format!("{}.base_url", name), arr.base_url.clone()]);
                table.add_row(vec![format!("{}.api_key", name), secret(&arr.api_key)]);
            }
            None => {
                table.add_row(vec![name.to_string(), "not configured".bright_black().to_string()]);
            }
        }
    }
    table.add_row(vec![
        "actions.delete_delay_ms".to_string(),
        config.actions.delete_delay_ms.to_string(),
    ]);
    table.add_row(vec!["logging.level".to_string(), config.logging.level.clone()]);
    table.add_row(vec![
        "logging.file".to_string(),
        config
            .logging
            .file
            .as_ref()
            .map(|f| f.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.println(table.to_string());

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is not valid: {}", e));
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s.starts_with("YOUR_") {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    format!(
        "{}***{}",
        chars[..2].iter().collect::<String>(),
        chars[chars.len() - 2..].iter().collect::<String>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("YOUR_PLEX_TOKEN"), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("abcdef123"), "ab***23");
    }

    #[test]
    fn test_create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Json, true);

        create_config(Some(&path), false, &output).unwrap();
        let created = Config::load_from_file(&path).unwrap();
        assert_eq!(created.plex.base_url, "http://localhost:32400");

        assert!(create_config(Some(&path), false, &output).is_err());
        assert!(create_config(Some(&path), true, &output).is_ok());
    }
}
