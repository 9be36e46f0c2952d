use color_eyre::Result;
use dialoguer::Confirm;
use tracing::warn;

/// Prompt for yes/no with optional default
pub fn prompt_yes_no(prompt: &str, default: Option<bool>) -> Result<bool> {
    let mut confirm_builder = Confirm::new().with_prompt(prompt);

    if let Some(default_value) = default {
        confirm_builder = confirm_builder.default(default_value);
    }

    confirm_builder
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Per-item confirmation for the core actions. Defaults to "no"; a prompt
/// that cannot be read counts as "no".
pub fn confirm_each() -> impl FnMut(&str) -> bool {
    |prompt: &str| match prompt_yes_no(prompt, Some(false)) {
        Ok(answer) => answer,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}
