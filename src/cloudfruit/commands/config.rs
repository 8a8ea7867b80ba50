//! Reads and changes the `AppConfig` kept in the container directory.

use crate::commands::{CloudPaths, CmdMessage, CmdResult};
use crate::config::{AppConfig, KEYS};
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    /// Every key, or just the named one.
    Show(Option<String>),
    Set { key: String, value: String },
}

impl ConfigAction {
    /// Maps `config [key] [value]` onto an action.
    pub fn from_args(key: Option<String>, value: Option<String>) -> Self {
        match (key, value) {
            (Some(key), Some(value)) => ConfigAction::Set { key, value },
            (key, _) => ConfigAction::Show(key),
        }
    }
}

pub fn run(paths: &CloudPaths, action: ConfigAction) -> Result<CmdResult> {
    let config = AppConfig::load(&paths.container)?;
    match action {
        ConfigAction::Show(None) => Ok(CmdResult::default().with_config(config)),
        ConfigAction::Show(Some(key)) => Ok(show_key(&config, &key)),
        ConfigAction::Set { key, value } => set_key(paths, config, &key, &value),
    }
}

fn show_key(config: &AppConfig, key: &str) -> CmdResult {
    let mut result = CmdResult::default();
    let message = match config.get(key) {
        Some(value) => CmdMessage::info(format!("{} = {}", key, value)),
        None => CmdMessage::error(format!(
            "Unknown config key: {} (known keys: {})",
            key,
            KEYS.join(", ")
        )),
    };
    result.add_message(message);
    result
}

fn set_key(paths: &CloudPaths, mut config: AppConfig, key: &str, value: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if let Err(e) = config.set(key, value) {
        result.add_message(CmdMessage::error(e));
        return Ok(result);
    }
    config.save(&paths.container)?;
    log::debug!("Saved config key {}", key);

    result.add_message(CmdMessage::success(format!(
        "{} set to {}",
        key,
        config.get(key).unwrap_or_default()
    )));

    // New fruits cannot be saved until the image exists.
    if key == "sample-image" {
        if let Some(path) = config.sample_image.as_ref().filter(|p| !p.is_file()) {
            result.add_message(CmdMessage::warning(format!(
                "No image at {} yet; adding fruits will fail until it exists.",
                path.display()
            )));
        }
    }
    Ok(result.with_config(config))
}
