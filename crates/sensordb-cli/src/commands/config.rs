//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ConfigAction;
use crate::config::Config;

/// Execute a config action against the file at `path`.
pub fn cmd_config(action: ConfigAction, path: &Path, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let content =
                toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            print!("{}", content);
        }
        ConfigAction::Init => {
            if path.exists() {
                println!("Config file already exists: {}", path.display());
                return Ok(());
            }
            Config::default()
                .save(path)
                .context("Failed to write config file")?;
            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}
