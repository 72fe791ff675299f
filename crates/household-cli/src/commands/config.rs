//! Configuration commands over `config.toml`.

use clap::Subcommand;
use household_core::{Config, ConfigError};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dot-separated key (e.g. "chores.default_room", "time.use_utc")
        key: String,
    },
    /// Change one value and save
    Set {
        /// Dot-separated key
        key: String,
        /// New value, parsed to the key's type
        value: String,
    },
    /// Print the whole configuration as TOML
    List,
    /// Print where the configuration file lives
    Path,
    /// Overwrite the configuration with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, "configuration updated");
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            print!("{}", toml::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("configuration reset to defaults");
        }
    }
    Ok(())
}
