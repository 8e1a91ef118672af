//! `config`: get/set/list/reset the scheduler's TOML dials
//! (`SchedulerConfig`, spec.md §4.9).

use clap::Subcommand;
use terp_core::{config_dir, SchedulerConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (`tick_interval_secs`, `executor_timeout_secs`, `recalc_window_months`)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: u64,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

fn config_path() -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    Ok(config_dir()?.join("scheduler.toml"))
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path()?;

    match action {
        ConfigAction::Get { key } => {
            let config = SchedulerConfig::load_or_default(&path);
            match key.as_str() {
                "tick_interval_secs" => println!("{}", config.tick_interval_secs),
                "executor_timeout_secs" => println!("{}", config.executor_timeout_secs),
                "recalc_window_months" => println!("{}", config.recalc_window_months),
                _ => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = SchedulerConfig::load_or_default(&path);
            match key.as_str() {
                "tick_interval_secs" => config.tick_interval_secs = value,
                "executor_timeout_secs" => config.executor_timeout_secs = value,
                "recalc_window_months" => config.recalc_window_months = value as u32,
                _ => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
            config.save(&path)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = SchedulerConfig::load_or_default(&path);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            let config = SchedulerConfig::default();
            config.save(&path)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
