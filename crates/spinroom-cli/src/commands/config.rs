use clap::Subcommand;
use serde_json::Value;
use spinroom_core::{Config, ConfigError};

const KEYS: &str = "allowance.max_spins, allowance.cooldown_ms, allowance.tick_interval_ms, \
allowance.storage_key, reels.symbols, reels.win_probability, reels.seed";

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        #[arg(help = format!("Dot-path key, one of: {KEYS}"))]
        key: String,
    },
    /// Change one setting and save it
    Set {
        #[arg(help = format!("Dot-path key, one of: {KEYS}"))]
        key: String,
        /// New value. Lists are JSON arrays; "none" clears reels.seed
        value: String,
    },
    /// Print every setting as `key = value`
    List,
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => get(&key),
        ConfigAction::Set { key, value } => set(&key, &value),
        ConfigAction::List => list(),
        ConfigAction::Reset => {
            Config::default().save()?;
            eprintln!("spin limits and reels restored to defaults");
            Ok(())
        }
    }
}

fn get(key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let value = config
        .get(key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    println!("{value}");
    Ok(())
}

fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    let stored = config.get(key).unwrap_or_default();
    println!("{key} = {stored}");
    Ok(())
}

fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut lines = Vec::new();
    flatten("", &serde_json::to_value(&config)?, &mut lines);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Turn nested sections into `section.key = value` lines. Arrays stay JSON.
fn flatten(prefix: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (name, inner) in map {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten(&path, inner, out);
            }
        }
        Value::String(s) => out.push(format!("{prefix} = {s}")),
        other => out.push(format!("{prefix} = {other}")),
    }
}
