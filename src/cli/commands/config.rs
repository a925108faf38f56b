//! `config` command

use anyhow::Result;

use crate::config::GrokipediaConfig;

/// Print the default configuration, or the effective one after all layers
pub fn handle_config_command(generate: bool, effective: &GrokipediaConfig) -> Result<()> {
    if generate {
        println!("{}", GrokipediaConfig::generate_default_config());
    } else {
        println!("{}", toml::to_string_pretty(effective)?);
    }
    Ok(())
}
