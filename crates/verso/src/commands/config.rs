//! Configuration display.

use std::path::PathBuf;
use verso_core::Config;

/// Print configuration sources, the merged configuration and the effective
/// history root.
pub fn show_config(config: &Config, sources: &[PathBuf]) -> anyhow::Result<()> {
    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(config)?);
    println!();

    println!("History root: {}", config.history_root()?.display());
    Ok(())
}
