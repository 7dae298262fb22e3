//! Theme command handlers.

use anyhow::{Context, Result};
use askgem_core::config::Config;
use askgem_core::theme::Theme;

pub fn show(config: &Config) {
    println!("{}", config.effective_theme());
}

pub fn toggle(config: &Config) -> Result<()> {
    save(config.effective_theme().toggled())
}

pub fn set(raw: &str) -> Result<()> {
    let theme: Theme = raw.parse().map_err(anyhow::Error::msg)?;
    save(theme)
}

fn save(theme: Theme) -> Result<()> {
    Config::save_theme(theme).context("save theme")?;
    println!("Theme set to {theme}");
    Ok(())
}
