//! Loading of TOML settings overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use canvas_td_core::{GameSettings, GameSettingsOverrides};

/// Resolves the session settings, layering the overrides file at `path` over the defaults.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<GameSettings> {
    let Some(path) = path else {
        return Ok(GameSettings::default());
    };

    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let overrides = parse_overrides(&document)
        .with_context(|| format!("failed to parse settings in {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded settings overrides");
    Ok(GameSettings::default().merged(overrides))
}

fn parse_overrides(document: &str) -> Result<GameSettingsOverrides> {
    toml::from_str(document).context("settings document is not a valid overrides table")
}
