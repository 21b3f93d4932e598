// Configuration loading - server settings and the mode catalog
use anyhow::Context;
use serde::Deserialize;

use crate::domain::mode::{ModeCatalog, ModeConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub valve: ValveSettings,
    pub relays: RelaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValveSettings {
    /// Fixed time the diverter mechanism takes to travel between endpoints.
    pub travel_ms: i64,
}

/// BCM pin numbers for the five relay outputs. In simulation they only
/// flavor the log lines.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    pub pump: u8,
    pub turbo: u8,
    pub inflow: u8,
    pub outflow: u8,
    pub heater: u8,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            pump: 17,
            turbo: 27,
            inflow: 22,
            outflow: 23,
            heater: 24,
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server"))
        .build()
        .context("reading config/server")?;

    Ok(settings.try_deserialize()?)
}

/// Read the mode catalog file once at startup.
pub fn load_mode_catalog(path: &str) -> anyhow::Result<ModeCatalog> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    parse_mode_catalog(&raw).with_context(|| format!("parsing {}", path))
}

fn parse_mode_catalog(raw: &str) -> anyhow::Result<ModeCatalog> {
    let modes: Vec<ModeConfig> = serde_json::from_str(raw)?;
    Ok(ModeCatalog::new(modes)?)
}
