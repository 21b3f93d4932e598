// Mode catalog domain model - named equipment configurations
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::equipment::EquipmentState;

/// Catalog key of the designated fallback configuration. Failed transitions
/// and manual overrides land here.
pub const SAFE_MODE_KEY: &str = "service";

const DEFAULT_ORDER: i32 = 999;

fn default_order() -> i32 {
    DEFAULT_ORDER
}

/// A named, catalog-defined target equipment configuration. Constructed once
/// at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Sort weight; modes without one sort last.
    #[serde(default = "default_order")]
    pub order: i32,
    /// Presentation hint, opaque to the controller.
    #[serde(default)]
    pub color: String,
    pub equipment: EquipmentState,
}

impl ModeConfig {
    pub fn summary(&self) -> ModeSummary {
        ModeSummary {
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            order: self.order,
        }
    }
}

/// Projection of a mode for display, without its equipment target.
#[derive(Debug, Clone, Serialize)]
pub struct ModeSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub order: i32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("mode catalog is empty")]
    Empty,
    #[error("duplicate mode key \"{0}\"")]
    DuplicateKey(String),
    #[error("mode catalog has no \"{SAFE_MODE_KEY}\" safe mode")]
    MissingSafeMode,
}

/// Immutable, insertion-ordered mapping from mode key to configuration.
#[derive(Debug)]
pub struct ModeCatalog {
    modes: Vec<ModeConfig>,
    safe_index: usize,
}

impl ModeCatalog {
    /// Validate and build the catalog. Keys must be unique and the designated
    /// safe mode must be present.
    pub fn new(modes: Vec<ModeConfig>) -> Result<Self, CatalogError> {
        if modes.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for mode in &modes {
            if !seen.insert(mode.key.as_str()) {
                return Err(CatalogError::DuplicateKey(mode.key.clone()));
            }
        }
        let safe_index = modes
            .iter()
            .position(|mode| mode.key == SAFE_MODE_KEY)
            .ok_or(CatalogError::MissingSafeMode)?;

        Ok(Self { modes, safe_index })
    }

    pub fn get(&self, key: &str) -> Option<&ModeConfig> {
        self.modes.iter().find(|mode| mode.key == key)
    }

    /// The fallback configuration applied when a transition fails.
    pub fn safe_mode(&self) -> &ModeConfig {
        &self.modes[self.safe_index]
    }

    /// Modes ordered by `order`, ties keeping catalog insertion order;
    /// recomputed on every read.
    pub fn sorted(&self) -> Vec<&ModeConfig> {
        let mut sorted: Vec<&ModeConfig> = self.modes.iter().collect();
        sorted.sort_by_key(|mode| mode.order);
        sorted
    }

    pub fn summaries(&self) -> Vec<ModeSummary> {
        self.sorted().into_iter().map(ModeConfig::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(key: &str, order: i32) -> ModeConfig {
        ModeConfig {
            key: key.to_string(),
            name: key.to_string(),
            description: String::new(),
            order,
            color: String::new(),
            equipment: EquipmentState::default(),
        }
    }

    #[test]
    fn test_catalog_rejects_empty_and_duplicate_keys() {
        assert!(matches!(ModeCatalog::new(Vec::new()), Err(CatalogError::Empty)));

        let result = ModeCatalog::new(vec![mode("service", 1), mode("service", 2)]);
        assert!(matches!(result, Err(CatalogError::DuplicateKey(key)) if key == "service"));
    }

    #[test]
    fn test_catalog_requires_the_safe_mode() {
        let result = ModeCatalog::new(vec![mode("auto", 1), mode("spa", 2)]);
        assert!(matches!(result, Err(CatalogError::MissingSafeMode)));
    }

    #[test]
    fn test_sorted_orders_by_weight_then_insertion() {
        let catalog = ModeCatalog::new(vec![
            mode("service", 999),
            mode("spa", 20),
            mode("auto", 10),
            mode("turbo-clean", 20),
        ])
        .unwrap();

        let keys: Vec<&str> = catalog.sorted().iter().map(|m| m.key.as_str()).collect();
        // spa and turbo-clean share a weight; spa was inserted first
        assert_eq!(keys, vec!["auto", "spa", "turbo-clean", "service"]);
    }

    #[test]
    fn test_lookup_and_safe_mode() {
        let catalog = ModeCatalog::new(vec![mode("auto", 10), mode("service", 999)]).unwrap();
        assert_eq!(catalog.get("auto").unwrap().key, "auto");
        assert!(catalog.get("swamp").is_none());
        assert_eq!(catalog.safe_mode().key, SAFE_MODE_KEY);
    }

    #[test]
    fn test_unspecified_order_sorts_last() {
        let parsed: ModeConfig = serde_json::from_str(
            r#"{
                "key": "service",
                "name": "Service",
                "equipment": {
                    "pump": "off", "pumpSpeed": "low",
                    "inflowValve": "pool", "outflowValve": "pool", "heater": "off"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.order, DEFAULT_ORDER);
        assert_eq!(parsed.description, "");
        assert_eq!(parsed.color, "");
    }
}
