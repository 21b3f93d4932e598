// Equipment domain model - the five relay-backed fields of the plant
use serde::{Deserialize, Serialize};

use crate::domain::valve::{VALVE_POOL_PERCENT, VALVE_SPA_PERCENT};

/// Binary powered state for the pump and heater relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Two-speed pump setting, driven through the turbo contactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpSpeed {
    Low,
    High,
}

impl PumpSpeed {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Circuit a diverter valve routes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveRoute {
    Pool,
    Spa,
}

impl ValveRoute {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pool" => Some(Self::Pool),
            "spa" => Some(Self::Spa),
            _ => None,
        }
    }
}

/// Commanded configuration of the whole plant.
///
/// `Copy`, so every read hands out an independent value and callers never
/// alias the orchestrator's current record. `pump_speed` is retained verbatim
/// while the pump is off so the last speed can be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentState {
    pub pump: Switch,
    pub pump_speed: PumpSpeed,
    pub inflow_valve: ValveRoute,
    pub outflow_valve: ValveRoute,
    pub heater: Switch,
}

impl Default for EquipmentState {
    /// The de-energized boot configuration: everything off, valves on the
    /// pool circuit.
    fn default() -> Self {
        Self {
            pump: Switch::Off,
            pump_speed: PumpSpeed::Low,
            inflow_valve: ValveRoute::Pool,
            outflow_valve: ValveRoute::Pool,
            heater: Switch::Off,
        }
    }
}

impl EquipmentState {
    /// Whether both diverter valves route through the spa circuit.
    pub fn routes_spa(&self) -> bool {
        self.inflow_valve == ValveRoute::Spa && self.outflow_valve == ValveRoute::Spa
    }

    /// Destination for the shared valve mechanism: fully travelled only when
    /// both valves route to the spa. Intermediate positions exist during
    /// travel but are never settleable targets.
    pub fn valve_destination_percent(&self) -> f64 {
        if self.routes_spa() {
            VALVE_SPA_PERCENT
        } else {
            VALVE_POOL_PERCENT
        }
    }

    /// Staged configuration held while the valves travel toward the spa:
    /// pump speed stays low until travel completes, so high flow is never
    /// driven against a partially-open valve.
    pub fn travel_hold(&self) -> Self {
        let mut staged = *self;
        if staged.routes_spa() {
            staged.pump_speed = PumpSpeed::Low;
        }
        staged
    }

    /// Merge a manual override patch. Recognized values replace the matching
    /// field; unrecognized values leave the field untouched.
    pub fn with_patch(&self, patch: &EquipmentPatch) -> Self {
        let mut next = *self;
        apply_field(&mut next.pump, patch.pump.as_deref(), Switch::parse, "pump");
        apply_field(
            &mut next.pump_speed,
            patch.pump_speed.as_deref(),
            PumpSpeed::parse,
            "pumpSpeed",
        );
        apply_field(
            &mut next.inflow_valve,
            patch.inflow_valve.as_deref(),
            ValveRoute::parse,
            "inflowValve",
        );
        apply_field(
            &mut next.outflow_valve,
            patch.outflow_valve.as_deref(),
            ValveRoute::parse,
            "outflowValve",
        );
        apply_field(&mut next.heater, patch.heater.as_deref(), Switch::parse, "heater");
        next
    }
}

fn apply_field<T>(slot: &mut T, raw: Option<&str>, parse: fn(&str) -> Option<T>, field: &str) {
    if let Some(raw) = raw {
        match parse(raw) {
            Some(value) => *slot = value,
            None => tracing::warn!("ignoring unrecognized value \"{}\" for {}", raw, field),
        }
    }
}

/// Manual override request; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentPatch {
    pub pump: Option<String>,
    pub pump_speed: Option<String>,
    pub inflow_valve: Option<String>,
    pub outflow_valve: Option<String>,
    pub heater: Option<String>,
}
