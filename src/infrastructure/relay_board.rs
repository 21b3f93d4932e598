// Simulated relay board - logged in-memory relay driver
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::relay_driver::{PinLevels, RelayDriver};
use crate::domain::equipment::{EquipmentState, PumpSpeed, ValveRoute};
use crate::infrastructure::config::RelaySettings;

/// In-memory stand-in for the relay hardware. Every write is logged with the
/// configured BCM pin number; levels are held so the status path can report
/// them. Boots fail-safe with all outputs de-energized, matching what a real
/// board driver must do before its first `apply`.
pub struct SimulatedRelayBoard {
    pins: RelaySettings,
    levels: Mutex<PinLevels>,
}

impl SimulatedRelayBoard {
    pub fn new(pins: RelaySettings) -> Self {
        let mut levels = PinLevels::new();
        for name in ["pump", "turbo", "inflow", "outflow", "heater"] {
            levels.insert(name.to_string(), 0);
        }
        tracing::info!("simulated relay board ready, all outputs de-energized");
        Self {
            pins,
            levels: Mutex::new(levels),
        }
    }

    fn level_map(&self, state: EquipmentState) -> PinLevels {
        let pump = state.pump.is_on();
        let mut levels = PinLevels::new();
        levels.insert("pump".to_string(), pump as u8);
        levels.insert(
            "turbo".to_string(),
            (pump && state.pump_speed == PumpSpeed::High) as u8,
        );
        levels.insert(
            "inflow".to_string(),
            (state.inflow_valve == ValveRoute::Spa) as u8,
        );
        levels.insert(
            "outflow".to_string(),
            (state.outflow_valve == ValveRoute::Spa) as u8,
        );
        levels.insert("heater".to_string(), state.heater.is_on() as u8);
        levels
    }

    fn pin_number(&self, name: &str) -> u8 {
        match name {
            "pump" => self.pins.pump,
            "turbo" => self.pins.turbo,
            "inflow" => self.pins.inflow,
            "outflow" => self.pins.outflow,
            _ => self.pins.heater,
        }
    }
}

#[async_trait]
impl RelayDriver for SimulatedRelayBoard {
    async fn apply(&self, state: EquipmentState) -> anyhow::Result<()> {
        let next = self.level_map(state);
        let mut levels = self.levels.lock().unwrap();
        for (name, level) in &next {
            if levels.get(name) != Some(level) {
                tracing::info!(
                    "relay {} (pin {}) -> {}",
                    name,
                    self.pin_number(name),
                    level
                );
            }
        }
        *levels = next;
        Ok(())
    }

    async fn pin_levels(&self) -> PinLevels {
        self.levels.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::{Switch, ValveRoute};

    #[tokio::test]
    async fn test_board_boots_with_every_output_de_energized() {
        let board = SimulatedRelayBoard::new(RelaySettings::default());
        let levels = board.pin_levels().await;

        assert_eq!(levels.len(), 5);
        for name in ["pump", "turbo", "inflow", "outflow", "heater"] {
            assert_eq!(levels[name], 0, "{} energized at boot", name);
        }
    }

    #[tokio::test]
    async fn test_apply_maps_equipment_onto_pin_levels() {
        let board = SimulatedRelayBoard::new(RelaySettings::default());
        board
            .apply(EquipmentState {
                pump: Switch::On,
                pump_speed: PumpSpeed::High,
                inflow_valve: ValveRoute::Spa,
                outflow_valve: ValveRoute::Pool,
                heater: Switch::On,
            })
            .await
            .unwrap();

        let levels = board.pin_levels().await;
        assert_eq!(levels["pump"], 1);
        assert_eq!(levels["turbo"], 1);
        assert_eq!(levels["inflow"], 1);
        assert_eq!(levels["outflow"], 0);
        assert_eq!(levels["heater"], 1);
    }

    #[tokio::test]
    async fn test_turbo_follows_the_pump() {
        let board = SimulatedRelayBoard::new(RelaySettings::default());
        // high speed retained while the pump is off must not energize turbo
        board
            .apply(EquipmentState {
                pump: Switch::Off,
                pump_speed: PumpSpeed::High,
                ..EquipmentState::default()
            })
            .await
            .unwrap();

        let levels = board.pin_levels().await;
        assert_eq!(levels["pump"], 0);
        assert_eq!(levels["turbo"], 0);
    }
}
