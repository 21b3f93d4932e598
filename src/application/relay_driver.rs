// Driver trait for the relay outputs
use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::equipment::EquipmentState;

/// Current output levels keyed by logical relay name, 0 or 1.
pub type PinLevels = BTreeMap<String, u8>;

/// Boundary to the relay outputs that drive the physical plant.
///
/// Implementations translate the five logical equipment fields into output
/// pin levels (pump, turbo, inflow, outflow, heater) and are responsible for
/// fail-safe initialization: every output de-energized before the first
/// `apply`. A driver may switch real hardware or log writes in simulation;
/// the orchestrator is agnostic to which.
#[async_trait]
pub trait RelayDriver: Send + Sync {
    /// Drive all relay outputs to match `state`.
    async fn apply(&self, state: EquipmentState) -> anyhow::Result<()>;

    /// Currently commanded pin levels, for status display.
    async fn pin_levels(&self) -> PinLevels;
}
