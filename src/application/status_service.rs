// Status synchronizer - read path assembling self-describing viewer snapshots
use std::sync::Arc;

use serde::Serialize;

use crate::application::orchestrator::ModeOrchestrator;
use crate::application::relay_driver::{PinLevels, RelayDriver};
use crate::domain::equipment::EquipmentState;
use crate::domain::mode::{ModeCatalog, ModeSummary};
use crate::domain::valve::{epoch_ms, ValveTimeline};

/// Everything a stateless remote viewer needs to reconstruct the live valve
/// interpolation locally, without further round-trips per rendered frame.
///
/// `serverNow` is the clock-skew anchor: a viewer computes
/// `skew = localNow - serverNow`, smooths it across snapshots, and evaluates
/// the valve timeline at `localNow - skew`, so independently-clocked viewers
/// converge on the same rendered position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub mode: String,
    /// Mode key being transitioned to; empty when idle.
    pub target: String,
    pub busy: bool,
    pub equipment: EquipmentState,
    /// Raw relay pin levels, for display only.
    pub gpio: PinLevels,
    /// Server epoch ms at the instant this snapshot was built.
    pub server_now: i64,
    /// Configured valve travel duration in ms.
    pub valve_wait_ms: i64,
    /// Timeline tuple with `percent` sampled live at `server_now`.
    pub valve: ValveTimeline,
    pub modes: Vec<ModeSummary>,
    pub last_error: Option<String>,
}

/// Read-only counterpart of the orchestrator. Snapshot construction takes
/// only the shared read lock and never waits on an in-flight travel sleep.
#[derive(Clone)]
pub struct StatusService {
    orchestrator: ModeOrchestrator,
    catalog: Arc<ModeCatalog>,
    driver: Arc<dyn RelayDriver>,
}

impl StatusService {
    pub fn new(
        orchestrator: ModeOrchestrator,
        catalog: Arc<ModeCatalog>,
        driver: Arc<dyn RelayDriver>,
    ) -> Self {
        Self {
            orchestrator,
            catalog,
            driver,
        }
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        let view = self.orchestrator.observe().await;
        let gpio = self.driver.pin_levels().await;
        let server_now = epoch_ms();

        StatusSnapshot {
            mode: view.mode,
            target: view.target.clone().unwrap_or_default(),
            busy: view.target.is_some(),
            equipment: view.equipment,
            gpio,
            server_now,
            valve_wait_ms: self.orchestrator.travel_ms(),
            valve: view.valve.sampled_at(server_now),
            modes: self.catalog.summaries(),
            last_error: view.last_error,
        }
    }

    /// Sorted mode summaries for the list endpoint.
    pub fn modes(&self) -> Vec<ModeSummary> {
        self.catalog.summaries()
    }
}
