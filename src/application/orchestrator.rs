// Mode orchestrator - single-flight state machine for equipment transitions
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::application::relay_driver::RelayDriver;
use crate::domain::equipment::{EquipmentPatch, EquipmentState};
use crate::domain::mode::{ModeCatalog, ModeConfig};
use crate::domain::valve::{epoch_ms, ValveTimeline, VALVE_POOL_PERCENT};

/// Failures reported synchronously to callers. Faults inside a background
/// transition are recovered internally and surface through `lastError`
/// instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("unknown mode \"{0}\"")]
    UnknownMode(String),
    #[error("busy switching to \"{target}\"")]
    Busy { target: String },
    #[error("relay driver failure: {0:#}")]
    Driver(anyhow::Error),
}

/// Mutable controller record. The busy gate admits one logical writer at a
/// time: the active background transition, or the request handling a manual
/// override.
struct ControllerState {
    equipment: EquipmentState,
    valve: ValveTimeline,
    mode: String,
    target: Option<String>,
    last_error: Option<String>,
}

/// Independent copy of the controller record handed to readers.
#[derive(Debug, Clone)]
pub struct ControllerView {
    pub equipment: EquipmentState,
    pub valve: ValveTimeline,
    pub mode: String,
    pub target: Option<String>,
    pub last_error: Option<String>,
}

impl ControllerView {
    /// An operation is in flight iff a target is set.
    pub fn busy(&self) -> bool {
        self.target.is_some()
    }
}

/// Serializes every equipment-affecting operation into a single logical
/// stream. A switch request either starts the sole background transition or
/// is rejected outright; there is deliberately no queue, because queueing a
/// physical-equipment action without the caller's continued intent risks
/// commanding stale state.
#[derive(Clone)]
pub struct ModeOrchestrator {
    catalog: Arc<ModeCatalog>,
    driver: Arc<dyn RelayDriver>,
    travel_ms: i64,
    state: Arc<RwLock<ControllerState>>,
}

impl ModeOrchestrator {
    pub fn new(catalog: Arc<ModeCatalog>, driver: Arc<dyn RelayDriver>, travel_ms: i64) -> Self {
        let boot = ControllerState {
            equipment: EquipmentState::default(),
            valve: ValveTimeline::settled(VALVE_POOL_PERCENT),
            mode: catalog.safe_mode().key.clone(),
            target: None,
            last_error: None,
        };
        Self {
            catalog,
            driver,
            travel_ms,
            state: Arc::new(RwLock::new(boot)),
        }
    }

    /// Fixed valve travel duration in milliseconds.
    pub fn travel_ms(&self) -> i64 {
        self.travel_ms
    }

    /// Copy of the current controller record. Interleaves freely with an
    /// in-flight transition; the travel wait never blocks readers.
    pub async fn observe(&self) -> ControllerView {
        let st = self.state.read().await;
        ControllerView {
            equipment: st.equipment,
            valve: st.valve,
            mode: st.mode.clone(),
            target: st.target.clone(),
            last_error: st.last_error.clone(),
        }
    }

    /// Request a switch to a catalog mode.
    ///
    /// Returns once the transition has been accepted (or found redundant);
    /// the equipment work itself runs in a detached background task. `busy`,
    /// `target`, and the valve timeline become visible to readers atomically,
    /// before this method returns, so an immediate follow-up request can
    /// never observe the gap.
    pub async fn switch_mode(&self, key: &str) -> Result<(), OrchestratorError> {
        let mode = self
            .catalog
            .get(key)
            .ok_or_else(|| OrchestratorError::UnknownMode(key.to_string()))?
            .clone();

        let mut st = self.state.write().await;
        if let Some(target) = &st.target {
            if target == key {
                tracing::debug!("switch to \"{}\" already in flight", key);
                return Ok(());
            }
            return Err(OrchestratorError::Busy {
                target: target.clone(),
            });
        }
        if st.mode == key {
            tracing::debug!("already in mode \"{}\"", key);
            return Ok(());
        }

        let now = epoch_ms();
        let current = st.valve.percent_at(now);
        let destination = mode.equipment.valve_destination_percent();
        let travel = (destination - current).abs() > f64::EPSILON;
        if travel {
            st.valve = ValveTimeline::begin(current, destination, now, self.travel_ms);
        }
        st.target = Some(key.to_string());
        tracing::info!(
            "mode switch \"{}\" -> \"{}\" accepted (travel: {})",
            st.mode,
            key,
            travel
        );
        drop(st);

        let worker = self.clone();
        tokio::spawn(async move {
            worker.run_transition(mode, travel).await;
        });
        Ok(())
    }

    /// Manual equipment override. Unrecognized values in the patch are
    /// ignored field-by-field; the result is applied immediately with no
    /// valve timeline, treated as already settled. The controller leaves
    /// catalog-defined modes and reports the safe mode afterwards.
    ///
    /// Overrides share the single-flight gate: while a transition is in
    /// flight they are rejected rather than racing the background task.
    pub async fn set_equipment(&self, patch: EquipmentPatch) -> Result<(), OrchestratorError> {
        let mut st = self.state.write().await;
        if let Some(target) = &st.target {
            return Err(OrchestratorError::Busy {
                target: target.clone(),
            });
        }

        let next = st.equipment.with_patch(&patch);
        tracing::info!("manual override: {:?}", next);
        match self
            .driver
            .apply(next)
            .await
            .context("applying manual equipment override")
        {
            Ok(()) => {
                st.equipment = next;
                st.valve = ValveTimeline::settled(next.valve_destination_percent());
                st.mode = self.catalog.safe_mode().key.clone();
                st.last_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!("manual override failed: {:#}", err);
                st.last_error = Some(format!("{:#}", err));
                self.force_safe_mode(&mut st).await;
                Err(OrchestratorError::Driver(err))
            }
        }
    }

    /// Background half of a mode switch: drive the relays, wait out valve
    /// travel, finalize. Every failure lands in the safe-mode recovery path,
    /// and the busy gate is released on all exits.
    async fn run_transition(self, mode: ModeConfig, travel: bool) {
        match self.drive_equipment(&mode, travel).await {
            Ok(()) => {
                let mut st = self.state.write().await;
                st.mode = mode.key.clone();
                st.last_error = None;
                st.target = None;
                tracing::info!("transition to \"{}\" complete", mode.key);
            }
            Err(err) => {
                tracing::error!("transition to \"{}\" failed: {:#}", mode.key, err);
                let mut st = self.state.write().await;
                // abandon motion in place; the position is not rolled back
                st.valve.freeze_at(epoch_ms());
                st.last_error = Some(format!("{:#}", err));
                self.force_safe_mode(&mut st).await;
                st.target = None;
            }
        }
    }

    async fn drive_equipment(&self, mode: &ModeConfig, travel: bool) -> anyhow::Result<()> {
        let target = mode.equipment;
        let staged = if travel { target.travel_hold() } else { target };

        self.driver
            .apply(staged)
            .await
            .context("applying pre-travel equipment state")?;
        self.state.write().await.equipment = staged;

        if travel {
            // the only suspension in the system; runs outside any lock
            tokio::time::sleep(Duration::from_millis(self.travel_ms as u64)).await;
            self.state.write().await.valve.finalize();
            self.driver
                .apply(target)
                .await
                .context("applying post-travel equipment state")?;
            self.state.write().await.equipment = target;
        }
        Ok(())
    }

    /// Command the catalog's safe configuration and record it. A driver
    /// failure here is logged, not propagated; the status still reports the
    /// safe mode the controller tried to reach.
    async fn force_safe_mode(&self, st: &mut ControllerState) {
        let safe = self.catalog.safe_mode();
        if let Err(err) = self.driver.apply(safe.equipment).await {
            tracing::error!("failed to reach safe mode \"{}\": {:#}", safe.key, err);
        }
        st.equipment = safe.equipment;
        st.mode = safe.key.clone();
    }
}
