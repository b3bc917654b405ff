//! The station driver: owns every placed station and orchestrates the
//! per-step advance.
//!
//! # Architecture
//!
//! The `StationDriver` owns:
//! - A `SlotMap<StationId, StationEntry>` (station state + grid position)
//! - The [`MaterialRegistry`] and [`RecipeTable`] built at load
//! - A [`SimRng`] shared by every probabilistic resolution
//! - A tick counter and a [`DirtyTracker`] for incremental persistence
//!
//! Each `step()` samples the heat condition once per station, advances
//! every station independently, and increments the tick. Stations never
//! observe each other within a step, so iteration order cannot change
//! outcomes; the rng is only consumed by interactions, never by stepping.

use crate::dirty::DirtyTracker;
use crate::fixed::Ticks;
use crate::id::{GridPos, StationId};
use crate::interact::{Action, ActionOutcome, Rejection, resolve};
use crate::material::MaterialRegistry;
use crate::recipe::RecipeTable;
use crate::rng::SimRng;
use crate::station::{HeatProvider, Station, WorldSink};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Station entry
// ---------------------------------------------------------------------------

/// One placed station and where it sits in the host grid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StationEntry {
    pub station: Station,
    pub pos: GridPos,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Result of one [`StationDriver::step`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Stations whose state changed this step.
    pub changed: usize,
}

#[derive(Debug)]
pub struct StationDriver {
    stations: SlotMap<StationId, StationEntry>,
    materials: MaterialRegistry,
    table: RecipeTable,
    rng: SimRng,
    tick: Ticks,
    dirty: DirtyTracker,
}

impl StationDriver {
    /// Create a driver over a finished catalog. The seed fixes the whole
    /// probabilistic future of this driver.
    pub fn new(materials: MaterialRegistry, table: RecipeTable, seed: u64) -> Self {
        Self {
            stations: SlotMap::with_key(),
            materials,
            table,
            rng: SimRng::new(seed),
            tick: 0,
            dirty: DirtyTracker::new(),
        }
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn table(&self) -> &RecipeTable {
        &self.table
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id).map(|e| &e.station)
    }

    pub fn position(&self, id: StationId) -> Option<GridPos> {
        self.stations.get(id).map(|e| e.pos)
    }

    /// Iterate all placed stations in key order.
    pub fn stations(&self) -> impl Iterator<Item = (StationId, &StationEntry)> {
        self.stations.iter()
    }

    // -- Placement --------------------------------------------------------

    /// Place a station into the world. The new station starts dirty.
    pub fn place(&mut self, station: Station, pos: GridPos) -> StationId {
        let id = self.stations.insert(StationEntry { station, pos });
        self.dirty.mark(id);
        id
    }

    /// Remove a station, emitting its recoverable contents into the world
    /// at its position. Returns `false` if the ID is not placed.
    pub fn remove(&mut self, id: StationId, sink: &mut dyn WorldSink) -> bool {
        let Some(entry) = self.stations.remove(id) else {
            return false;
        };
        for unit in entry.station.drops(&self.table) {
            sink.emit_material(entry.pos, unit);
        }
        self.dirty.mark(id);
        true
    }

    // -- Stepping ---------------------------------------------------------

    /// Advance every station by one simulation step and increment the tick.
    /// The heat condition is sampled once per station, so a station sees a
    /// single consistent answer for the whole step.
    pub fn step(&mut self, heat: &impl HeatProvider) -> StepResult {
        let mut result = StepResult::default();
        for (id, entry) in &mut self.stations {
            let heat_present = heat.heat_present(entry.pos);
            if entry.station.step(heat_present, &self.table) {
                self.dirty.mark(id);
                result.changed += 1;
            }
        }
        self.tick += 1;
        result
    }

    // -- Interaction ------------------------------------------------------

    /// Resolve one participant action against one station. Accepted actions
    /// mark the station dirty; rejected ones leave all state untouched.
    pub fn interact(
        &mut self,
        id: StationId,
        action: Action,
        sink: &mut dyn WorldSink,
    ) -> ActionOutcome {
        let Some(entry) = self.stations.get_mut(id) else {
            return ActionOutcome::Rejected(Rejection::UnknownStation);
        };
        let outcome = resolve(
            &mut entry.station,
            entry.pos,
            action,
            &self.materials,
            &self.table,
            &mut self.rng,
            sink,
        );
        if outcome.is_accepted() {
            self.dirty.mark(id);
        }
        outcome
    }

    // -- Dirty tracking ---------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn dirty_tracker(&self) -> &DirtyTracker {
        &self.dirty
    }

    /// Mark all state clean, typically after the host persists.
    pub fn mark_clean(&mut self) {
        self.dirty.mark_clean();
    }

    // -- Snapshot plumbing -------------------------------------------------

    pub(crate) fn rng(&self) -> &SimRng {
        &self.rng
    }

    pub(crate) fn entries(&self) -> &SlotMap<StationId, StationEntry> {
        &self.stations
    }

    pub(crate) fn restore(
        materials: MaterialRegistry,
        table: RecipeTable,
        stations: SlotMap<StationId, StationEntry>,
        rng: SimRng,
        tick: Ticks,
    ) -> Self {
        Self {
            stations,
            materials,
            table,
            rng,
            tick,
            dirty: DirtyTracker::new(),
        }
    }
}
