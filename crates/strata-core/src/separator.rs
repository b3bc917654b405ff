//! The separator station: works one unit of input material through a
//! filtering medium, producing probabilistic yields on completion.
//!
//! Progress advances one notch per trigger event rather than per simulation
//! step; the station is otherwise inert between interactions.

use crate::id::MaterialId;
use crate::recipe::RecipeTable;
use crate::rng::SimRng;
use crate::station::MaterialUnit;

/// Trigger events needed to work one batch through the filter.
pub const PROGRESS_MAX: u32 = 7;
/// Output buffer slots.
pub const OUTPUT_SLOTS: usize = 9;

/// Result of one [`SeparatorStation::advance`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Whether this advance completed the batch (true exactly once per batch).
    pub completed: bool,
    /// Units that found no free buffer slot. The caller must place these in
    /// the world; they are never silently discarded.
    pub overflow: Vec<MaterialUnit>,
}

/// A placed separator. Holds at most one filter medium and one input unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeparatorStation {
    pub(crate) filter: Option<MaterialId>,
    pub(crate) input: Option<MaterialId>,
    pub(crate) progress: u32,
    pub(crate) outputs: [Option<MaterialId>; OUTPUT_SLOTS],
}

impl SeparatorStation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> Option<MaterialId> {
        self.filter
    }

    pub fn input(&self) -> Option<MaterialId> {
        self.input
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn outputs(&self) -> &[Option<MaterialId>; OUTPUT_SLOTS] {
        &self.outputs
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Install a filter medium. Succeeds only if none is installed.
    /// Whether the material actually is a filter is the resolver's check.
    pub fn assign_filter(&mut self, filter: MaterialId) -> bool {
        if self.filter.is_some() {
            return false;
        }
        self.filter = Some(filter);
        true
    }

    /// Remove the installed filter. Refused while a batch is loaded.
    pub fn remove_filter(&mut self) -> Option<MaterialId> {
        if self.input.is_some() {
            return None;
        }
        self.filter.take()
    }

    /// Load one unit of input. Requires an installed filter and no current
    /// input; always resets progress.
    pub fn assign_input(&mut self, input: MaterialId) -> bool {
        if self.filter.is_none() || self.input.is_some() {
            return false;
        }
        self.input = Some(input);
        self.progress = 0;
        true
    }

    /// One trigger event. Advances progress; on reaching [`PROGRESS_MAX`]
    /// the input is consumed, progress resets, and the recipe table is
    /// resolved into the output buffer (first empty slot each).
    pub fn advance(&mut self, table: &RecipeTable, rng: &mut SimRng) -> AdvanceOutcome {
        let (Some(filter), Some(source)) = (self.filter, self.input) else {
            return AdvanceOutcome::default();
        };
        self.progress += 1;
        if self.progress < PROGRESS_MAX {
            return AdvanceOutcome::default();
        }

        self.input = None;
        self.progress = 0;

        let mut outcome = AdvanceOutcome {
            completed: true,
            overflow: Vec::new(),
        };
        let Some(class) = table.filter_class(filter) else {
            // Unclassified filter medium separates nothing.
            return outcome;
        };
        for material in table.resolve(source, class, rng) {
            match self.outputs.iter_mut().find(|slot| slot.is_none()) {
                Some(slot) => *slot = Some(material),
                None => outcome.overflow.push(MaterialUnit::one(material)),
            }
        }
        outcome
    }

    /// Take one buffered output unit.
    pub fn take_output(&mut self, slot: usize) -> Option<MaterialId> {
        self.outputs.get_mut(slot).and_then(|s| s.take())
    }

    /// Everything recoverable when the station is destroyed or emptied:
    /// filter, loaded input, and buffered outputs. Does not clear state.
    pub fn collect_drops(&self) -> Vec<MaterialUnit> {
        let mut drops = Vec::new();
        if let Some(filter) = self.filter {
            drops.push(MaterialUnit::one(filter));
        }
        if let Some(input) = self.input {
            drops.push(MaterialUnit::one(input));
        }
        for material in self.outputs.iter().flatten() {
            drops.push(MaterialUnit::one(*material));
        }
        drops
    }
}
