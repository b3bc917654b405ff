//! The interaction resolver: translates participant actions into station
//! mutations, enforcing preconditions.
//!
//! Every resolution is total: an invalid action returns a typed rejection
//! and leaves the station untouched. Materials handed back to the
//! participant travel in the outcome; materials that must land in the
//! world (separator overflow) go through the [`WorldSink`].

use crate::id::GridPos;
use crate::id::MaterialId;
use crate::material::MaterialRegistry;
use crate::recipe::{RecipeTable, ThermalVariant};
use crate::rng::SimRng;
use crate::station::{MaterialUnit, Station, WorldSink};

/// A participant action aimed at one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pour fluid into an accumulator.
    DepositFluid { fluid: MaterialId, amount: u32 },
    /// Feed solid material into a thermal station from a stack of `units`.
    DepositSolid { material: MaterialId, units: u32 },
    /// Add one compostable unit to an accumulator.
    DepositCompostable { material: MaterialId },
    /// Draw fluid from an accumulator or thermal station.
    ExtractFluid { amount: u32 },
    /// Collect the finished compost batch from an accumulator.
    CollectCompost,
    /// Install a filter medium into a separator.
    AssignFilter { filter: MaterialId },
    /// Remove the separator's filter medium.
    RemoveFilter,
    /// Load one unit of input into a separator.
    AssignInput { material: MaterialId },
    /// One separator work event (a participant "use").
    Trigger,
    /// Take one buffered output unit from a separator slot.
    TakeOutput { slot: usize },
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No station exists under the addressed ID.
    UnknownStation,
    /// The action does not apply to this station kind.
    WrongStationKind,
    /// The material is not in the registry.
    UnknownMaterial,
    /// Deposited "fluid" is a solid.
    NotAFluid,
    /// The table has no compost value for this material.
    NotCompostable,
    /// The table has no melt value for this material in this variant.
    NotMeltable,
    /// The material is not a registered filter medium.
    NotAFilterMedium,
    /// Scalding fluid cannot be drawn from a low-heat station.
    ScaldingFluid,
    /// The station's current mode or capacity refused the mutation.
    InvalidState,
    /// The addressed output slot holds nothing.
    EmptySlot,
}

/// Result of resolving one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted {
        /// Units consumed from the participant's stack (0 where the action
        /// consumes nothing, e.g. extraction).
        consumed_units: u32,
        /// Materials handed back to the participant.
        yielded: Vec<MaterialUnit>,
    },
    Rejected(Rejection),
}

impl ActionOutcome {
    fn consumed(units: u32) -> Self {
        ActionOutcome::Accepted {
            consumed_units: units,
            yielded: Vec::new(),
        }
    }

    fn yielded(unit: MaterialUnit) -> Self {
        ActionOutcome::Accepted {
            consumed_units: 0,
            yielded: vec![unit],
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ActionOutcome::Accepted { .. })
    }
}

/// Resolve one action against one station. Mutates the station on success;
/// on rejection no state changes anywhere.
pub fn resolve(
    station: &mut Station,
    at: GridPos,
    action: Action,
    materials: &MaterialRegistry,
    table: &RecipeTable,
    rng: &mut SimRng,
    sink: &mut dyn WorldSink,
) -> ActionOutcome {
    use ActionOutcome::Rejected;

    match (station, action) {
        (Station::Accumulator(acc), Action::DepositFluid { fluid, amount }) => {
            if materials.get(fluid).is_none() {
                return Rejected(Rejection::UnknownMaterial);
            }
            if !materials.is_fluid(fluid) {
                return Rejected(Rejection::NotAFluid);
            }
            if acc.add_fluid(fluid, amount) {
                ActionOutcome::consumed(amount)
            } else {
                Rejected(Rejection::InvalidState)
            }
        }

        (Station::Accumulator(acc), Action::DepositCompostable { material }) => {
            let Some(value) = table.compost_value(material) else {
                return Rejected(Rejection::NotCompostable);
            };
            if acc.add_compostable(value) {
                ActionOutcome::consumed(1)
            } else {
                Rejected(Rejection::InvalidState)
            }
        }

        (Station::Accumulator(acc), Action::ExtractFluid { amount }) => {
            match acc.extract_fluid(amount) {
                Some(fluid) => ActionOutcome::yielded(MaterialUnit::new(fluid, amount)),
                None => Rejected(Rejection::InvalidState),
            }
        }

        (Station::Accumulator(acc), Action::CollectCompost) => {
            let Some(output) = table.compost_output() else {
                return Rejected(Rejection::InvalidState);
            };
            if acc.collect_and_reset() {
                ActionOutcome::yielded(MaterialUnit::one(output))
            } else {
                Rejected(Rejection::InvalidState)
            }
        }

        (Station::Thermal(th), Action::DepositSolid { material, units }) => {
            let Some(value) = table.melt_value(material, th.variant()) else {
                return Rejected(Rejection::NotMeltable);
            };
            let consumed = th.add_solid(units, value);
            if consumed > 0 {
                ActionOutcome::consumed(consumed)
            } else {
                Rejected(Rejection::InvalidState)
            }
        }

        (Station::Thermal(th), Action::ExtractFluid { amount }) => {
            if let Some(fluid) = th.fluid()
                && materials.is_scalding(fluid)
                && th.variant() == ThermalVariant::Low
            {
                return Rejected(Rejection::ScaldingFluid);
            }
            match th.extract_fluid(amount) {
                Some(fluid) => ActionOutcome::yielded(MaterialUnit::new(fluid, amount)),
                None => Rejected(Rejection::InvalidState),
            }
        }

        (Station::Separator(sep), Action::AssignFilter { filter }) => {
            if table.filter_class(filter).is_none() {
                return Rejected(Rejection::NotAFilterMedium);
            }
            if sep.assign_filter(filter) {
                ActionOutcome::consumed(1)
            } else {
                Rejected(Rejection::InvalidState)
            }
        }

        (Station::Separator(sep), Action::RemoveFilter) => match sep.remove_filter() {
            Some(filter) => ActionOutcome::yielded(MaterialUnit::one(filter)),
            None => Rejected(Rejection::InvalidState),
        },

        (Station::Separator(sep), Action::AssignInput { material }) => {
            if materials.get(material).is_none() {
                return Rejected(Rejection::UnknownMaterial);
            }
            if sep.assign_input(material) {
                ActionOutcome::consumed(1)
            } else {
                Rejected(Rejection::InvalidState)
            }
        }

        (Station::Separator(sep), Action::Trigger) => {
            if !sep.has_filter() || !sep.has_input() {
                return Rejected(Rejection::InvalidState);
            }
            let outcome = sep.advance(table, rng);
            for unit in outcome.overflow {
                sink.emit_material(at, unit);
            }
            ActionOutcome::consumed(0)
        }

        (Station::Separator(sep), Action::TakeOutput { slot }) => {
            match sep.take_output(slot) {
                Some(material) => ActionOutcome::yielded(MaterialUnit::one(material)),
                None => Rejected(Rejection::EmptySlot),
            }
        }

        // Everything else is a kind mismatch.
        _ => Rejected(Rejection::WrongStationKind),
    }
}
