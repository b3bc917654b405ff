//! The thermal station: melts pending solid into a produced fluid when an
//! external heat condition holds.
//!
//! The station never reads the world itself -- the driver samples the heat
//! query once per step and passes the result in. Heat absence pauses the
//! current conversion batch but never reverses progress already made.

use crate::id::MaterialId;
use crate::recipe::{RecipeTable, ThermalVariant};
use crate::station::MaterialUnit;

/// Maximum pending solid, in melt units.
pub const SOLID_CAP: u32 = 1000;
/// Maximum produced fluid, in fluid units.
pub const FLUID_CAP: u32 = 1000;
/// Steps one conversion batch takes under continuous heat.
pub const CONVERSION_PERIOD: u32 = 200;

/// A placed thermal station. The variant is fixed at creation and never
/// changes over the station's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ThermalStation {
    pub(crate) variant: ThermalVariant,
    pub(crate) pending_solid: u32,
    pub(crate) fluid: Option<MaterialId>,
    pub(crate) fluid_amount: u32,
    pub(crate) countdown: u32,
}

impl ThermalStation {
    pub fn new(variant: ThermalVariant) -> Self {
        Self {
            variant,
            pending_solid: 0,
            fluid: None,
            fluid_amount: 0,
            countdown: 0,
        }
    }

    pub fn variant(&self) -> ThermalVariant {
        self.variant
    }

    pub fn pending_solid(&self) -> u32 {
        self.pending_solid
    }

    pub fn fluid(&self) -> Option<MaterialId> {
        self.fluid
    }

    pub fn fluid_amount(&self) -> u32 {
        self.fluid_amount
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Feed solid material in. Takes the largest whole unit count `n` with
    /// `n * unit_melt_value` fitting under [`SOLID_CAP`] and `n` no larger
    /// than `available_units`. Returns the units consumed from the caller's
    /// stack; 0 means nothing fit.
    pub fn add_solid(&mut self, available_units: u32, unit_melt_value: u32) -> u32 {
        if unit_melt_value == 0 {
            return 0;
        }
        let room = SOLID_CAP - self.pending_solid;
        let n = (room / unit_melt_value).min(available_units);
        if n == 0 {
            return 0;
        }
        self.pending_solid += n * unit_melt_value;
        n
    }

    /// Draw `amount` produced fluid out; returns the fluid type drawn.
    /// Draining to zero clears the produced-fluid type. The scalding-fluid
    /// guard lives in the interaction resolver, not here.
    pub fn extract_fluid(&mut self, amount: u32) -> Option<MaterialId> {
        if self.fluid_amount < amount || self.fluid.is_none() {
            return None;
        }
        let drawn = self.fluid;
        self.fluid_amount -= amount;
        if self.fluid_amount == 0 {
            self.fluid = None;
        }
        drawn
    }

    /// Advance one simulation step with the heat condition sampled this
    /// step. Returns whether state changed.
    ///
    /// Starting a batch requires heat and sets the produced fluid from the
    /// variant; the countdown only runs while heat is present. On reaching
    /// zero, pending solid converts 1:1 into fluid, clamped by the space
    /// left under [`FLUID_CAP`]; excess solid stays pending for the next
    /// batch.
    pub fn step(&mut self, heat_present: bool, table: &RecipeTable) -> bool {
        if self.pending_solid == 0 || !heat_present {
            return false;
        }
        if self.countdown == 0 {
            let Some(output) = table.thermal_output(self.variant) else {
                return false;
            };
            self.fluid = Some(output);
            self.countdown = CONVERSION_PERIOD;
        }
        self.countdown -= 1;
        if self.countdown == 0 {
            let converted = self.pending_solid.min(FLUID_CAP - self.fluid_amount);
            self.pending_solid -= converted;
            self.fluid_amount += converted;
        }
        true
    }

    /// Recoverable contents when the station is removed: the produced fluid.
    /// Pending solid is part-melted feed and is discarded.
    pub fn drops(&self) -> Vec<MaterialUnit> {
        match self.fluid {
            Some(fluid) if self.fluid_amount > 0 => {
                vec![MaterialUnit::new(fluid, self.fluid_amount)]
            }
            _ => Vec::new(),
        }
    }
}
