//! The accumulator station: mixes a single fluid, or composts solid matter
//! into a derived material over time.
//!
//! Exactly one of the fluid / compost sub-states is active at a time; every
//! mutation is gated on the current mode and fails without touching state
//! when the precondition does not hold.

use crate::id::MaterialId;
use crate::recipe::RecipeTable;
use crate::station::MaterialUnit;

/// Maximum fluid the station holds, in fluid units.
pub const FLUID_CAP: u32 = 1000;
/// Compost level at which the batch is full and starts resting.
pub const COMPOST_CAP: u32 = 1000;
/// Steps a full compost batch rests before it is ready for collection.
pub const COMPOST_DURATION: u32 = 600;

/// Lifecycle mode. `Ready` means a finished compost batch awaits collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub enum AccumulatorMode {
    #[default]
    Empty,
    FluidFilled,
    Composting,
    Ready,
}

/// A placed accumulator. Created empty; mutated only by interactions and
/// its own step function.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccumulatorStation {
    pub(crate) mode: AccumulatorMode,
    pub(crate) fluid: Option<MaterialId>,
    pub(crate) fluid_amount: u32,
    pub(crate) compost_level: u32,
    pub(crate) compost_time: u32,
}

impl AccumulatorStation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AccumulatorMode {
        self.mode
    }

    pub fn fluid(&self) -> Option<MaterialId> {
        self.fluid
    }

    pub fn fluid_amount(&self) -> u32 {
        self.fluid_amount
    }

    pub fn compost_level(&self) -> u32 {
        self.compost_level
    }

    pub fn compost_time(&self) -> u32 {
        self.compost_time
    }

    /// Pour fluid in. Succeeds only from `Empty`, or from `FluidFilled` with
    /// the same fluid, and only if the result stays within [`FLUID_CAP`].
    pub fn add_fluid(&mut self, fluid: MaterialId, amount: u32) -> bool {
        let compatible = match self.mode {
            AccumulatorMode::Empty => true,
            AccumulatorMode::FluidFilled => self.fluid == Some(fluid),
            _ => false,
        };
        if !compatible {
            return false;
        }
        let new_amount = match self.fluid_amount.checked_add(amount) {
            Some(n) if n <= FLUID_CAP => n,
            _ => return false,
        };
        self.fluid = Some(fluid);
        self.fluid_amount = new_amount;
        self.mode = AccumulatorMode::FluidFilled;
        true
    }

    /// Draw `amount` fluid out. Succeeds only when `FluidFilled` and the
    /// held quantity covers the request; returns the fluid type drawn.
    /// Draining to zero resets the station to `Empty`.
    pub fn extract_fluid(&mut self, amount: u32) -> Option<MaterialId> {
        if self.mode != AccumulatorMode::FluidFilled || self.fluid_amount < amount {
            return None;
        }
        let drawn = self.fluid;
        self.fluid_amount -= amount;
        if self.fluid_amount == 0 {
            self.fluid = None;
            self.mode = AccumulatorMode::Empty;
        }
        drawn
    }

    /// Add compostable matter worth `compost_value`. Succeeds only from
    /// `Empty` or `Composting`, and only if the level stays within
    /// [`COMPOST_CAP`].
    pub fn add_compostable(&mut self, compost_value: u32) -> bool {
        if !matches!(self.mode, AccumulatorMode::Empty | AccumulatorMode::Composting) {
            return false;
        }
        let new_level = match self.compost_level.checked_add(compost_value) {
            Some(n) if n <= COMPOST_CAP => n,
            _ => return false,
        };
        self.compost_level = new_level;
        self.mode = AccumulatorMode::Composting;
        true
    }

    /// Collect the finished batch. Valid only when `Ready`; resets to
    /// `Empty`. The derived material itself comes from the recipe table.
    pub fn collect_and_reset(&mut self) -> bool {
        if self.mode != AccumulatorMode::Ready {
            return false;
        }
        self.mode = AccumulatorMode::Empty;
        self.compost_level = 0;
        self.compost_time = 0;
        true
    }

    /// Advance one simulation step. Only a full compost batch makes
    /// progress; on reaching [`COMPOST_DURATION`] the batch becomes `Ready`.
    /// Returns whether state changed.
    pub fn step(&mut self) -> bool {
        if self.mode != AccumulatorMode::Composting || self.compost_level < COMPOST_CAP {
            return false;
        }
        self.compost_time += 1;
        if self.compost_time >= COMPOST_DURATION {
            self.mode = AccumulatorMode::Ready;
            self.compost_time = 0;
        }
        true
    }

    /// Recoverable contents when the station is removed from the world.
    /// A finished batch yields the derived material; held fluid is yielded
    /// as-is. Compost still in progress is sludge and unrecoverable.
    pub fn drops(&self, table: &RecipeTable) -> Vec<MaterialUnit> {
        match self.mode {
            AccumulatorMode::FluidFilled => match self.fluid {
                Some(fluid) => vec![MaterialUnit::new(fluid, self.fluid_amount)],
                None => Vec::new(),
            },
            AccumulatorMode::Ready => match table.compost_output() {
                Some(out) => vec![MaterialUnit::one(out)],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}
