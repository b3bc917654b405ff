//! Station polymorphism and the narrow interfaces to the host world.

use crate::accumulator::AccumulatorStation;
use crate::id::{GridPos, MaterialId};
use crate::recipe::RecipeTable;
use crate::separator::SeparatorStation;
use crate::thermal::ThermalStation;

/// A quantity of one material. Quantity is fluid units for fluids and a
/// unit count for solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaterialUnit {
    pub material: MaterialId,
    pub quantity: u32,
}

impl MaterialUnit {
    pub fn new(material: MaterialId, quantity: u32) -> Self {
        Self { material, quantity }
    }

    pub fn one(material: MaterialId) -> Self {
        Self::new(material, 1)
    }
}

/// External query: is a heat source present at the given location?
/// Sampled once per station per step by the driver.
pub trait HeatProvider {
    fn heat_present(&self, at: GridPos) -> bool;
}

/// External sink for materials the core must place into the world
/// (separator buffer overflow, drops from a removed station).
pub trait WorldSink {
    fn emit_material(&mut self, at: GridPos, unit: MaterialUnit);
}

/// Top-level station enum. Dispatches via enum match (no trait objects).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Station {
    Accumulator(AccumulatorStation),
    Thermal(ThermalStation),
    Separator(SeparatorStation),
}

impl Station {
    /// Advance one simulation step. The separator only moves on trigger
    /// events, so its step is a no-op. Returns whether state changed.
    pub fn step(&mut self, heat_present: bool, table: &RecipeTable) -> bool {
        match self {
            Station::Accumulator(acc) => acc.step(),
            Station::Thermal(th) => th.step(heat_present, table),
            Station::Separator(_) => false,
        }
    }

    /// Recoverable contents when the station is removed from the world.
    pub fn drops(&self, table: &RecipeTable) -> Vec<MaterialUnit> {
        match self {
            Station::Accumulator(acc) => acc.drops(table),
            Station::Thermal(th) => th.drops(),
            Station::Separator(sep) => sep.collect_drops(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{AccumulatorMode, COMPOST_CAP, COMPOST_DURATION};
    use crate::recipe::ThermalVariant;
    use crate::test_utils::sample_catalog;

    #[test]
    fn step_dispatches_to_each_variant() {
        let catalog = sample_catalog();

        let mut acc = AccumulatorStation::new();
        acc.add_compostable(COMPOST_CAP);
        let mut station = Station::Accumulator(acc);
        for _ in 0..COMPOST_DURATION {
            assert!(station.step(false, &catalog.table));
        }
        let Station::Accumulator(acc) = &station else {
            unreachable!()
        };
        assert_eq!(acc.mode(), AccumulatorMode::Ready);

        let mut th = ThermalStation::new(ThermalVariant::Low);
        th.add_solid(1, 250);
        let mut station = Station::Thermal(th);
        assert!(station.step(true, &catalog.table));
        assert!(!station.step(false, &catalog.table));

        let mut station = Station::Separator(SeparatorStation::new());
        assert!(!station.step(true, &catalog.table));
    }

    #[test]
    fn drops_dispatch_to_each_variant() {
        let catalog = sample_catalog();

        let mut acc = AccumulatorStation::new();
        acc.add_fluid(catalog.water, 100);
        assert_eq!(
            Station::Accumulator(acc).drops(&catalog.table),
            vec![MaterialUnit::new(catalog.water, 100)]
        );

        let mut sep = SeparatorStation::new();
        sep.assign_filter(catalog.twine_mesh);
        assert_eq!(
            Station::Separator(sep).drops(&catalog.table),
            vec![MaterialUnit::one(catalog.twine_mesh)]
        );

        assert!(
            Station::Thermal(ThermalStation::new(ThermalVariant::Low))
                .drops(&catalog.table)
                .is_empty()
        );
    }
}
