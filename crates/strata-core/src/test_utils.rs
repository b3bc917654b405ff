//! Shared fixtures for tests. Enabled with the `test-utils` feature.

use crate::fixed::Fixed64;
use crate::id::{GridPos, MaterialId};
use crate::material::{MaterialRegistry, MaterialRegistryBuilder};
use crate::recipe::{FilterClass, RecipeTable, RecipeTableBuilder, ThermalVariant};
use crate::station::{HeatProvider, MaterialUnit, WorldSink};

/// A heat provider that answers the same everywhere.
pub struct ConstantHeat(pub bool);

impl HeatProvider for ConstantHeat {
    fn heat_present(&self, _at: GridPos) -> bool {
        self.0
    }
}

/// A world sink that records every emitted material.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub emitted: Vec<(GridPos, MaterialUnit)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total quantity emitted of one material, across all positions.
    pub fn total_of(&self, material: MaterialId) -> u32 {
        self.emitted
            .iter()
            .filter(|(_, u)| u.material == material)
            .map(|(_, u)| u.quantity)
            .sum()
    }
}

impl WorldSink for CollectingSink {
    fn emit_material(&mut self, at: GridPos, unit: MaterialUnit) {
        self.emitted.push((at, unit));
    }
}

/// A small but complete content catalog with every station exercised:
/// a separation chain for dirt and gravel, compost values, melt values
/// for both thermal variants, and three filter media.
pub struct SampleCatalog {
    pub materials: MaterialRegistry,
    pub table: RecipeTable,
    pub dirt: MaterialId,
    pub gravel: MaterialId,
    pub sand: MaterialId,
    pub cobblestone: MaterialId,
    pub leaves: MaterialId,
    pub sapling: MaterialId,
    pub seeds: MaterialId,
    pub flint: MaterialId,
    pub raw_iron: MaterialId,
    pub twine_mesh: MaterialId,
    pub flint_mesh: MaterialId,
    pub iron_mesh: MaterialId,
    pub water: MaterialId,
    pub molten_rock: MaterialId,
}

pub fn sample_catalog() -> SampleCatalog {
    let mut m = MaterialRegistryBuilder::new();
    let dirt = m.register_solid("dirt");
    let gravel = m.register_solid("gravel");
    let sand = m.register_solid("sand");
    let cobblestone = m.register_solid("cobblestone");
    let leaves = m.register_solid("leaves");
    let sapling = m.register_solid("sapling");
    let seeds = m.register_solid("wheat_seeds");
    let flint = m.register_solid("flint");
    let raw_iron = m.register_solid("raw_iron");
    let twine_mesh = m.register_solid("twine_mesh");
    let flint_mesh = m.register_solid("flint_mesh");
    let iron_mesh = m.register_solid("iron_mesh");
    let water = m.register_fluid("water", false);
    let molten_rock = m.register_fluid("molten_rock", true);
    let materials = m.build().expect("sample materials are well-formed");

    let p = |v: f64| Fixed64::from_num(v);
    let mut t = RecipeTableBuilder::new();
    t.register_separation(dirt, FilterClass::Twine, seeds, p(0.15))
        .register_separation(gravel, FilterClass::Twine, flint, p(0.25))
        .register_separation(gravel, FilterClass::Flint, raw_iron, p(0.05))
        .register_separation(sand, FilterClass::Flint, flint, p(0.1))
        .register_compost(leaves, 100)
        .register_compost(sapling, 125)
        .compost_output(dirt)
        .register_melt(leaves, ThermalVariant::Low, 250)
        .register_melt(sapling, ThermalVariant::Low, 500)
        .register_melt(cobblestone, ThermalVariant::High, 250)
        .thermal_output(ThermalVariant::Low, water)
        .thermal_output(ThermalVariant::High, molten_rock)
        .register_filter(twine_mesh, FilterClass::Twine)
        .register_filter(flint_mesh, FilterClass::Flint)
        .register_filter(iron_mesh, FilterClass::Iron);
    let table = t.build(&materials).expect("sample table is well-formed");

    SampleCatalog {
        materials,
        table,
        dirt,
        gravel,
        sand,
        cobblestone,
        leaves,
        sapling,
        seeds,
        flint,
        raw_iron,
        twine_mesh,
        flint_mesh,
        iron_mesh,
        water,
        molten_rock,
    }
}

pub fn pos(x: i32, y: i32, z: i32) -> GridPos {
    GridPos::new(x, y, z)
}
