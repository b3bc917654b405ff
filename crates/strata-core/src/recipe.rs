//! The recipe table: the data-driven policy every station consults.
//!
//! One table holds four kinds of entries: separation recipes (probabilistic
//! yields keyed by source material and filter class), compost values, melt
//! values per thermal variant, and the filter-medium membership map. The
//! table is built once at process start via [`RecipeTableBuilder`] and then
//! shared read-only -- there is no hidden global registry, and eligibility
//! checks ("is this compostable?") are lookup-table membership tests rather
//! than identity-comparison chains.

use crate::fixed::Fixed64;
use crate::id::MaterialId;
use crate::material::MaterialRegistry;
use crate::rng::SimRng;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Quality tier of a filtering medium, ordered worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum FilterClass {
    Twine,
    Flint,
    Iron,
    Diamond,
}

impl FilterClass {
    /// All tiers, ascending.
    pub const ALL: [FilterClass; 4] = [
        FilterClass::Twine,
        FilterClass::Flint,
        FilterClass::Iron,
        FilterClass::Diamond,
    ];
}

/// Which fluids a thermal station produces and which feed it accepts.
/// Fixed at station creation from its construction context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThermalVariant {
    Low,
    High,
}

/// How separation lookups match filter classes.
///
/// The tiered-unlock question is deliberately left to content: `Exact`
/// matches only the registered class, `Cascade` lets a better filter also
/// use every lower tier's recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FilterMatching {
    #[default]
    Exact,
    Cascade,
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One candidate output of a separation recipe. Each output is an
/// independent Bernoulli trial, not a slice of a normalized distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WeightedOutput {
    pub output: MaterialId,
    pub probability: Fixed64,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`RecipeTable`].
/// Registration is unchecked; all validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RecipeTableBuilder {
    separation: HashMap<(MaterialId, FilterClass), Vec<WeightedOutput>>,
    compost_values: HashMap<MaterialId, u32>,
    compost_output: Option<MaterialId>,
    melt_values: HashMap<(MaterialId, ThermalVariant), u32>,
    thermal_outputs: HashMap<ThermalVariant, MaterialId>,
    filter_media: HashMap<MaterialId, FilterClass>,
    matching: FilterMatching,
}

impl RecipeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter-matching policy (default `Exact`).
    pub fn matching(&mut self, matching: FilterMatching) -> &mut Self {
        self.matching = matching;
        self
    }

    /// Register one separation output for `(source, class)`.
    pub fn register_separation(
        &mut self,
        source: MaterialId,
        class: FilterClass,
        output: MaterialId,
        probability: Fixed64,
    ) -> &mut Self {
        self.separation
            .entry((source, class))
            .or_default()
            .push(WeightedOutput {
                output,
                probability,
            });
        self
    }

    /// Register a compostable material and its fill value.
    pub fn register_compost(&mut self, material: MaterialId, value: u32) -> &mut Self {
        self.compost_values.insert(material, value);
        self
    }

    /// Set the derived material a full, rested compost batch collapses into.
    pub fn compost_output(&mut self, material: MaterialId) -> &mut Self {
        self.compost_output = Some(material);
        self
    }

    /// Register a meltable material for one thermal variant.
    pub fn register_melt(
        &mut self,
        material: MaterialId,
        variant: ThermalVariant,
        value: u32,
    ) -> &mut Self {
        self.melt_values.insert((material, variant), value);
        self
    }

    /// Set the fluid a thermal variant produces.
    pub fn thermal_output(&mut self, variant: ThermalVariant, fluid: MaterialId) -> &mut Self {
        self.thermal_outputs.insert(variant, fluid);
        self
    }

    /// Register a filter medium and its class.
    pub fn register_filter(&mut self, material: MaterialId, class: FilterClass) -> &mut Self {
        self.filter_media.insert(material, class);
        self
    }

    /// Validate every entry against the registry and freeze the table.
    pub fn build(self, materials: &MaterialRegistry) -> Result<RecipeTable, RecipeError> {
        let known = |id: MaterialId| materials.get(id).is_some();

        for (&(source, _), outputs) in &self.separation {
            if !known(source) {
                return Err(RecipeError::UnknownMaterial(source));
            }
            for out in outputs {
                if !known(out.output) {
                    return Err(RecipeError::UnknownMaterial(out.output));
                }
                if out.probability <= Fixed64::ZERO || out.probability > Fixed64::from_num(1) {
                    return Err(RecipeError::InvalidProbability {
                        output: out.output,
                        probability: out.probability,
                    });
                }
            }
        }

        for (&material, &value) in &self.compost_values {
            if !known(material) {
                return Err(RecipeError::UnknownMaterial(material));
            }
            if value == 0 {
                return Err(RecipeError::ZeroValue(material));
            }
        }
        if !self.compost_values.is_empty() && self.compost_output.is_none() {
            return Err(RecipeError::MissingCompostOutput);
        }
        if let Some(out) = self.compost_output
            && !known(out)
        {
            return Err(RecipeError::UnknownMaterial(out));
        }

        for (&(material, variant), &value) in &self.melt_values {
            if !known(material) {
                return Err(RecipeError::UnknownMaterial(material));
            }
            if value == 0 {
                return Err(RecipeError::ZeroValue(material));
            }
            if !self.thermal_outputs.contains_key(&variant) {
                return Err(RecipeError::MissingThermalOutput(variant));
            }
        }
        for &fluid in self.thermal_outputs.values() {
            if !known(fluid) {
                return Err(RecipeError::UnknownMaterial(fluid));
            }
            if !materials.is_fluid(fluid) {
                return Err(RecipeError::NotAFluid(fluid));
            }
        }

        for &material in self.filter_media.keys() {
            if !known(material) {
                return Err(RecipeError::UnknownMaterial(material));
            }
        }

        Ok(RecipeTable {
            separation: self.separation,
            compost_values: self.compost_values,
            compost_output: self.compost_output,
            melt_values: self.melt_values,
            thermal_outputs: self.thermal_outputs,
            filter_media: self.filter_media,
            matching: self.matching,
        })
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Immutable recipe table. Frozen after build; thread-safe to share.
#[derive(Debug)]
pub struct RecipeTable {
    separation: HashMap<(MaterialId, FilterClass), Vec<WeightedOutput>>,
    compost_values: HashMap<MaterialId, u32>,
    compost_output: Option<MaterialId>,
    melt_values: HashMap<(MaterialId, ThermalVariant), u32>,
    thermal_outputs: HashMap<ThermalVariant, MaterialId>,
    filter_media: HashMap<MaterialId, FilterClass>,
    matching: FilterMatching,
}

impl RecipeTable {
    /// All candidate outputs for separating `source` through a filter of
    /// `class`, in deterministic registration order. Empty if nothing is
    /// registered.
    pub fn lookup(&self, source: MaterialId, class: FilterClass) -> Vec<WeightedOutput> {
        match self.matching {
            FilterMatching::Exact => self
                .separation
                .get(&(source, class))
                .cloned()
                .unwrap_or_default(),
            FilterMatching::Cascade => {
                let mut out = Vec::new();
                for tier in FilterClass::ALL {
                    if tier <= class
                        && let Some(entries) = self.separation.get(&(source, tier))
                    {
                        out.extend_from_slice(entries);
                    }
                }
                out
            }
        }
    }

    /// Roll every candidate output independently. Duplicates and an empty
    /// result are both valid outcomes. No side effects beyond consuming
    /// draws from `rng`.
    pub fn resolve(
        &self,
        source: MaterialId,
        class: FilterClass,
        rng: &mut SimRng,
    ) -> Vec<MaterialId> {
        self.lookup(source, class)
            .iter()
            .filter(|e| rng.chance(e.probability))
            .map(|e| e.output)
            .collect()
    }

    /// Compost fill value for a material; `None` means not compostable.
    pub fn compost_value(&self, material: MaterialId) -> Option<u32> {
        self.compost_values.get(&material).copied()
    }

    /// The derived material a finished compost batch yields.
    pub fn compost_output(&self) -> Option<MaterialId> {
        self.compost_output
    }

    /// Melt value of a material in the given thermal variant; `None` means
    /// that variant cannot melt it.
    pub fn melt_value(&self, material: MaterialId, variant: ThermalVariant) -> Option<u32> {
        self.melt_values.get(&(material, variant)).copied()
    }

    /// The fluid the given thermal variant produces.
    pub fn thermal_output(&self, variant: ThermalVariant) -> Option<MaterialId> {
        self.thermal_outputs.get(&variant).copied()
    }

    /// The class of a filter medium; `None` means the material is not a
    /// filter at all.
    pub fn filter_class(&self, material: MaterialId) -> Option<FilterClass> {
        self.filter_media.get(&material).copied()
    }

    pub fn matching(&self) -> FilterMatching {
        self.matching
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("unknown material reference: {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("probability for output {output:?} must be in (0, 1], got {probability}")]
    InvalidProbability {
        output: MaterialId,
        probability: Fixed64,
    },
    #[error("compost/melt value for {0:?} must be at least 1")]
    ZeroValue(MaterialId),
    #[error("compost values registered but no compost output set")]
    MissingCompostOutput,
    #[error("melt values registered for {0:?} but no thermal output set")]
    MissingThermalOutput(ThermalVariant),
    #[error("thermal output {0:?} is not a fluid")]
    NotAFluid(MaterialId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialRegistryBuilder;

    struct Fixture {
        materials: MaterialRegistry,
        dirt: MaterialId,
        gravel: MaterialId,
        seeds: MaterialId,
        flint: MaterialId,
        ore: MaterialId,
        leaves: MaterialId,
        water: MaterialId,
    }

    fn materials() -> Fixture {
        let mut b = MaterialRegistryBuilder::new();
        let dirt = b.register_solid("dirt");
        let gravel = b.register_solid("gravel");
        let seeds = b.register_solid("seeds");
        let flint = b.register_solid("flint");
        let ore = b.register_solid("raw_iron");
        let leaves = b.register_solid("leaves");
        let water = b.register_fluid("water", false);
        Fixture {
            materials: b.build().unwrap(),
            dirt,
            gravel,
            seeds,
            flint,
            ore,
            leaves,
            water,
        }
    }

    fn p(v: f64) -> Fixed64 {
        Fixed64::from_num(v)
    }

    #[test]
    fn lookup_exact_only_matches_registered_class() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_separation(f.gravel, FilterClass::Twine, f.flint, p(0.25));
        b.register_separation(f.gravel, FilterClass::Flint, f.ore, p(0.05));
        let table = b.build(&f.materials).unwrap();

        let twine = table.lookup(f.gravel, FilterClass::Twine);
        assert_eq!(twine.len(), 1);
        assert_eq!(twine[0].output, f.flint);

        // Exact matching: a better filter does not inherit twine recipes.
        let flint = table.lookup(f.gravel, FilterClass::Flint);
        assert_eq!(flint.len(), 1);
        assert_eq!(flint[0].output, f.ore);

        assert!(table.lookup(f.dirt, FilterClass::Twine).is_empty());
    }

    #[test]
    fn lookup_cascade_includes_lower_tiers() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.matching(FilterMatching::Cascade);
        b.register_separation(f.gravel, FilterClass::Twine, f.flint, p(0.25));
        b.register_separation(f.gravel, FilterClass::Flint, f.ore, p(0.05));
        let table = b.build(&f.materials).unwrap();

        let flint = table.lookup(f.gravel, FilterClass::Flint);
        assert_eq!(flint.len(), 2);
        // Ascending tier order keeps draw consumption deterministic.
        assert_eq!(flint[0].output, f.flint);
        assert_eq!(flint[1].output, f.ore);

        // Lower tiers still see only their own entries.
        assert_eq!(table.lookup(f.gravel, FilterClass::Twine).len(), 1);
    }

    #[test]
    fn resolve_is_deterministic_per_seed() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_separation(f.dirt, FilterClass::Twine, f.seeds, p(0.5));
        b.register_separation(f.dirt, FilterClass::Twine, f.flint, p(0.3));
        let table = b.build(&f.materials).unwrap();

        let mut a = SimRng::new(1234);
        let mut b2 = SimRng::new(1234);
        for _ in 0..100 {
            assert_eq!(
                table.resolve(f.dirt, FilterClass::Twine, &mut a),
                table.resolve(f.dirt, FilterClass::Twine, &mut b2)
            );
        }
    }

    #[test]
    fn resolve_can_yield_duplicates_and_nothing() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        // Two certain entries for the same output: always two copies.
        b.register_separation(f.dirt, FilterClass::Twine, f.seeds, p(1.0));
        b.register_separation(f.dirt, FilterClass::Twine, f.seeds, p(1.0));
        let table = b.build(&f.materials).unwrap();

        let mut rng = SimRng::new(5);
        assert_eq!(
            table.resolve(f.dirt, FilterClass::Twine, &mut rng),
            vec![f.seeds, f.seeds]
        );
        // Unregistered source: empty result, no draws consumed.
        let before = rng.state();
        assert!(table.resolve(f.gravel, FilterClass::Twine, &mut rng).is_empty());
        assert_eq!(rng.state(), before);
    }

    #[test]
    fn compost_and_melt_lookups() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_compost(f.leaves, 100)
            .compost_output(f.dirt)
            .register_melt(f.leaves, ThermalVariant::Low, 250)
            .thermal_output(ThermalVariant::Low, f.water);
        let table = b.build(&f.materials).unwrap();

        assert_eq!(table.compost_value(f.leaves), Some(100));
        assert_eq!(table.compost_value(f.gravel), None);
        assert_eq!(table.compost_output(), Some(f.dirt));
        assert_eq!(table.melt_value(f.leaves, ThermalVariant::Low), Some(250));
        assert_eq!(table.melt_value(f.leaves, ThermalVariant::High), None);
        assert_eq!(table.thermal_output(ThermalVariant::Low), Some(f.water));
        assert_eq!(table.thermal_output(ThermalVariant::High), None);
    }

    #[test]
    fn filter_media_membership() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_filter(f.flint, FilterClass::Flint);
        let table = b.build(&f.materials).unwrap();
        assert_eq!(table.filter_class(f.flint), Some(FilterClass::Flint));
        assert_eq!(table.filter_class(f.dirt), None);
    }

    #[test]
    fn build_rejects_bad_probability() {
        let f = materials();
        for bad in [0.0, -0.5, 1.5] {
            let mut b = RecipeTableBuilder::new();
            b.register_separation(f.dirt, FilterClass::Twine, f.seeds, p(bad));
            assert!(matches!(
                b.build(&f.materials),
                Err(RecipeError::InvalidProbability { .. })
            ));
        }
    }

    #[test]
    fn build_rejects_unknown_material() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_separation(MaterialId(99), FilterClass::Twine, f.seeds, p(0.5));
        assert!(matches!(
            b.build(&f.materials),
            Err(RecipeError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn build_rejects_incomplete_thermal_config() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_melt(f.leaves, ThermalVariant::Low, 250);
        assert!(matches!(
            b.build(&f.materials),
            Err(RecipeError::MissingThermalOutput(ThermalVariant::Low))
        ));

        let mut b = RecipeTableBuilder::new();
        b.register_melt(f.leaves, ThermalVariant::Low, 250)
            .thermal_output(ThermalVariant::Low, f.dirt);
        assert!(matches!(b.build(&f.materials), Err(RecipeError::NotAFluid(_))));
    }

    #[test]
    fn build_rejects_compost_without_output() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_compost(f.leaves, 100);
        assert!(matches!(
            b.build(&f.materials),
            Err(RecipeError::MissingCompostOutput)
        ));
    }

    #[test]
    fn build_rejects_zero_values() {
        let f = materials();
        let mut b = RecipeTableBuilder::new();
        b.register_compost(f.leaves, 0).compost_output(f.dirt);
        assert!(matches!(b.build(&f.materials), Err(RecipeError::ZeroValue(_))));
    }

    #[test]
    fn filter_class_tiers_are_ordered() {
        assert!(FilterClass::Twine < FilterClass::Flint);
        assert!(FilterClass::Flint < FilterClass::Iron);
        assert!(FilterClass::Iron < FilterClass::Diamond);
    }
}
