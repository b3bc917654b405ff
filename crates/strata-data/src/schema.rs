//! Serde data file structs for catalog content definitions.
//!
//! These structs define the on-disk format for materials, recipes, and
//! tools. They are deserialized from RON, JSON, or TOML data files and
//! then resolved into core types by the loader. Everything is referenced
//! by material name; the loader turns names into ids.

use serde::Deserialize;

// ===========================================================================
// Catalog
// ===========================================================================

/// A full content catalog in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    pub materials: Vec<MaterialData>,
    #[serde(default)]
    pub separations: Vec<SeparationData>,
    #[serde(default)]
    pub compost: Vec<CompostData>,
    #[serde(default)]
    pub compost_output: Option<String>,
    #[serde(default)]
    pub melts: Vec<MeltData>,
    #[serde(default)]
    pub thermal_outputs: Vec<ThermalOutputData>,
    #[serde(default)]
    pub filters: Vec<FilterData>,
    #[serde(default)]
    pub tools: Vec<ToolData>,
    #[serde(default)]
    pub matching: MatchingData,
}

// ===========================================================================
// Materials
// ===========================================================================

/// A material definition. Kind defaults to solid.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialData {
    pub name: String,
    #[serde(default)]
    pub kind: MaterialKindData,
    #[serde(default)]
    pub scalding: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKindData {
    #[default]
    Solid,
    Fluid,
}

// ===========================================================================
// Recipes
// ===========================================================================

/// Filter quality tier, lowest to highest.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterClassData {
    Twine,
    Flint,
    Iron,
    Diamond,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalVariantData {
    Low,
    High,
}

/// How separation entries are matched against a filter class.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingData {
    #[default]
    Exact,
    Cascade,
}

/// One separation entry: working `source` through a `class` filter may
/// yield `output` with the given probability.
#[derive(Debug, Clone, Deserialize)]
pub struct SeparationData {
    pub source: String,
    pub class: FilterClassData,
    pub output: String,
    pub probability: f64,
}

/// Compost value of one unit of a material.
#[derive(Debug, Clone, Deserialize)]
pub struct CompostData {
    pub material: String,
    pub value: u32,
}

/// Melt value of one unit of a material in the given thermal variant.
#[derive(Debug, Clone, Deserialize)]
pub struct MeltData {
    pub material: String,
    pub variant: ThermalVariantData,
    pub value: u32,
}

/// The fluid a thermal variant produces.
#[derive(Debug, Clone, Deserialize)]
pub struct ThermalOutputData {
    pub variant: ThermalVariantData,
    pub fluid: String,
}

/// A material usable as a separator filter medium, and its class.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterData {
    pub material: String,
    pub class: FilterClassData,
}

// ===========================================================================
// Tools
// ===========================================================================

/// A tool definition composed from capabilities.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolData {
    pub name: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub crush: Vec<CrushData>,
    #[serde(default)]
    pub bonus: Vec<BonusData>,
}

fn default_speed() -> f64 {
    1.0
}

/// One crush conversion step.
#[derive(Debug, Clone, Deserialize)]
pub struct CrushData {
    pub from: String,
    pub to: String,
}

/// A bonus-drop chance when harvesting a material with this tool.
#[derive(Debug, Clone, Deserialize)]
pub struct BonusData {
    pub material: String,
    pub chance: f64,
}
