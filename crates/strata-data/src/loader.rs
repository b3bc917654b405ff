//! Resolution pipeline: reads catalog files, resolves name references,
//! builds the material registry, recipe table, and tool set.
//!
//! Provides format detection (RON/JSON/TOML) and deserialization helpers.
//! All cross-references in a data file are by material name; resolution
//! fails loudly on the first dangling reference.

use crate::schema::{
    CatalogData, FilterClassData, MatchingData, MaterialKindData, ThermalVariantData,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use strata_core::fixed::{Fixed32, Fixed64};
use strata_core::id::MaterialId;
use strata_core::material::{MaterialError, MaterialRegistry, MaterialRegistryBuilder};
use strata_core::recipe::{
    FilterClass, FilterMatching, RecipeError, RecipeTable, RecipeTableBuilder, ThermalVariant,
};
use strata_core::tool::ToolSpec;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A material name reference could not be resolved.
    #[error("unresolved material reference '{name}' in {file}")]
    UnresolvedRef { file: PathBuf, name: String },

    /// A probability was outside (0, 1].
    #[error("probability {value} out of range (0, 1] for '{name}' in {file}")]
    InvalidProbability {
        file: PathBuf,
        name: String,
        value: f64,
    },

    /// The material set itself was malformed.
    #[error("invalid materials in {file}: {source}")]
    Material {
        file: PathBuf,
        source: MaterialError,
    },

    /// The resolved recipe table failed validation.
    #[error("invalid recipes in {file}: {source}")]
    Recipe { file: PathBuf, source: RecipeError },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(content).map_err(|e| DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => toml::from_str(content).map_err(|e| DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

// ===========================================================================
// Schema -> core conversions
// ===========================================================================

impl From<FilterClassData> for FilterClass {
    fn from(value: FilterClassData) -> Self {
        match value {
            FilterClassData::Twine => FilterClass::Twine,
            FilterClassData::Flint => FilterClass::Flint,
            FilterClassData::Iron => FilterClass::Iron,
            FilterClassData::Diamond => FilterClass::Diamond,
        }
    }
}

impl From<ThermalVariantData> for ThermalVariant {
    fn from(value: ThermalVariantData) -> Self {
        match value {
            ThermalVariantData::Low => ThermalVariant::Low,
            ThermalVariantData::High => ThermalVariant::High,
        }
    }
}

impl From<MatchingData> for FilterMatching {
    fn from(value: MatchingData) -> Self {
        match value {
            MatchingData::Exact => FilterMatching::Exact,
            MatchingData::Cascade => FilterMatching::Cascade,
        }
    }
}

// ===========================================================================
// Catalog
// ===========================================================================

/// A fully resolved content catalog.
#[derive(Debug)]
pub struct Catalog {
    pub materials: MaterialRegistry,
    pub table: RecipeTable,
    pub tools: Vec<ToolSpec>,
}

impl Catalog {
    /// Find a tool by name.
    pub fn tool(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name() == name)
    }
}

/// Load a catalog from a file, with the format detected from the extension.
pub fn load_catalog(path: &Path) -> Result<Catalog, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let data = deserialize_str(&content, format, path)?;
    resolve(data, path)
}

/// Resolve a catalog from in-memory content.
pub fn catalog_from_str(content: &str, format: Format) -> Result<Catalog, DataLoadError> {
    let file = Path::new("<inline>");
    let data = deserialize_str(content, format, file)?;
    resolve(data, file)
}

fn resolve(data: CatalogData, file: &Path) -> Result<Catalog, DataLoadError> {
    // -- Materials --------------------------------------------------------
    let mut materials = MaterialRegistryBuilder::new();
    for m in &data.materials {
        match m.kind {
            MaterialKindData::Solid => materials.register_solid(&m.name),
            MaterialKindData::Fluid => materials.register_fluid(&m.name, m.scalding),
        };
    }
    let materials = materials.build().map_err(|source| DataLoadError::Material {
        file: file.to_path_buf(),
        source,
    })?;

    let lookup = |name: &str| -> Result<MaterialId, DataLoadError> {
        materials.id(name).ok_or_else(|| DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    };
    let probability = |value: f64, name: &str| -> Result<Fixed64, DataLoadError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Fixed64::from_num(value))
        } else {
            Err(DataLoadError::InvalidProbability {
                file: file.to_path_buf(),
                name: name.to_string(),
                value,
            })
        }
    };

    // -- Recipes ----------------------------------------------------------
    let mut table = RecipeTableBuilder::new();
    table.matching(data.matching.into());
    for s in &data.separations {
        table.register_separation(
            lookup(&s.source)?,
            s.class.into(),
            lookup(&s.output)?,
            probability(s.probability, &s.source)?,
        );
    }
    for c in &data.compost {
        table.register_compost(lookup(&c.material)?, c.value);
    }
    if let Some(output) = &data.compost_output {
        table.compost_output(lookup(output)?);
    }
    for m in &data.melts {
        table.register_melt(lookup(&m.material)?, m.variant.into(), m.value);
    }
    for t in &data.thermal_outputs {
        table.thermal_output(t.variant.into(), lookup(&t.fluid)?);
    }
    for f in &data.filters {
        table.register_filter(lookup(&f.material)?, f.class.into());
    }
    let table = table.build(&materials).map_err(|source| DataLoadError::Recipe {
        file: file.to_path_buf(),
        source,
    })?;

    // -- Tools ------------------------------------------------------------
    let mut tools = Vec::with_capacity(data.tools.len());
    for t in &data.tools {
        let mut spec = ToolSpec::new(&t.name, Fixed32::from_num(t.speed.clamp(0.0, 1024.0)));
        for c in &t.crush {
            spec = spec.with_crush(lookup(&c.from)?, lookup(&c.to)?);
        }
        for b in &t.bonus {
            spec = spec.with_bonus(lookup(&b.material)?, probability(b.chance, &t.name)?);
        }
        tools.push(spec);
    }

    Ok(Catalog {
        materials,
        table,
        tools,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
