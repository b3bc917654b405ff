//! The material catalog: immutable after build, shared by every station.

use crate::id::MaterialId;
use std::collections::HashMap;

/// Whether a material is discrete solid matter or a pourable fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MaterialKind {
    Solid,
    Fluid,
}

/// A material definition.
#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub name: String,
    pub kind: MaterialKind,
    /// Fluids too hot to draw from a low-heat thermal station.
    pub scalding: bool,
}

/// Builder for constructing an immutable [`MaterialRegistry`].
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct MaterialRegistryBuilder {
    defs: Vec<MaterialDef>,
    name_to_id: HashMap<String, MaterialId>,
}

impl MaterialRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a solid material. Returns its ID.
    pub fn register_solid(&mut self, name: &str) -> MaterialId {
        self.register(name, MaterialKind::Solid, false)
    }

    /// Register a fluid material. Returns its ID.
    pub fn register_fluid(&mut self, name: &str, scalding: bool) -> MaterialId {
        self.register(name, MaterialKind::Fluid, scalding)
    }

    fn register(&mut self, name: &str, kind: MaterialKind, scalding: bool) -> MaterialId {
        let id = MaterialId(self.defs.len() as u32);
        self.defs.push(MaterialDef {
            name: name.to_string(),
            kind,
            scalding,
        });
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    /// Finalize and build the immutable registry.
    pub fn build(self) -> Result<MaterialRegistry, MaterialError> {
        if self.name_to_id.len() != self.defs.len() {
            // A duplicate name overwrote an earlier mapping; find it.
            for (i, def) in self.defs.iter().enumerate() {
                if self.name_to_id[&def.name] != MaterialId(i as u32) {
                    return Err(MaterialError::DuplicateName(def.name.clone()));
                }
            }
        }
        Ok(MaterialRegistry {
            defs: self.defs,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable material registry. Frozen after build; thread-safe to share.
#[derive(Debug)]
pub struct MaterialRegistry {
    defs: Vec<MaterialDef>,
    name_to_id: HashMap<String, MaterialId>,
}

impl MaterialRegistry {
    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    pub fn name(&self, id: MaterialId) -> Option<&str> {
        self.get(id).map(|d| d.name.as_str())
    }

    pub fn is_fluid(&self, id: MaterialId) -> bool {
        self.get(id).map(|d| d.kind == MaterialKind::Fluid).unwrap_or(false)
    }

    pub fn is_scalding(&self, id: MaterialId) -> bool {
        self.get(id).map(|d| d.scalding).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("duplicate material name: {0}")]
    DuplicateName(String),
}
