//! Tool capability descriptors.
//!
//! A tool is a bag of data-driven capabilities selected by composition:
//! which materials it crushes into what, which materials it can shake a
//! bonus drop out of, and how fast it works. There is no tool hierarchy;
//! a catalog entry just composes the capabilities it wants.

use crate::fixed::{Fixed32, Fixed64};
use crate::id::MaterialId;
use crate::rng::SimRng;
use std::collections::HashMap;

/// One tool's capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    name: String,
    speed_multiplier: Fixed32,
    crush: HashMap<MaterialId, MaterialId>,
    bonus: HashMap<MaterialId, Fixed64>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, speed_multiplier: Fixed32) -> Self {
        Self {
            name: name.into(),
            speed_multiplier,
            crush: HashMap::new(),
            bonus: HashMap::new(),
        }
    }

    /// Add a crush conversion, e.g. cobblestone into gravel.
    pub fn with_crush(mut self, from: MaterialId, to: MaterialId) -> Self {
        self.crush.insert(from, to);
        self
    }

    /// Add a bonus-drop chance when harvesting the given material.
    pub fn with_bonus(mut self, material: MaterialId, chance: Fixed64) -> Self {
        self.bonus.insert(material, chance);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn speed_multiplier(&self) -> Fixed32 {
        self.speed_multiplier
    }

    /// What this tool crushes the material into, if anything.
    pub fn crushes(&self, material: MaterialId) -> Option<MaterialId> {
        self.crush.get(&material).copied()
    }

    /// Bonus-drop probability for the material; zero when the tool has no
    /// bonus entry for it.
    pub fn bonus_drop_chance(&self, material: MaterialId) -> Fixed64 {
        self.bonus.get(&material).copied().unwrap_or(Fixed64::ZERO)
    }

    /// Roll the bonus drop. Consumes one rng draw only when the tool has a
    /// bonus entry for the material.
    pub fn roll_bonus(&self, material: MaterialId, rng: &mut SimRng) -> bool {
        match self.bonus.get(&material) {
            Some(&chance) => rng.chance(chance),
            None => false,
        }
    }
}
