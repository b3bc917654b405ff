use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a placed station in the driver.
    pub struct StationId;
}

/// Identifies a material (solid or fluid) in the registry. Cheap to copy
/// and compare; materials are immutable values compared by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Grid location of a placed station. The core never interprets coordinates;
/// they are an opaque handle for the host's heat query and drop emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_id_identity() {
        assert_eq!(MaterialId(3), MaterialId(3));
        assert_ne!(MaterialId(3), MaterialId(4));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(MaterialId(0), "dirt");
        map.insert(MaterialId(1), "gravel");
        assert_eq!(map[&MaterialId(1)], "gravel");
    }

    #[test]
    fn grid_pos_copy_and_compare() {
        let a = GridPos::new(1, 2, 3);
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, GridPos::new(1, 2, 4));
    }
}
