//! Material Definitions - ids, behavior kinds and built-in constants
//!
//! A material is plain data (`MaterialDescriptor`) plus a closed
//! `MaterialKind` that selects its update rule. Several ids may share a kind
//! (a bundle can add "red sand" with kind `sand` and its own color/density).

use serde::{Deserialize, Serialize};

/// Material id stored in every cell.
pub type MaterialId = u8;

pub const MAT_EMPTY: MaterialId = 0;
pub const MAT_STONE: MaterialId = 1;
pub const MAT_SAND: MaterialId = 2;
pub const MAT_WATER: MaterialId = 3;
pub const MAT_WOOD: MaterialId = 5;
pub const MAT_STEAM: MaterialId = 7;
pub const MAT_ACID: MaterialId = 8;
pub const MAT_OIL: MaterialId = 9;
pub const MAT_FIRE: MaterialId = 10;
pub const MAT_GUNPOWDER: MaterialId = 11;
pub const MAT_SMOKE: MaterialId = 12;
pub const MAT_EMBER: MaterialId = 13;
pub const MAT_LAVA: MaterialId = 14;
pub const MAT_ICE: MaterialId = 15;
pub const MAT_GAS: MaterialId = 17;
pub const MAT_BLACK_HOLE: MaterialId = 18;
pub const MAT_HOT_SMOKE: MaterialId = 19;
pub const MAT_SLIME: MaterialId = 20;
pub const MAT_C4: MaterialId = 21;
pub const MAT_MAGMA_ROCK: MaterialId = 22;
pub const MAT_CRYO: MaterialId = 23;
pub const MAT_COAL: MaterialId = 24;
pub const MAT_FIREWORK: MaterialId = 25;
pub const MAT_MERCURY: MaterialId = 26;
pub const MAT_GLASS: MaterialId = 27;
pub const MAT_DUST: MaterialId = 28;
pub const MAT_PLASMA: MaterialId = 29;
/// Out-of-bounds sentinel. Never registered, never stored by rules.
pub const MAT_BOUNDARY: MaterialId = 255;

/// Density of anything that must never be displaced.
pub const SOLID_DENSITY: u8 = 255;

/// Default heat conductivity for materials that do not set one.
pub const DEFAULT_CONDUCTIVITY: f32 = 0.2;

/// Update rule selector. One variant per rule, dispatched by a single match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    #[default]
    Empty,
    Stone,
    Sand,
    Water,
    Wood,
    Steam,
    Acid,
    Oil,
    Fire,
    Gunpowder,
    Smoke,
    Ember,
    Lava,
    Ice,
    Gas,
    BlackHole,
    HotSmoke,
    Slime,
    C4,
    MagmaRock,
    Cryo,
    Coal,
    Firework,
    Mercury,
    Glass,
    Dust,
    Plasma,
}

/// Coarse grouping used by displacement and off-grid collision rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    #[default]
    Empty,
    Solid,
    Powder,
    Liquid,
    Gas,
    Energetic,
    Special,
}

impl MaterialKind {
    pub fn family(self) -> MaterialFamily {
        use MaterialKind::*;
        match self {
            Empty => MaterialFamily::Empty,
            Stone | Wood | Ice | Glass | MagmaRock | C4 => MaterialFamily::Solid,
            Sand | Coal | Gunpowder => MaterialFamily::Powder,
            Water | Oil | Acid | Lava | Slime | Mercury => MaterialFamily::Liquid,
            Steam | Smoke | HotSmoke | Gas | Cryo | Dust | Plasma => MaterialFamily::Gas,
            Fire | Ember | Firework => MaterialFamily::Energetic,
            BlackHole => MaterialFamily::Special,
        }
    }
}

/// Registry entry. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDescriptor {
    pub id: MaterialId,
    pub name: String,
    pub kind: MaterialKind,
    /// 0xRRGGBB
    pub color: u32,
    /// Displacement order; solids use `SOLID_DENSITY`.
    pub density: u8,
    /// Heat conductivity in `[0, 1]`.
    pub conductivity: f32,
    /// Max sideways scan distance for liquids.
    pub dispersion: u8,
    /// Horizontal flow probability for liquids in `[0, 1]`.
    pub flow_rate: f32,
    pub is_gas: bool,
    pub can_sleep: bool,
}

impl MaterialDescriptor {
    #[inline]
    pub fn family(&self) -> MaterialFamily {
        self.kind.family()
    }

    /// Defaults of the built-in material with this kind, reassigned to `id`/`name`.
    pub fn from_kind(id: MaterialId, name: impl Into<String>, kind: MaterialKind) -> Self {
        let base = BUILTIN_MATERIALS
            .iter()
            .find(|m| m.kind == kind)
            .map(MaterialDescriptor::from)
            .unwrap_or_else(|| MaterialDescriptor::from(&BUILTIN_MATERIALS[0]));
        Self {
            id,
            name: name.into(),
            ..base
        }
    }
}

/// Const form of a descriptor for the built-in table.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinMaterial {
    pub id: MaterialId,
    pub name: &'static str,
    pub kind: MaterialKind,
    pub color: u32,
    pub density: u8,
    pub conductivity: f32,
    pub dispersion: u8,
    pub flow_rate: f32,
    pub is_gas: bool,
    pub can_sleep: bool,
}

impl From<&BuiltinMaterial> for MaterialDescriptor {
    fn from(b: &BuiltinMaterial) -> Self {
        Self {
            id: b.id,
            name: b.name.to_string(),
            kind: b.kind,
            color: b.color,
            density: b.density,
            conductivity: b.conductivity,
            dispersion: b.dispersion,
            flow_rate: b.flow_rate,
            is_gas: b.is_gas,
            can_sleep: b.can_sleep,
        }
    }
}

const fn solid(id: MaterialId, name: &'static str, kind: MaterialKind, color: u32) -> BuiltinMaterial {
    BuiltinMaterial {
        id,
        name,
        kind,
        color,
        density: SOLID_DENSITY,
        conductivity: DEFAULT_CONDUCTIVITY,
        dispersion: 0,
        flow_rate: 0.0,
        is_gas: false,
        can_sleep: false,
    }
}

const fn powder(id: MaterialId, name: &'static str, kind: MaterialKind, color: u32, density: u8) -> BuiltinMaterial {
    BuiltinMaterial {
        density,
        can_sleep: true,
        ..solid(id, name, kind, color)
    }
}

const fn liquid(
    id: MaterialId,
    name: &'static str,
    kind: MaterialKind,
    color: u32,
    density: u8,
    dispersion: u8,
    flow_rate: f32,
) -> BuiltinMaterial {
    BuiltinMaterial {
        density,
        dispersion,
        flow_rate,
        ..solid(id, name, kind, color)
    }
}

const fn gas(id: MaterialId, name: &'static str, kind: MaterialKind, color: u32, density: u8) -> BuiltinMaterial {
    BuiltinMaterial {
        density,
        is_gas: true,
        ..solid(id, name, kind, color)
    }
}

const fn sleeps(mut m: BuiltinMaterial) -> BuiltinMaterial {
    m.can_sleep = true;
    m
}

const fn conducts(mut m: BuiltinMaterial, conductivity: f32) -> BuiltinMaterial {
    m.conductivity = conductivity;
    m
}

pub const BUILTIN_MATERIALS: [BuiltinMaterial; 27] = [
    BuiltinMaterial { density: 0, ..solid(MAT_EMPTY, "Empty", MaterialKind::Empty, 0x000000) },
    sleeps(solid(MAT_STONE, "Stone", MaterialKind::Stone, 0x5C5C6E)),
    powder(MAT_SAND, "Sand", MaterialKind::Sand, 0xD4A574, 40),
    liquid(MAT_WATER, "Water", MaterialKind::Water, 0x2266CC, 10, 8, 1.0),
    solid(MAT_WOOD, "Wood", MaterialKind::Wood, 0x654321),
    gas(MAT_STEAM, "Steam", MaterialKind::Steam, 0xE0F0FF, 1),
    liquid(MAT_ACID, "Acid", MaterialKind::Acid, 0x33FF66, 15, 5, 1.0),
    liquid(MAT_OIL, "Oil", MaterialKind::Oil, 0x1A0A00, 5, 6, 1.0),
    gas(MAT_FIRE, "Fire", MaterialKind::Fire, 0xFF4400, 1),
    powder(MAT_GUNPOWDER, "Gunpowder", MaterialKind::Gunpowder, 0x444444, 35),
    gas(MAT_SMOKE, "Smoke", MaterialKind::Smoke, 0x222222, 1),
    solid(MAT_EMBER, "Ember", MaterialKind::Ember, 0xFF5500),
    conducts(liquid(MAT_LAVA, "Lava", MaterialKind::Lava, 0xFF4411, 20, 3, 0.15), 0.6),
    conducts(sleeps(solid(MAT_ICE, "Ice", MaterialKind::Ice, 0x88CCEE)), 0.4),
    gas(MAT_GAS, "Gas", MaterialKind::Gas, 0xFFEE66, 2),
    solid(MAT_BLACK_HOLE, "BlackHole", MaterialKind::BlackHole, 0x220044),
    gas(MAT_HOT_SMOKE, "HotSmoke", MaterialKind::HotSmoke, 0x553311, 1),
    liquid(MAT_SLIME, "Slime", MaterialKind::Slime, 0x7FCC33, 12, 2, 0.3),
    sleeps(solid(MAT_C4, "C4", MaterialKind::C4, 0xCCCC99)),
    conducts(sleeps(BuiltinMaterial { density: 30, ..solid(MAT_MAGMA_ROCK, "MagmaRock", MaterialKind::MagmaRock, 0x442222) }), 0.3),
    conducts(gas(MAT_CRYO, "Cryo", MaterialKind::Cryo, 0x88FFFF, 2), 0.7),
    conducts(powder(MAT_COAL, "Coal", MaterialKind::Coal, 0x222222, 30), 0.15),
    solid(MAT_FIREWORK, "Firework", MaterialKind::Firework, 0xFF00FF),
    conducts(liquid(MAT_MERCURY, "Mercury", MaterialKind::Mercury, 0xB8B8C8, 60, 4, 0.8), 0.9),
    conducts(sleeps(solid(MAT_GLASS, "Glass", MaterialKind::Glass, 0xCCEEFF)), 0.1),
    gas(MAT_DUST, "Dust", MaterialKind::Dust, 0xBBAA88, 3),
    conducts(gas(MAT_PLASMA, "Plasma", MaterialKind::Plasma, 0xFF66FF, 1), 0.8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique_and_not_boundary() {
        let mut seen = [false; 256];
        for m in BUILTIN_MATERIALS.iter() {
            assert!(!seen[m.id as usize], "duplicate id {}", m.id);
            assert_ne!(m.id, MAT_BOUNDARY);
            seen[m.id as usize] = true;
        }
    }

    #[test]
    fn every_kind_has_one_builtin() {
        for m in BUILTIN_MATERIALS.iter() {
            let count = BUILTIN_MATERIALS.iter().filter(|o| o.kind == m.kind).count();
            assert_eq!(count, 1, "{:?}", m.kind);
        }
    }

    #[test]
    fn sleep_capable_set() {
        let sleepers: Vec<MaterialId> = BUILTIN_MATERIALS
            .iter()
            .filter(|m| m.can_sleep)
            .map(|m| m.id)
            .collect();
        for id in [MAT_STONE, MAT_SAND, MAT_GLASS, MAT_ICE, MAT_MAGMA_ROCK, MAT_COAL, MAT_GUNPOWDER, MAT_C4] {
            assert!(sleepers.contains(&id), "{}", id);
        }
        assert!(!sleepers.contains(&MAT_WOOD));
        assert!(!sleepers.contains(&MAT_WATER));
    }

    #[test]
    fn liquid_densities_order_oil_water_acid_lava_mercury() {
        let d = |id| BUILTIN_MATERIALS.iter().find(|m| m.id == id).map(|m| m.density);
        assert!(d(MAT_OIL) < d(MAT_WATER));
        assert!(d(MAT_WATER) < d(MAT_ACID));
        assert!(d(MAT_ACID) < d(MAT_LAVA));
        assert!(d(MAT_LAVA) < d(MAT_MERCURY));
    }

    #[test]
    fn from_kind_copies_constants() {
        let red_sand = MaterialDescriptor::from_kind(40, "Red Sand", MaterialKind::Sand);
        assert_eq!(red_sand.id, 40);
        assert_eq!(red_sand.density, 40);
        assert_eq!(red_sand.family(), MaterialFamily::Powder);
        assert!(red_sand.can_sleep);
    }
}
