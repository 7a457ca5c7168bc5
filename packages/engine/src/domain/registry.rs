//! Material Registry - 256-slot id table with flat lookup arrays
//!
//! Built once before the simulation starts and then shared read-only
//! (`Arc<MaterialRegistry>`) by every worker. Hot-path lookups (kind,
//! density, conductivity, flags) are plain indexed arrays.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::domain::materials::{
    MaterialDescriptor, MaterialFamily, MaterialId, MaterialKind, BUILTIN_MATERIALS,
    DEFAULT_CONDUCTIVITY, MAT_BOUNDARY, MAT_EMPTY, SOLID_DENSITY,
};

const SLOTS: usize = 256;

#[derive(Clone)]
pub struct MaterialRegistry {
    slots: Vec<Option<MaterialDescriptor>>,
    kinds: [MaterialKind; SLOTS],
    families: [MaterialFamily; SLOTS],
    densities: [u8; SLOTS],
    conductivities: [f32; SLOTS],
    colors: [u32; SLOTS],
    colors_abgr: [u32; SLOTS],
    dispersions: [u8; SLOTS],
    flow_rates: [f32; SLOTS],
    gas_flags: [bool; SLOTS],
    sleep_flags: [bool; SLOTS],
    name_to_id: HashMap<String, MaterialId>,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl MaterialRegistry {
    /// Registry with no materials at all.
    pub fn empty() -> Self {
        Self {
            slots: vec![None; SLOTS],
            kinds: [MaterialKind::Empty; SLOTS],
            families: [MaterialFamily::Empty; SLOTS],
            densities: [SOLID_DENSITY; SLOTS],
            conductivities: [DEFAULT_CONDUCTIVITY; SLOTS],
            colors: [0; SLOTS],
            colors_abgr: [0; SLOTS],
            dispersions: [0; SLOTS],
            flow_rates: [0.0; SLOTS],
            gas_flags: [false; SLOTS],
            sleep_flags: [false; SLOTS],
            name_to_id: HashMap::new(),
        }
    }

    /// Registry holding every built-in material.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for m in BUILTIN_MATERIALS.iter() {
            registry.register(MaterialDescriptor::from(m));
        }
        registry
    }

    /// Insert `material` at its id. An existing entry is overwritten with a warning.
    pub fn register(&mut self, material: MaterialDescriptor) {
        let idx = material.id as usize;
        if let Some(old) = &self.slots[idx] {
            log::warn!(
                "material id {} already registered as '{}', overwriting with '{}'",
                material.id,
                old.name,
                material.name
            );
            if self.name_to_id.get(&old.name) == Some(&material.id) {
                self.name_to_id.remove(&old.name);
            }
        }

        self.kinds[idx] = material.kind;
        self.families[idx] = material.family();
        self.densities[idx] = material.density;
        self.conductivities[idx] = material.conductivity;
        self.colors[idx] = material.color;
        self.colors_abgr[idx] = to_abgr(material.color);
        self.dispersions[idx] = material.dispersion;
        self.flow_rates[idx] = material.flow_rate;
        self.gas_flags[idx] = material.is_gas;
        self.sleep_flags[idx] = material.can_sleep;
        self.name_to_id.insert(material.name.clone(), material.id);
        self.slots[idx] = Some(material);
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialDescriptor> {
        self.slots[id as usize].as_ref()
    }

    pub fn is_registered(&self, id: MaterialId) -> bool {
        self.slots[id as usize].is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialDescriptor> {
        self.slots.iter().flatten()
    }

    pub fn id_by_name(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    // === Hot-path lookups ===

    #[inline(always)]
    pub fn kind(&self, id: MaterialId) -> MaterialKind {
        self.kinds[id as usize]
    }

    #[inline(always)]
    pub fn family(&self, id: MaterialId) -> MaterialFamily {
        self.families[id as usize]
    }

    #[inline(always)]
    pub fn density(&self, id: MaterialId) -> u8 {
        self.densities[id as usize]
    }

    #[inline(always)]
    pub fn conductivity(&self, id: MaterialId) -> f32 {
        self.conductivities[id as usize]
    }

    #[inline(always)]
    pub fn color(&self, id: MaterialId) -> u32 {
        self.colors[id as usize]
    }

    /// 0xAABBGGRR, ready for little-endian RGBA pixel writes.
    #[inline(always)]
    pub fn color_abgr(&self, id: MaterialId) -> u32 {
        self.colors_abgr[id as usize]
    }

    #[inline(always)]
    pub fn dispersion(&self, id: MaterialId) -> u8 {
        self.dispersions[id as usize]
    }

    #[inline(always)]
    pub fn flow_rate(&self, id: MaterialId) -> f32 {
        self.flow_rates[id as usize]
    }

    #[inline(always)]
    pub fn is_gas(&self, id: MaterialId) -> bool {
        self.gas_flags[id as usize]
    }

    #[inline(always)]
    pub fn can_sleep(&self, id: MaterialId) -> bool {
        self.sleep_flags[id as usize]
    }

    #[inline(always)]
    pub fn is_liquid(&self, id: MaterialId) -> bool {
        self.families[id as usize] == MaterialFamily::Liquid
    }

    /// Fluids are what liquids and sinking powders may displace.
    #[inline(always)]
    pub fn is_fluid(&self, id: MaterialId) -> bool {
        self.is_liquid(id) || self.gas_flags[id as usize]
    }

    /// Powder and liquid cells, the ones a shockwave can throw.
    #[inline(always)]
    pub fn is_movable(&self, id: MaterialId) -> bool {
        matches!(
            self.families[id as usize],
            MaterialFamily::Powder | MaterialFamily::Liquid
        )
    }

    // === Bundles ===

    /// Build a registry from a JSON material bundle.
    ///
    /// Entries start from the built-in constants of their `kind` and override
    /// any field they name. With `includeBuiltins` (default) the built-ins are
    /// registered first, so entries can also replace them.
    pub fn from_bundle_json(json: &str) -> Result<Self, EngineError> {
        let bundle: BundleRoot = serde_json::from_str(json)?;
        Self::from_bundle(bundle)
    }

    fn from_bundle(bundle: BundleRoot) -> Result<Self, EngineError> {
        if bundle.format_version > BUNDLE_FORMAT_VERSION {
            return Err(EngineError::Bundle(format!(
                "unsupported bundle formatVersion {} (max {})",
                bundle.format_version, BUNDLE_FORMAT_VERSION
            )));
        }

        let mut registry = if bundle.include_builtins {
            Self::with_builtins()
        } else {
            Self::empty()
        };
        if !registry.is_registered(MAT_EMPTY) {
            registry.register(MaterialDescriptor::from(&BUILTIN_MATERIALS[0]));
        }

        for entry in bundle.materials.into_iter() {
            let material = entry.into_descriptor()?;
            registry.register(material);
        }

        log::debug!("material bundle loaded: {} materials", registry.len());
        Ok(registry)
    }

    /// Serialized list of registered materials, for UIs and tooling.
    pub fn manifest_json(&self) -> Result<String, EngineError> {
        let manifest = Manifest {
            format_version: BUNDLE_FORMAT_VERSION,
            materials: self.iter().collect(),
        };
        Ok(serde_json::to_string(&manifest)?)
    }
}

fn to_abgr(rgb: u32) -> u32 {
    let r = (rgb >> 16) & 0xFF;
    let g = (rgb >> 8) & 0xFF;
    let b = rgb & 0xFF;
    (0xFF << 24) | (b << 16) | (g << 8) | r
}

const BUNDLE_FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleRoot {
    #[serde(default = "default_format_version")]
    format_version: u32,
    #[serde(default = "default_true")]
    include_builtins: bool,
    #[serde(default)]
    materials: Vec<BundleMaterial>,
}

fn default_format_version() -> u32 {
    BUNDLE_FORMAT_VERSION
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BundleMaterial {
    id: u16,
    name: String,
    kind: MaterialKind,
    color: Option<u32>,
    density: Option<u8>,
    conductivity: Option<f32>,
    dispersion: Option<u8>,
    flow_rate: Option<f32>,
    is_gas: Option<bool>,
    can_sleep: Option<bool>,
}

impl BundleMaterial {
    fn into_descriptor(self) -> Result<MaterialDescriptor, EngineError> {
        if self.id >= MAT_BOUNDARY as u16 {
            return Err(EngineError::Bundle(format!(
                "material '{}' uses reserved or out-of-range id {}",
                self.name, self.id
            )));
        }
        let id = self.id as MaterialId;
        if id == MAT_EMPTY && self.kind != MaterialKind::Empty {
            return Err(EngineError::Bundle(format!(
                "id 0 is reserved for empty, got kind {:?}",
                self.kind
            )));
        }
        if self.name.trim().is_empty() {
            return Err(EngineError::Bundle(format!("material id {} has an empty name", id)));
        }
        if let Some(k) = self.conductivity {
            if !(0.0..=1.0).contains(&k) {
                return Err(EngineError::Bundle(format!(
                    "material '{}' conductivity {} outside [0, 1]",
                    self.name, k
                )));
            }
        }
        if let Some(f) = self.flow_rate {
            if !(0.0..=1.0).contains(&f) {
                return Err(EngineError::Bundle(format!(
                    "material '{}' flowRate {} outside [0, 1]",
                    self.name, f
                )));
            }
        }

        let mut m = MaterialDescriptor::from_kind(id, self.name, self.kind);
        if let Some(v) = self.color {
            m.color = v & 0x00FF_FFFF;
        }
        if let Some(v) = self.density {
            m.density = v;
        }
        if let Some(v) = self.conductivity {
            m.conductivity = v;
        }
        if let Some(v) = self.dispersion {
            m.dispersion = v;
        }
        if let Some(v) = self.flow_rate {
            m.flow_rate = v;
        }
        if let Some(v) = self.is_gas {
            m.is_gas = v;
        }
        if let Some(v) = self.can_sleep {
            m.can_sleep = v;
        }
        Ok(m)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    format_version: u32,
    materials: Vec<&'a MaterialDescriptor>,
}
