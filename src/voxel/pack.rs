//! Loaded scene: voxel models, palette, and resolved model ordering

use super::grid::VoxelGrid;

/// Palette length in floats: 256 RGBA entries.
pub const PALETTE_SIZE: usize = 256 * 4;

/// Convert one 8-bit encoded palette channel to linear space.
///
/// Kept as a standalone pure function so the gamma curve is testable on its
/// own and applied identically everywhere.
#[inline]
pub fn srgb_byte_to_linear(byte: u8) -> f32 {
    (byte as f32 / 256.0).powf(2.2)
}

/// Everything loaded from one scene file.
///
/// Owns all voxel grids and the shared palette. `ordered_models` maps a
/// scene slot (parsed from transform-node names) to an index into `models`;
/// slots are `Option` because gaps are legal and model index 0 is a
/// legitimate value, so a zero sentinel would be ambiguous.
pub struct VoxelPack {
    pub models: Vec<VoxelGrid>,
    /// 256 RGBA entries in linear space. Entry 0 is reserved air, always zero.
    pub palette: Box<[f32; PALETTE_SIZE]>,
    pub ordered_models: Vec<Option<usize>>,
}

impl VoxelPack {
    /// Empty pack with a zeroed palette.
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            palette: Box::new([0.0; PALETTE_SIZE]),
            ordered_models: Vec::new(),
        }
    }

    /// Model occupying `slot`, if a transform node resolved one there.
    pub fn model_for_slot(&self, slot: usize) -> Option<&VoxelGrid> {
        let index = (*self.ordered_models.get(slot)?)?;
        self.models.get(index)
    }

    /// RGBA palette entry for an occupancy value.
    pub fn palette_entry(&self, index: u8) -> [f32; 4] {
        let base = index as usize * 4;
        [
            self.palette[base],
            self.palette[base + 1],
            self.palette[base + 2],
            self.palette[base + 3],
        ]
    }
}

impl Default for VoxelPack {
    fn default() -> Self {
        Self::new()
    }
}
