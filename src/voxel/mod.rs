//! Voxel data structures and preprocessing

pub mod distance_field;
pub mod grid;
pub mod pack;

pub use distance_field::{DistanceFieldBuilder, DistanceVoxel};
pub use grid::VoxelGrid;
pub use pack::{PALETTE_SIZE, VoxelPack};
