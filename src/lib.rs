//! Voxmarch - voxel scene loading and distance-field preprocessing
//!
//! Loads a chunk-container voxel scene (models, palette, scene-slot
//! ordering) and precomputes per-voxel uniform-radius distance fields that a
//! ray-marching renderer uses to skip empty space. Load-only: texture
//! upload, shading and input handling live in the rendering collaborator.

pub mod core;
pub mod scene;
pub mod vox;
pub mod voxel;

pub use crate::core::error::VoxError;
pub use crate::vox::{load, load_file};
pub use crate::voxel::{DistanceFieldBuilder, DistanceVoxel, VoxelGrid, VoxelPack};
