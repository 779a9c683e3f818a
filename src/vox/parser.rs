//! Recursive parser for the chunk-container scene format
//!
//! The file is a magic tag, a version integer, and a tree of chunks. Every
//! chunk declares its own content length and the total length of its
//! children, so each recursive call carries explicit `content_end` /
//! `subtree_end` bounds and seeks to them regardless of how much a decoder
//! actually consumed. That keeps trailing sibling chunks reachable even when
//! a decoder under-reads fields it does not understand.
//!
//! Format references:
//! https://github.com/ephtracy/voxel-model/blob/master/MagicaVoxel-file-format-vox.txt
//! https://github.com/ephtracy/voxel-model/blob/master/MagicaVoxel-file-format-vox-extension.txt

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use super::cursor::ByteCursor;
use crate::core::error::VoxError;
use crate::scene::resolver::{SceneGraphResolver, TransformRecord};
use crate::voxel::grid::VoxelGrid;
use crate::voxel::pack::{PALETTE_SIZE, VoxelPack, srgb_byte_to_linear};

/// 4-byte file magic.
pub const MAGIC: [u8; 4] = *b"VOX ";

/// Container version this loader was written against. Other versions load
/// with a warning rather than failing; real-world files are routinely
/// written by newer tools with unchanged chunk layouts.
pub const EXPECTED_VERSION: i32 = 150;

/// Parse a complete scene file from memory.
pub fn load(bytes: &[u8]) -> Result<VoxelPack, VoxError> {
    VoxLoader::new(bytes).load()
}

/// Read and parse a scene file from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<VoxelPack, VoxError> {
    let path = path.as_ref();
    info!("loading voxel scene from {}", path.display());
    let bytes = std::fs::read(path)?;
    load(&bytes)
}

struct VoxLoader<'a> {
    cursor: ByteCursor<'a>,
    pack: VoxelPack,
    resolver: SceneGraphResolver,
}

impl<'a> VoxLoader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(bytes),
            pack: VoxelPack::new(),
            resolver: SceneGraphResolver::new(),
        }
    }

    fn load(mut self) -> Result<VoxelPack, VoxError> {
        let magic = self.cursor.read_bytes(4)?;
        if magic != MAGIC {
            return Err(VoxError::InvalidMagic {
                found: [magic[0], magic[1], magic[2], magic[3]],
            });
        }

        let version = self.cursor.read_i32()?;
        if version != EXPECTED_VERSION {
            warn!(
                "container version {} (expected {}), loading anyway",
                version, EXPECTED_VERSION
            );
        } else {
            debug!("container version {}", version);
        }

        // Top-level siblings (normally a single MAIN chunk holding the tree)
        while !self.cursor.is_empty() {
            self.parse_chunk()?;
        }

        self.pack.ordered_models = self.resolver.resolve(self.pack.models.len());

        let resolved = self
            .pack
            .ordered_models
            .iter()
            .filter(|slot| slot.is_some())
            .count();
        info!(
            "loaded {} model(s), {} resolved scene slot(s)",
            self.pack.models.len(),
            resolved
        );

        Ok(self.pack)
    }

    fn parse_chunk(&mut self) -> Result<(), VoxError> {
        let id: [u8; 4] = self
            .cursor
            .read_bytes(4)?
            .try_into()
            .unwrap_or([0, 0, 0, 0]);
        let content_bytes = self.cursor.read_i32()?;
        let child_bytes = self.cursor.read_i32()?;
        if content_bytes < 0 || child_bytes < 0 {
            return Err(VoxError::malformed(
                "header",
                format!(
                    "chunk {:?} declares negative extent ({} content, {} children)",
                    String::from_utf8_lossy(&id),
                    content_bytes,
                    child_bytes
                ),
            ));
        }

        let content_end = self.cursor.position() + content_bytes as usize;
        let subtree_end = content_end + child_bytes as usize;
        // Validate the declared extent up front so a truncated tail is always
        // reported as truncation, even for chunks whose content we only skip.
        if subtree_end > self.cursor.len() {
            return Err(VoxError::TruncatedInput {
                offset: self.cursor.position(),
                needed: (content_bytes + child_bytes) as usize,
                remaining: self.cursor.remaining(),
            });
        }

        debug!(
            "chunk {:?}: {} content bytes, {} child bytes",
            String::from_utf8_lossy(&id),
            content_bytes,
            child_bytes
        );

        match &id {
            b"SIZE" => self.read_size()?,
            b"XYZI" => self.read_xyzi()?,
            b"RGBA" => self.read_rgba()?,
            b"nTRN" => self.read_transform_node()?,
            b"nSHP" => self.read_shape_node()?,
            // Materials, layers, cameras and anything newer are not used
            // downstream; their content is skipped below.
            _ => {}
        }

        // Decoders may under-read trailing fields; the declared extent wins.
        self.cursor.seek(content_end)?;
        while self.cursor.position() < subtree_end {
            self.parse_chunk()?;
        }
        self.cursor.seek(subtree_end)?;
        Ok(())
    }

    fn read_size(&mut self) -> Result<(), VoxError> {
        let x_dim = self.cursor.read_i32()?;
        let y_dim = self.cursor.read_i32()?;
        let z_dim = self.cursor.read_i32()?;
        if x_dim <= 0 || y_dim <= 0 || z_dim <= 0 {
            return Err(VoxError::malformed(
                "SIZE",
                format!("non-positive dimensions {}x{}x{}", x_dim, y_dim, z_dim),
            ));
        }
        debug!("model {}: {}x{}x{}", self.pack.models.len(), x_dim, y_dim, z_dim);
        self.pack
            .models
            .push(VoxelGrid::new(x_dim as usize, y_dim as usize, z_dim as usize));
        Ok(())
    }

    fn read_xyzi(&mut self) -> Result<(), VoxError> {
        let num_voxels = self.cursor.read_i32()?;
        if num_voxels < 0 {
            return Err(VoxError::malformed(
                "XYZI",
                format!("negative voxel count {}", num_voxels),
            ));
        }
        let Some(grid) = self.pack.models.last_mut() else {
            return Err(VoxError::malformed("XYZI", "no preceding SIZE chunk"));
        };

        for _ in 0..num_voxels {
            let quad = self.cursor.read_bytes(4)?;
            let (x, y, z, index) = (
                quad[0] as usize,
                quad[1] as usize,
                quad[2] as usize,
                quad[3],
            );
            // Strict policy: an out-of-range coordinate almost always means
            // the cursor has desynced from the chunk layout, so the whole
            // load is abandoned rather than skipping the voxel.
            if !grid.in_bounds(x, y, z) {
                return Err(VoxError::malformed(
                    "XYZI",
                    format!(
                        "voxel ({}, {}, {}) outside {}x{}x{} grid",
                        x,
                        y,
                        z,
                        grid.x_dim(),
                        grid.y_dim(),
                        grid.z_dim()
                    ),
                ));
            }
            grid.set(x, y, z, index);
        }
        debug!("read {} voxels", num_voxels);
        Ok(())
    }

    fn read_rgba(&mut self) -> Result<(), VoxError> {
        // Entries 1..=255 only: entry 0 is reserved air and stays zero.
        let raw = self.cursor.read_bytes(PALETTE_SIZE - 4)?;
        for i in 0..4 {
            self.pack.palette[i] = 0.0;
        }
        for (i, &byte) in raw.iter().enumerate() {
            self.pack.palette[i + 4] = srgb_byte_to_linear(byte);
        }
        debug!("read palette");
        Ok(())
    }

    fn read_transform_node(&mut self) -> Result<(), VoxError> {
        let node_id = self.cursor.read_i32()?;
        let attributes = self.read_dict("nTRN")?;
        let child_id = self.cursor.read_i32()?;
        // Reserved id, layer id and frame dicts follow; the caller's
        // seek-to-content-end skips them.
        let name = attributes.get("_name").cloned().unwrap_or_default();
        self.resolver.record_transform(TransformRecord {
            name,
            id: node_id,
            child: child_id,
        });
        Ok(())
    }

    fn read_shape_node(&mut self) -> Result<(), VoxError> {
        let node_id = self.cursor.read_i32()?;
        let _attributes = self.read_dict("nSHP")?;
        let num_models = self.cursor.read_i32()?;
        if num_models != 1 {
            return Err(VoxError::malformed(
                "nSHP",
                format!("expected exactly 1 model, found {}", num_models),
            ));
        }
        let model_id = self.cursor.read_i32()?;
        self.resolver.record_shape(node_id, model_id);
        Ok(())
    }

    /// String-to-string attribute dictionary: a count, then length-prefixed
    /// key and value pairs. Duplicate keys resolve last-write-wins.
    fn read_dict(&mut self, chunk: &'static str) -> Result<HashMap<String, String>, VoxError> {
        let num_keys = self.cursor.read_i32()?;
        if num_keys < 0 {
            return Err(VoxError::malformed(
                chunk,
                format!("negative dictionary size {}", num_keys),
            ));
        }
        let mut dict = HashMap::new();
        for _ in 0..num_keys {
            let key = self.read_string(chunk)?;
            let value = self.read_string(chunk)?;
            dict.insert(key, value);
        }
        Ok(dict)
    }

    fn read_string(&mut self, chunk: &'static str) -> Result<String, VoxError> {
        let len = self.cursor.read_i32()?;
        if len < 0 {
            return Err(VoxError::malformed(
                chunk,
                format!("negative string length {}", len),
            ));
        }
        self.cursor.read_fixed_string(len as usize)
    }
}
