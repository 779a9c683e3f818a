//! Dense voxel occupancy grid

/// One voxel model: a dense 3D grid of 8-bit occupancy values.
///
/// Value 0 is empty/air; any nonzero value is an index into the pack's
/// palette. Layout is x fastest-varying, then y, then z, matching the order
/// the renderer expects when uploading the buffer as a 3D texture.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    x_dim: usize,
    y_dim: usize,
    z_dim: usize,
    data: Vec<u8>,
}

impl VoxelGrid {
    /// Create a zero-filled (all air) grid.
    pub fn new(x_dim: usize, y_dim: usize, z_dim: usize) -> Self {
        Self {
            x_dim,
            y_dim,
            z_dim,
            data: vec![0; x_dim * y_dim * z_dim],
        }
    }

    pub fn x_dim(&self) -> usize {
        self.x_dim
    }

    pub fn y_dim(&self) -> usize {
        self.y_dim
    }

    pub fn z_dim(&self) -> usize {
        self.z_dim
    }

    /// Total voxel count (occupied or not).
    pub fn voxel_count(&self) -> usize {
        self.data.len()
    }

    /// Number of voxels with a nonzero occupancy value.
    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// True when all three dimensions are equal.
    pub fn is_cubic(&self) -> bool {
        self.x_dim == self.y_dim && self.y_dim == self.z_dim
    }

    /// Whether `(x, y, z)` lies inside the grid.
    pub fn in_bounds(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.x_dim && y < self.y_dim && z < self.z_dim
    }

    /// Linear offset of `(x, y, z)`. Caller must check bounds.
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.x_dim * y + self.x_dim * self.y_dim * z
    }

    /// Occupancy value at `(x, y, z)`, or `None` out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        if self.in_bounds(x, y, z) {
            Some(self.data[self.linear_index(x, y, z)])
        } else {
            None
        }
    }

    /// Set the occupancy value at `(x, y, z)`. Caller must check bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u8) {
        let idx = self.linear_index(x, y, z);
        self.data[idx] = value;
    }

    /// Raw occupancy buffer in upload order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_x_fastest() {
        let grid = VoxelGrid::new(4, 3, 2);
        assert_eq!(grid.linear_index(0, 0, 0), 0);
        assert_eq!(grid.linear_index(1, 0, 0), 1);
        assert_eq!(grid.linear_index(0, 1, 0), 4);
        assert_eq!(grid.linear_index(0, 0, 1), 12);
        assert_eq!(grid.linear_index(3, 2, 1), 23);
    }

    #[test]
    fn test_set_get() {
        let mut grid = VoxelGrid::new(2, 2, 2);
        grid.set(1, 0, 1, 42);
        assert_eq!(grid.get(1, 0, 1), Some(42));
        assert_eq!(grid.get(0, 0, 0), Some(0));
        assert_eq!(grid.get(2, 0, 0), None);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.voxel_count(), 8);
    }
}
