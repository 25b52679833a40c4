use serde::{Deserialize, Serialize};

/// Horizontal edge length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 16;
/// Chunks span the whole world height.
pub const CHUNK_HEIGHT: usize = 256;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT;

const SIZE_I: i32 = CHUNK_SIZE as i32;

/// Global voxel address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Column address of a chunk. Chunks are not stacked vertically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

/// Voxel address inside one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl WorldPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn chunk(self) -> ChunkPos {
        ChunkPos::from_world(self)
    }

    #[inline]
    pub fn y_in_range(self) -> bool {
        self.y >= 0 && (self.y as usize) < CHUNK_HEIGHT
    }

    /// Floor-division split into chunk and local coordinates. `None` when y
    /// is outside the world column.
    pub fn to_chunk_local(self) -> Option<(ChunkPos, LocalPos)> {
        if !self.y_in_range() {
            return None;
        }
        let local = LocalPos {
            x: self.x.rem_euclid(SIZE_I) as usize,
            y: self.y as usize,
            z: self.z.rem_euclid(SIZE_I) as usize,
        };
        Some((self.chunk(), local))
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl From<(i32, i32, i32)> for WorldPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl ChunkPos {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[inline]
    pub fn from_world(p: WorldPos) -> Self {
        Self {
            x: p.x.div_euclid(SIZE_I),
            z: p.z.div_euclid(SIZE_I),
        }
    }

    /// Chunk containing a continuous world coordinate.
    #[inline]
    pub fn from_world_f32(x: f32, z: f32) -> Self {
        Self::from_world(WorldPos::new(x.floor() as i32, 0, z.floor() as i32))
    }

    /// World position of the chunk's minimum corner at y = 0.
    #[inline]
    pub fn origin(self) -> WorldPos {
        WorldPos::new(self.x * SIZE_I, 0, self.z * SIZE_I)
    }

    #[inline]
    pub fn to_world(self, local: LocalPos) -> WorldPos {
        let o = self.origin();
        WorldPos::new(o.x + local.x as i32, local.y as i32, o.z + local.z as i32)
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Ring index around `other` (max of the axis deltas).
    #[inline]
    pub fn chebyshev(self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    #[inline]
    pub fn distance(self, other: ChunkPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }
}

impl From<(i32, i32)> for ChunkPos {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

impl LocalPos {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn in_bounds(self) -> bool {
        self.x < CHUNK_SIZE && self.y < CHUNK_HEIGHT && self.z < CHUNK_SIZE
    }

    /// True on the outer x or z faces of the chunk.
    #[inline]
    pub fn on_horizontal_border(self) -> bool {
        self.x == 0 || self.z == 0 || self.x == CHUNK_SIZE - 1 || self.z == CHUNK_SIZE - 1
    }
}
