use loam_blocks::VoxelType;

use crate::worldgen::Surface;

/// Layering of a column whose surface voxel sits at `height`. Caves are
/// carved separately.
pub(super) fn select_surface_voxel(params: &Surface, y: i32, height: i32) -> VoxelType {
    if y == 0 {
        VoxelType::Bedrock
    } else if y > height {
        VoxelType::Air
    } else if y == height {
        if height > params.grass_above {
            VoxelType::Grass
        } else if height > params.sand_above {
            VoxelType::Sand
        } else {
            VoxelType::Stone
        }
    } else if y >= height - params.topsoil_thickness {
        if height > params.sand_above {
            VoxelType::Dirt
        } else {
            VoxelType::Stone
        }
    } else {
        VoxelType::Stone
    }
}

/// True for voxels below the topsoil band that caves may remove.
#[inline]
pub(super) fn is_deep(params: &Surface, y: i32, height: i32) -> bool {
    y > 0 && y < height - params.topsoil_thickness
}
