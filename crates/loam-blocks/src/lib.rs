//! Voxel type table and the per-voxel value stored in chunks.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Block material tag. Discriminants are part of the stored encoding; append only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VoxelType {
    #[default]
    Air = 0,
    Stone = 1,
    Dirt = 2,
    Grass = 3,
    Sand = 4,
    Water = 5,
    Wood = 6,
    Leaves = 7,
    Bedrock = 8,
    Snow = 9,
    Ice = 10,
    Cobblestone = 11,
    Planks = 12,
    Glass = 13,
    CoalOre = 14,
    IronOre = 15,
}

impl VoxelType {
    pub const COUNT: usize = 16;

    pub const ALL: [VoxelType; Self::COUNT] = [
        VoxelType::Air,
        VoxelType::Stone,
        VoxelType::Dirt,
        VoxelType::Grass,
        VoxelType::Sand,
        VoxelType::Water,
        VoxelType::Wood,
        VoxelType::Leaves,
        VoxelType::Bedrock,
        VoxelType::Snow,
        VoxelType::Ice,
        VoxelType::Cobblestone,
        VoxelType::Planks,
        VoxelType::Glass,
        VoxelType::CoalOre,
        VoxelType::IronOre,
    ];

    #[inline]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            VoxelType::Air => "air",
            VoxelType::Stone => "stone",
            VoxelType::Dirt => "dirt",
            VoxelType::Grass => "grass",
            VoxelType::Sand => "sand",
            VoxelType::Water => "water",
            VoxelType::Wood => "wood",
            VoxelType::Leaves => "leaves",
            VoxelType::Bedrock => "bedrock",
            VoxelType::Snow => "snow",
            VoxelType::Ice => "ice",
            VoxelType::Cobblestone => "cobblestone",
            VoxelType::Planks => "planks",
            VoxelType::Glass => "glass",
            VoxelType::CoalOre => "coal_ore",
            VoxelType::IronOre => "iron_ore",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Anything but air occupies its cell.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != VoxelType::Air
    }

    #[inline]
    pub fn is_liquid(self) -> bool {
        self == VoxelType::Water
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        !matches!(self, VoxelType::Air | VoxelType::Water | VoxelType::Glass)
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(self, VoxelType::Water | VoxelType::Glass | VoxelType::Ice)
    }

    /// Stops rays and moving bodies: solid and not liquid.
    #[inline]
    pub fn blocks_movement(self) -> bool {
        self.is_solid() && !self.is_liquid()
    }

    #[inline]
    pub fn is_indestructible(self) -> bool {
        self == VoxelType::Bedrock
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voxel {
    pub ty: VoxelType,
    /// Light level, 0..=15.
    #[serde(default)]
    pub light: u8,
}

impl Voxel {
    pub const AIR: Voxel = Voxel {
        ty: VoxelType::Air,
        light: 0,
    };
    pub const MAX_LIGHT: u8 = 15;

    #[inline]
    pub const fn new(ty: VoxelType) -> Self {
        Self { ty, light: 0 }
    }

    #[inline]
    pub fn with_light(self, light: u8) -> Self {
        Self {
            light: light.min(Self::MAX_LIGHT),
            ..self
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.ty == VoxelType::Air
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        self.ty.is_solid()
    }

    #[inline]
    pub fn is_liquid(self) -> bool {
        self.ty.is_liquid()
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.ty.is_opaque()
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.ty.is_transparent()
    }

    #[inline]
    pub fn blocks_movement(self) -> bool {
        self.ty.blocks_movement()
    }

    /// Stable 16-bit encoding: type id in the low byte, light in the high byte.
    #[inline]
    pub fn to_raw(self) -> u16 {
        u16::from(self.ty.id()) | (u16::from(self.light) << 8)
    }

    /// Inverse of [`Voxel::to_raw`]. Unknown type ids decode to `None`.
    #[inline]
    pub fn from_raw(raw: u16) -> Option<Self> {
        let ty = VoxelType::from_id((raw & 0xFF) as u8)?;
        let light = (raw >> 8) as u8;
        if light > Self::MAX_LIGHT {
            return None;
        }
        Some(Self { ty, light })
    }
}

impl From<VoxelType> for Voxel {
    fn from(ty: VoxelType) -> Self {
        Voxel::new(ty)
    }
}
