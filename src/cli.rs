use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use loam_world::GeneratorKind;

#[derive(Parser, Debug)]
#[command(name = "loam", version, about = "Headless voxel terrain engine")]
pub struct Cli {
    /// Engine config (TOML). Defaults are used when omitted.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[arg(long, global = true)]
    pub generator: Option<GeneratorKind>,

    #[arg(long, global = true, default_value = "info")]
    pub log_level: LevelFilter,

    /// Also write the log to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream chunks around a moving observer.
    Stream(StreamArgs),
    /// Print the terrain height of a column.
    Height { x: i32, z: i32 },
    /// Cast a ray into the generated world.
    Raycast(RaycastArgs),
    /// Print the effective config as TOML.
    PrintConfig,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub x: f32,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub z: f32,
    /// Observer velocity along x, blocks per tick.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub dx: f32,
    /// Observer velocity along z, blocks per tick.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub dz: f32,
    #[arg(long, default_value_t = 200)]
    pub ticks: u32,
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,
    #[arg(long)]
    pub view_distance: Option<i32>,
    /// Generate on the calling thread instead of the worker.
    #[arg(long)]
    pub sync: bool,
    /// Reload the config file when it changes.
    #[arg(long)]
    pub watch: bool,
}

#[derive(Args, Debug)]
pub struct RaycastArgs {
    /// Origin as x,y,z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [0.5, 120.5, 0.5])]
    pub origin: Vec<f32>,
    /// Direction as x,y,z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [0.0, -1.0, 0.0])]
    pub dir: Vec<f32>,
    #[arg(long, default_value_t = 128.0)]
    pub max: f32,
}
