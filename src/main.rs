#![forbid(unsafe_code)]

mod cli;
mod config;
mod logging;
mod watch;

use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use loam_chunk::{CHUNK_SIZE, ChunkPos, WorldPos};
use loam_geom::{Ray, Vec3};
use loam_physics::raycast_voxel;
use loam_runtime::ChunkStreamer;
use loam_world::VoxelWorld;

use crate::cli::{Cli, Command, RaycastArgs, StreamArgs};
use crate::config::{EngineConfig, load_or_default};
use crate::watch::ConfigWatcher;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.log_level, cli.log_file.as_deref()) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut cfg = load_or_default(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if let Some(kind) = cli.generator {
        cfg.generator = kind;
    }
    match cli.command {
        Command::Stream(args) => run_stream(&cfg, &args, cli.config.as_deref()),
        Command::Height { x, z } => run_height(&cfg, x, z),
        Command::Raycast(args) => run_raycast(&cfg, &args),
        Command::PrintConfig => {
            print!("{}", cfg.to_toml_string()?);
            Ok(())
        }
    }
}

fn run_stream(
    cfg: &EngineConfig,
    args: &StreamArgs,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let mut world = cfg.build_world();
    let mut stream_cfg = cfg.stream.clone();
    if let Some(vd) = args.view_distance {
        stream_cfg.view_distance = vd;
    }
    let mut streamer = if args.sync {
        ChunkStreamer::synchronous(stream_cfg)
    } else {
        ChunkStreamer::new(stream_cfg)
    };
    let watcher = match (args.watch, config_path) {
        (true, Some(p)) => Some(ConfigWatcher::spawn(p)?),
        (true, None) => {
            log::warn!("--watch needs --config; not watching");
            None
        }
        _ => None,
    };

    log::info!(
        "streaming {} (seed {}) around ({}, {}), view distance {}",
        cfg.generator,
        cfg.seed,
        args.x,
        args.z,
        streamer.view_distance()
    );
    let started = Instant::now();
    let mut observer = Vec3::new(args.x, 64.0, args.z);
    for tick in 0..args.ticks {
        if let Some(w) = &watcher {
            if let Some(new_cfg) = w.process(&mut world) {
                streamer.set_view_distance(args.view_distance.unwrap_or(new_cfg.stream.view_distance));
            }
        }
        streamer.update(&mut world, observer);
        let dirty = world.take_dirty_chunks();
        if !dirty.is_empty() {
            log::debug!("tick {}: {} chunks changed", tick, dirty.len());
        }
        if tick % 50 == 0 {
            let s = streamer.stats();
            log::info!(
                "tick {}: resident {}, queued {}, in flight {}",
                tick,
                world.loaded_chunk_count(),
                s.queued,
                s.in_flight
            );
        }
        observer.x += args.dx;
        observer.z += args.dz;
        if args.tick_ms > 0 {
            thread::sleep(Duration::from_millis(args.tick_ms));
        }
    }
    streamer.shutdown();

    let s = streamer.stats();
    let deferred = world.deferred_stats();
    println!("ticks:      {}", args.ticks);
    println!("elapsed:    {:.2?}", started.elapsed());
    println!("resident:   {}", world.loaded_chunk_count());
    println!("generated:  {}", s.generated);
    println!("published:  {}", s.published);
    println!("cancelled:  {}", s.cancelled);
    println!("discarded:  {}", s.discarded);
    println!("unloaded:   {}", s.unloaded);
    println!(
        "deferred:   {} writes for {} chunks",
        deferred.writes, deferred.chunk_entries
    );
    Ok(())
}

fn run_height(cfg: &EngineConfig, x: i32, z: i32) -> Result<(), Box<dyn Error>> {
    let mut world = cfg.build_world();
    let h = world.height(x, z);
    println!("height({}, {}) = {}", x, z, h);
    let Some((cpos, local)) = WorldPos::new(x, 0, z).to_chunk_local() else {
        return Ok(());
    };
    let chunk = world.load_chunk(cpos);
    match chunk.top_solid(local.x, local.z) {
        Some(y) => println!(
            "top block: {} at y {}",
            chunk.get(local.x, y, local.z).ty.name(),
            y
        ),
        None => println!("top block: none"),
    }
    Ok(())
}

fn triple(v: &[f32], what: &str) -> Result<Vec3, Box<dyn Error>> {
    match v {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("{} needs three components, got {}", what, v.len()).into()),
    }
}

/// Load every chunk a ray of length `max` from `origin` could reach.
fn load_around(world: &mut VoxelWorld, origin: Vec3, max: f32) {
    let center = ChunkPos::from_world_f32(origin.x, origin.z);
    let r = ((max / CHUNK_SIZE as f32).ceil() as i32 + 1).min(16);
    for dx in -r..=r {
        for dz in -r..=r {
            world.load_chunk(center.offset(dx, dz));
        }
    }
    log::debug!("loaded {} chunks for raycast", world.loaded_chunk_count());
}

fn run_raycast(cfg: &EngineConfig, args: &RaycastArgs) -> Result<(), Box<dyn Error>> {
    let origin = triple(&args.origin, "--origin")?;
    let dir = triple(&args.dir, "--dir")?;
    let ray = Ray::try_new(origin, dir).ok_or("ray direction must be non-zero and finite")?;
    let mut world = cfg.build_world();
    load_around(&mut world, origin, args.max);

    let hit = raycast_voxel(&ray, Some(&world), args.max);
    if !hit.hit {
        println!("no hit within {}", args.max);
        return Ok(());
    }
    let b = hit.block;
    let name = world
        .get_voxel(WorldPos::new(b.x, b.y, b.z))
        .map_or("unknown", |v| v.ty.name());
    println!("hit {} at ({}, {}, {})", name, b.x, b.y, b.z);
    println!("distance {:.3}", hit.distance);
    println!(
        "point ({:.3}, {:.3}, {:.3})",
        hit.point.x, hit.point.y, hit.point.z
    );
    println!("normal ({}, {}, {})", hit.normal.x, hit.normal.y, hit.normal.z);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_world::GeneratorKind;

    #[test]
    fn triple_checks_length() {
        assert_eq!(triple(&[1.0, 2.0, 3.0], "v").unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert!(triple(&[1.0, 2.0], "v").is_err());
    }

    #[test]
    fn raycast_over_flat_world_hits_grass() {
        let cfg = EngineConfig {
            generator: GeneratorKind::Flat,
            ..EngineConfig::default()
        };
        let mut world = cfg.build_world();
        let origin = Vec3::new(-7.5, 30.5, 20.5);
        load_around(&mut world, origin, 40.0);
        let ray = Ray::new(origin, Vec3::new(0.0, -1.0, 0.0));
        let hit = raycast_voxel(&ray, Some(&world), 40.0);
        assert!(hit.hit);
        assert_eq!(hit.block.y, cfg.worldgen.flat.thickness);
        assert_eq!(hit.normal.y, 1);
    }
}
