use std::sync::{Mutex, MutexGuard};

use hashbrown::{HashMap, HashSet};
use loam_chunk::ChunkPos;
use loam_geom::Vec3;
use loam_world::VoxelWorld;

use crate::config::{StreamConfig, clamp_view_distance};
use crate::request::{LoadQueue, LoadRequest, RequestState};
use crate::worker::{GenJob, GenResult, GenWorker};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub queued: usize,
    pub in_flight: usize,
    pub generated: u64,
    pub published: u64,
    pub cancelled: u64,
    pub discarded: u64,
    pub unloaded: u64,
}

/// Keeps the chunks around an observer resident.
///
/// Generation runs on one background thread; finished chunks are published
/// into the world only from [`ChunkStreamer::update`], so a chunk becomes
/// visible in one step and the world is never touched off this thread.
pub struct ChunkStreamer {
    config: StreamConfig,
    queue: Mutex<LoadQueue>,
    in_flight: HashMap<ChunkPos, u64>,
    cancelled: HashSet<ChunkPos>,
    unload_list: Vec<ChunkPos>,
    last_center: Option<ChunkPos>,
    worker: Option<GenWorker>,
    stopped: bool,
    stats: StreamStats,
}

impl ChunkStreamer {
    /// Streamer with a background worker. Falls back to synchronous
    /// generation if the thread cannot be spawned.
    pub fn new(config: StreamConfig) -> Self {
        let worker = match GenWorker::spawn() {
            Ok(w) => Some(w),
            Err(e) => {
                log::error!(target: "stream", "failed to spawn generation worker: {}; loading synchronously", e);
                None
            }
        };
        Self::build(config, worker)
    }

    /// Streamer that generates inside `update`, within the per-update budget.
    pub fn synchronous(config: StreamConfig) -> Self {
        Self::build(config, None)
    }

    fn build(mut config: StreamConfig, worker: Option<GenWorker>) -> Self {
        config.view_distance = clamp_view_distance(config.view_distance);
        config.hysteresis = config.hysteresis.max(0);
        config.chunks_per_update = config.chunks_per_update.max(1);
        Self {
            config,
            queue: Mutex::new(LoadQueue::default()),
            in_flight: HashMap::new(),
            cancelled: HashSet::new(),
            unload_list: Vec::new(),
            last_center: None,
            worker,
            stopped: false,
            stats: StreamStats::default(),
        }
    }

    fn lock_queue(&self) -> MutexGuard<'_, LoadQueue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    #[inline]
    pub fn view_distance(&self) -> i32 {
        self.config.view_distance
    }

    /// Clamped to `[1, 32]`. The load set is recomputed on the next update.
    pub fn set_view_distance(&mut self, n: i32) {
        let clamped = clamp_view_distance(n);
        if clamped != self.config.view_distance {
            log::info!(target: "stream", "view distance {} -> {}", self.config.view_distance, clamped);
            self.config.view_distance = clamped;
            self.last_center = None;
        }
    }

    pub fn has_worker(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_running())
    }

    /// One streaming step.
    pub fn update(&mut self, world: &mut VoxelWorld, observer: Vec3) {
        if self.stopped {
            return;
        }
        let center = ChunkPos::from_world_f32(observer.x, observer.z);
        if self.last_center != Some(center) {
            log::debug!(target: "stream", "observer entered chunk ({}, {})", center.x, center.z);
            self.last_center = Some(center);
            self.determine_chunks_to_load(world, center);
            self.determine_chunks_to_unload(world, center);
        }
        self.publish_results(world, center);
        self.process_load_queue(world);
    }

    #[inline]
    fn in_range(&self, pos: ChunkPos, center: ChunkPos) -> bool {
        pos.chebyshev(center) <= self.config.view_distance
    }

    /// Queue every missing chunk within the view distance, nearest ring first,
    /// and cancel queued requests that are now out of range.
    pub fn determine_chunks_to_load(&mut self, world: &VoxelWorld, center: ChunkPos) {
        let vd = self.config.view_distance;
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        let dropped = queue.retain(|r| r.pos.chebyshev(center) <= vd);
        let mut added = 0usize;
        for radius in 0..=vd {
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    if dx.abs().max(dz.abs()) != radius {
                        continue;
                    }
                    let pos = center.offset(dx, dz);
                    if world.is_chunk_loaded(pos) || self.in_flight.contains_key(&pos) {
                        continue;
                    }
                    if queue.push(LoadRequest {
                        pos,
                        priority: radius,
                    }) {
                        self.cancelled.remove(&pos);
                        added += 1;
                    }
                }
            }
        }
        let queued = queue.len();
        drop(queue);
        for pos in &dropped {
            log::trace!(target: "stream", "cancelled ({}, {})", pos.x, pos.z);
        }
        self.stats.cancelled += dropped.len() as u64;
        // Only cancellations near the observer are worth reporting
        let keep = vd + self.config.hysteresis;
        self.cancelled.retain(|p| p.chebyshev(center) <= keep);
        self.cancelled.extend(dropped);
        log::debug!(target: "stream", "queued {} new chunks ({} pending)", added, queued);
    }

    /// Mark resident chunks beyond the view distance plus hysteresis.
    ///
    /// Uses the same Chebyshev metric as the load square, so nothing inside
    /// the view distance is ever marked.
    pub fn determine_chunks_to_unload(&mut self, world: &VoxelWorld, center: ChunkPos) {
        let buffer = if world.loaded_chunk_count() > self.config.max_loaded_chunks {
            1
        } else {
            self.config.hysteresis
        };
        let limit = self.config.view_distance + buffer;
        self.unload_list = world
            .chunk_positions()
            .into_iter()
            .filter(|p| p.chebyshev(center) > limit)
            .collect();
    }

    fn publish_results(&mut self, world: &mut VoxelWorld, center: ChunkPos) {
        let results = match &self.worker {
            Some(w) => w.drain(),
            None => return,
        };
        let revision = world.generator_revision();
        for GenResult {
            pos,
            revision: rev,
            generated,
            elapsed,
        } in results
        {
            self.in_flight.remove(&pos);
            let in_range = self.in_range(pos, center);
            if rev != revision {
                self.stats.discarded += 1;
                log::debug!(target: "stream", "discarded stale ({}, {}) rev {} != {}", pos.x, pos.z, rev, revision);
                if in_range && !world.is_chunk_loaded(pos) {
                    self.lock_queue().push(LoadRequest {
                        pos,
                        priority: pos.chebyshev(center),
                    });
                }
                continue;
            }
            if !in_range {
                self.stats.discarded += 1;
                log::trace!(target: "stream", "discarded out-of-range ({}, {})", pos.x, pos.z);
                continue;
            }
            if world.insert_generated(generated) {
                self.stats.published += 1;
                log::trace!(target: "stream", "published ({}, {}) in {:?}", pos.x, pos.z, elapsed);
            } else {
                self.stats.discarded += 1;
            }
        }
    }

    /// Hand up to `chunks_per_update` requests to the worker, then apply unloads.
    pub fn process_load_queue(&mut self, world: &mut VoxelWorld) {
        let budget = self.config.chunks_per_update;
        let revision = world.generator_revision();
        let batch: Vec<LoadRequest> = {
            let mut queue = self.lock_queue();
            std::iter::from_fn(|| queue.pop()).take(budget).collect()
        };
        for req in batch {
            if world.is_chunk_loaded(req.pos) {
                continue;
            }
            let job = GenJob {
                pos: req.pos,
                generator: world.generator(),
                revision,
            };
            let handed_off = match &self.worker {
                Some(w) => w.submit(job).is_ok(),
                None => false,
            };
            if handed_off {
                self.in_flight.insert(req.pos, revision);
            } else {
                world.load_chunk(req.pos);
                self.stats.published += 1;
            }
        }
        for pos in std::mem::take(&mut self.unload_list) {
            if world.unload_chunk(pos) {
                self.stats.unloaded += 1;
            }
        }
    }

    /// Residency is read from `world`, so chunks loaded or unloaded behind the
    /// streamer's back are reported as they are.
    pub fn state_of(&self, world: &VoxelWorld, pos: ChunkPos) -> Option<RequestState> {
        if self.lock_queue().contains(pos) {
            Some(RequestState::Queued)
        } else if self.in_flight.contains_key(&pos) {
            Some(RequestState::Generating)
        } else if world.is_chunk_loaded(pos) {
            Some(RequestState::Resident)
        } else if self.cancelled.contains(&pos) {
            Some(RequestState::Cancelled)
        } else {
            None
        }
    }

    pub fn pending_count(&self) -> usize {
        self.lock_queue().len()
    }

    #[inline]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Nothing queued, generating, or waiting to unload.
    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0 && self.in_flight.is_empty() && self.unload_list.is_empty()
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            queued: self.pending_count(),
            in_flight: self.in_flight.len(),
            generated: self.worker.as_ref().map_or(0, |w| w.generated_count()),
            ..self.stats
        }
    }

    /// Stop the worker and drop all outstanding requests. Further updates do nothing.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(w) = self.worker.as_mut() {
            w.shutdown();
        }
        self.lock_queue().clear();
        self.in_flight.clear();
        self.unload_list.clear();
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.stopped
    }
}

impl Drop for ChunkStreamer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
