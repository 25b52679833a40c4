use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use loam_chunk::ChunkPos;
use loam_world::{GeneratedChunk, TerrainGenerator, generate};

pub(crate) struct GenJob {
    pub pos: ChunkPos,
    pub generator: Arc<dyn TerrainGenerator>,
    pub revision: u64,
}

pub(crate) struct GenResult {
    pub pos: ChunkPos,
    pub revision: u64,
    pub generated: GeneratedChunk,
    pub elapsed: Duration,
}

/// Single background generation thread. It only sees generator snapshots and
/// never the resident chunk map.
pub(crate) struct GenWorker {
    job_tx: Option<Sender<GenJob>>,
    res_rx: Receiver<GenResult>,
    running: Arc<AtomicBool>,
    generated: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl GenWorker {
    pub(crate) fn spawn() -> std::io::Result<Self> {
        let (job_tx, job_rx) = unbounded::<GenJob>();
        let (res_tx, res_rx) = unbounded::<GenResult>();
        let running = Arc::new(AtomicBool::new(true));
        let generated = Arc::new(AtomicU64::new(0));
        let handle = {
            let running = running.clone();
            let generated = generated.clone();
            thread::Builder::new()
                .name("loam-chunkgen".into())
                .spawn(move || run(job_rx, res_tx, running, generated))?
        };
        log::info!(target: "stream", "chunk generation worker started");
        Ok(Self {
            job_tx: Some(job_tx),
            res_rx,
            running,
            generated,
            handle: Some(handle),
        })
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.job_tx.is_some() && self.running.load(Ordering::Acquire)
    }

    /// Hands the job back when the worker is gone.
    pub(crate) fn submit(&self, job: GenJob) -> Result<(), GenJob> {
        match &self.job_tx {
            Some(tx) if self.running.load(Ordering::Acquire) => tx.send(job).map_err(|e| e.0),
            _ => Err(job),
        }
    }

    pub(crate) fn drain(&self) -> Vec<GenResult> {
        self.res_rx.try_iter().collect()
    }

    pub(crate) fn generated_count(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    /// Stop accepting work and join. A job already being generated finishes first.
    pub(crate) fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        self.job_tx = None;
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                log::error!(target: "stream", "chunk generation worker panicked");
            } else {
                log::info!(target: "stream", "chunk generation worker stopped");
            }
        }
    }
}

impl Drop for GenWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    rx: Receiver<GenJob>,
    tx: Sender<GenResult>,
    running: Arc<AtomicBool>,
    generated: Arc<AtomicU64>,
) {
    while let Ok(job) = rx.recv() {
        if !running.load(Ordering::Acquire) {
            break;
        }
        let t0 = Instant::now();
        let out = generate(job.generator.as_ref(), job.pos);
        generated.fetch_add(1, Ordering::Relaxed);
        log::trace!(target: "stream", "generated ({}, {}) rev {}", job.pos.x, job.pos.z, job.revision);
        let res = GenResult {
            pos: job.pos,
            revision: job.revision,
            generated: out,
            elapsed: t0.elapsed(),
        };
        if tx.send(res).is_err() {
            break;
        }
    }
}
