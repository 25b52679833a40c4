use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};

use loam_world::VoxelWorld;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::{EngineConfig, load_config_from_path};

/// Watches the engine config file and re-applies it to a world on change.
pub struct ConfigWatcher {
    path: PathBuf,
    rx: Receiver<()>,
    // Dropping the watcher stops event delivery
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    pub fn spawn(path: &Path) -> Result<Self, Box<dyn Error>> {
        let (tx, rx) = channel::<()>();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    match event.kind {
                        EventKind::Modify(_)
                        | EventKind::Create(_)
                        | EventKind::Remove(_)
                        | EventKind::Any => {
                            let _ = tx.send(());
                        }
                        _ => {}
                    }
                }
            })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        log::info!("watching {} for changes", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            rx,
            _watcher: watcher,
        })
    }

    /// True if any change event arrived since the last call.
    pub fn take_changed(&self) -> bool {
        self.rx.try_iter().count() > 0
    }

    /// Reload the file when it changed and push it into `world`.
    /// Returns the new config if one was applied.
    pub fn process(&self, world: &mut VoxelWorld) -> Option<EngineConfig> {
        if !self.take_changed() {
            return None;
        }
        reload(&self.path, world)
    }
}

/// Load `path` and apply it. Failures are logged and leave the world untouched.
pub fn reload(path: &Path, world: &mut VoxelWorld) -> Option<EngineConfig> {
    if !path.exists() {
        log::warn!("config missing: {}", path.display());
        return None;
    }
    match load_config_from_path(path) {
        Ok(cfg) => {
            if cfg.apply_to(world) {
                log::info!("config reloaded from {}", path.display());
            } else {
                log::debug!("config at {} unchanged", path.display());
            }
            Some(cfg)
        }
        Err(e) => {
            log::warn!("config reload failed ({}): {}", path.display(), e);
            None
        }
    }
}
