use serde::{Deserialize, Serialize};

pub const MIN_VIEW_DISTANCE: i32 = 1;
pub const MAX_VIEW_DISTANCE: i32 = 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Chebyshev radius, in chunks, kept loaded around the observer.
    #[serde(default = "default_view_distance")]
    pub view_distance: i32,
    /// Extra rings kept resident before a chunk is unloaded.
    #[serde(default = "default_hysteresis")]
    pub hysteresis: i32,
    /// Requests handed to the worker per update.
    #[serde(default = "default_chunks_per_update")]
    pub chunks_per_update: usize,
    /// Above this the hysteresis buffer shrinks to one ring.
    #[serde(default = "default_max_loaded")]
    pub max_loaded_chunks: usize,
}
fn default_view_distance() -> i32 {
    8
}
fn default_hysteresis() -> i32 {
    2
}
fn default_chunks_per_update() -> usize {
    2
}
fn default_max_loaded() -> usize {
    1000
}
impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            view_distance: default_view_distance(),
            hysteresis: default_hysteresis(),
            chunks_per_update: default_chunks_per_update(),
            max_loaded_chunks: default_max_loaded(),
        }
    }
}

#[inline]
pub fn clamp_view_distance(n: i32) -> i32 {
    n.clamp(MIN_VIEW_DISTANCE, MAX_VIEW_DISTANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_table() {
        let cfg: StreamConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, StreamConfig::default());
        assert_eq!(cfg.view_distance, 8);
        assert_eq!(cfg.hysteresis, 2);
        assert_eq!(cfg.chunks_per_update, 2);
        assert_eq!(cfg.max_loaded_chunks, 1000);
    }

    #[test]
    fn view_distance_clamps() {
        assert_eq!(clamp_view_distance(0), 1);
        assert_eq!(clamp_view_distance(-5), 1);
        assert_eq!(clamp_view_distance(12), 12);
        assert_eq!(clamp_view_distance(100), 32);
    }
}
