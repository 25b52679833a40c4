//! Observer-centred chunk streaming with a background generation worker.
#![forbid(unsafe_code)]

mod config;
mod request;
mod streamer;
mod worker;

pub use config::{MAX_VIEW_DISTANCE, MIN_VIEW_DISTANCE, StreamConfig, clamp_view_distance};
pub use request::{LoadRequest, RequestState};
pub use streamer::{ChunkStreamer, StreamStats};
