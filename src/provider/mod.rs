pub mod cache;
pub mod client;
pub mod fetch;
pub mod types;

pub use cache::{CacheConfig, DiskCache};
pub use client::create_client;
pub use fetch::{get_event_results, get_track_status};
pub use types::{EventResultRow, TrackStatusEntry};
