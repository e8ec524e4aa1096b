pub mod collector;
pub mod pipeline;

pub use collector::{VideoSource, YouTubeCollector};
pub use pipeline::{top_videos, TrendsPipeline};
