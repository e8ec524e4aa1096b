//! Pure analytic stages: no I/O, no shared state.

pub mod forecast;
pub mod sentiment;
pub mod series;
pub mod trend;

pub use forecast::{forecast_views, interval_z, FittedModel};
pub use sentiment::{classify_polarity, CommentCleaner, LexiconScorer, PolarityScorer, SentimentAggregator};
pub use series::{apply_window, build_daily_series};
pub use trend::{classify_trend, label_for_slope, ols_slope};
