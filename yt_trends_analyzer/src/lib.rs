use std::sync::Arc;

pub mod analytics;
pub mod config;
pub mod errors;
pub mod models;
pub mod routers;
pub mod services;

pub use analytics::{LexiconScorer, PolarityScorer, SentimentAggregator};
pub use config::{load_config, parse_keywords, AppConfig};
pub use errors::{Result, TrendAnalysisError};
pub use models::{
    AnalysisResult, DailySeries, DailyViews, ForecastOutcome, ForecastPoint, ForecastResult,
    KeywordReport, Polarity, ReportStatus, SentimentTally, TrendLabel, TrendResult, VideoRecord,
    VideoSentiment,
};
pub use services::{TrendsPipeline, VideoSource, YouTubeCollector};

pub type DefaultPipeline = TrendsPipeline<YouTubeCollector, LexiconScorer>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DefaultPipeline>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let collector = YouTubeCollector::new(config.clone())?;
        let pipeline = TrendsPipeline::new(collector, LexiconScorer::new(), config)?;
        Ok(AppState {
            pipeline: Arc::new(pipeline),
        })
    }
}
