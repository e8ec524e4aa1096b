use anyhow::Result;
use config::Config;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesOptions {
    /// Keep only the last `window_days` calendar days relative to the newest date.
    pub window_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendOptions {
    pub window: usize,
    pub threshold: f64,
}

impl Default for TrendOptions {
    fn default() -> Self {
        TrendOptions {
            window: 7,
            threshold: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastOptions {
    pub horizon_days: u32,
    pub min_observations: usize,
    /// Coverage of the uncertainty interval, e.g. 0.8 for an 80% band.
    pub interval_width: f64,
    pub weekly_seasonality: bool,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        ForecastOptions {
            horizon_days: 7,
            min_observations: 10,
            interval_width: 0.8,
            weekly_seasonality: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentOptions {
    pub positive_threshold: f64,
    pub negative_threshold: f64,
}

impl Default for SentimentOptions {
    fn default() -> Self {
        SentimentOptions {
            positive_threshold: 0.1,
            negative_threshold: -0.1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub youtube_api_url: String,
    pub youtube_rss_url: String,
    #[serde(skip_serializing)]
    pub youtube_api_key: String,
    pub keywords: Vec<String>,
    pub max_results: usize,
    pub max_pages: usize,
    pub top_videos: usize,
    pub max_comments: usize,
    pub description_chars: usize,
    pub request_timeout_secs: u64,
    pub max_concurrent_keywords: usize,
    pub rss_fallback: bool,
    pub bind_addr: String,
    pub log_dir: Option<String>,
    pub series: SeriesOptions,
    pub trend: TrendOptions,
    pub forecast: ForecastOptions,
    pub sentiment: SentimentOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            youtube_api_url: "https://www.googleapis.com/youtube/v3".to_string(),
            youtube_rss_url: "https://www.youtube.com/feeds/videos.xml".to_string(),
            youtube_api_key: String::new(),
            keywords: vec!["AI".to_string()],
            max_results: 100,
            max_pages: 10,
            top_videos: 3,
            max_comments: 50,
            description_chars: 150,
            request_timeout_secs: 10,
            max_concurrent_keywords: 1,
            rss_fallback: true,
            bind_addr: "0.0.0.0:3000".to_string(),
            log_dir: None,
            series: SeriesOptions::default(),
            trend: TrendOptions::default(),
            forecast: ForecastOptions::default(),
            sentiment: SentimentOptions::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.keywords.is_empty() {
            return Err(anyhow::anyhow!("keywords cannot be empty"));
        }

        if self.max_results == 0 || self.max_results > 500 {
            return Err(anyhow::anyhow!("max_results must be between 1 and 500"));
        }

        if self.max_pages == 0 {
            return Err(anyhow::anyhow!("max_pages must be at least 1"));
        }

        if self.max_comments > 100 {
            return Err(anyhow::anyhow!("max_comments must not exceed 100"));
        }

        if self.max_concurrent_keywords == 0 || self.max_concurrent_keywords > 16 {
            return Err(anyhow::anyhow!(
                "max_concurrent_keywords must be between 1 and 16"
            ));
        }

        if self.youtube_api_key.is_empty() && !self.rss_fallback {
            return Err(anyhow::anyhow!(
                "YOUTUBE_API_KEY is required when rss_fallback is disabled"
            ));
        }

        if self.series.window_days == Some(0) {
            return Err(anyhow::anyhow!("series.window_days must be at least 1 when set"));
        }

        if self.trend.window < 2 {
            return Err(anyhow::anyhow!("trend.window must be at least 2"));
        }

        if !(self.trend.threshold > 0.0) {
            return Err(anyhow::anyhow!("trend.threshold must be positive"));
        }

        if self.forecast.horizon_days == 0 {
            return Err(anyhow::anyhow!("forecast.horizon_days must be at least 1"));
        }

        if self.forecast.min_observations < 3 {
            return Err(anyhow::anyhow!("forecast.min_observations must be at least 3"));
        }

        if !(self.forecast.interval_width > 0.0 && self.forecast.interval_width < 1.0) {
            return Err(anyhow::anyhow!(
                "forecast.interval_width must be strictly between 0 and 1"
            ));
        }

        let s = &self.sentiment;
        if !(-1.0..=1.0).contains(&s.negative_threshold)
            || !(-1.0..=1.0).contains(&s.positive_threshold)
            || s.negative_threshold > s.positive_threshold
        {
            return Err(anyhow::anyhow!(
                "sentiment thresholds must lie in [-1, 1] with negative <= positive"
            ));
        }

        Ok(())
    }
}

/// Splits a comma-separated keyword list, trimming entries and dropping empty ones.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("YT_ANALYZER")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("keywords")
                .try_parsing(true),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    config.youtube_api_key = env::var("YOUTUBE_API_KEY").unwrap_or_default();

    config.validate()?;

    Ok(config)
}
