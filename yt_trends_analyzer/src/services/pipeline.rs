use futures::stream::{self, StreamExt};

use crate::analytics::{
    apply_window, build_daily_series, classify_trend, forecast_views, PolarityScorer,
    SentimentAggregator,
};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ForecastOutcome, KeywordReport, ReportStatus, SentimentTally, VideoRecord, VideoSentiment,
};
use crate::services::collector::VideoSource;

/// The `n` most viewed videos; ties go to the newer video, then to the smaller id.
pub fn top_videos(videos: &[VideoRecord], n: usize) -> Vec<VideoRecord> {
    let mut sorted: Vec<VideoRecord> = videos.to_vec();
    sorted.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| a.video_id.cmp(&b.video_id))
    });
    sorted.truncate(n);
    sorted
}

/// Runs series, trend, forecast and sentiment for each keyword.
///
/// A failing keyword never aborts the run: it yields a report with a
/// human-readable message instead.
pub struct TrendsPipeline<S, P> {
    source: S,
    sentiment: SentimentAggregator<P>,
    config: AppConfig,
}

impl<S, P> TrendsPipeline<S, P>
where
    S: VideoSource + Sync,
    P: PolarityScorer + Sync,
{
    pub fn new(source: S, scorer: P, config: AppConfig) -> Result<Self> {
        let sentiment = SentimentAggregator::new(scorer, config.sentiment.clone())?;
        Ok(TrendsPipeline {
            source,
            sentiment,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn run(&self, keywords: &[String]) -> Vec<KeywordReport> {
        let concurrency = self.config.max_concurrent_keywords.max(1);
        tracing::info!(keywords = keywords.len(), concurrency, "starting trends analysis");

        if concurrency == 1 {
            let mut reports = Vec::with_capacity(keywords.len());
            for keyword in keywords {
                reports.push(self.analyze_keyword(keyword).await);
            }
            return reports;
        }

        stream::iter(keywords.to_vec())
            .map(|keyword| async move { self.analyze_keyword(&keyword).await })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    pub async fn analyze_keyword(&self, keyword: &str) -> KeywordReport {
        let videos = match self.source.search_videos(keyword).await {
            Ok(videos) => videos,
            Err(e) => {
                tracing::error!(keyword, error = %e, "video retrieval failed");
                return KeywordReport::failed(
                    keyword,
                    ReportStatus::Error,
                    format!("Could not fetch videos for '{}': {}", keyword, e),
                );
            }
        };

        if videos.is_empty() {
            tracing::warn!(keyword, "no videos found");
            return KeywordReport::failed(
                keyword,
                ReportStatus::NoData,
                "No videos found for this keyword.".to_string(),
            );
        }

        let top = top_videos(&videos, self.config.top_videos);

        let series = match build_daily_series(&videos) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "could not build daily series");
                let mut report =
                    KeywordReport::failed(keyword, ReportStatus::NoData, e.to_string());
                report.top_videos = top;
                return report;
            }
        };

        // the calendar window narrows the trend input only, the forecaster fits all history
        let recent = apply_window(series.clone(), &self.config.series);
        let trend = classify_trend(&recent, &self.config.trend);
        tracing::info!(
            keyword,
            label = %trend.label,
            slope = ?trend.slope,
            dates = recent.len(),
            first = ?recent.first_date(),
            "trend classified"
        );

        let forecast = match forecast_views(&series, &self.config.forecast) {
            Ok(result) => ForecastOutcome::Available(result),
            Err(e) => {
                if e.is_insufficient() {
                    tracing::info!(keyword, reason = %e, "no forecast produced");
                } else {
                    tracing::warn!(keyword, error = %e, "forecast failed");
                }
                ForecastOutcome::Unavailable {
                    reason: format!("Not enough data to make a forecast. {}", e),
                }
            }
        };

        let mut sentiment = Vec::with_capacity(top.len());
        for video in &top {
            let tally = self.video_sentiment(keyword, video).await;
            sentiment.push(VideoSentiment {
                video_id: video.video_id.clone(),
                title: video.title.clone(),
                tally,
            });
        }

        KeywordReport {
            keyword: keyword.to_string(),
            status: ReportStatus::Ok,
            message: format!("Trend classification: {}", trend.label),
            top_videos: top,
            series: Some(series),
            trend: Some(trend),
            forecast: Some(forecast),
            sentiment,
        }
    }

    /// Best effort: a failed comment fetch yields an all-zero tally.
    async fn video_sentiment(&self, keyword: &str, video: &VideoRecord) -> SentimentTally {
        match self.source.fetch_comments(&video.video_id).await {
            Ok(mut comments) => {
                comments.truncate(self.config.max_comments);
                self.sentiment.aggregate(&comments)
            }
            Err(e) => {
                tracing::warn!(
                    keyword,
                    video_id = %video.video_id,
                    error = %e,
                    "comment retrieval failed, sentiment left empty"
                );
                SentimentTally::default()
            }
        }
    }
}
