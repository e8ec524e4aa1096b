use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One video returned by the retrieval collaborator for a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: NaiveDate,
    pub views: u64,
}

impl VideoRecord {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: u64,
}

/// Views summed per publish date, strictly ascending by date.
///
/// Only the series builder constructs non-empty values, so the ordering and
/// uniqueness of dates hold for every instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailySeries {
    points: Vec<DailyViews>,
}

impl DailySeries {
    pub(crate) fn from_sorted(points: Vec<DailyViews>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        DailySeries { points }
    }

    pub fn points(&self) -> &[DailyViews] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn total_views(&self) -> u64 {
        self.points.iter().map(|p| p.views).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Rising,
    Declining,
    Stable,
    InsufficientData,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TrendLabel::Rising => "Rising",
            TrendLabel::Declining => "Declining",
            TrendLabel::Stable => "Stable",
            TrendLabel::InsufficientData => "Not enough data",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendResult {
    pub label: TrendLabel,
    /// Fitted slope in views per period; `None` when the window could not be filled.
    pub slope: Option<f64>,
    pub window: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    /// `true` for dates after the last observed date.
    pub is_forecast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    pub horizon_days: u32,
    pub last_observed: NaiveDate,
    pub observations: usize,
    pub interval_width: f64,
}

impl ForecastResult {
    pub fn history(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| !p.is_forecast)
    }

    pub fn future(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.is_forecast)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

/// Counts of classified comments per polarity bucket.
///
/// `dropped` is kept apart from the buckets: the three bucket counts always sum
/// to the number of comments that were actually classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub dropped: usize,
}

impl SentimentTally {
    pub fn record(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Positive => self.positive += 1,
            Polarity::Neutral => self.neutral += 1,
            Polarity::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSentiment {
    pub video_id: String,
    pub title: String,
    pub tally: SentimentTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Available(ForecastResult),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ok,
    NoData,
    Error,
}

/// Everything the presentation layer needs for one keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordReport {
    pub keyword: String,
    pub status: ReportStatus,
    pub message: String,
    pub top_videos: Vec<VideoRecord>,
    pub series: Option<DailySeries>,
    pub trend: Option<TrendResult>,
    pub forecast: Option<ForecastOutcome>,
    pub sentiment: Vec<VideoSentiment>,
}

impl KeywordReport {
    pub fn failed(keyword: &str, status: ReportStatus, message: String) -> Self {
        KeywordReport {
            keyword: keyword.to_string(),
            status,
            message,
            top_videos: Vec::new(),
            series: None,
            trend: None,
            forecast: None,
            sentiment: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub timestamp: String,
    pub status: String,
    pub reports: Vec<KeywordReport>,
}
