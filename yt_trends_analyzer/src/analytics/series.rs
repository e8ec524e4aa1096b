use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::config::SeriesOptions;
use crate::errors::{Result, TrendAnalysisError};
use crate::models::{DailySeries, DailyViews, VideoRecord};

/// Sums views per publish date, ascending by date.
///
/// An empty batch is an error: nothing downstream can work with an empty series.
pub fn build_daily_series(records: &[VideoRecord]) -> Result<DailySeries> {
    if records.is_empty() {
        return Err(TrendAnalysisError::InsufficientData(
            "no videos to aggregate".to_string(),
        ));
    }

    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *daily.entry(record.published_at).or_insert(0) += record.views;
    }

    let points = daily
        .into_iter()
        .map(|(date, views)| DailyViews { date, views })
        .collect();

    let series = DailySeries::from_sorted(points);
    tracing::debug!(
        dates = series.len(),
        total_views = series.total_views(),
        "daily series built"
    );
    Ok(series)
}

/// Keeps the entries within the last `window_days` calendar days of the newest date.
///
/// `window_days` must be at least 1; configuration validation rejects 0.
pub fn apply_window(series: DailySeries, options: &SeriesOptions) -> DailySeries {
    let (Some(days), Some(last)) = (options.window_days, series.last_date()) else {
        return series;
    };

    // window_days = 1 keeps only the newest date
    let cutoff = last
        .checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
        .unwrap_or(NaiveDate::MIN);

    let points = series
        .points()
        .iter()
        .filter(|p| p.date >= cutoff)
        .copied()
        .collect();

    DailySeries::from_sorted(points)
}
