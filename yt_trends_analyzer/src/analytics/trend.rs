use crate::config::TrendOptions;
use crate::models::{DailySeries, TrendLabel, TrendResult};

/// Ordinary least-squares slope of `ys` against their position `0..n`.
///
/// Returns `None` for fewer than two points.
pub fn ols_slope(ys: &[f64]) -> Option<f64> {
    let n = ys.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let (sxy, sxx) = ys
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

    Some(sxy / sxx)
}

/// Buckets a slope against a symmetric threshold.
pub fn label_for_slope(slope: f64, threshold: f64) -> TrendLabel {
    if slope > threshold {
        TrendLabel::Rising
    } else if slope < -threshold {
        TrendLabel::Declining
    } else {
        TrendLabel::Stable
    }
}

/// Classifies the trailing `options.window` entries of the series.
///
/// The x-axis is the position in the window, not the calendar date, so gaps
/// between publish dates are treated as uniform spacing.
pub fn classify_trend(series: &DailySeries, options: &TrendOptions) -> TrendResult {
    let points = series.points();
    let window = options.window;

    if points.len() < window {
        tracing::debug!(
            entries = points.len(),
            required = window,
            "series too short for trend classification"
        );
        return TrendResult {
            label: TrendLabel::InsufficientData,
            slope: None,
            window,
            threshold: options.threshold,
        };
    }

    let ys: Vec<f64> = points[points.len() - window..]
        .iter()
        .map(|p| p.views as f64)
        .collect();

    match ols_slope(&ys) {
        Some(slope) => TrendResult {
            label: label_for_slope(slope, options.threshold),
            slope: Some(slope),
            window,
            threshold: options.threshold,
        },
        None => TrendResult {
            label: TrendLabel::InsufficientData,
            slope: None,
            window,
            threshold: options.threshold,
        },
    }
}
