//! Additive trend + day-of-week forecasting.
//!
//! The model is `views(date) = a + b * t + s[weekday(date)] + e`, fitted by
//! least squares over the positive observations. `t` is the calendar offset
//! from the first observation, scaled to `[0, 1]`. Uncertainty bounds are the
//! classical regression prediction interval
//! `estimate ± z * sigma * sqrt(1 + x' (X'X)^-1 x)`.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::ForecastOptions;
use crate::errors::{Result, TrendAnalysisError};
use crate::models::{DailySeries, ForecastPoint, ForecastResult};

/// Prophet-style default: weekly terms only once two full weeks are observed.
const MIN_SEASONAL_SPAN_DAYS: i64 = 14;

#[derive(Debug, Clone)]
pub struct FittedModel {
    origin: NaiveDate,
    span: f64,
    /// Observed weekdays; the first one is the baseline and carries no coefficient.
    weekdays: Vec<Weekday>,
    coefficients: Vec<f64>,
    /// `(X'X)^-1`
    covariance: Vec<Vec<f64>>,
    sigma: f64,
    observations: usize,
}

impl FittedModel {
    pub fn fit(observations: &[(NaiveDate, f64)], options: &ForecastOptions) -> Result<Self> {
        let n = observations.len();
        let (Some(&(origin, _)), Some(&(last, _))) = (observations.first(), observations.last())
        else {
            return Err(TrendAnalysisError::InsufficientData(
                "no positive observations".to_string(),
            ));
        };

        let span_days = (last - origin).num_days();
        if span_days <= 0 {
            return Err(TrendAnalysisError::ModelFitFailure(
                "observations cover a single date".to_string(),
            ));
        }

        let mut weekdays: Vec<Weekday> = Vec::new();
        if options.weekly_seasonality && span_days >= MIN_SEASONAL_SPAN_DAYS {
            for (date, _) in observations {
                if !weekdays.contains(&date.weekday()) {
                    weekdays.push(date.weekday());
                }
            }
            weekdays.sort_by_key(|w| w.num_days_from_monday());
            // keep at least two residual degrees of freedom
            if n < 2 + weekdays.len() + 1 {
                tracing::debug!(
                    observations = n,
                    "too few observations for weekly terms, fitting trend only"
                );
                weekdays.clear();
            }
        }

        let mut model = FittedModel {
            origin,
            span: span_days as f64,
            weekdays,
            coefficients: Vec::new(),
            covariance: Vec::new(),
            sigma: 0.0,
            observations: n,
        };

        let rows: Vec<Vec<f64>> = observations
            .iter()
            .map(|(date, _)| model.design_row(*date))
            .collect();
        let p = rows[0].len();

        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, (_, y)) in rows.iter().zip(observations) {
            for i in 0..p {
                xty[i] += row[i] * y;
                for j in 0..p {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }

        let covariance = invert(xtx).ok_or_else(|| {
            TrendAnalysisError::ModelFitFailure("design matrix is singular".to_string())
        })?;
        let coefficients: Vec<f64> = covariance
            .iter()
            .map(|r| r.iter().zip(&xty).map(|(c, v)| c * v).sum())
            .collect();

        let rss: f64 = rows
            .iter()
            .zip(observations)
            .map(|(row, (_, y))| {
                let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
                (y - fitted).powi(2)
            })
            .sum();
        let dof = n.saturating_sub(p).max(1);
        let sigma = (rss / dof as f64).sqrt();

        if !sigma.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(TrendAnalysisError::ModelFitFailure(
                "fit produced non-finite parameters".to_string(),
            ));
        }

        model.coefficients = coefficients;
        model.covariance = covariance;
        model.sigma = sigma;
        Ok(model)
    }

    fn design_row(&self, date: NaiveDate) -> Vec<f64> {
        let t = (date - self.origin).num_days() as f64 / self.span;
        let mut row = vec![1.0, t];
        if let Some((_, rest)) = self.weekdays.split_first() {
            let weekday = date.weekday();
            if self.weekdays.contains(&weekday) {
                row.extend(rest.iter().map(|w| if *w == weekday { 1.0 } else { 0.0 }));
            } else {
                // unseen weekday: average of the observed weekday effects
                let share = 1.0 / self.weekdays.len() as f64;
                row.extend(rest.iter().map(|_| share));
            }
        }
        row
    }

    pub fn has_weekly_terms(&self) -> bool {
        !self.weekdays.is_empty()
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Returns `(estimate, lower, upper)` for `date`.
    pub fn predict(&self, date: NaiveDate, z: f64) -> (f64, f64, f64) {
        let row = self.design_row(date);
        let estimate: f64 = row.iter().zip(&self.coefficients).map(|(x, b)| x * b).sum();
        let leverage: f64 = self
            .covariance
            .iter()
            .zip(&row)
            .map(|(cov_row, xi)| xi * cov_row.iter().zip(&row).map(|(c, xj)| c * xj).sum::<f64>())
            .sum();
        let half_width = z * self.sigma * (1.0 + leverage.max(0.0)).sqrt();
        (estimate, estimate - half_width, estimate + half_width)
    }
}

/// Fits the model on the positive days of `series` and projects
/// `options.horizon_days` past its last date.
///
/// Rows are produced for every date of the series plus the horizon. Values
/// are floored at zero since views cannot be negative.
pub fn forecast_views(series: &DailySeries, options: &ForecastOptions) -> Result<ForecastResult> {
    let observations: Vec<(NaiveDate, f64)> = series
        .points()
        .iter()
        .filter(|p| p.views > 0)
        .map(|p| (p.date, p.views as f64))
        .collect();

    if observations.len() < options.min_observations {
        return Err(TrendAnalysisError::InsufficientData(format!(
            "{} positive observations, at least {} required",
            observations.len(),
            options.min_observations
        )));
    }

    let last_observed = series.last_date().ok_or_else(|| {
        TrendAnalysisError::InsufficientData("series is empty".to_string())
    })?;

    let model = FittedModel::fit(&observations, options)?;
    let z = interval_z(options.interval_width)?;

    let future_dates = (1..=u64::from(options.horizon_days)).map(|d| {
        last_observed.checked_add_days(Days::new(d)).ok_or_else(|| {
            TrendAnalysisError::ModelFitFailure("forecast horizon overflows the calendar".to_string())
        })
    });

    let mut points = Vec::with_capacity(series.len() + options.horizon_days as usize);
    for date in series.points().iter().map(|p| p.date) {
        points.push(make_point(&model, date, z, false)?);
    }
    for date in future_dates {
        points.push(make_point(&model, date?, z, true)?);
    }

    tracing::debug!(
        observations = observations.len(),
        weekly = model.has_weekly_terms(),
        sigma = model.sigma(),
        "forecast model fitted"
    );

    Ok(ForecastResult {
        points,
        horizon_days: options.horizon_days,
        last_observed,
        observations: observations.len(),
        interval_width: options.interval_width,
    })
}

fn make_point(model: &FittedModel, date: NaiveDate, z: f64, is_forecast: bool) -> Result<ForecastPoint> {
    let (estimate, lower, upper) = model.predict(date, z);
    if !(estimate.is_finite() && lower.is_finite() && upper.is_finite()) {
        return Err(TrendAnalysisError::ModelFitFailure(format!(
            "non-finite prediction for {date}"
        )));
    }
    Ok(ForecastPoint {
        date,
        estimate: estimate.max(0.0),
        lower: lower.max(0.0),
        upper: upper.max(0.0),
        is_forecast,
    })
}

/// Gauss-Jordan inversion with partial pivoting. `None` when singular.
fn invert(mut matrix: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let scale = matrix
        .iter()
        .flat_map(|r| r.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return None;
    }

    let mut inverse: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| {
            matrix[a][col]
                .abs()
                .partial_cmp(&matrix[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if matrix[pivot_row][col].abs() <= scale * 1e-12 {
            return None;
        }
        matrix.swap(col, pivot_row);
        inverse.swap(col, pivot_row);

        let pivot = matrix[col][col];
        for j in 0..n {
            matrix[col][j] /= pivot;
            inverse[col][j] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = matrix[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                matrix[row][j] -= factor * matrix[col][j];
                inverse[row][j] -= factor * inverse[col][j];
            }
        }
    }

    Some(inverse)
}

/// Two-sided standard normal critical value for an interval covering `width`.
pub fn interval_z(width: f64) -> Result<f64> {
    if !(width > 0.0 && width < 1.0) {
        return Err(TrendAnalysisError::ModelFitFailure(format!(
            "interval width {width} outside (0, 1)"
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| TrendAnalysisError::ModelFitFailure(format!("standard normal: {e}")))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}
