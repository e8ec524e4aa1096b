use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::{parse_keywords, ForecastOptions, SentimentOptions, SeriesOptions, TrendOptions};
use crate::models::{AnalysisResult, KeywordReport, ReportStatus};
use crate::AppState;

const MAX_KEYWORDS_PER_REQUEST: usize = 20;

#[derive(Deserialize)]
pub struct AnalysisRequest {
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeQuery {
    /// Comma-separated keywords.
    pub keyword: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub default_keywords: Vec<String>,
    pub data_api_enabled: bool,
    pub rss_fallback: bool,
    pub series: SeriesOptions,
    pub trend: TrendOptions,
    pub forecast: ForecastOptions,
    pub sentiment: SentimentOptions,
    pub available_endpoints: Vec<String>,
}

fn summarize(reports: Vec<KeywordReport>) -> AnalysisResult {
    let ok = reports.iter().filter(|r| r.status == ReportStatus::Ok).count();
    let status = if ok == reports.len() {
        "success"
    } else if ok == 0 {
        "error"
    } else {
        "partial"
    };

    AnalysisResult {
        timestamp: Utc::now().to_rfc3339(),
        status: status.to_string(),
        reports,
    }
}

/// Trims keywords and rejects empty or oversized requests.
pub fn validate_keywords(keywords: Vec<String>) -> Result<Vec<String>, StatusCode> {
    let keywords: Vec<String> = keywords
        .into_iter()
        .map(|kw| kw.trim().to_string())
        .filter(|kw| !kw.is_empty())
        .collect();

    if keywords.is_empty() || keywords.len() > MAX_KEYWORDS_PER_REQUEST {
        tracing::warn!(count = keywords.len(), "rejected keyword list");
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(keywords)
}

pub async fn trends_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, StatusCode> {
    let keywords = validate_keywords(req.keywords)?;

    tracing::info!(?keywords, "starting trends analysis request");
    let reports = state.pipeline.run(&keywords).await;
    let result = summarize(reports);
    tracing::info!(status = %result.status, "trends analysis finished");

    Ok(Json(result))
}

/// `GET /analyze?keyword=AI,Python`; falls back to the configured keywords.
pub async fn simple_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalysisResult>, StatusCode> {
    let keywords = match query.keyword.as_deref() {
        Some(raw) => parse_keywords(raw),
        None => state.pipeline.config().keywords.clone(),
    };
    trends_analysis(State(state), Json(AnalysisRequest { keywords })).await
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "YouTube Trends Analyzer API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.pipeline.config();

    Json(StatusResponse {
        status: "ready".to_string(),
        default_keywords: config.keywords.clone(),
        data_api_enabled: !config.youtube_api_key.is_empty(),
        rss_fallback: config.rss_fallback,
        series: config.series.clone(),
        trend: config.trend.clone(),
        forecast: config.forecast.clone(),
        sentiment: config.sentiment.clone(),
        available_endpoints: vec![
            "/".to_string(),
            "/status".to_string(),
            "/analyze".to_string(),
            "/api/trends-analysis".to_string(),
        ],
    })
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/status", get(get_status))
        .route("/analyze", get(simple_analysis))
        .route("/api/trends-analysis", post(trends_analysis))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_trimmed_and_bounded() {
        assert_eq!(
            validate_keywords(vec![" AI ".to_string(), "".to_string()]).unwrap(),
            vec!["AI"]
        );
        assert_eq!(
            validate_keywords(vec!["  ".to_string()]),
            Err(StatusCode::BAD_REQUEST)
        );
        let many = (0..=MAX_KEYWORDS_PER_REQUEST).map(|i| i.to_string()).collect();
        assert_eq!(validate_keywords(many), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn summary_status_reflects_reports() {
        let ok = KeywordReport::failed("a", ReportStatus::Ok, String::new());
        let failed = KeywordReport::failed("b", ReportStatus::NoData, "none".to_string());

        assert_eq!(summarize(vec![ok.clone()]).status, "success");
        assert_eq!(summarize(vec![ok, failed.clone()]).status, "partial");
        assert_eq!(summarize(vec![failed]).status, "error");
    }
}
