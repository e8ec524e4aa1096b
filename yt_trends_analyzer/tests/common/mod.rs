#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use yt_trends_analyzer::AppConfig;

pub const SEARCH_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
  <title>search</title>
  <entry>
    <id>yt:video:vid001</id>
    <title>Rust in 100 seconds</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=vid001"/>
    <published>2024-04-02T10:00:00+00:00</published>
    <media:group>
      <media:title>Rust in 100 seconds</media:title>
      <media:description>Fast overview</media:description>
      <media:community>
        <media:statistics views="4321"/>
      </media:community>
    </media:group>
  </entry>
  <entry>
    <id>yt:video:vid002</id>
    <title>Ownership explained</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=vid002"/>
    <published>2024-04-03T10:00:00+00:00</published>
    <media:group>
      <media:title>Ownership explained</media:title>
      <media:description>Borrowing and moves</media:description>
      <media:community>
        <media:statistics views="1200"/>
      </media:community>
    </media:group>
  </entry>
</feed>"#;

/// Local stand-in for the Data API and the search feed.
///
/// Search always advertises another page, so only `max_pages` stops the collector.
#[derive(Clone, Default)]
pub struct StubYouTube {
    pub api_down: bool,
    pub feed_down: bool,
    pub search_hits: Arc<AtomicUsize>,
    pub feed_hits: Arc<AtomicUsize>,
}

impl StubYouTube {
    pub fn search_hits(&self) -> usize {
        self.search_hits.load(Ordering::SeqCst)
    }

    pub fn feed_hits(&self) -> usize {
        self.feed_hits.load(Ordering::SeqCst)
    }

    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/search", get(search))
            .route("/videos", get(videos))
            .route("/commentThreads", get(comment_threads))
            .route("/feed", get(feed))
            .with_state(self.clone());

        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        addr
    }
}

pub fn stub_config(addr: SocketAddr) -> AppConfig {
    AppConfig {
        youtube_api_url: format!("http://{}", addr),
        youtube_rss_url: format!("http://{}/feed", addr),
        request_timeout_secs: 5,
        ..AppConfig::default()
    }
}

async fn search(State(stub): State<StubYouTube>) -> Response {
    let page = stub.search_hits.fetch_add(1, Ordering::SeqCst);
    if stub.api_down {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backendError").into_response();
    }

    Json(json!({
        "items": [{"id": {"videoId": format!("page{}", page)}}],
        "nextPageToken": format!("token{}", page + 1),
    }))
    .into_response()
}

async fn videos(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let items: Vec<_> = params
        .get("id")
        .map(|ids| ids.split(',').collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|id| {
            json!({
                "id": id,
                "snippet": {"title": format!("Video {}", id), "publishedAt": "2024-04-02T10:00:00Z"},
                "statistics": {"viewCount": "100"},
            })
        })
        .collect();

    Json(json!({ "items": items }))
}

async fn comment_threads() -> Json<serde_json::Value> {
    Json(json!({
        "items": [
            {"snippet": {"topLevelComment": {"snippet": {"textOriginal": "great video"}}}},
            {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "terrible audio"}}}},
        ]
    }))
}

async fn feed(State(stub): State<StubYouTube>) -> Response {
    stub.feed_hits.fetch_add(1, Ordering::SeqCst);
    if stub.feed_down {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    ([(header::CONTENT_TYPE, "application/atom+xml")], SEARCH_FEED).into_response()
}
