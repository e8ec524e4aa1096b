use std::future::Future;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::{Result, TrendAnalysisError};
use crate::models::VideoRecord;

/// The YouTube Data API caps `maxResults` at 50 for search and video lookups.
const API_PAGE_SIZE: usize = 50;
const COMMENT_PAGE_SIZE: usize = 100;

/// Where videos and comments for a keyword come from.
///
/// An empty video list means "nothing found"; an `Err` means the source itself failed.
pub trait VideoSource {
    fn search_videos(&self, keyword: &str) -> impl Future<Output = Result<Vec<VideoRecord>>> + Send;

    fn fetch_comments(&self, video_id: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_original: Option<String>,
    text_display: Option<String>,
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub(crate) fn video_from_item(item: VideoItem, description_chars: usize) -> Result<VideoRecord> {
    let published_at = chrono::DateTime::parse_from_rfc3339(&item.snippet.published_at)?.date_naive();

    let views = match item.statistics.view_count {
        Some(raw) => raw.parse::<u64>().map_err(|_| {
            TrendAnalysisError::RetrievalFailure(format!("invalid viewCount '{}' for {}", raw, item.id))
        })?,
        None => 0,
    };

    let thumbnails = item.snippet.thumbnails;
    let thumbnail = thumbnails
        .high
        .or(thumbnails.medium)
        .or(thumbnails.default)
        .map(|t| t.url)
        .unwrap_or_default();

    Ok(VideoRecord {
        video_id: item.id,
        title: item.snippet.title,
        description: truncate_chars(&item.snippet.description, description_chars),
        thumbnail,
        published_at,
        views,
    })
}

pub(crate) fn video_from_entry(entry: &feed_rs::model::Entry, description_chars: usize) -> Option<VideoRecord> {
    let published_at = entry.published.or(entry.updated)?.date_naive();
    let video_id = entry
        .id
        .strip_prefix("yt:video:")
        .unwrap_or(&entry.id)
        .to_string();
    let title = entry.title.as_ref().map(|t| t.content.clone()).unwrap_or_default();

    let media = entry.media.first();
    let description = media
        .and_then(|m| m.description.as_ref())
        .map(|d| truncate_chars(&d.content, description_chars))
        .unwrap_or_default();
    let thumbnail = media
        .and_then(|m| m.thumbnails.first())
        .map(|t| t.image.uri.clone())
        .unwrap_or_default();
    let views = media
        .and_then(|m| m.community.as_ref())
        .and_then(|c| c.stats_views)
        .unwrap_or(0);

    Some(VideoRecord {
        video_id,
        title,
        description,
        thumbnail,
        published_at,
        views,
    })
}

pub(crate) fn parse_feed(content: &[u8], max_results: usize, description_chars: usize) -> Result<Vec<VideoRecord>> {
    let feed = feed_rs::parser::parse(content)
        .map_err(|e| TrendAnalysisError::RetrievalFailure(format!("RSS parse error: {}", e)))?;

    Ok(feed
        .entries
        .iter()
        .filter_map(|entry| video_from_entry(entry, description_chars))
        .take(max_results)
        .collect())
}

#[derive(Clone)]
pub struct YouTubeCollector {
    client: Client,
    config: AppConfig,
}

impl YouTubeCollector {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(YouTubeCollector { client, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TrendAnalysisError::RetrievalFailure(format!(
                "YouTube {} error: {} - {}",
                what, status, error_text
            )));
        }

        Ok(response.json().await?)
    }

    async fn collect_from_data_api(&self, keyword: &str) -> Result<Vec<VideoRecord>> {
        let max_results = self.config.max_results;
        let mut videos: Vec<VideoRecord> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        tracing::info!(keyword, max_results, "searching YouTube Data API");

        while videos.len() < max_results && pages < self.config.max_pages {
            pages += 1;
            let page_size = API_PAGE_SIZE.min(max_results - videos.len());

            let mut url = format!(
                "{}/search?part=id&type=video&q={}&maxResults={}&key={}",
                self.config.youtube_api_url,
                urlencoding::encode(keyword),
                page_size,
                self.config.youtube_api_key
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let search: SearchResponse = self.get_json(&url, "search").await?;
            let ids: Vec<String> = search.items.into_iter().filter_map(|i| i.id.video_id).collect();
            if ids.is_empty() {
                break;
            }

            let url = format!(
                "{}/videos?part=statistics,snippet&id={}&key={}",
                self.config.youtube_api_url,
                ids.join(","),
                self.config.youtube_api_key
            );
            let details: VideoListResponse = self.get_json(&url, "videos").await?;

            for item in details.items {
                videos.push(video_from_item(item, self.config.description_chars)?);
            }

            page_token = search.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        videos.truncate(max_results);
        tracing::info!(keyword, videos = videos.len(), pages, "collected videos from Data API");
        Ok(videos)
    }

    async fn collect_from_rss_feed(&self, keyword: &str) -> Result<Vec<VideoRecord>> {
        let url = format!(
            "{}?search_query={}",
            self.config.youtube_rss_url,
            urlencoding::encode(keyword)
        );

        tracing::info!(keyword, "fetching YouTube search feed");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrendAnalysisError::RetrievalFailure(format!(
                "YouTube feed error: {}",
                status
            )));
        }
        let content = response.bytes().await?;

        let videos = parse_feed(&content[..], self.config.max_results, self.config.description_chars)?;
        tracing::info!(keyword, videos = videos.len(), "collected videos from feed");
        Ok(videos)
    }
}

impl VideoSource for YouTubeCollector {
    async fn search_videos(&self, keyword: &str) -> Result<Vec<VideoRecord>> {
        if !self.config.youtube_api_key.is_empty() {
            match self.collect_from_data_api(keyword).await {
                Ok(videos) => return Ok(videos),
                Err(e) if self.config.rss_fallback => {
                    tracing::warn!(keyword, error = %e, "YouTube Data API unavailable, falling back to feed")
                }
                Err(e) => return Err(e),
            }
        }

        self.collect_from_rss_feed(keyword).await.map_err(|e| {
            tracing::error!(keyword, error = %e, "all YouTube sources failed");
            TrendAnalysisError::RetrievalFailure(format!("no YouTube source available for '{}': {}", keyword, e))
        })
    }

    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<String>> {
        if self.config.youtube_api_key.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.config.max_comments.min(COMMENT_PAGE_SIZE);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/commentThreads?part=snippet&videoId={}&maxResults={}&textFormat=plainText&order=relevance&key={}",
            self.config.youtube_api_url,
            urlencoding::encode(video_id),
            limit,
            self.config.youtube_api_key
        );
        let threads: CommentThreadsResponse = self.get_json(&url, "commentThreads").await?;

        let comments: Vec<String> = threads
            .items
            .into_iter()
            .filter_map(|t| {
                let snippet = t.snippet.top_level_comment.snippet;
                snippet.text_original.or(snippet.text_display)
            })
            .take(limit)
            .collect();

        tracing::debug!(video_id, comments = comments.len(), "fetched comments");
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn video_item_maps_to_record() {
        let json = r#"{
            "id": "abc123",
            "snippet": {
                "title": "Intro to AI",
                "description": "A long description that keeps going",
                "publishedAt": "2024-03-05T23:59:10Z",
                "thumbnails": {
                    "default": {"url": "https://i.ytimg.com/default.jpg"},
                    "high": {"url": "https://i.ytimg.com/high.jpg"}
                }
            },
            "statistics": {"viewCount": "12345"}
        }"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        let record = video_from_item(item, 6).unwrap();

        assert_eq!(record.video_id, "abc123");
        assert_eq!(record.description, "A long");
        assert_eq!(record.thumbnail, "https://i.ytimg.com/high.jpg");
        assert_eq!(record.published_at, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(record.views, 12345);
        assert_eq!(record.watch_url(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn missing_view_count_is_zero() {
        let json = r#"{
            "id": "x",
            "snippet": {"title": "t", "publishedAt": "2024-01-01T00:00:00Z"}
        }"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        let record = video_from_item(item, 150).unwrap();
        assert_eq!(record.views, 0);
        assert_eq!(record.thumbnail, "");
    }

    #[test]
    fn malformed_publish_date_is_an_error() {
        let json = r#"{
            "id": "x",
            "snippet": {"title": "t", "publishedAt": "yesterday"},
            "statistics": {"viewCount": "1"}
        }"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        assert!(matches!(
            video_from_item(item, 150),
            Err(TrendAnalysisError::DateError(_))
        ));
    }

    #[test]
    fn search_feed_entries_carry_views() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
  <title>search</title>
  <entry>
    <id>yt:video:vid001</id>
    <yt:videoId>vid001</yt:videoId>
    <title>Rust in 100 seconds</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=vid001"/>
    <published>2024-04-02T10:00:00+00:00</published>
    <updated>2024-04-03T10:00:00+00:00</updated>
    <media:group>
      <media:title>Rust in 100 seconds</media:title>
      <media:thumbnail url="https://i.ytimg.com/vi/vid001/hqdefault.jpg" width="480" height="360"/>
      <media:description>Fast overview</media:description>
      <media:community>
        <media:starRating count="10" average="5.00" min="1" max="5"/>
        <media:statistics views="4321"/>
      </media:community>
    </media:group>
  </entry>
</feed>"#;
        let videos = parse_feed(xml.as_bytes(), 10, 150).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "vid001");
        assert_eq!(videos[0].title, "Rust in 100 seconds");
        assert_eq!(videos[0].published_at, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
        assert_eq!(videos[0].views, 4321);
    }
}
