//! Catalog client
//!
//! Thin data-fetching collaborator over the station/source API: request,
//! parse the JSON envelope, unwrap `data`. Requests are one-shot; there is
//! no retry or caching layer.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

/// JSON envelope every catalog endpoint wraps its payload in
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    success: bool,
    data: T,
}

/// An ATC station resolvable to a live stream
#[derive(Debug, Clone, Deserialize)]
pub struct AtcStation {
    pub id: String,
    pub name: String,
    pub airport_code: String,
    pub frequency: String,
    pub description: String,
    pub stream_url: String,
}

/// A music source: direct stream or an identifier the server resolves
#[derive(Debug, Clone, Deserialize)]
pub struct MusicSource {
    pub id: String,
    pub name: String,
    pub source_type: String,
    pub stream_url: String,
    pub thumbnail: Option<String>,
}

/// Direct audio stream extracted from a third-party video URL
#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeStreamInfo {
    pub stream_url: String,
    pub title: String,
}

/// Health probe payload
#[derive(Debug, Deserialize)]
struct HealthEnvelope {
    success: bool,
}

/// HTTP client for the catalog API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:3000/api`). A trailing slash is trimmed.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// List ATC stations, each carrying a playable stream URL
    pub async fn atc_stations(&self) -> Result<Vec<AtcStation>> {
        self.fetch("/atc-stations").await
    }

    /// List music sources
    pub async fn music_sources(&self) -> Result<Vec<MusicSource>> {
        self.fetch("/music-sources").await
    }

    /// Liveness probe: true when the API reports healthy
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "catalog health check");
        let envelope: HealthEnvelope = self.http.get(&url).send().await?.json().await?;
        Ok(envelope.success)
    }

    /// Resolve a third-party video URL to a direct playable audio stream
    pub async fn extract_youtube(&self, video_url: &str) -> Result<YoutubeStreamInfo> {
        let url = format!("{}/youtube/extract", self.base_url);
        debug!(url = %url, video_url = %video_url, "extracting stream url");
        let envelope: Envelope<YoutubeStreamInfo> = self
            .http
            .get(&url)
            .query(&[("url", video_url)])
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope.data)
    }

    /// URL of the server-side proxy for a raw stream URL
    pub fn proxy_url(&self, stream_url: &str) -> String {
        format!(
            "{}/proxy/stream?url={}",
            self.base_url,
            urlencode(stream_url)
        )
    }

    /// URL of the server-side resolved stream for a music source id
    pub fn music_stream_url(&self, source_id: &str) -> String {
        format!("{}/stream/music/{}", self.base_url, source_id)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "catalog fetch");
        let envelope: Envelope<T> = self.http.get(&url).send().await?.json().await?;
        Ok(envelope.data)
    }
}

/// Percent-encode a value for use in a query string
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = CatalogClient::new("http://localhost:3000/api/");
        assert_eq!(
            client.music_stream_url("lofi-1"),
            "http://localhost:3000/api/stream/music/lofi-1"
        );
    }

    #[test]
    fn test_proxy_url_encodes_stream_url() {
        let client = CatalogClient::new("http://localhost:3000/api");
        assert_eq!(
            client.proxy_url("https://d.liveatc.net/kjfk_twr?x=1&y=2"),
            "http://localhost:3000/api/proxy/stream?url=https%3A%2F%2Fd.liveatc.net%2Fkjfk_twr%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn test_station_envelope_deserializes() {
        let body = r#"{
            "success": true,
            "data": [{
                "id": "kjfk-twr",
                "name": "JFK Tower",
                "airport_code": "KJFK",
                "frequency": "119.100",
                "description": "New York JFK tower",
                "stream_url": "https://d.liveatc.net/kjfk_twr"
            }]
        }"#;

        let envelope: Envelope<Vec<AtcStation>> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].airport_code, "KJFK");
    }

    #[test]
    fn test_music_source_optional_thumbnail() {
        let body = r#"{
            "success": true,
            "data": [{
                "id": "lofi-1",
                "name": "Lofi Radio",
                "source_type": "stream",
                "stream_url": "https://example.com/lofi"
            }]
        }"#;

        let envelope: Envelope<Vec<MusicSource>> = serde_json::from_str(body).unwrap();
        assert!(envelope.data[0].thumbnail.is_none());
    }
}
