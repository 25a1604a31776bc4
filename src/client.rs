use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::error::Error;
use crate::mapping::extract_metadata;
use crate::mode::Mode;
use crate::variants::{select_photo_link, select_video_link, size_to_rank, Variant};

/// One search result reduced to what the download step needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: u64,
    pub link: String,
    pub metadata: BTreeMap<String, String>,
}

impl SearchHit {
    pub fn from_item(mode: Mode, item: &Value, size: &str) -> Result<Self, Error> {
        let id = item.get("id").and_then(Value::as_u64).ok_or_else(|| Error::MissingField("id".into()))?;
        let (link, metadata) = match mode {
            Mode::Images => {
                let src: HashMap<String, String> = field(item, "src")?;
                (select_photo_link(&src, size)?, extract_metadata(item)?)
            }
            Mode::Videos => {
                let files: Vec<Variant> = field(item, "video_files")?;
                (select_video_link(&files, size)?, extract_metadata(&video_as_photo(item))?)
            }
        };
        Ok(Self { id, link, metadata })
    }
}

fn field<T: DeserializeOwned>(item: &Value, name: &str) -> Result<T, Error> {
    let value = item.get(name).ok_or_else(|| Error::MissingField(name.to_string()))?;
    T::deserialize(value).map_err(|e| Error::InvalidField { field: name.to_string(), reason: e.to_string() })
}

/// Map a page of result items, skipping the ones that cannot be mapped. An
/// unknown size name fails the whole page.
pub fn hits_from_items(mode: Mode, items: &[Value], size: &str) -> Result<Vec<SearchHit>, Error> {
    size_to_rank(size)?;
    let mut hits = Vec::with_capacity(items.len());
    for item in items {
        match SearchHit::from_item(mode, item, size) {
            Ok(hit) => hits.push(hit),
            Err(e) => warn!("skipping search result: {}", e),
        }
    }
    Ok(hits)
}

// Videos name their author under `user`; lift it to the photo field names so
// one mapping table serves both modes.
fn video_as_photo(item: &Value) -> Value {
    let user = item.get("user").cloned().unwrap_or(Value::Null);
    json!({
        "url": item.get("url"),
        "photographer": user.get("name"),
        "photographer_id": user.get("id"),
        "photographer_url": user.get("url"),
    })
}

/// Take the result array out of a search response body.
pub fn extract_items(mut body: Value, response_key: &str) -> Result<Vec<Value>, Error> {
    match body.get_mut(response_key).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(Error::MissingField(response_key.to_string())),
    }
}

/// Thin client for the search endpoints. It lists results; fetching the files
/// is left to the caller.
pub struct PexelsClient {
    http: reqwest::Client,
    config: SourceConfig,
    api_key: String,
}

impl PexelsClient {
    pub fn new(config: SourceConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent("pexels-source/0.1").build()?;
        Ok(Self { http, config, api_key: api_key.into() })
    }

    pub fn config(&self) -> &SourceConfig { &self.config }

    /// Raw result items of one search page.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<Value>> {
        let url = self.config.resolve_endpoint_url()?;
        debug!(%url, query, page, "searching");
        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.api_key)
            .query(&[
                ("query", query.to_string()),
                ("per_page", self.config.per_page().to_string()),
                ("page", page.max(1).to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("search failed: HTTP {} from {}", status, url));
        }
        let body: Value = resp.json().await.context("decoding search response")?;
        Ok(extract_items(body, self.config.resolve_response_key())?)
    }

    /// Search and pick the `size` variant of every item. Items that cannot be
    /// mapped are skipped with a warning.
    pub async fn search_hits(&self, query: &str, page: u32, size: &str) -> Result<Vec<SearchHit>> {
        size_to_rank(size)?;
        let items = self.search(query, page).await?;
        Ok(hits_from_items(self.config.mode(), &items, size)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn photo() -> Value {
        json!({
            "id": 2014422,
            "width": 3024,
            "height": 3024,
            "url": "https://www.pexels.com/photo/brown-rocks-2014422/",
            "photographer": "Joey Farina",
            "photographer_url": "https://www.pexels.com/@joey",
            "photographer_id": 680589,
            "src": {
                "original": "https://images.pexels.com/photos/2014422/o.jpeg",
                "large2x": "https://images.pexels.com/photos/2014422/l2.jpeg",
                "tiny": "https://images.pexels.com/photos/2014422/t.jpeg"
            },
            "alt": "Brown Rocks During Golden Hour"
        })
    }

    fn video() -> Value {
        json!({
            "id": 2499611,
            "url": "https://www.pexels.com/video/2499611/",
            "user": { "id": 680589, "name": "Joey Farina", "url": "https://www.pexels.com/@joey" },
            "video_files": [
                { "id": 1, "quality": "sd", "file_type": "video/mp4", "width": 640, "height": 360, "link": "https://v/sd" },
                { "id": 2, "quality": "hd", "file_type": "video/mp4", "width": 1920, "height": 1080, "link": "https://v/hd" }
            ]
        })
    }

    #[test]
    fn photo_hit() {
        let hit = SearchHit::from_item(Mode::Images, &photo(), "large2x").unwrap();
        assert_eq!(hit.id, 2014422);
        assert_eq!(hit.link, "https://images.pexels.com/photos/2014422/l2.jpeg");
        assert_eq!(hit.metadata["Image description"], "Brown Rocks During Golden Hour");
    }

    #[test]
    fn video_hit_uses_user_as_photographer() {
        let hit = SearchHit::from_item(Mode::Videos, &video(), "original").unwrap();
        assert_eq!(hit.link, "https://v/hd");
        assert_eq!(hit.metadata["Photographer name"], "Joey Farina");
        assert_eq!(hit.metadata["Photographer Pexels ID"], "680589");
        assert_eq!(hit.metadata["Source URL"], "https://www.pexels.com/video/2499611/");
    }

    #[test]
    fn video_hit_with_too_few_files_is_out_of_range() {
        let err = SearchHit::from_item(Mode::Videos, &video(), "medium").unwrap_err();
        assert_eq!(err, Error::OutOfRange { index: 3, len: 2 });
    }

    #[test]
    fn malformed_video_files_are_reported_as_such() {
        let mut item = video();
        item["video_files"][1]["width"] = json!("wide");
        match SearchHit::from_item(Mode::Videos, &item, "original").unwrap_err() {
            Error::InvalidField { field, reason } => {
                assert_eq!(field, "video_files");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn page_skips_unmappable_items() {
        let mut no_src = photo();
        no_src["id"] = json!(2);
        no_src.as_object_mut().unwrap().remove("src");
        let mut no_photographer = photo();
        no_photographer["id"] = json!(3);
        no_photographer.as_object_mut().unwrap().remove("photographer");

        let hits = hits_from_items(Mode::Images, &[photo(), no_src, no_photographer], "tiny").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2014422);
        assert_eq!(hits[0].link, "https://images.pexels.com/photos/2014422/t.jpeg");
    }

    #[test]
    fn page_with_unknown_size_fails() {
        let err = hits_from_items(Mode::Images, &[photo()], "huge").unwrap_err();
        assert!(matches!(err, Error::InvalidSize { ref size, .. } if size == "huge"));
        assert!(hits_from_items(Mode::Videos, &[], "huge").is_err());
    }

    #[tokio::test]
    async fn search_sends_query_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("query", "rocks"))
            .and(query_param("per_page", "80"))
            .and(query_param("page", "2"))
            .and(header("authorization", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2, "photos": [photo()] })))
            .mount(&server)
            .await;

        let config = SourceConfig::new(Mode::Images).with_api_url(&server.uri()).unwrap();
        let client = PexelsClient::new(config, "key-1").unwrap();
        let hits = client.search_hits("rocks", 2, "original").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].link, "https://images.pexels.com/photos/2014422/o.jpeg");
    }

    #[tokio::test]
    async fn search_fails_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = SourceConfig::new(Mode::Videos).with_api_url(&server.uri()).unwrap();
        let client = PexelsClient::new(config, "bad").unwrap();
        let err = client.search("rocks", 1).await.unwrap_err();
        assert!(err.to_string().contains("401"), "{err:#}");
    }

    #[test]
    fn items_under_response_key() {
        let body = json!({ "page": 1, "per_page": 80, "photos": [photo(), photo()] });
        assert_eq!(extract_items(body, "photos").unwrap().len(), 2);
    }

    #[test]
    fn missing_response_key_is_an_error() {
        let body = json!({ "page": 1, "videos": [] });
        assert_eq!(extract_items(body, "photos").unwrap_err(), Error::MissingField("photos".into()));
    }
}
