use anyhow::{Context, Result};
use async_trait::async_trait;
use blog_kit_core::types::{ApiConfig, Post, PostPage};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::document::{RawDocument, SearchResponse, map_page, map_post};
use crate::{ContentSource, ListQuery};

/// Content API client.
///
/// One fixed upstream, no retries, no local caching; failures propagate
/// to the caller.
pub struct ContentClient {
    client: reqwest::Client,
    base_url: String,
}

impl ContentClient {
    /// Create a new client for the configured content API
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("blog-kit/", env!("CARGO_PKG_VERSION"))
    }

    fn search_url(&self) -> String {
        format!("{}/documents/search", self.base_url)
    }

    fn document_url(&self, doc_type: &str, uid: &str) -> String {
        format!("{}/documents/{}/{}", self.base_url, doc_type, uid)
    }

    async fn read_page(response: reqwest::Response) -> Result<PostPage> {
        let status = response.status();
        let body = response.text().await.context("Failed to read response")?;

        if !status.is_success() {
            anyhow::bail!("Content API error ({}): {}", status, body);
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).context("Failed to parse listing response")?;
        map_page(parsed)
    }
}

/// Predicate selecting every document of one type
fn type_predicate(doc_type: &str) -> String {
    format!("[[at(document.type,{})]]", doc_type)
}

#[async_trait]
impl ContentSource for ContentClient {
    async fn query_by_type(&self, doc_type: &str, query: &ListQuery) -> Result<PostPage> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("q", type_predicate(doc_type)),
                ("fetch", query.fetch.join(",")),
                ("pageSize", query.page_size.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to query documents of type '{}'", doc_type))?;

        Self::read_page(response).await
    }

    async fn fetch_page(&self, url: &str) -> Result<PostPage> {
        // The URL arrives pre-formed from the previous page's `next_page`
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch listing page {}", url))?;

        Self::read_page(response).await
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<Post>> {
        let url = self.document_url(doc_type, uid);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch document '{}'", uid))?;

        if response.status() == 404 {
            return Ok(None);
        }

        let status = response.status();
        let body = response.text().await.context("Failed to read response")?;
        if !status.is_success() {
            anyhow::bail!("Content API error ({}): {}", status, body);
        }

        let raw: RawDocument =
            serde_json::from_str(&body).context("Failed to parse document response")?;
        map_post(raw).map(Some)
    }
}
