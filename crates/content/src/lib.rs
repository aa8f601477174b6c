// Content API access: query-by-type with pagination, get-by-uid, and the
// raw-document mapping into the domain types.

pub mod client;
pub mod document;

pub use client::ContentClient;

use async_trait::async_trait;
use blog_kit_core::types::{Post, PostPage};

/// Fields projected into listing queries
pub const LIST_FETCH_FIELDS: &[&str] = &["title", "subtitle", "author"];

/// Parameters of a listing query
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Field names the API should project into each result
    pub fetch: Vec<String>,
    /// Maximum summaries returned per page
    pub page_size: u32,
}

impl ListQuery {
    pub fn new(fetch: &[&str], page_size: u32) -> Self {
        Self {
            fetch: fetch.iter().map(|f| f.to_string()).collect(),
            page_size,
        }
    }
}

/// A source of post documents.
///
/// Implemented by [`ContentClient`] against the real content API; build
/// and serve take it as a parameter so tests can substitute fixtures.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Query one page of documents of `doc_type`
    async fn query_by_type(&self, doc_type: &str, query: &ListQuery) -> anyhow::Result<PostPage>;

    /// Fetch a follow-up page via the literal `next_page` URL from a
    /// previous response. The URL is opaque; no query parameters are
    /// constructed here.
    async fn fetch_page(&self, url: &str) -> anyhow::Result<PostPage>;

    /// Fetch a single document by uid. `Ok(None)` means the document
    /// does not exist.
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> anyhow::Result<Option<Post>>;
}
