use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    pub site: SiteConfig,
    pub api: ApiConfig,
}

/// Site presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Content API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the headless content API, without trailing slash
    pub base_url: String,
    /// Document type used for every listing and detail query
    pub content_type: String,
    /// Summaries requested per listing page
    pub page_size: u32,
}

/// A fully hydrated post document, as shown on a detail page.
///
/// Immutable once fetched; identified by `uid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub data: PostData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Banner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One titled section of a post body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<TextSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
}

/// The listing projection of a post.
///
/// Carries only the fields the listing page shows; a summary can never
/// hold a banner or body content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// One page of a paginated listing query.
///
/// `next_page` is `None` exactly when no further pages exist; otherwise it
/// holds the opaque, fully-formed URL of the next page exactly as supplied
/// by the content API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

impl PostPage {
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

impl PostData {
    /// Total word count across title, headings, and body text
    pub fn word_count(&self) -> usize {
        let mut words = self.title.split_whitespace().count();
        for block in &self.content {
            words += block.heading.split_whitespace().count();
            for span in &block.body {
                words += span.text.split_whitespace().count();
            }
        }
        words
    }
}

/// Check that a slug is safe to use as a URL segment and directory name.
///
/// Uids come from the content API; anything outside the slug alphabet is
/// rejected before it can reach the filesystem or a route.
pub fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 128
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
