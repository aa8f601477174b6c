use anyhow::{Context, Result};
use blog_kit_core::types::{
    Banner, ContentBlock, Post, PostData, PostPage, PostSummary, TextSpan,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response body of the search endpoint
/// This matches the content API's wire format exactly
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<RawDocument>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub total_results_size: Option<u64>,
}

/// A document as returned by the content API.
///
/// Listing queries project only the fetched fields, so everything below
/// `uid` is optional on the wire and defaulted here.
#[derive(Debug, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: RawData,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub banner: Option<RawBanner>,
    #[serde(default)]
    pub content: Vec<RawBlock>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawBanner {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub body: Vec<RawSpan>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSpan {
    #[serde(default)]
    pub text: String,
}

/// Map a full document into a [`Post`].
///
/// `uid` and `first_publication_date` pass through untouched, content
/// blocks are copied verbatim, and a missing banner (or missing banner
/// url) becomes `None`.
pub fn map_post(doc: RawDocument) -> Result<Post> {
    let uid = require_uid(doc.uid)?;
    let first_publication_date = parse_publication_date(doc.first_publication_date.as_deref())
        .with_context(|| format!("document '{}'", uid))?;

    let banner = Banner {
        url: doc.data.banner.and_then(|banner| banner.url),
    };

    let content = doc
        .data
        .content
        .into_iter()
        .map(|block| ContentBlock {
            heading: block.heading,
            body: block
                .body
                .into_iter()
                .map(|span| TextSpan { text: span.text })
                .collect(),
        })
        .collect();

    Ok(Post {
        uid,
        first_publication_date,
        data: PostData {
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
            banner,
            content,
        },
    })
}

/// Map a listing result into a [`PostSummary`]
pub fn map_summary(doc: RawDocument) -> Result<PostSummary> {
    let uid = require_uid(doc.uid)?;
    let first_publication_date = parse_publication_date(doc.first_publication_date.as_deref())
        .with_context(|| format!("document '{}'", uid))?;

    Ok(PostSummary {
        uid,
        first_publication_date,
        title: doc.data.title,
        subtitle: doc.data.subtitle,
        author: doc.data.author,
    })
}

/// Map a search response into a [`PostPage`]
pub fn map_page(response: SearchResponse) -> Result<PostPage> {
    let results = response
        .results
        .into_iter()
        .map(map_summary)
        .collect::<Result<Vec<_>>>()?;

    Ok(PostPage {
        results,
        next_page: response.next_page,
    })
}

fn require_uid(uid: Option<String>) -> Result<String> {
    match uid {
        Some(uid) if !uid.is_empty() => Ok(uid),
        _ => anyhow::bail!("document has no uid"),
    }
}

fn parse_publication_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid first_publication_date '{}'", raw))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
    }
}
