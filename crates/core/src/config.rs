use crate::error::{Error, Result};
use crate::types::{ApiConfig, BlogConfig, SiteConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default listing page size, matching the upstream listing behavior
pub const DEFAULT_PAGE_SIZE: u32 = 2;

/// Upper bound the content API places on `pageSize`
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw TOML configuration structure
/// This matches the blog.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    api: RawApi,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    title: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    base_url: String,
    content_type: String,
    page_size: Option<u32>,
}

/// Parse blog.toml from a file path
pub fn parse_blog_toml<P: AsRef<Path>>(path: P) -> Result<BlogConfig> {
    let content = fs::read_to_string(path)?;
    parse_blog_toml_str(&content)
}

/// Parse blog.toml from a string (useful for testing)
pub fn parse_blog_toml_str(content: &str) -> Result<BlogConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.site.title.trim().is_empty() {
        return Err(Error::ConfigParse(
            "Empty 'site.title' field".to_string(),
        ));
    }

    let base_url = validate_base_url(&raw.api.base_url)?;
    let content_type = validate_content_type(&raw.api.content_type)?;

    let page_size = raw.api.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::ConfigParse(format!(
            "'api.page_size' must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, page_size
        )));
    }

    Ok(BlogConfig {
        site: SiteConfig {
            title: raw.site.title,
            description: raw.site.description,
        },
        api: ApiConfig {
            base_url,
            content_type,
            page_size,
        },
    })
}

/// Validate the content API base URL.
///
/// Only absolute http/https URLs with a host are accepted; a trailing
/// slash is stripped so endpoint paths can be appended uniformly.
fn validate_base_url(url: &str) -> Result<String> {
    let url = url.trim();

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::ConfigParse(format!(
                "'api.base_url' must start with http:// or https://, got '{}'",
                url
            ))
        })?;

    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() {
        return Err(Error::ConfigParse(format!(
            "'api.base_url' has no host: '{}'",
            url
        )));
    }

    Ok(url.trim_end_matches('/').to_string())
}

/// Validate the content type identifier.
///
/// The identifier is interpolated into query predicates and endpoint
/// paths, so only the slug alphabet is allowed.
fn validate_content_type(content_type: &str) -> Result<String> {
    let content_type = content_type.trim();

    if content_type.is_empty() {
        return Err(Error::ConfigParse(
            "Empty 'api.content_type' field".to_string(),
        ));
    }

    let ok = content_type
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        return Err(Error::ConfigParse(format!(
            "'api.content_type' may only contain lowercase letters, digits, '-' and '_', got '{}'",
            content_type
        )));
    }

    Ok(content_type.to_string())
}
