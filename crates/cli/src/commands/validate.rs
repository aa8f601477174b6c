use anyhow::{Context, Result};
use blog_kit_content::{ContentClient, ContentSource, LIST_FETCH_FIELDS, ListQuery};
use blog_kit_core::parse_blog_toml;
use std::path::PathBuf;

/// Validate blog.toml and confirm the content API answers
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating blog at: {}", path.display());

    let config_path = path.join("blog.toml");
    let config = parse_blog_toml(&config_path).context("Failed to parse blog.toml")?;

    println!("✓ blog.toml valid");
    println!("  Site: {}", config.site.title);
    println!("  API: {}", config.api.base_url);
    println!(
        "  Content type: {} (page size {})",
        config.api.content_type, config.api.page_size
    );

    let client = ContentClient::new(&config.api)?;
    let probe = client
        .query_by_type(&config.api.content_type, &ListQuery::new(LIST_FETCH_FIELDS, 1))
        .await
        .context("Content API is not reachable")?;

    println!("✓ Content API reachable");
    if probe.results.is_empty() {
        println!(
            "  ⚠ No documents of type '{}' found yet",
            config.api.content_type
        );
    } else {
        println!(
            "  Documents of type '{}' found{}",
            config.api.content_type,
            if probe.has_more() {
                " (more than one page)"
            } else {
                ""
            }
        );
    }

    Ok(())
}
