use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const STARTER_CONFIG: &str = r#"# blog-kit configuration

[site]
title = "My Blog"
description = "Notes and essays"

[api]
# Base URL of the headless content API.
base_url = "https://your-repo.cdn.example.com/api/v2"
# Document type queried for posts. The same identifier is used for the
# listing and for detail fetches.
content_type = "posts"
# Summaries fetched per listing page.
page_size = 2
"#;

/// Scaffold a new blog directory
pub async fn run(path: PathBuf) -> Result<()> {
    println!("📝 Initializing blog directory: {}", path.display());

    let config_path = path.join("blog.toml");
    if config_path.exists() {
        anyhow::bail!("blog.toml already exists in {}", path.display());
    }

    fs::create_dir_all(&path).context("Failed to create blog directory")?;
    fs::create_dir_all(path.join("public")).context("Failed to create public directory")?;
    fs::write(&config_path, STARTER_CONFIG).context("Failed to write blog.toml")?;

    println!("   ✓ Created blog.toml");
    println!("   ✓ Created public/ for static assets");
    println!();
    println!("Next steps:");
    println!("   1. Edit {} with your content API details", config_path.display());
    println!("   2. Run 'blog-kit validate {}'", path.display());
    println!("   3. Run 'blog-kit serve {}'", path.display());

    Ok(())
}
