use anyhow::{Context, Result};
use blog_kit_content::{ContentClient, ContentSource, LIST_FETCH_FIELDS, ListQuery};
use blog_kit_core::parse_blog_toml;
use blog_kit_core::types::{BlogConfig, valid_slug};
use blog_kit_generator::{IndexMode, IndexOptions, loadmore_js, render_index, render_post};
use std::fs;
use std::path::{Path, PathBuf};

/// What a build produced
#[derive(Debug)]
pub struct BuildSummary {
    pub listing_entries: usize,
    pub listing_has_more: bool,
    pub posts_built: usize,
    pub assets_copied: usize,
}

/// Build static site for deployment
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    // Validate blog directory exists
    if !path.exists() {
        anyhow::bail!("Blog directory does not exist: {}", path.display());
    }

    let config_path = path.join("blog.toml");
    if !config_path.exists() {
        anyhow::bail!(
            "blog.toml not found in {}\nRun 'blog-kit init {}' first",
            path.display(),
            path.display()
        );
    }

    let config = parse_blog_toml(&config_path).context("Failed to parse blog.toml")?;

    println!("✓ Loaded: {}", config.site.title);
    println!("  Content API: {}", config.api.base_url);
    println!();

    let client = ContentClient::new(&config.api)?;
    let summary = build_static_site(&config, &client, &path, &output).await?;

    println!();
    println!("✅ Build complete!");
    println!(
        "   Listing: {} posts{}",
        summary.listing_entries,
        if summary.listing_has_more {
            " (further pages load in the browser)"
        } else {
            ""
        }
    );
    println!("   Post pages: {}", summary.posts_built);
    println!("   Output: {}", output.display());

    Ok(())
}

/// Build the whole site into `output`.
///
/// Any content API failure aborts the build: a page cannot be prebuilt
/// without its data.
pub async fn build_static_site(
    config: &BlogConfig,
    source: &dyn ContentSource,
    blog_dir: &Path,
    output: &Path,
) -> Result<BuildSummary> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    // Listing page: one query, projecting only the listing fields
    println!("📄 Generating listing page...");
    let initial = source
        .query_by_type(
            &config.api.content_type,
            &ListQuery::new(LIST_FETCH_FIELDS, config.api.page_size),
        )
        .await
        .context("Failed to fetch the initial post listing")?;

    let index_html = render_index(
        &config.site,
        &initial.results,
        initial.next_page.as_deref(),
        &IndexOptions {
            mode: IndexMode::Static,
            load_error: false,
        },
    );
    fs::write(output.join("index.html"), index_html).context("Failed to write index.html")?;
    fs::write(output.join("loadmore.js"), loadmore_js())
        .context("Failed to write loadmore.js")?;
    println!("   ✓ Generated index.html and loadmore.js");

    // Every known slug gets a prebuilt page
    println!("🔍 Enumerating posts...");
    let slugs = enumerate_slugs(config, source).await?;
    println!("   ✓ Found {} posts", slugs.len());

    println!("📝 Generating post pages...");
    let mut posts_built = 0;
    for slug in &slugs {
        let html = generate_post_html(config, source, slug)
            .await?
            .with_context(|| format!("Post '{}' vanished from the content API mid-build", slug))?;

        let page_dir = output.join("post").join(slug);
        fs::create_dir_all(&page_dir)
            .with_context(|| format!("Failed to create {}", page_dir.display()))?;
        fs::write(page_dir.join("index.html"), html)
            .with_context(|| format!("Failed to write page for '{}'", slug))?;

        println!("   ✓ post/{}/index.html", slug);
        posts_built += 1;
    }

    // Static assets
    let assets_copied = copy_public_assets(blog_dir, output)?;
    if assets_copied > 0 {
        println!("   ✓ Copied {} static assets", assets_copied);
    }

    Ok(BuildSummary {
        listing_entries: initial.results.len(),
        listing_has_more: initial.has_more(),
        posts_built,
        assets_copied,
    })
}

/// Collect every post uid, following `next_page` until the listing is
/// exhausted
pub async fn enumerate_slugs(
    config: &BlogConfig,
    source: &dyn ContentSource,
) -> Result<Vec<String>> {
    let mut slugs = Vec::new();
    let mut current = source
        .query_by_type(
            &config.api.content_type,
            &ListQuery::new(LIST_FETCH_FIELDS, config.api.page_size),
        )
        .await
        .context("Failed to enumerate posts")?;

    loop {
        for summary in &current.results {
            if !valid_slug(&summary.uid) {
                anyhow::bail!("Refusing unsafe post uid '{}'", summary.uid);
            }
            slugs.push(summary.uid.clone());
        }

        match current.next_page.take() {
            Some(url) => {
                current = source
                    .fetch_page(&url)
                    .await
                    .context("Failed to fetch listing page")?;
            }
            None => break,
        }
    }

    Ok(slugs)
}

/// Fetch one post and render its detail page.
///
/// `Ok(None)` means the content API has no such document.
pub async fn generate_post_html(
    config: &BlogConfig,
    source: &dyn ContentSource,
    slug: &str,
) -> Result<Option<String>> {
    let post = source.get_by_uid(&config.api.content_type, slug).await?;
    Ok(post.map(|post| render_post(&config.site, &post)))
}

/// Copy top-level files from the blog's public/ directory into the output
fn copy_public_assets(blog_dir: &Path, output: &Path) -> Result<usize> {
    let src = blog_dir.join("public");
    if !src.exists() {
        return Ok(0);
    }

    let dst = output.join("public");
    fs::create_dir_all(&dst).context("Failed to create public output directory")?;

    let mut copied = 0;
    for entry in fs::read_dir(&src)? {
        let entry = entry?;
        let src_path = entry.path();
        if src_path.is_file() {
            fs::copy(&src_path, dst.join(entry.file_name()))
                .with_context(|| format!("Failed to copy {}", src_path.display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blog_kit_core::types::{
        ApiConfig, Banner, Post, PostData, PostPage, PostSummary, SiteConfig,
    };
    use std::collections::HashMap;

    fn test_config() -> BlogConfig {
        BlogConfig {
            site: SiteConfig {
                title: "Space Traveling".to_string(),
                description: None,
            },
            api: ApiConfig {
                base_url: "https://api.example.com/v2".to_string(),
                content_type: "posts".to_string(),
                page_size: 2,
            },
        }
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: format!("Title of {}", uid),
            subtitle: "sub".to_string(),
            author: "author".to_string(),
        }
    }

    fn post(uid: &str) -> Post {
        Post {
            uid: uid.to_string(),
            first_publication_date: None,
            data: PostData {
                title: format!("Title of {}", uid),
                subtitle: "sub".to_string(),
                author: "author".to_string(),
                banner: Banner::default(),
                content: vec![],
            },
        }
    }

    struct FakeSource {
        initial: PostPage,
        pages: HashMap<String, PostPage>,
        posts: HashMap<String, Post>,
    }

    impl FakeSource {
        fn paginated(uids_per_page: &[&[&str]]) -> Self {
            let mut pages = HashMap::new();
            let mut posts = HashMap::new();
            let url_for = |index: usize| format!("https://api.example.com/search?page={}", index + 1);

            let mut built: Vec<PostPage> = uids_per_page
                .iter()
                .enumerate()
                .map(|(i, uids)| PostPage {
                    results: uids.iter().map(|uid| summary(uid)).collect(),
                    next_page: (i + 1 < uids_per_page.len()).then(|| url_for(i + 1)),
                })
                .collect();

            for uids in uids_per_page {
                for uid in *uids {
                    posts.insert(uid.to_string(), post(uid));
                }
            }

            let initial = built.remove(0);
            for (i, page) in built.into_iter().enumerate() {
                pages.insert(url_for(i + 1), page);
            }

            Self {
                initial,
                pages,
                posts,
            }
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn query_by_type(
            &self,
            _doc_type: &str,
            _query: &ListQuery,
        ) -> anyhow::Result<PostPage> {
            Ok(self.initial.clone())
        }

        async fn fetch_page(&self, url: &str) -> anyhow::Result<PostPage> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no page at {}", url))
        }

        async fn get_by_uid(&self, _doc_type: &str, uid: &str) -> anyhow::Result<Option<Post>> {
            Ok(self.posts.get(uid).cloned())
        }
    }

    #[tokio::test]
    async fn test_enumerate_slugs_follows_next_page() {
        let source = FakeSource::paginated(&[&["a", "b"], &["c", "d"], &["e"]]);
        let slugs = enumerate_slugs(&test_config(), &source).await.unwrap();
        assert_eq!(slugs, ["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_enumerate_slugs_rejects_unsafe_uid() {
        let source = FakeSource::paginated(&[&["fine", "../evil"]]);
        let result = enumerate_slugs(&test_config(), &source).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unsafe post uid"));
    }

    #[tokio::test]
    async fn test_build_writes_one_page_per_slug() {
        let source = FakeSource::paginated(&[&["a", "b"], &["c"]]);
        let blog_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let summary = build_static_site(&test_config(), &source, blog_dir.path(), out.path())
            .await
            .unwrap();

        assert_eq!(summary.posts_built, 3);
        assert_eq!(summary.listing_entries, 2);
        assert!(summary.listing_has_more);

        for uid in ["a", "b", "c"] {
            let page = out.path().join("post").join(uid).join("index.html");
            let html = fs::read_to_string(page).unwrap();
            assert!(html.contains(&format!("Title of {}", uid)));
        }
    }

    #[tokio::test]
    async fn test_build_listing_page_and_script() {
        let source = FakeSource::paginated(&[&["a", "b"], &["c"]]);
        let blog_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        build_static_site(&test_config(), &source, blog_dir.path(), out.path())
            .await
            .unwrap();

        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        // Only the first page of summaries is prerendered
        assert!(index.contains("Title of a"));
        assert!(index.contains("Title of b"));
        assert!(!index.contains("Title of c"));
        // Browser-side load-more picks up from the embedded next_page URL
        assert!(index.contains("data-next-page=\"https://api.example.com/search?page=2\""));
        assert!(out.path().join("loadmore.js").is_file());
    }

    #[tokio::test]
    async fn test_build_without_further_pages_hides_control() {
        let source = FakeSource::paginated(&[&["a"]]);
        let blog_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        build_static_site(&test_config(), &source, blog_dir.path(), out.path())
            .await
            .unwrap();

        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(!index.contains(r#"id="load-more""#));
    }

    #[tokio::test]
    async fn test_build_fails_when_post_vanishes() {
        let mut source = FakeSource::paginated(&[&["a", "b"]]);
        source.posts.remove("b");
        let blog_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let result = build_static_site(&test_config(), &source, blog_dir.path(), out.path()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("vanished"));
    }

    #[tokio::test]
    async fn test_build_copies_public_assets() {
        let source = FakeSource::paginated(&[&["a"]]);
        let blog_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(blog_dir.path().join("public")).unwrap();
        fs::write(blog_dir.path().join("public").join("logo.svg"), "<svg/>").unwrap();
        let out = tempfile::tempdir().unwrap();

        let summary = build_static_site(&test_config(), &source, blog_dir.path(), out.path())
            .await
            .unwrap();

        assert_eq!(summary.assets_copied, 1);
        assert!(out.path().join("public").join("logo.svg").is_file());
    }
}
