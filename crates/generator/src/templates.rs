use blog_kit_core::types::{Post, PostSummary, SiteConfig};

use crate::{format_date, html_escape, reading_time_label};

/// How the listing page drives load-more
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Written to disk; load-more runs in the browser via loadmore.js
    Static,
    /// Served locally; load-more posts back to the server
    Served,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    pub mode: IndexMode,
    /// Show a retryable notice for a failed load-more (served mode)
    pub load_error: bool,
}

const SITE_CSS: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            background: #f5f5f5;
        }
        header.site {
            background: #1a1d23;
            color: white;
            padding: 1.5rem 2rem;
        }
        header.site a { color: inherit; text-decoration: none; }
        header.site .tagline { color: #aab; font-size: 0.9rem; }
        main.container {
            max-width: 720px;
            margin: 0 auto;
            padding: 2rem;
        }
        .post-summary {
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.08);
            padding: 1.5rem;
            margin-bottom: 1.5rem;
        }
        .post-summary h2 { margin-bottom: 0.25rem; }
        .post-summary h2 a { color: #222; text-decoration: none; }
        .post-summary .subtitle { color: #666; }
        .post-summary footer, .post-meta {
            margin-top: 0.75rem;
            color: #999;
            font-size: 0.9rem;
            display: flex;
            gap: 1.5rem;
        }
        #load-more {
            background: #ff6b35;
            color: white;
            border: none;
            border-radius: 4px;
            padding: 0.75rem 1.5rem;
            font-weight: bold;
            cursor: pointer;
        }
        #load-error { color: #c0392b; margin-top: 1rem; }
        .banner img { width: 100%; max-height: 320px; object-fit: cover; }
        article h1 { font-size: 2rem; margin-bottom: 0.5rem; color: #222; }
        article section { margin-top: 2rem; }
        article section h2 { font-size: 1.3rem; margin-bottom: 0.75rem; color: #222; }
        article section p { margin-bottom: 0.75rem; }
        .loading { text-align: center; padding: 4rem 0; color: #666; }
"#;

/// Shared page shell: head, inline styles, site header
fn page_shell(site: &SiteConfig, page_title: &str, head_extra: &str, body: &str) -> String {
    let tagline = site
        .description
        .as_deref()
        .map(|d| format!(r#"<div class="tagline">{}</div>"#, html_escape(d)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>{head_extra}
    <style>{css}    </style>
</head>
<body>
    <header class="site">
        <h1><a href="/">{site_title}</a></h1>
        {tagline}
    </header>
{body}
</body>
</html>"#,
        title = html_escape(page_title),
        head_extra = head_extra,
        css = SITE_CSS,
        site_title = html_escape(&site.title),
        tagline = tagline,
    )
}

fn summary_html(post: &PostSummary) -> String {
    let date = format_date(post.first_publication_date.as_ref())
        .map(|d| format!("<time>{}</time>", html_escape(&d)))
        .unwrap_or_default();

    format!(
        r#"            <section class="post-summary">
                <h2><a href="/post/{uid}/">{title}</a></h2>
                <p class="subtitle">{subtitle}</p>
                <footer>
                    {date}
                    <span class="author">{author}</span>
                </footer>
            </section>"#,
        uid = html_escape(&post.uid),
        title = html_escape(&post.title),
        subtitle = html_escape(&post.subtitle),
        date = date,
        author = html_escape(&post.author),
    )
}

/// Render the listing page.
///
/// The load-more control is rendered only while `next_page` is non-null;
/// once the last fetched page reports no successor it disappears.
pub fn render_index(
    site: &SiteConfig,
    posts: &[PostSummary],
    next_page: Option<&str>,
    options: &IndexOptions,
) -> String {
    let posts_html: String = posts
        .iter()
        .map(summary_html)
        .collect::<Vec<_>>()
        .join("\n");

    let control = match (options.mode, next_page) {
        (_, None) => String::new(),
        (IndexMode::Static, Some(url)) => format!(
            r#"            <button id="load-more" type="button" data-next-page="{}">Load more posts</button>
            <p id="load-error" hidden>Couldn&#x27;t load more posts. Try again.</p>"#,
            html_escape(url)
        ),
        (IndexMode::Served, Some(_)) => r#"            <form method="post" action="/load-more">
                <button id="load-more" type="submit">Load more posts</button>
            </form>"#
            .to_string(),
    };

    let error_note = if options.load_error {
        "            <p id=\"load-error\">Couldn&#x27;t load more posts. Try again.</p>\n"
    } else {
        ""
    };

    let scripts = match options.mode {
        IndexMode::Static => "\n    <script src=\"/loadmore.js\"></script>",
        IndexMode::Served => concat!(
            "\n    <script>\n",
            "        const eventSource = new EventSource('/_reload');\n",
            "        eventSource.onmessage = () => location.reload();\n",
            "        eventSource.onerror = () => eventSource.close();\n",
            "    </script>"
        ),
    };

    let body = format!(
        r#"    <main class="container">
        <div id="posts">
{posts_html}
        </div>
{error_note}{control}
    </main>{scripts}"#,
    );

    page_shell(site, &site.title, "", &body)
}

/// Render a full post detail page
pub fn render_post(site: &SiteConfig, post: &Post) -> String {
    let banner = post
        .data
        .banner
        .url
        .as_deref()
        .map(|url| {
            format!(
                r#"    <section class="banner"><img src="{}" alt="Banner"></section>
"#,
                html_escape(url)
            )
        })
        .unwrap_or_default();

    let date = format_date(post.first_publication_date.as_ref())
        .map(|d| format!("<time>{}</time>", html_escape(&d)))
        .unwrap_or_default();

    let blocks: String = post
        .data
        .content
        .iter()
        .map(|block| {
            let paragraphs: String = block
                .body
                .iter()
                .map(|span| format!("                <p>{}</p>\n", html_escape(&span.text)))
                .collect();
            format!(
                r#"            <section>
                <h2>{}</h2>
{}            </section>"#,
                html_escape(&block.heading),
                paragraphs
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"{banner}    <main class="container">
        <article>
            <h1>{title}</h1>
            <div class="post-meta">
                {date}
                <span class="author">{author}</span>
                <span class="reading-time">{reading_time}</span>
            </div>
{blocks}
        </article>
    </main>"#,
        banner = banner,
        title = html_escape(&post.data.title),
        date = date,
        author = html_escape(&post.data.author),
        reading_time = html_escape(&reading_time_label(&post.data)),
        blocks = blocks,
    );

    let page_title = format!("{} | {}", post.data.title, site.title);
    page_shell(site, &page_title, "", &body)
}

/// Render the loading placeholder served while a page is generating.
///
/// The page refreshes itself until generation finishes; no partial
/// content is ever shown.
pub fn render_loading(site: &SiteConfig) -> String {
    let body = r#"    <main class="container">
        <div class="loading"><h1>Loading&hellip;</h1></div>
    </main>"#;

    page_shell(
        site,
        &format!("Loading… | {}", site.title),
        "\n    <meta http-equiv=\"refresh\" content=\"1\">",
        body,
    )
}

/// Render the not-found page
pub fn render_not_found(site: &SiteConfig, slug: &str) -> String {
    let body = format!(
        r#"    <main class="container">
        <div class="loading">
            <h1>Post not found</h1>
            <p>No post named &#x27;{}&#x27; exists.</p>
            <p><a href="/">Back to all posts</a></p>
        </div>
    </main>"#,
        html_escape(slug)
    );

    page_shell(site, &format!("Not found | {}", site.title), "", &body)
}
