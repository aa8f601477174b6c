use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use blog_kit_content::{ContentClient, ContentSource, LIST_FETCH_FIELDS, ListQuery};
use blog_kit_core::{
    ListingState, PageState, PageStore, parse_blog_toml,
    types::{BlogConfig, valid_slug},
};
use blog_kit_generator::{
    IndexMode, IndexOptions, render_index, render_loading, render_not_found,
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use serde::Deserialize;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use super::build::{enumerate_slugs, generate_post_html};

#[derive(Clone)]
struct AppState {
    config: Arc<BlogConfig>,
    source: Arc<dyn ContentSource>,
    listing: Arc<Mutex<ListingState>>,
    pages: Arc<PageStore>,
    reload_tx: broadcast::Sender<()>,
}

/// Start the local blog server.
///
/// This command:
/// - Validates and loads blog.toml
/// - Fetches the initial listing page and pre-generates every known post
/// - Serves the listing with server-driven load-more
/// - Generates pages on demand for slugs published after startup
/// - Watches blog.toml and triggers hot reload on change
///
/// # Arguments
///
/// * `path` - Path to blog directory containing blog.toml
/// * `port` - Port to serve on (default: 8080)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("🚀 Starting blog server...");
    println!("   Blog: {}", path.display());

    // Validate blog directory exists
    if !path.exists() {
        anyhow::bail!(
            "Blog directory does not exist: {}\nRun 'blog-kit init {}' first",
            path.display(),
            path.display()
        );
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

    println!("   ✓ Loaded: {}", config.site.title);
    println!("   ✓ Content API: {}", config.api.base_url);

    let client = ContentClient::new(&config.api)?;
    let source: Arc<dyn ContentSource> = Arc::new(client);
    let state = build_app_state(config, source).await?;

    // Start config file watcher
    let watcher_path = config_path.clone();
    let watcher_tx = state.reload_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_config(watcher_path, watcher_tx).await {
            eprintln!("File watcher error: {}", e);
        }
    });

    let app = router(state, &path);

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Blog ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Fetch initial data and pre-generate every enumerated post page.
///
/// A failure here is fatal: a page cannot be prebuilt without its data.
async fn build_app_state(config: BlogConfig, source: Arc<dyn ContentSource>) -> Result<AppState> {
    let initial = source
        .query_by_type(
            &config.api.content_type,
            &ListQuery::new(LIST_FETCH_FIELDS, config.api.page_size),
        )
        .await
        .context("Failed to fetch the initial post listing")?;

    let listing = ListingState::from_page(initial);
    println!(
        "   ✓ Listing: {} posts{}",
        listing.len(),
        if listing.has_more() {
            " (more available)"
        } else {
            ""
        }
    );

    let pages = PageStore::new();
    let slugs = enumerate_slugs(&config, source.as_ref()).await?;
    for slug in &slugs {
        match generate_post_html(&config, source.as_ref(), slug).await? {
            Some(html) => pages.insert_ready(slug, html),
            None => anyhow::bail!(
                "Post '{}' vanished from the content API during pre-generation",
                slug
            ),
        }
    }
    println!("   ✓ Pre-generated {} post pages", pages.len());

    let (reload_tx, _) = broadcast::channel(100);

    Ok(AppState {
        config: Arc::new(config),
        source,
        listing: Arc::new(Mutex::new(listing)),
        pages: Arc::new(pages),
        reload_tx,
    })
}

/// Build router
fn router(state: AppState, blog_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/load-more", post(load_more_handler))
        .route("/post/{slug}", get(post_handler))
        .route("/post/{slug}/", get(post_handler))
        .route("/_reload", get(sse_handler))
        .nest_service("/public", ServeDir::new(blog_dir.join("public")))
        .with_state(state)
}

#[derive(Deserialize)]
struct IndexParams {
    error: Option<String>,
}

/// Listing page handler
async fn index_handler(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Html<String> {
    let listing = state.listing.lock().expect("listing lock poisoned");
    let options = IndexOptions {
        mode: IndexMode::Served,
        load_error: params.error.as_deref() == Some("load-more"),
    };
    Html(render_index(
        &state.config.site,
        listing.posts(),
        listing.next_page(),
        &options,
    ))
}

/// Load-more handler: drives the listing state machine.
///
/// `begin_load_more` admits one request at a time, so a double-submitted
/// form cannot append the same page twice; the extra submission just
/// redirects back to the listing.
async fn load_more_handler(State(state): State<AppState>) -> Redirect {
    let url = state
        .listing
        .lock()
        .expect("listing lock poisoned")
        .begin_load_more();

    let Some(url) = url else {
        return Redirect::to("/");
    };

    match state.source.fetch_page(&url).await {
        Ok(page) => {
            state
                .listing
                .lock()
                .expect("listing lock poisoned")
                .complete_load_more(page);
            Redirect::to("/")
        }
        Err(err) => {
            eprintln!("   ⚠ load-more failed: {:#}", err);
            state
                .listing
                .lock()
                .expect("listing lock poisoned")
                .abort_load_more();
            Redirect::to("/?error=load-more")
        }
    }
}

/// Detail page handler.
///
/// Prebuilt and already-generated pages serve immediately. A slug with no
/// entry starts exactly one background generation and serves the loading
/// placeholder until it finishes; failures turn into the not-found page.
async fn post_handler(
    UrlPath(slug): UrlPath<String>,
    State(state): State<AppState>,
) -> Response {
    if !valid_slug(&slug) {
        return not_found_response(&state, &slug);
    }

    match state.pages.get(&slug) {
        Some(PageState::Ready(html)) => Html(html.as_ref().clone()).into_response(),
        Some(PageState::Generating) => loading_response(&state),
        Some(PageState::Missing) => not_found_response(&state, &slug),
        None => {
            if state.pages.begin_generation(&slug) {
                spawn_generation(state.clone(), slug);
            }
            loading_response(&state)
        }
    }
}

fn spawn_generation(state: AppState, slug: String) {
    tokio::spawn(async move {
        match generate_post_html(&state.config, state.source.as_ref(), &slug).await {
            Ok(Some(html)) => {
                println!("   ✓ Generated /post/{}", slug);
                state.pages.complete(&slug, html);
            }
            Ok(None) => {
                println!("   ℹ️  No post '{}' in the content API", slug);
                state.pages.fail(&slug);
            }
            Err(err) => {
                eprintln!("   ⚠ Generation failed for '{}': {:#}", slug, err);
                state.pages.fail(&slug);
            }
        }
    });
}

fn loading_response(state: &AppState) -> Response {
    Html(render_loading(&state.config.site)).into_response()
}

fn not_found_response(state: &AppState, slug: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render_not_found(&state.config.site, slug)),
    )
        .into_response()
}

/// Watch blog.toml and trigger reload on change
async fn watch_config(config_path: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    // Watch the containing directory; editors often replace the file
    let watch_root = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) => {
                if event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == config_path.file_name())
                {
                    println!("   📝 blog.toml changed, reloading...");
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            if rx.recv().await.is_ok() {
                yield Ok(Event::default().data("reload"));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
