use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Lifecycle state of a single detail page
#[derive(Debug, Clone)]
pub enum PageState {
    /// Generation is running; show the loading placeholder
    Generating,
    /// Rendered page, servable immediately
    Ready(Arc<String>),
    /// Generation failed or the document does not exist
    Missing,
}

impl PageState {
    pub fn is_ready(&self) -> bool {
        matches!(self, PageState::Ready(_))
    }
}

/// Shared store of per-slug detail pages.
///
/// Pages generated up front enter directly as `Ready`. A slug with no
/// entry may be claimed for on-demand generation via
/// [`PageStore::begin_generation`], which admits exactly one generator:
/// concurrent requests for the same slug observe `Generating` and serve
/// the placeholder instead of starting a second generation.
#[derive(Debug, Default)]
pub struct PageStore {
    inner: RwLock<HashMap<String, PageState>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slug: &str) -> Option<PageState> {
        self.inner
            .read()
            .expect("page store lock poisoned")
            .get(slug)
            .cloned()
    }

    /// Store a page generated up front
    pub fn insert_ready(&self, slug: &str, html: String) {
        self.inner
            .write()
            .expect("page store lock poisoned")
            .insert(slug.to_string(), PageState::Ready(Arc::new(html)));
    }

    /// Claim a slug for on-demand generation.
    ///
    /// Returns `true` if the caller should generate the page; `false` if
    /// another state is already recorded for the slug.
    pub fn begin_generation(&self, slug: &str) -> bool {
        let mut inner = self.inner.write().expect("page store lock poisoned");
        if inner.contains_key(slug) {
            return false;
        }
        inner.insert(slug.to_string(), PageState::Generating);
        true
    }

    /// Finish a generation claimed with [`PageStore::begin_generation`]
    pub fn complete(&self, slug: &str, html: String) {
        self.inner
            .write()
            .expect("page store lock poisoned")
            .insert(slug.to_string(), PageState::Ready(Arc::new(html)));
    }

    /// Record a failed generation; the slug serves not-found from now on
    pub fn fail(&self, slug: &str) {
        self.inner
            .write()
            .expect("page store lock poisoned")
            .insert(slug.to_string(), PageState::Missing);
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("page store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
