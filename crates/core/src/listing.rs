use crate::types::{PostPage, PostSummary};

/// Client-held state of the incremental post listing.
///
/// The list of summaries is append-only: it grows by flattening each newly
/// fetched page's entries onto the end, and it never reorders or
/// deduplicates. `next_page` always reflects the *last* fetched page, so
/// the load-more control disappears exactly when that page reported no
/// successor.
///
/// At most one load-more request may be outstanding at a time:
/// [`ListingState::begin_load_more`] hands out the next-page URL once and
/// refuses further requests until the load completes or aborts, so rapid
/// repeated triggers cannot append the same page twice.
#[derive(Debug, Default)]
pub struct ListingState {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    in_flight: bool,
}

impl ListingState {
    /// Initialize from the initial listing page
    pub fn from_page(page: PostPage) -> Self {
        Self {
            posts: page.results,
            next_page: page.next_page,
            in_flight: false,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Whether the last fetched page reported a successor
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Start a load-more request.
    ///
    /// Returns the URL to fetch, or `None` if there is no further page or
    /// a request is already in flight. The caller must follow up with
    /// [`ListingState::complete_load_more`] or
    /// [`ListingState::abort_load_more`].
    pub fn begin_load_more(&mut self) -> Option<String> {
        if self.in_flight {
            return None;
        }
        let url = self.next_page.clone()?;
        self.in_flight = true;
        Some(url)
    }

    /// Finish a load-more request with the fetched page.
    ///
    /// Appends each entry of the page's `results` individually (never the
    /// page wrapper) and adopts the page's `next_page`.
    pub fn complete_load_more(&mut self, page: PostPage) {
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.in_flight = false;
    }

    /// Abandon a failed load-more request.
    ///
    /// `next_page` is left untouched so the action stays retryable.
    pub fn abort_load_more(&mut self) {
        self.in_flight = false;
    }
}
