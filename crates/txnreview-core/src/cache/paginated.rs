//! Cursor-paginated transaction feed
//!
//! Pages are appended to the accumulated sequence in the order they are
//! requested. `invalidate` bumps a generation counter; a page resolving for
//! an older generation is dropped when stale responses are discarded, and
//! appended otherwise.

use log::{debug, warn};
use std::sync::{Arc, RwLock};

use super::CacheSlot;
use crate::error::CoreResult;
use crate::executor::{RequestExecutor, RequestOptions};
use crate::lock;
use crate::models::{Page, PaginatedRequestParams, Transaction};
use crate::service::operations;

#[derive(Default)]
struct FeedState {
    slot: CacheSlot<Page<Transaction>>,
    generation: u64,
    /// Id of the page fetch currently outstanding in this generation, if any
    fetching: Option<u64>,
    next_fetch_id: u64,
}

impl FeedState {
    /// Release the in-flight gate if `fetch_id` still holds it
    fn finish(&mut self, fetch_id: u64) {
        if self.fetching == Some(fetch_id) {
            self.fetching = None;
            self.slot.is_loading = false;
        }
    }
}

/// Releases the in-flight gate if the fetch future is dropped before it
/// finishes.
struct PendingPage<'a> {
    state: &'a RwLock<FeedState>,
    fetch_id: u64,
}

impl Drop for PendingPage<'_> {
    fn drop(&mut self) {
        lock::write(self.state).finish(self.fetch_id);
    }
}

pub struct PaginatedTransactionCache {
    executor: Arc<RequestExecutor>,
    discard_stale: bool,
    state: RwLock<FeedState>,
}

impl PaginatedTransactionCache {
    pub fn new(executor: Arc<RequestExecutor>, discard_stale: bool) -> Self {
        Self {
            executor,
            discard_stale,
            state: RwLock::new(FeedState::default()),
        }
    }

    /// Fetch the page after the stored cursor and append it.
    ///
    /// A no-op once the last page is reached, and while another page fetch
    /// of the same generation is outstanding.
    pub async fn fetch_next_page(&self) -> CoreResult<()> {
        let (generation, fetch_id, cursor) = {
            let mut state = lock::write(&self.state);
            if state.slot.value.as_ref().is_some_and(Page::is_terminal) {
                debug!(target: "txnreview::cache", "last page already loaded, skipping fetch");
                return Ok(());
            }
            if state.fetching.is_some() {
                debug!(target: "txnreview::cache", "page fetch already in flight, skipping fetch");
                return Ok(());
            }
            state.next_fetch_id += 1;
            let fetch_id = state.next_fetch_id;
            state.fetching = Some(fetch_id);
            state.slot.is_loading = true;
            let cursor = state.slot.value.as_ref().and_then(|page| page.next_page);
            (state.generation, fetch_id, cursor)
        };
        let _pending = PendingPage {
            state: &self.state,
            fetch_id,
        };

        debug!(target: "txnreview::cache", "fetching page {:?} (generation {})", cursor, generation);
        let result = self
            .executor
            .execute::<_, Page<Transaction>>(
                operations::PAGINATED_TRANSACTIONS,
                &PaginatedRequestParams { page: cursor },
                RequestOptions::cached(),
            )
            .await;

        // Released under the same lock that appends, so a follow-up fetch
        // always sees this page's cursor.
        let mut state = lock::write(&self.state);
        state.finish(fetch_id);
        let current = state.generation == generation;
        let page = result?;

        if !current && self.discard_stale {
            warn!(
                target: "txnreview::cache",
                "discarding page {:?} from generation {} (now {})",
                cursor, generation, state.generation
            );
            return Ok(());
        }

        match state.slot.value.as_mut() {
            Some(accumulated) => {
                accumulated.data.extend(page.data);
                accumulated.next_page = page.next_page;
            }
            None => state.slot.value = Some(page),
        }
        Ok(())
    }

    /// Clear the accumulated pages and cursor, regardless of in-flight fetches.
    ///
    /// Outstanding fetches lose the in-flight gate, so the new generation can
    /// fetch its first page right away.
    pub fn invalidate(&self) {
        let mut state = lock::write(&self.state);
        state.generation += 1;
        state.fetching = None;
        state.slot = CacheSlot::default();
    }

    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        lock::read(&self.state)
            .slot
            .value
            .as_ref()
            .map(|page| page.data.clone())
    }

    pub fn value(&self) -> Option<Page<Transaction>> {
        lock::read(&self.state).slot.value.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock::read(&self.state).slot.is_loading
    }

    /// Populated and no further pages exist
    pub fn is_last_page(&self) -> bool {
        lock::read(&self.state)
            .slot
            .value
            .as_ref()
            .is_some_and(Page::is_terminal)
    }
}
