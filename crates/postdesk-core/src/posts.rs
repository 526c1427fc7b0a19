// ── Dashboard post list page ──
//
// Page state, the fetched page, the create/edit modal and the three
// mutations. The page number lives in the router's location so the view
// is bookmarkable; the fetched data goes through the shared query cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use postdesk_api::{ApiClient, Paginated, PostCreateUpdate, PostListItem, PostPatch};

use crate::cache::{POSTS_LIST, QueryCache, QueryKey};
use crate::error::CoreError;
use crate::filter::PostFilter;
use crate::notify::Notifier;
use crate::pagination::PageParam;
use crate::router::{Route, Router};

pub type PostPage = Paginated<PostListItem>;

/// Fetch state of the current page.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Loaded(PostPage),
    /// Blocking error panel.
    Failed(String),
}

/// Values the edit modal is pre-filled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub is_published: bool,
}

#[derive(Debug, Default)]
struct ModalState {
    open: bool,
    editing: Option<EditingPost>,
}

/// What the list renders after client-side filtering.
///
/// The "showing" label compares `showing` with `page_rows`, both counts of
/// the fetched page. `total_count` is the server's count for the whole
/// collection and only drives the pager; the filter never sees other pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PostListView {
    pub posts: Vec<PostListItem>,
    pub total_count: u64,
    pub page: u32,
    pub page_count: u64,
    pub showing: usize,
    pub page_rows: usize,
}

/// Clears a pending flag when the mutation finishes, however it ends.
struct Pending<'a>(&'a AtomicBool);

impl<'a> Pending<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct PostListPage {
    client: Arc<ApiClient>,
    router: Arc<Router>,
    cache: Arc<QueryCache<PostPage>>,
    notifier: Notifier,
    page_param: PageParam,
    list: watch::Sender<ListState>,
    modal: Mutex<ModalState>,
    creating: AtomicBool,
    updating: AtomicBool,
    deleting: AtomicBool,
}

impl std::fmt::Debug for PostListPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostListPage")
            .field("page", &self.page())
            .field("list", &*self.list.borrow())
            .finish_non_exhaustive()
    }
}

impl PostListPage {
    pub fn new(
        client: Arc<ApiClient>,
        router: Arc<Router>,
        cache: Arc<QueryCache<PostPage>>,
        notifier: Notifier,
    ) -> Self {
        let (list, _) = watch::channel(ListState::Idle);
        Self {
            client,
            router,
            cache,
            notifier,
            page_param: PageParam::default(),
            list,
            modal: Mutex::new(ModalState::default()),
            creating: AtomicBool::new(false),
            updating: AtomicBool::new(false),
            deleting: AtomicBool::new(false),
        }
    }

    // ── Page state ───────────────────────────────────────────────────

    /// Current page, read from the location (`1` when absent or invalid).
    pub fn page(&self) -> u32 {
        self.page_param.read(&self.router.location())
    }

    /// Move to `page` and fetch it. Page 1 is dropped from the location.
    ///
    /// Only valid while the router sits on the post list; anywhere else
    /// the location is left alone and nothing is fetched.
    pub async fn set_page(&self, page: u32) -> Result<PostPage, CoreError> {
        if self.router.route() != Some(Route::Posts) {
            let location = self.router.location();
            warn!(page, %location, "page change outside the post list");
            return Err(CoreError::ValidationFailed {
                message: format!("cannot change page on {}", location.path),
            });
        }
        self.router
            .set_query_param(self.page_param.key(), self.page_param.encode(page));
        self.load().await
    }

    // ── Data ─────────────────────────────────────────────────────────

    pub fn list_state(&self) -> ListState {
        self.list.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.list.subscribe()
    }

    /// Fetch the current page through the cache.
    pub async fn load(&self) -> Result<PostPage, CoreError> {
        let page = self.page();
        self.list.send_replace(ListState::Loading);

        let client = Arc::clone(&self.client);
        let result = self
            .cache
            .get_or_fetch(QueryKey::posts_list(page), || async move {
                client.list_posts(page).await
            })
            .await;

        match result {
            Ok(data) => {
                debug!(page, count = data.count, rows = data.results.len(), "post page loaded");
                self.list.send_replace(ListState::Loaded(data.clone()));
                Ok(data)
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(page, error = %err, "failed to load posts");
                self.list.send_replace(ListState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// The loaded page with `filter` applied; `None` until a page loads.
    pub fn view(&self, filter: &PostFilter) -> Option<PostListView> {
        let list = self.list.borrow();
        let ListState::Loaded(data) = &*list else {
            return None;
        };
        let posts: Vec<PostListItem> = filter.apply(&data.results).into_iter().cloned().collect();
        Some(PostListView {
            showing: posts.len(),
            page_rows: data.results.len(),
            posts,
            total_count: data.count,
            page: self.page(),
            page_count: data.page_count(),
        })
    }

    // ── Modal ────────────────────────────────────────────────────────

    pub fn open_create_modal(&self) {
        let mut modal = self.modal();
        modal.editing = None;
        modal.open = true;
    }

    pub fn open_edit_modal(&self, post: EditingPost) {
        let mut modal = self.modal();
        modal.editing = Some(post);
        modal.open = true;
    }

    pub fn close_modal(&self) {
        let mut modal = self.modal();
        modal.open = false;
        modal.editing = None;
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal().open
    }

    pub fn editing_post(&self) -> Option<EditingPost> {
        self.modal().editing.clone()
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::Acquire)
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::Acquire)
    }

    pub async fn create(&self, values: &PostCreateUpdate) -> Result<PostCreateUpdate, CoreError> {
        let _pending = Pending::start(&self.creating);
        match self.client.create_post(values).await {
            Ok(created) => {
                self.notifier.success("Post created successfully");
                self.close_modal();
                self.refresh_list().await;
                Ok(created)
            }
            Err(e) => Err(self.mutation_failed("Failed to create post", e)),
        }
    }

    /// Partial update of `id` with every field of `values`.
    pub async fn update(
        &self,
        id: i64,
        values: &PostCreateUpdate,
    ) -> Result<PostCreateUpdate, CoreError> {
        self.patch(id, &PostPatch::from(values.clone())).await
    }

    /// Full replace of `id`. Same notifications and refetch as `patch`.
    pub async fn replace(
        &self,
        id: i64,
        values: &PostCreateUpdate,
    ) -> Result<PostCreateUpdate, CoreError> {
        let _pending = Pending::start(&self.updating);
        match self.client.update_post(id, values).await {
            Ok(updated) => {
                self.notifier.success("Post updated successfully");
                self.close_modal();
                self.refresh_list().await;
                Ok(updated)
            }
            Err(e) => Err(self.mutation_failed("Failed to update post", e)),
        }
    }

    pub async fn patch(&self, id: i64, patch: &PostPatch) -> Result<PostCreateUpdate, CoreError> {
        let _pending = Pending::start(&self.updating);
        match self.client.patch_post(id, patch).await {
            Ok(updated) => {
                self.notifier.success("Post updated successfully");
                self.close_modal();
                self.refresh_list().await;
                Ok(updated)
            }
            Err(e) => Err(self.mutation_failed("Failed to update post", e)),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), CoreError> {
        let _pending = Pending::start(&self.deleting);
        match self.client.delete_post(id).await {
            Ok(()) => {
                self.notifier.success("Post deleted successfully");
                self.refresh_list().await;
                Ok(())
            }
            Err(e) => Err(self.mutation_failed("Failed to delete post", e)),
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn modal(&self) -> std::sync::MutexGuard<'_, ModalState> {
        self.modal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidate the list and refetch it if a page is on screen.
    async fn refresh_list(&self) {
        self.cache.invalidate(POSTS_LIST);
        if matches!(*self.list.borrow(), ListState::Idle) {
            return;
        }
        // A failed refetch shows up in the list state, not in the mutation.
        let _ = self.load().await;
    }

    fn mutation_failed(&self, message: &str, err: postdesk_api::Error) -> CoreError {
        warn!(error = %err, "{message}");
        self.notifier.error(message);
        CoreError::from(err)
    }
}
