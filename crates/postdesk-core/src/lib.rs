//! Client-side state between `postdesk-api` and its consumers (CLI).
//!
//! This crate owns session, filtering, routing and page logic for the
//! blog dashboard:
//!
//! - **[`Dashboard`]**: Central facade. Restores the [`Session`] from the
//!   persisted record, wires the [`Router`] in as the HTTP client's
//!   navigator, and vends the page controllers.
//!
//! - **[`Session`]**: Who is logged in plus UI preferences, observable via a
//!   `tokio::sync::watch` channel and written through to a [`SnapshotStore`]
//!   on every change. Tokens live in the API crate's `TokenStore` slots.
//!
//! - **[`PostFilterStore`]**: Search text and status filter, one `watch`
//!   channel per field. Provided by a [`FilterScope`].
//!
//! - **[`PostListPage`]**: Bookmarkable page number, cached page fetches,
//!   client-side filtering and create/update/delete with notifications.
//!
//! - **[`AuthFlow`]**: Token exchange and identity fetch at login.

pub mod auth;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod notify;
pub mod pagination;
pub mod persist;
pub mod portal;
pub mod posts;
pub mod router;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthFlow, Credentials};
pub use cache::{QueryCache, QueryKey, STALE_TIME};
pub use config::{ApiConfig, TlsVerification};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use filter::{FilterScope, FilterState, PostFilter, PostFilterStore, StatusFilter};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use pagination::PageParam;
pub use persist::{
    MemorySnapshotStore, PersistedRecord, PersistedState, STORAGE_NAME, STORAGE_VERSION,
    SnapshotStore, Theme,
};
pub use portal::PublicPostsPage;
pub use posts::{EditingPost, ListState, PostListPage, PostListView, PostPage};
pub use router::{Location, POSTS_PATH, Route, Router};
pub use session::{Session, SessionState};

// Model types consumers render directly.
pub use postdesk_api::{
    Comment, CommentCreate, LOGIN_PATH, MemoryTokenStore, Paginated, PostCreateUpdate, PostDetail,
    PostListItem, PostPatch, PublicPostDetail, PublicPostListItem, TokenSlot, TokenStore,
    UserIdentity,
};
