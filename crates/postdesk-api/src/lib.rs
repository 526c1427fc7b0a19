// postdesk-api: Async Rust client for the blog REST API (dashboard + portal)

pub mod client;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod navigation;
pub mod portal;
pub mod token;
pub mod transport;

pub use client::{ApiClient, RequestSpec};
pub use error::Error;
pub use models::{
    AccessToken, Author, Comment, CommentCreate, PAGE_SIZE, Paginated, PostCreateUpdate,
    PostDetail, PostListItem, PostPatch, PublicAuthor, PublicComment, PublicPostDetail,
    PublicPostListItem, TokenPair, UserIdentity,
};
pub use navigation::{LOGIN_PATH, Navigator, NoopNavigator, RecordingNavigator};
pub use portal::PortalClient;
pub use token::{MemoryTokenStore, TokenSlot, TokenStore};
pub use transport::{TlsMode, TransportConfig};

/// API version segment used in versioned paths.
pub const API_VERSION: &str = "v0";

/// Default API base URL when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Which side of the API a resource lives on.
///
/// The dashboard surface requires a bearer token; the portal surface is
/// public and read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSurface {
    Dashboard,
    Portal,
}

impl ApiSurface {
    /// Versioned path prefix for this surface's resources.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Dashboard => "/api/v0/dashboard",
            Self::Portal => "/api/v0/portal",
        }
    }

    /// Collection path for a resource, e.g. `/api/v0/dashboard/posts/`.
    pub fn collection(self, resource: &str) -> String {
        format!("{}/{resource}/", self.prefix())
    }

    /// Item path for a resource, e.g. `/api/v0/portal/posts/3/`.
    pub fn item(self, resource: &str, id: i64) -> String {
        format!("{}/{resource}/{id}/", self.prefix())
    }
}

/// Fixed paths outside the surface prefixes.
pub mod paths {
    /// Token obtain endpoint (email + password → access + refresh).
    pub const TOKEN: &str = "/api/token/";
    /// Token refresh endpoint (refresh → access).
    pub const TOKEN_REFRESH: &str = "/api/v0/token/refresh/";
    /// Current user identity.
    pub const CURRENT_USER: &str = "/api/dashboard/users/me/";
}
