// Wire types for the blog REST API
//
// Field names follow the API's snake_case JSON. Timestamps are RFC 3339
// and parsed into `chrono::DateTime<Utc>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side page size for every paginated collection.
pub const PAGE_SIZE: u32 = 100;

// ── Pagination ──────────────────────────────────────────────────────

/// DRF page-number pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of items across all pages.
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Paginated<T> {
    /// Number of pages needed for `count` items at [`PAGE_SIZE`].
    pub fn page_count(&self) -> u64 {
        self.count.div_ceil(u64::from(PAGE_SIZE)).max(1)
    }
}

// ── Auth ────────────────────────────────────────────────────────────

/// `POST /api/token/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// `POST /api/v0/token/refresh/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

/// The authenticated user, as returned by `/users/me/`.
///
/// Replaced wholesale on re-login; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_staff: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

// ── Dashboard ───────────────────────────────────────────────────────

/// Author block embedded in dashboard posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Row of the dashboard post list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: i64,
    pub title: String,
    pub author: Author,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full dashboard post with its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: Author,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for create and full update; also the create/update response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreateUpdate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_published: bool,
}

/// Body for `PATCH`. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_published.is_none()
    }
}

impl From<PostCreateUpdate> for PostPatch {
    fn from(values: PostCreateUpdate) -> Self {
        Self {
            title: Some(values.title),
            content: Some(values.content),
            is_published: Some(values.is_published),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post: i64,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreate {
    pub post: i64,
    pub content: String,
}

// ── Portal ──────────────────────────────────────────────────────────

/// Public author block: no email, no bio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAuthor {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPostListItem {
    pub id: i64,
    pub title: String,
    pub author: PublicAuthor,
    #[serde(default)]
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicComment {
    pub id: i64,
    pub author: PublicAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPostDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: PublicAuthor,
    #[serde(default)]
    pub comments: Vec<PublicComment>,
    pub created_at: DateTime<Utc>,
}
