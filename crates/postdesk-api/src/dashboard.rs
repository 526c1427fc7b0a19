// Dashboard API endpoints
//
// Posts, comments, and the current user. Every call goes through
// `ApiClient::execute`, so all of them get the bearer header and the
// single refresh-retry.

use reqwest::Method;
use tracing::debug;

use crate::ApiSurface;
use crate::client::{ApiClient, RequestSpec};
use crate::error::Error;
use crate::models::{
    Comment, CommentCreate, Paginated, PostCreateUpdate, PostDetail, PostListItem, PostPatch,
    UserIdentity,
};
use crate::paths;

const POSTS: &str = "posts";
const COMMENTS: &str = "comments";

impl ApiClient {
    // ── Users ────────────────────────────────────────────────────────

    /// Fetch the identity behind the current access token.
    ///
    /// `GET /api/dashboard/users/me/`
    pub async fn current_user(&self) -> Result<UserIdentity, Error> {
        debug!("fetching current user");
        self.request_json(&RequestSpec::get(paths::CURRENT_USER))
            .await
    }

    // ── Posts ────────────────────────────────────────────────────────

    /// List one page of posts (newest first).
    ///
    /// `GET /api/v0/dashboard/posts/?page={page}`
    pub async fn list_posts(&self, page: u32) -> Result<Paginated<PostListItem>, Error> {
        debug!(page, "listing posts");
        let spec = RequestSpec::get(ApiSurface::Dashboard.collection(POSTS)).with_query("page", page);
        self.request_json(&spec).await
    }

    /// `GET /api/v0/dashboard/posts/{id}/`
    pub async fn get_post(&self, id: i64) -> Result<PostDetail, Error> {
        debug!(id, "fetching post");
        self.request_json(&RequestSpec::get(ApiSurface::Dashboard.item(POSTS, id)))
            .await
    }

    /// `POST /api/v0/dashboard/posts/`
    pub async fn create_post(&self, values: &PostCreateUpdate) -> Result<PostCreateUpdate, Error> {
        debug!(title = %values.title, "creating post");
        let spec = RequestSpec::new(Method::POST, ApiSurface::Dashboard.collection(POSTS))
            .with_json(values)?;
        self.request_json(&spec).await
    }

    /// Full replace. `PUT /api/v0/dashboard/posts/{id}/`
    pub async fn update_post(
        &self,
        id: i64,
        values: &PostCreateUpdate,
    ) -> Result<PostCreateUpdate, Error> {
        debug!(id, "replacing post");
        let spec =
            RequestSpec::new(Method::PUT, ApiSurface::Dashboard.item(POSTS, id)).with_json(values)?;
        self.request_json(&spec).await
    }

    /// Partial update. `PATCH /api/v0/dashboard/posts/{id}/`
    pub async fn patch_post(&self, id: i64, patch: &PostPatch) -> Result<PostCreateUpdate, Error> {
        debug!(id, "patching post");
        let spec =
            RequestSpec::new(Method::PATCH, ApiSurface::Dashboard.item(POSTS, id)).with_json(patch)?;
        self.request_json(&spec).await
    }

    /// `DELETE /api/v0/dashboard/posts/{id}/`
    pub async fn delete_post(&self, id: i64) -> Result<(), Error> {
        debug!(id, "deleting post");
        self.request_empty(&RequestSpec::delete(ApiSurface::Dashboard.item(POSTS, id)))
            .await
    }

    // ── Comments ─────────────────────────────────────────────────────

    /// `GET /api/v0/dashboard/comments/?page={page}`
    pub async fn list_comments(&self, page: u32) -> Result<Paginated<Comment>, Error> {
        debug!(page, "listing comments");
        let spec =
            RequestSpec::get(ApiSurface::Dashboard.collection(COMMENTS)).with_query("page", page);
        self.request_json(&spec).await
    }

    /// `GET /api/v0/dashboard/comments/{id}/`
    pub async fn get_comment(&self, id: i64) -> Result<Comment, Error> {
        debug!(id, "fetching comment");
        self.request_json(&RequestSpec::get(ApiSurface::Dashboard.item(COMMENTS, id)))
            .await
    }

    /// `POST /api/v0/dashboard/comments/`
    pub async fn create_comment(&self, comment: &CommentCreate) -> Result<CommentCreate, Error> {
        debug!(post = comment.post, "creating comment");
        let spec = RequestSpec::new(Method::POST, ApiSurface::Dashboard.collection(COMMENTS))
            .with_json(comment)?;
        self.request_json(&spec).await
    }

    /// `DELETE /api/v0/dashboard/comments/{id}/`
    pub async fn delete_comment(&self, id: i64) -> Result<(), Error> {
        debug!(id, "deleting comment");
        self.request_empty(&RequestSpec::delete(ApiSurface::Dashboard.item(COMMENTS, id)))
            .await
    }
}
