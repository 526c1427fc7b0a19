// Portal API client
//
// Public, read-only access to published posts. No credentials, no
// interceptor: a failure here is returned exactly as received.

use tracing::debug;
use url::Url;

use crate::ApiSurface;
use crate::client::{check_status, decode_json, join_url};
use crate::error::Error;
use crate::models::{Paginated, PublicPostDetail, PublicPostListItem};
use crate::transport::TransportConfig;

const POSTS: &str = "posts";

/// Unauthenticated client for the public portal surface.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List one page of published posts.
    ///
    /// `GET /api/v0/portal/posts/?page={page}`
    pub async fn list_posts(&self, page: u32) -> Result<Paginated<PublicPostListItem>, Error> {
        let path = ApiSurface::Portal.collection(POSTS);
        let url = join_url(&self.base_url, &path)?;
        debug!(page, "listing published posts");

        let resp = self
            .http
            .get(url)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(Error::Transport)?;
        decode_json(check_status(resp, &path).await?).await
    }

    /// `GET /api/v0/portal/posts/{id}/`
    pub async fn get_post(&self, id: i64) -> Result<PublicPostDetail, Error> {
        let path = ApiSurface::Portal.item(POSTS, id);
        let url = join_url(&self.base_url, &path)?;
        debug!(id, "fetching published post");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        decode_json(check_status(resp, &path).await?).await
    }
}
