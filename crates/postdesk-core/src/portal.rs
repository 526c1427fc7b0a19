// Public reader page. Page state is local to the page object, not part of
// the location, and nothing here touches the session.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use postdesk_api::{Paginated, PortalClient, PublicPostDetail, PublicPostListItem};

use crate::error::CoreError;

#[derive(Debug)]
pub struct PublicPostsPage {
    client: PortalClient,
    page: AtomicU32,
}

impl PublicPostsPage {
    pub fn new(client: PortalClient) -> Self {
        Self {
            client,
            page: AtomicU32::new(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.load(Ordering::Acquire)
    }

    /// Move to `page` (clamped to 1) and fetch it.
    pub async fn set_page(&self, page: u32) -> Result<Paginated<PublicPostListItem>, CoreError> {
        self.page.store(page.max(1), Ordering::Release);
        self.load().await
    }

    pub async fn load(&self) -> Result<Paginated<PublicPostListItem>, CoreError> {
        let page = self.page();
        debug!(page, "loading public posts");
        Ok(self.client.list_posts(page).await?)
    }

    pub async fn post(&self, id: i64) -> Result<PublicPostDetail, CoreError> {
        Ok(self.client.get_post(id).await?)
    }
}
