// ── Dashboard ──
//
// Wires the session, router, HTTP client, query cache, notifications and
// page controllers into one cheaply cloneable handle. Nothing here does
// I/O on construction; the first request happens when a page loads or a
// login is submitted.

use std::sync::Arc;

use tracing::{debug, info};

use postdesk_api::{ApiClient, LOGIN_PATH, Navigator, PortalClient, TokenStore};

use crate::auth::AuthFlow;
use crate::cache::QueryCache;
use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::filter::FilterScope;
use crate::notify::{Notification, Notifier};
use crate::persist::SnapshotStore;
use crate::portal::PublicPostsPage;
use crate::posts::{PostListPage, PostPage};
use crate::router::Router;
use crate::session::Session;

/// Navigator handed to the HTTP client.
///
/// A forced trip to the login page means the refresh failed and the
/// tokens are gone. The session identity, cached pages and filter store
/// are all dropped before the router sees the push, the same as an
/// explicit logout. Otherwise the guard would bounce straight back and
/// the next user would be served the previous user's pages.
struct SessionRedirect {
    session: Arc<Session>,
    router: Arc<Router>,
    cache: Arc<QueryCache<PostPage>>,
    filters: Arc<FilterScope>,
}

impl Navigator for SessionRedirect {
    fn navigate(&self, path: &str) {
        if path == LOGIN_PATH && self.session.is_authenticated() {
            info!("session expired, logging out");
            self.session.logout();
            self.cache.clear();
            self.filters.deactivate();
        }
        self.router.push(path);
    }
}

/// The main entry point for consumers.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: ApiConfig,
    session: Arc<Session>,
    router: Arc<Router>,
    client: Arc<ApiClient>,
    cache: Arc<QueryCache<PostPage>>,
    notifier: Notifier,
    filters: Arc<FilterScope>,
    auth: AuthFlow,
    posts: PostListPage,
    portal: PublicPostsPage,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("session", &self.inner.session)
            .field("location", &self.inner.router.location().to_string())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Restore the session from `snapshots` and wire everything against
    /// `config`.
    pub fn new(
        config: ApiConfig,
        tokens: Arc<dyn TokenStore>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Result<Self, CoreError> {
        let transport = config.transport();
        let session = Arc::new(Session::restore(tokens, snapshots));
        let router = Arc::new(Router::new(session.subscribe()));
        let cache = Arc::new(QueryCache::default());
        let filters = Arc::new(FilterScope::new());

        let redirect: Arc<dyn Navigator> = Arc::new(SessionRedirect {
            session: Arc::clone(&session),
            router: Arc::clone(&router),
            cache: Arc::clone(&cache),
            filters: Arc::clone(&filters),
        });
        let client = Arc::new(ApiClient::new(
            config.base_url.clone(),
            &transport,
            Arc::clone(session.tokens()),
            redirect,
        )?);
        let portal = PublicPostsPage::new(PortalClient::new(config.base_url.clone(), &transport)?);

        let notifier = Notifier::new();
        let auth = AuthFlow::new(
            Arc::clone(&client),
            Arc::clone(&session),
            Arc::clone(&router) as Arc<dyn Navigator>,
            Arc::clone(&cache),
        );
        let posts = PostListPage::new(
            Arc::clone(&client),
            Arc::clone(&router),
            Arc::clone(&cache),
            notifier.clone(),
        );

        debug!(base_url = %config.base_url, "dashboard wired");
        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                session,
                router,
                client,
                cache,
                notifier,
                filters,
                auth,
                posts,
                portal,
            }),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.inner.router
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.inner.client
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.inner.auth
    }

    pub fn posts(&self) -> &PostListPage {
        &self.inner.posts
    }

    pub fn portal(&self) -> &PublicPostsPage {
        &self.inner.portal
    }

    /// Provider for the post list's filter store.
    pub fn filters(&self) -> &FilterScope {
        &self.inner.filters
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub fn subscribe_notifications(&self) -> tokio::sync::broadcast::Receiver<Notification> {
        self.inner.notifier.subscribe()
    }

    /// Log out, drop cached pages and the filter store, land on `/login`.
    pub fn logout(&self) {
        self.inner.auth.logout();
        self.inner.cache.clear();
        self.inner.filters.deactivate();
    }

    /// Navigate to `target` through the auth guard.
    pub fn navigate(&self, target: &str) {
        self.inner.router.push(target);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persist::MemorySnapshotStore;
    use crate::router::Route;
    use postdesk_api::{MemoryTokenStore, UserIdentity};

    fn dashboard() -> Dashboard {
        Dashboard::new(
            ApiConfig::default(),
            Arc::new(MemoryTokenStore::new()),
            Arc::new(MemorySnapshotStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn starts_on_login_without_session() {
        let dash = dashboard();
        assert_eq!(dash.router().route(), Some(Route::Login));
        assert!(!dash.session().is_authenticated());
    }

    #[test]
    fn forced_login_redirect_drops_identity() {
        let dash = dashboard();
        dash.session().set_user(Some(UserIdentity {
            id: 1,
            email: "a@b.com".into(),
            username: "alice".into(),
            is_staff: None,
            bio: None,
            date_joined: None,
        }));
        dash.navigate("/posts");
        assert_eq!(dash.router().route(), Some(Route::Posts));

        dash.filters().activate().set_search_query("secret");

        let redirect = SessionRedirect {
            session: Arc::clone(dash.session()),
            router: Arc::clone(dash.router()),
            cache: Arc::clone(&dash.inner.cache),
            filters: Arc::clone(&dash.inner.filters),
        };
        redirect.navigate(LOGIN_PATH);
        assert!(!dash.session().is_authenticated());
        assert!(!dash.filters().is_active());
        assert_eq!(dash.router().route(), Some(Route::Login));
    }
}
