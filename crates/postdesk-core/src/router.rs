// ── Router ──
//
// Current location (path + query) plus the protected-route guard. The
// router is also the `Navigator` handed to the HTTP client, so a failed
// token refresh lands here as a push to `/login`.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use postdesk_api::{LOGIN_PATH, Navigator};

use crate::error::CoreError;
use crate::session::SessionState;

pub const POSTS_PATH: &str = "/posts";

// Only used to resolve relative locations.
const LOCATION_ORIGIN: &str = "http://postdesk.local";

/// A path plus its query parameters, e.g. `/posts?page=2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    /// Parse `"/posts?page=2"` style strings.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let invalid = |e: url::ParseError| CoreError::ValidationFailed {
            message: format!("invalid location {raw:?}: {e}"),
        };
        let url = Url::parse(LOCATION_ORIGIN)
            .and_then(|origin| origin.join(raw))
            .map_err(invalid)?;
        Ok(Self {
            path: url.path().to_owned(),
            query: url.query_pairs().into_owned().collect(),
        })
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Set or clear one query parameter. Returns whether anything changed.
    pub fn set_query_param(&mut self, key: &str, value: Option<String>) -> bool {
        match value {
            Some(v) => self.query.insert(key.to_owned(), v.clone()) != Some(v),
            None => self.query.remove(key).is_some(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Known dashboard routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Posts,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Posts => POSTS_PATH,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            LOGIN_PATH => Some(Self::Login),
            POSTS_PATH => Some(Self::Posts),
            _ => None,
        }
    }

    /// Everything except the login page needs a session.
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// Holds the current location and enforces the auth guard on every push.
#[derive(Debug)]
pub struct Router {
    location: watch::Sender<Location>,
    session: watch::Receiver<SessionState>,
}

impl Router {
    /// Start at `/`, which the guard resolves immediately.
    pub fn new(session: watch::Receiver<SessionState>) -> Self {
        let (location, _) = watch::channel(Location::new("/"));
        let router = Self { location, session };
        router.revalidate();
        router
    }

    pub fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    pub fn route(&self) -> Option<Route> {
        Route::from_path(&self.location.borrow().path)
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }

    /// Navigate to `target`, applying the guard. Unparseable targets are
    /// ignored.
    pub fn push(&self, target: &str) {
        match Location::parse(target) {
            Ok(location) => self.go(location),
            Err(e) => warn!(error = %e, "ignoring navigation"),
        }
    }

    pub fn go(&self, location: Location) {
        let resolved = self.resolve(location);
        debug!(location = %resolved, "navigating");
        self.location.send_if_modified(|current| {
            if *current == resolved {
                return false;
            }
            *current = resolved;
            true
        });
    }

    /// Re-apply the guard to the current location, e.g. after logout.
    pub fn revalidate(&self) {
        self.go(self.location());
    }

    /// Update one query parameter of the current location in place.
    pub fn set_query_param(&self, key: &str, value: Option<String>) {
        self.location
            .send_if_modified(|current| current.set_query_param(key, value));
    }

    fn resolve(&self, location: Location) -> Location {
        let authenticated = self.session.borrow().is_authenticated;
        match Route::from_path(&location.path) {
            Some(Route::Login) if authenticated => Location::new(POSTS_PATH),
            Some(Route::Login) => location,
            _ if !authenticated => Location::new(LOGIN_PATH),
            None if location.path == "/" => Location::new(POSTS_PATH),
            _ => location,
        }
    }
}

impl Navigator for Router {
    fn navigate(&self, path: &str) {
        self.push(path);
    }
}
