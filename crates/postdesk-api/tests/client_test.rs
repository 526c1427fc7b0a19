#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` and `PortalClient` using wiremock.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postdesk_api::{
    ApiClient, Error, MemoryTokenStore, PortalClient, PostCreateUpdate, RecordingNavigator,
    TokenStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

const POSTS: &str = "/api/v0/dashboard/posts/";
const REFRESH: &str = "/api/v0/token/refresh/";

struct Harness {
    server: MockServer,
    client: Arc<ApiClient>,
    tokens: Arc<MemoryTokenStore>,
    navigator: Arc<RecordingNavigator>,
}

async fn setup(tokens: MemoryTokenStore) -> Harness {
    let server = MockServer::start().await;
    let tokens = Arc::new(tokens);
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        tokens.clone(),
        navigator.clone(),
    );
    Harness {
        server,
        client: Arc::new(client),
        tokens,
        navigator,
    }
}

fn empty_page() -> serde_json::Value {
    json!({ "count": 0, "next": null, "previous": null, "results": [] })
}

fn post_page() -> serde_json::Value {
    json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{
            "id": 1,
            "title": "Hello",
            "author": { "id": 2, "username": "alice", "email": "a@b.com" },
            "is_published": true,
            "comment_count": 3,
            "created_at": "2024-06-15T10:30:00Z",
            "updated_at": "2024-06-15T10:35:00Z"
        }]
    })
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type"
    }))
}

// ── Request path ────────────────────────────────────────────────────

#[tokio::test]
async fn attaches_bearer_token_when_present() {
    let h = setup(MemoryTokenStore::with_tokens("acc", "ref")).await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(header("authorization", "Bearer acc"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post_page()))
        .expect(1)
        .mount(&h.server)
        .await;

    let page = h.client.list_posts(1).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].author.username, "alice");
    assert!(page.results[0].is_published);
}

#[tokio::test]
async fn sends_unauthenticated_without_token() {
    let h = setup(MemoryTokenStore::new()).await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&h.server)
        .await;

    h.client.list_posts(1).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

// ── Refresh-retry ───────────────────────────────────────────────────

#[tokio::test]
async fn refreshes_once_and_retries_with_new_token() {
    let h = setup(MemoryTokenStore::with_tokens("old", "r1")).await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(header("authorization", "Bearer old"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({ "refresh": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post_page()))
        .expect(1)
        .mount(&h.server)
        .await;

    let page = h.client.list_posts(1).await.unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(h.tokens.access_token().unwrap().expose_secret(), "new");
    assert_eq!(h.tokens.refresh_token().unwrap().expose_secret(), "r1");
    assert!(h.navigator.visited().is_empty());

    // The refresh call itself must be unauthenticated.
    let requests = h.server.received_requests().await.unwrap();
    let refresh = requests.iter().find(|r| r.url.path() == REFRESH).unwrap();
    assert!(refresh.headers.get("authorization").is_none());
}

#[tokio::test]
async fn no_refresh_token_returns_original_failure() {
    let h = setup(MemoryTokenStore::new()).await;
    h.tokens
        .set_access_token(SecretString::from("old".to_owned()));

    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(0)
        .mount(&h.server)
        .await;

    let result = h.client.list_posts(1).await;
    match result {
        Err(Error::Unauthorized { ref message }) => {
            assert!(message.contains("not valid"), "got: {message}");
        }
        other => panic!("expected Unauthorized, got: {other:?}"),
    }
    // Nothing cleared, nothing navigated.
    assert!(h.tokens.access_token().is_some());
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn failed_refresh_clears_tokens_and_redirects_to_login() {
    let h = setup(MemoryTokenStore::with_tokens("old", "expired")).await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token is blacklisted" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.client.list_posts(1).await;

    // The original 401 surfaces, not the refresh failure.
    match result {
        Err(Error::Unauthorized { ref message }) => {
            assert!(!message.contains("blacklisted"), "got: {message}");
        }
        other => panic!("expected Unauthorized, got: {other:?}"),
    }
    assert!(h.tokens.access_token().is_none());
    assert!(h.tokens.refresh_token().is_none());
    assert_eq!(h.navigator.visited(), vec!["/login".to_owned()]);
}

#[tokio::test]
async fn retried_request_401_is_terminal() {
    let h = setup(MemoryTokenStore::with_tokens("old", "r1")).await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.client.list_posts(1).await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })), "got {result:?}");
    // The refresh itself succeeded, so the session survives.
    assert_eq!(h.tokens.access_token().unwrap().expose_secret(), "new");
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn non_401_errors_pass_through() {
    let h = setup(MemoryTokenStore::with_tokens("acc", "r1")).await;

    Mock::given(method("POST"))
        .and(path(POSTS))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "title": ["This field is required."] })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(0)
        .mount(&h.server)
        .await;

    let values = PostCreateUpdate {
        title: String::new(),
        content: "body".into(),
        is_published: false,
    };
    let result = h.client.create_post(&values).await;
    match result {
        Err(Error::Api { status, ref body, .. }) => {
            assert_eq!(status, 400);
            assert!(body.contains("required"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let h = setup(MemoryTokenStore::with_tokens("old", "r1")).await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(header("authorization", "Bearer old"))
        .respond_with(unauthorized())
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let (a, b) = tokio::join!(h.client.list_posts(1), h.client.list_posts(2));
    assert!(a.is_ok(), "{a:?}");
    assert!(b.is_ok(), "{b:?}");
}

// ── Token exchange ──────────────────────────────────────────────────

#[tokio::test]
async fn obtain_token_pair_success() {
    let h = setup(MemoryTokenStore::new()).await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "acc", "refresh": "ref" })),
        )
        .mount(&h.server)
        .await;

    let pair = h
        .client
        .obtain_token_pair("a@b.com", &SecretString::from("x".to_owned()))
        .await
        .unwrap();
    assert_eq!(pair.access, "acc");
    assert_eq!(pair.refresh, "ref");
}

#[tokio::test]
async fn obtain_token_pair_rejected_is_never_refreshed() {
    let h = setup(MemoryTokenStore::with_tokens("stale", "r1")).await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(0)
        .mount(&h.server)
        .await;

    let result = h
        .client
        .obtain_token_pair("a@b.com", &SecretString::from("wrong".to_owned()))
        .await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Dashboard endpoints ─────────────────────────────────────────────

#[tokio::test]
async fn current_user_and_delete() {
    let h = setup(MemoryTokenStore::with_tokens("acc", "ref")).await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": "admin@example.com",
            "username": "admin",
            "is_staff": true
        })))
        .mount(&h.server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v0/dashboard/posts/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let me = h.client.current_user().await.unwrap();
    assert_eq!(me.is_staff, Some(true));
    h.client.delete_post(5).await.unwrap();
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let h = setup(MemoryTokenStore::with_tokens("acc", "ref")).await;

    Mock::given(method("GET"))
        .and(path("/api/v0/dashboard/posts/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&h.server)
        .await;

    let err = h.client.get_post(404).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn update_post_replaces_with_put() {
    let h = setup(MemoryTokenStore::with_tokens("acc", "ref")).await;

    Mock::given(method("PUT"))
        .and(path("/api/v0/dashboard/posts/5/"))
        .and(header("authorization", "Bearer acc"))
        .and(body_json(json!({ "title": "T", "content": "C", "is_published": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "T", "content": "C", "is_published": true
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let values = PostCreateUpdate {
        title: "T".into(),
        content: "C".into(),
        is_published: true,
    };
    let replaced = h.client.update_post(5, &values).await.unwrap();
    assert_eq!(replaced, values);
}

#[tokio::test]
async fn get_comment_by_id() {
    let h = setup(MemoryTokenStore::with_tokens("acc", "ref")).await;

    Mock::given(method("GET"))
        .and(path("/api/v0/dashboard/comments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "post": 5,
            "author": { "id": 2, "username": "bob" },
            "content": "Nice post",
            "created_at": "2024-06-15T10:30:00Z"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let comment = h.client.get_comment(12).await.unwrap();
    assert_eq!(comment.post, 5);
    assert_eq!(comment.author.username, "bob");
    assert_eq!(comment.content, "Nice post");
}

// ── Portal ──────────────────────────────────────────────────────────

#[tokio::test]
async fn portal_lists_without_credentials() {
    let server = MockServer::start().await;
    let portal = PortalClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
    );

    Mock::given(method("GET"))
        .and(path("/api/v0/portal/posts/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 101,
            "next": null,
            "previous": "http://localhost:8000/api/v0/portal/posts/",
            "results": [{
                "id": 9,
                "title": "Public",
                "author": { "id": 2, "username": "alice" },
                "comment_count": 0,
                "created_at": "2024-06-15T10:30:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let page = portal.list_posts(2).await.unwrap();
    assert_eq!(page.count, 101);
    assert_eq!(page.page_count(), 2);
    assert_eq!(page.results[0].author.username, "alice");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}
