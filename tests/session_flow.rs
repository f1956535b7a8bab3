//! End-to-end session flows through the wired `App` against a mock API.

use std::rc::Rc;

use serde_json::json;
use shortlink_client::net::transport::Navigator;
use shortlink_client::net::types::ResourceId;
use shortlink_client::router::NavigationOutcome;
use shortlink_client::router::history::{HistoryBackend, MemoryHistory};
use shortlink_client::router::routes::{Location, RouteName};
use shortlink_client::state::credentials::{TOKEN_KEY, USER_KEY};
use shortlink_client::util::dark_mode::HeadlessSurface;
use shortlink_client::util::storage::{KeyValueStorage, MemoryStorage};
use shortlink_client::{App, ClientConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ada() -> serde_json::Value {
    json!({ "id": 1, "email": "ada@example.com", "name": "Ada" })
}

fn app(server: &MockServer, storage: &MemoryStorage, initial: &str) -> App {
    App::new(
        ClientConfig::new(server.uri()),
        Rc::new(storage.clone()),
        Rc::new(MemoryHistory::new(Location::parse(initial))),
        Rc::new(HeadlessSurface::new(false)),
    )
    .unwrap()
}

fn signed_in_storage() -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.set_item(TOKEN_KEY, "tok").unwrap();
    storage.set_item(USER_KEY, &ada().to_string()).unwrap();
    storage
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-new", "user": ada() })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn anonymous_user_logs_in_and_returns_to_requested_page() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let storage = MemoryStorage::new();
    let app = app(&server, &storage, "/dashboard");
    let router = app.router();

    assert!(matches!(router.start(), NavigationOutcome::Redirected { .. }));
    assert_eq!(router.current().unwrap().full_path(), "/login?redirect=/dashboard");

    assert!(app.session().login("ada@example.com", "pw").await);
    assert_eq!(storage.peek(TOKEN_KEY).as_deref(), Some("tok-new"));

    let destination = router.post_login_destination();
    assert_eq!(router.push(destination), NavigationOutcome::Completed);
    assert_eq!(router.current_route(), Some(RouteName::Dashboard));

    assert_eq!(
        router.push("/login"),
        NavigationOutcome::Duplicated,
        "authenticated login visit redirects back to the dashboard already shown"
    );
}

#[tokio::test]
async fn expired_token_tears_down_session_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Token expired" })))
        .mount(&server)
        .await;
    let storage = signed_in_storage();
    let app = app(&server, &storage, "/dashboard");
    app.router().start();

    app.links().fetch_links(1, 20).await;

    assert!(!app.session().is_authenticated());
    assert!(app.session().user().is_none());
    assert_eq!(storage.peek(TOKEN_KEY), None);
    assert_eq!(storage.peek(USER_KEY), None);
    assert_eq!(app.links().last_error().as_deref(), Some("Token expired"));
    assert_eq!(app.router().current_full_path(), "/login?redirect=/dashboard");

    let outcome = app.router().push("/profile");
    assert_eq!(
        outcome,
        NavigationOutcome::Redirected {
            requested: "/profile".to_owned(),
            target: "/login?redirect=/profile".to_owned(),
        }
    );
}

#[tokio::test]
async fn server_error_on_link_detail_keeps_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let storage = signed_in_storage();
    let app = app(&server, &storage, "/dashboard");

    assert!(app.links().fetch_link(&ResourceId::Number(9)).await.is_none());
    assert!(app.links().current_link().is_none());
    assert_eq!(app.links().last_error().as_deref(), Some("Failed to fetch link details"));
    assert!(!app.links().loading());
    assert!(app.session().is_authenticated(), "non-401 failures keep the session");
}

#[tokio::test]
async fn corrupted_profile_entry_is_discarded_at_startup() {
    let server = MockServer::start().await;
    let storage = MemoryStorage::new();
    storage.set_item(TOKEN_KEY, "tok").unwrap();
    storage.set_item(USER_KEY, "{not json").unwrap();

    let app = app(&server, &storage, "/profile");

    assert!(app.session().is_authenticated());
    assert!(app.session().user().is_none());
    assert_eq!(storage.peek(USER_KEY), None);
    assert_eq!(app.router().start(), NavigationOutcome::Completed);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let server = MockServer::start().await;
    let storage = signed_in_storage();
    let app = app(&server, &storage, "/");

    app.session().logout();
    let after_first = app.session().state();
    app.session().logout();

    assert_eq!(app.session().state(), after_first);
    assert!(!app.session().is_authenticated());
    assert_eq!(storage.peek(TOKEN_KEY), None);
    assert_eq!(storage.peek(USER_KEY), None);
}

#[tokio::test]
async fn restart_restores_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let storage = MemoryStorage::new();

    {
        let first = app(&server, &storage, "/login");
        first.router().start();
        assert!(first.session().login("ada@example.com", "pw").await);
    }

    let second = app(&server, &storage, "/dashboard");
    assert!(second.session().is_authenticated());
    assert_eq!(second.session().user().map(|u| u.email).as_deref(), Some("ada@example.com"));
    assert_eq!(second.router().start(), NavigationOutcome::Completed);
}

#[tokio::test]
async fn back_button_after_logout_lands_on_login() {
    let server = MockServer::start().await;
    let storage = signed_in_storage();
    let history = Rc::new(MemoryHistory::new(Location::parse("/dashboard")));
    let app = App::new(
        ClientConfig::new(server.uri()),
        Rc::new(storage.clone()),
        Rc::clone(&history) as Rc<dyn HistoryBackend>,
        Rc::new(HeadlessSurface::new(false)),
    )
    .unwrap();

    app.router().start();
    app.router().push("/");
    app.session().logout();
    assert!(history.back());

    assert_eq!(app.router().current_route(), Some(RouteName::Login));
    assert_eq!(history.current(), Some(Location::login_redirect("/dashboard")));
}
