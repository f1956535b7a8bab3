use super::*;
use crate::config::ClientConfig;
use crate::state::credentials::CredentialStore;
use crate::util::storage::MemoryStorage;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn link_json(id: i64, code: &str) -> serde_json::Value {
    json!({ "id": id, "original_url": format!("https://example.com/{code}"), "short_code": code, "clicks": id * 10 })
}

fn store_for(uri: &str) -> LinkStore {
    let credentials = Rc::new(CredentialStore::open(Rc::new(MemoryStorage::new())));
    let transport = Rc::new(Transport::new(&ClientConfig::new(uri), credentials).unwrap());
    LinkStore::new(transport)
}

async fn loaded_store(server: &MockServer) -> LinkStore {
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([link_json(1, "one"), link_json(2, "two")])))
        .mount(server)
        .await;
    let store = store_for(&server.uri());
    store.fetch_links(1, 20).await;
    assert_eq!(store.links().len(), 2);
    store
}

#[tokio::test]
async fn fetch_links_records_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .and(query_param("page", "3"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([link_json(9, "nine")])))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());

    store.fetch_links(3, 5).await;

    let state = store.state();
    assert_eq!(state.links.len(), 1);
    assert_eq!(state.pagination.page, 3);
    assert_eq!(state.pagination.limit, 5);
    assert!(!state.loading);
}

#[tokio::test]
async fn fetch_links_failure_keeps_existing_list() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    store.fetch_links(2, 20).await;

    assert_eq!(store.links().len(), 2);
    assert_eq!(store.state().pagination.page, 1);
    assert_eq!(store.last_error().as_deref(), Some(FETCH_LINKS_FAILED));
}

#[tokio::test]
async fn fetch_link_sets_current_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(link_json(4, "four")))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());

    let link = store.fetch_link(&ResourceId::Number(4)).await;

    assert_eq!(link.as_ref().map(|l| l.short_code.as_str()), Some("four"));
    assert_eq!(store.current_link(), link);
}

#[tokio::test]
async fn fetch_link_failure_leaves_state_untouched() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    Mock::given(method("GET"))
        .and(path("/links/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(link_json(1, "one")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    store.fetch_link(&ResourceId::Number(1)).await;
    let before = store.current_link();
    assert!(before.is_some());

    Mock::given(method("GET"))
        .and(path("/links/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let result = store.fetch_link(&ResourceId::Number(2)).await;

    assert!(result.is_none());
    assert_eq!(store.current_link(), before);
    assert_eq!(store.links().len(), 2);
    assert_eq!(store.last_error().as_deref(), Some(FETCH_LINK_FAILED));
    assert!(!store.loading());
}

#[tokio::test]
async fn create_link_prepends() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    Mock::given(method("POST"))
        .and(path("/links"))
        .and(body_json(json!({ "original_url": "https://example.com/new", "title": "New" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(link_json(3, "new")))
        .mount(&server)
        .await;

    let new_link = NewLink {
        original_url: "https://example.com/new".to_owned(),
        title: Some("New".to_owned()),
        ..NewLink::default()
    };
    let created = store.create_link(&new_link).await;

    assert!(created.is_some());
    let codes: Vec<String> = store.links().into_iter().map(|l| l.short_code).collect();
    assert_eq!(codes, vec!["new", "one", "two"]);
}

#[tokio::test]
async fn create_link_failure_passes_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "error": "Short code already taken" })))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());

    let created = store.create_link(&NewLink { original_url: "https://x.y".to_owned(), ..NewLink::default() }).await;

    assert!(created.is_none());
    assert_eq!(store.last_error().as_deref(), Some("Short code already taken"));
}

#[tokio::test]
async fn update_link_replaces_list_entry_and_current() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    Mock::given(method("GET"))
        .and(path("/links/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(link_json(2, "two")))
        .mount(&server)
        .await;
    store.fetch_link(&ResourceId::Number(2)).await;

    let mut updated = link_json(2, "two");
    updated["title"] = json!("Renamed");
    Mock::given(method("PUT"))
        .and(path("/links/2"))
        .and(body_json(json!({ "title": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .mount(&server)
        .await;

    let patch = LinkPatch { title: Some("Renamed".to_owned()), ..LinkPatch::default() };
    let result = store.update_link(&ResourceId::Number(2), &patch).await;

    assert!(result.is_some());
    let state = store.state();
    assert_eq!(state.links[1].title.as_deref(), Some("Renamed"));
    assert_eq!(state.current_link.and_then(|l| l.title).as_deref(), Some("Renamed"));
    assert!(state.links[0].title.is_none());
}

#[tokio::test]
async fn update_link_failure_returns_none() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    Mock::given(method("PUT"))
        .and(path("/links/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(store.update_link(&ResourceId::Number(1), &LinkPatch::default()).await.is_none());
    assert_eq!(store.last_error().as_deref(), Some(UPDATE_LINK_FAILED));
    assert_eq!(store.links().len(), 2);
}

#[tokio::test]
async fn delete_link_removes_entry_and_current() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    Mock::given(method("GET"))
        .and(path("/links/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(link_json(1, "one")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/links/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    store.fetch_link(&ResourceId::Number(1)).await;

    assert!(store.delete_link(&ResourceId::Number(1)).await);

    let state = store.state();
    assert_eq!(state.links.len(), 1);
    assert_eq!(state.links[0].id, ResourceId::Number(2));
    assert!(state.current_link.is_none());
}

#[tokio::test]
async fn delete_link_failure_keeps_entry() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/links/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!store.delete_link(&ResourceId::Number(2)).await);
    assert_eq!(store.links().len(), 2);
    assert_eq!(store.last_error().as_deref(), Some(DELETE_LINK_FAILED));
}

#[tokio::test]
async fn fetch_link_stats_sends_only_given_bounds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links/5/stats"))
        .and(query_param("from", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_clicks": 12,
            "daily": [{ "date": "2024-01-01", "clicks": 12 }]
        })))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());

    let stats = store.fetch_link_stats(&ResourceId::Number(5), Some("2024-01-01"), None).await;

    assert_eq!(stats.as_ref().map(|s| s.total_clicks), Some(12));
    assert_eq!(store.state().link_stats, stats);
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or_default().contains("to="));
}

#[tokio::test]
async fn fetch_link_stats_failure_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links/5/stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());

    assert!(store.fetch_link_stats(&ResourceId::Number(5), None, None).await.is_none());
    assert_eq!(store.last_error().as_deref(), Some(FETCH_LINK_STATS_FAILED));
}

#[tokio::test]
async fn fetch_user_stats_stores_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_links": 4, "total_clicks": 40 })))
        .mount(&server)
        .await;
    let store = store_for(&server.uri());

    let stats = store.fetch_user_stats().await;

    assert_eq!(stats.as_ref().map(|s| s.total_links), Some(4));
    assert_eq!(store.state().user_stats, stats);
}

#[tokio::test]
async fn fetch_user_stats_failure_uses_fallback() {
    let store = store_for("http://127.0.0.1:9");
    assert!(store.fetch_user_stats().await.is_none());
    assert_eq!(store.last_error().as_deref(), Some(FETCH_USER_STATS_FAILED));
}

#[tokio::test]
async fn route_param_ids_match_numeric_server_ids() {
    let server = MockServer::start().await;
    let store = loaded_store(&server).await;
    let mut updated = link_json(2, "two");
    updated["title"] = json!("From stats page");
    Mock::given(method("PUT"))
        .and(path("/links/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/links/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let patch = LinkPatch { title: Some("From stats page".to_owned()), ..LinkPatch::default() };
    assert!(store.update_link(&ResourceId::from("2"), &patch).await.is_some());
    assert_eq!(store.links()[1].title.as_deref(), Some("From stats page"));

    assert!(store.delete_link(&ResourceId::from("1")).await);
    let ids: Vec<ResourceId> = store.links().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![ResourceId::Number(2)]);
}
