mod common;

use std::sync::Arc;
use std::time::Duration;

use admin_client::config::SEARCH_DEBOUNCE;
use admin_client::error::ApiError;
use admin_client::query::{FetchStatus, ListParams, ListQuery, QueryCache};
use admin_client::search::{Debouncer, ListController};
use admin_client::toast::{ToastKind, Toaster};
use admin_client::{QueryKey, Role, User};
use common::{role, user, FakeApi};

fn team() -> Vec<User> {
    vec![
        user("u1", "Ada", "Lovelace", "r1"),
        user("u2", "Alan", "Turing", "r2"),
        user("u3", "Grace", "Hopper", "r2"),
        user("u4", "Edsger", "Dijkstra", "r2"),
        user("u5", "Barbara", "Liskov", "r1"),
        user("u6", "Donald", "Knuth", "r2"),
        user("u7", "Ken", "Thompson", "r2"),
    ]
}

fn controller<R: admin_client::Resource>(api: Arc<FakeApi<R>>, toaster: Toaster) -> ListController<R> {
    let cache = Arc::new(QueryCache::new());
    ListController::new(ListQuery::new(cache, api, toaster))
}

#[tokio::test(start_paused = true)]
async fn typing_fetches_once_per_settled_term() {
    let api = FakeApi::new(team(), 2);
    let mut list = controller(api.clone(), Toaster::default());
    let (mut debouncer, mut settled) = Debouncer::new(SEARCH_DEBOUNCE);

    list.load().await;

    debouncer.push("k".to_string());
    tokio::time::sleep(Duration::from_millis(50)).await;
    debouncer.push("kn".to_string());

    let term = settled.recv().await.unwrap();
    let state = list.apply_search(term).await;

    assert_eq!(api.list_calls(), vec![ListParams::new("", 1), ListParams::new("kn", 1)]);
    assert_eq!(state.rows().len(), 1);
    assert_eq!(state.rows()[0].full_name(), "Donald Knuth");
}

#[tokio::test]
async fn new_search_term_resets_to_the_first_page() {
    let api = FakeApi::new(team(), 2);
    let mut list = controller(api.clone(), Toaster::default());

    list.go_to_page(3).await;
    assert_eq!(list.page(), 3);

    let state = list.apply_search("a").await;

    assert_eq!(list.page(), 1);
    assert_eq!(api.list_calls().last(), Some(&ListParams::new("a", 1)));
    assert_eq!(state.params, Some(ListParams::new("a", 1)));
}

#[tokio::test]
async fn same_term_keeps_the_page() {
    let api = FakeApi::new(team(), 2);
    let mut list = controller(api.clone(), Toaster::default());

    list.apply_search("a").await;
    list.next_page().await;
    assert_eq!(list.page(), 2);

    list.apply_search("a").await;
    assert_eq!(list.page(), 2);
    assert_eq!(list.search(), "a");
}

#[tokio::test]
async fn paging_keeps_the_search_term() {
    let api = FakeApi::new(team(), 2);
    let mut list = controller(api.clone(), Toaster::default());

    list.apply_search("a").await;
    let state = list.next_page().await;

    assert_eq!(api.list_calls().last(), Some(&ListParams::new("a", 2)));
    assert!(state.data.as_ref().unwrap().has_prev());

    list.prev_page().await;
    assert_eq!(list.params(), ListParams::new("a", 1));
}

#[tokio::test]
async fn paging_stops_at_the_ends() {
    let api = FakeApi::new(team(), 5);
    let mut list = controller(api.clone(), Toaster::default());

    list.load().await;
    list.prev_page().await;
    assert_eq!(list.page(), 1);

    list.next_page().await;
    list.next_page().await;
    assert_eq!(list.page(), 2);
    assert_eq!(api.list_calls().len(), 2);
}

#[tokio::test]
async fn fresh_parameters_are_not_fetched_twice() {
    let api = FakeApi::new(team(), 2);
    let mut list = controller(api.clone(), Toaster::default());

    list.load().await;
    list.load().await;
    assert_eq!(api.list_calls().len(), 1);

    list.refresh().await;
    assert_eq!(api.list_calls().len(), 2);
}

#[tokio::test]
async fn failed_load_shows_a_toast_and_keeps_the_rows() {
    let roles = vec![role("r1", "Admin", true), role("r2", "Editor", false)];
    let api = FakeApi::new(roles, 10);
    let toaster = Toaster::default();
    let mut list = controller(api.clone(), toaster.clone());

    list.load().await;
    api.fail_next_list(ApiError::new("Service Unavailable", Some(503), None));
    let state = list.refresh().await;

    assert!(state.is_error);
    assert_eq!(state.status, FetchStatus::Error);
    assert_eq!(state.error.as_ref().unwrap().message, "Service Unavailable");
    assert_eq!(state.rows().len(), 2);

    let toast = toaster.active().await.unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "Failed to load roles: Service Unavailable");

    // retry action
    let state = list.refresh().await;
    assert!(!state.is_error);
    assert_eq!(state.status, FetchStatus::Settled);
}

#[tokio::test]
async fn stale_read_serves_cached_rows_while_refreshing() {
    let api = FakeApi::new(vec![role("r1", "Admin", true)], 10);
    let cache = Arc::new(QueryCache::new());
    let query: ListQuery<Role> = ListQuery::new(cache.clone(), api.clone(), Toaster::default());

    let first = query.read(ListParams::default());
    assert!(first.state.is_loading);
    assert!(first.state.data.is_none());
    first.refresh.unwrap().await.unwrap();

    let fresh = query.read(ListParams::default());
    assert!(fresh.refresh.is_none());

    cache.invalidate(QueryKey::Roles);
    let stale = query.read(ListParams::default());
    assert_eq!(stale.state.rows()[0].name, "Admin");
    assert!(stale.state.is_fetching);
    assert!(!stale.state.is_loading);

    let settled = stale.refresh.unwrap().await.unwrap();
    assert!(!settled.is_stale);
    assert_eq!(api.list_calls().len(), 2);
}

#[tokio::test]
async fn roles_page_with_a_default_role() {
    let api = FakeApi::new(vec![role("r1", "Admin", true)], 10);
    let mut list: ListController<Role> = controller(api, Toaster::default());

    let state = list.load().await;
    let page = state.data.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].name, "Admin");
    assert!(page.data[0].is_default);
    assert_eq!(page.pages, 1);
    assert!(!page.has_next() && !page.has_prev());
}

#[tokio::test(start_paused = true)]
async fn later_fetch_wins_over_an_earlier_one() {
    let api = FakeApi::new(team(), 2);
    api.set_list_delay(Duration::from_millis(300));
    let query: ListQuery<User> = ListQuery::new(Arc::new(QueryCache::new()), api.clone(), Toaster::default());

    let (_, second) = futures::future::join(
        query.refetch(ListParams::new("", 1)),
        query.refetch(ListParams::new("", 2)),
    )
    .await;

    assert_eq!(second.params, Some(ListParams::new("", 2)));
    assert_eq!(query.state().rows()[0].id, "u3");
}
