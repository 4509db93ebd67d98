//! Aggregation cycle tests against a wiremock backend.

use std::time::Duration;

use agrodash_client::BackendClient;
use agrodash_core::Actor;
use agrodash_dashboard::{
    run_cycle, CycleOptions, DashboardError, DashboardSession, DashboardState, FallbackStatus,
    Field, GroupStatus, ProfileTier, SourceId, SourceStatus, FALLBACK_FAILURE_MESSAGE,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACTOR: Actor = Actor::Id(42);

fn options() -> CycleOptions {
    CycleOptions {
        recent_limit: 5,
        source_timeout: Duration::from_secs(5),
    }
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_empty_content(server: &MockServer) {
    for route in [
        "/dashboard/recent/products",
        "/dashboard/recent/orders",
        "/dashboard/recent/notifications",
    ] {
        mount_json(server, route, json!([])).await;
    }
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::with_base_url(&server.uri()).expect("client construction should not fail")
}

#[tokio::test]
async fn lookup_profile_wins_and_empty_content_falls_back_once() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3, "orders": 1 })).await;
    mount_status(&server, "/dashboard/profile", 500).await;
    mount_json(
        &server,
        "/users/42",
        json!({ "id": 42, "fullName": "Asha Patil", "city": "Nashik" }),
    )
    .await;
    mount_status(&server, "/dashboard/services", 500).await;
    mount_empty_content(&server).await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": { "name": "Green Acres", "city": "Pune" },
            "services": ["Tractor rental"],
            "recent": {
                "products": [{ "id": 1, "name": "Neem oil", "price": 320 }],
                "orders": [],
                "notifications": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = run_cycle(&client(&server), &ACTOR, &options()).await;
    let state = result.state;
    let report = result.report;

    assert!(state.metrics.is_ready());
    assert_eq!(
        state.profile.value().and_then(|p| p.city.as_deref()),
        Some("Nashik")
    );
    assert_eq!(report.profile_tier, Some(ProfileTier::DirectLookup));

    assert_eq!(state.services, Field::Ready(vec!["Tractor rental".to_string()]));
    assert!(report.services_from_aggregate);

    assert_eq!(report.content, GroupStatus::TotalFailure);
    assert!(report.needs_fallback);
    assert_eq!(
        report.fallback,
        FallbackStatus::Applied {
            fields: vec!["recent_products"]
        }
    );
    assert_eq!(
        state.recent_products.value().map(|p| p[0].name.as_str()),
        Some("Neem oil")
    );
    assert_eq!(state.recent_orders, Field::Empty);
    assert_eq!(state.recent_notifications, Field::Empty);

    assert!(report
        .sources
        .iter()
        .any(|s| s.source == SourceId::AggregateDashboard && s.status == SourceStatus::Success));
}

#[tokio::test]
async fn one_non_empty_content_source_suppresses_fallback() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    mount_json(&server, "/dashboard/profile", json!({ "city": "Nashik" })).await;
    mount_json(&server, "/dashboard/services", json!({ "services": ["Soil testing"] })).await;
    mount_json(&server, "/dashboard/recent/products", json!([])).await;
    mount_status(&server, "/dashboard/recent/orders", 502).await;
    mount_json(
        &server,
        "/dashboard/recent/notifications",
        json!({ "notifications": [{
            "id": 9, "title": "New request", "type": "request",
            "isRead": false, "createdAt": "2025-05-03T09:00:00Z"
        }] }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = run_cycle(&client(&server), &ACTOR, &options()).await;

    assert_eq!(result.report.fallback, FallbackStatus::NotNeeded);
    assert!(!result.report.needs_fallback);
    assert_eq!(result.report.content, GroupStatus::PartialSuccess);
    assert!(result
        .report
        .issues
        .contains(&DashboardError::PartialSourceFailure {
            group: "recent content",
            failed: 2,
            total: 3,
        }));
    assert_eq!(
        result.state.recent_orders.error(),
        Some("Failed to load recent orders")
    );
    assert_eq!(result.report.profile_tier, Some(ProfileTier::Dedicated));
}

#[tokio::test]
async fn failed_fallback_marks_every_content_field() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    mount_json(&server, "/dashboard/profile", json!({ "city": "Nashik" })).await;
    mount_json(&server, "/dashboard/services", json!(["Soil testing"])).await;
    mount_status(&server, "/dashboard/recent/products", 500).await;
    mount_json(&server, "/dashboard/recent/orders", json!([])).await;
    mount_status(&server, "/dashboard/recent/notifications", 503).await;
    mount_status(&server, "/dashboard", 500).await;

    let result = run_cycle(&client(&server), &ACTOR, &options()).await;
    let state = result.state;

    assert_eq!(state.recent_products.error(), Some(FALLBACK_FAILURE_MESSAGE));
    assert_eq!(state.recent_orders.error(), Some(FALLBACK_FAILURE_MESSAGE));
    assert_eq!(
        state.recent_notifications.error(),
        Some(FALLBACK_FAILURE_MESSAGE)
    );
    assert!(matches!(result.report.fallback, FallbackStatus::Failed { .. }));
    assert!(result
        .report
        .issues
        .iter()
        .any(|issue| matches!(issue, DashboardError::FallbackFailure { .. })));

    // Primary data survives a failed fallback.
    assert!(state.metrics.is_ready());
    assert!(state.services.is_ready());
}

#[tokio::test]
async fn profile_fails_only_after_every_tier_is_empty() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    Mock::given(method("GET"))
        .and(path("/dashboard/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    mount_status(&server, "/users/42", 404).await;
    mount_json(&server, "/dashboard/services", json!(["Soil testing"])).await;
    mount_json(
        &server,
        "/dashboard/recent/products",
        json!([{ "id": 1, "name": "Neem oil" }]),
    )
    .await;
    mount_json(&server, "/dashboard/recent/orders", json!([])).await;
    mount_json(&server, "/dashboard/recent/notifications", json!([])).await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": null,
            "services": [],
            "recent": { "products": [], "orders": [], "notifications": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = run_cycle(&client(&server), &ACTOR, &options()).await;

    assert_eq!(
        result.state.profile.error(),
        Some("Failed to load profile from all sources")
    );
    assert_eq!(result.report.profile_tier, None);
    assert_eq!(result.report.fallback, FallbackStatus::NotNeeded);
}

#[tokio::test]
async fn slow_source_times_out_without_blocking_others() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    mount_json(&server, "/dashboard/profile", json!({ "city": "Nashik" })).await;
    mount_json(&server, "/dashboard/services", json!(["Soil testing"])).await;
    mount_json(
        &server,
        "/dashboard/recent/products",
        json!([{ "id": 1, "name": "Neem oil" }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dashboard/recent/orders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_json(&server, "/dashboard/recent/notifications", json!([])).await;

    let options = CycleOptions {
        recent_limit: 5,
        source_timeout: Duration::from_millis(200),
    };
    let result = run_cycle(&client(&server), &ACTOR, &options).await;

    assert_eq!(
        result.state.recent_orders.error(),
        Some("Failed to load recent orders")
    );
    assert!(result.state.recent_products.is_ready());
    let orders = result
        .report
        .sources
        .iter()
        .find(|s| s.source == SourceId::RecentOrders)
        .expect("orders summary recorded");
    assert_eq!(orders.status, SourceStatus::Failed);
}

#[tokio::test]
async fn session_publishes_finished_state_to_subscribers() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    mount_json(&server, "/dashboard/profile", json!({ "city": "Nashik" })).await;
    mount_json(&server, "/dashboard/services", json!(["Soil testing"])).await;
    mount_json(
        &server,
        "/dashboard/recent/orders",
        json!([{ "id": 11, "productName": "Seeds", "totalPrice": 800 }]),
    )
    .await;
    mount_json(&server, "/dashboard/recent/products", json!([])).await;
    mount_json(&server, "/dashboard/recent/notifications", json!([])).await;

    let mut session = DashboardSession::new(client(&server), ACTOR, options());
    let mut rx = session.subscribe();
    assert_eq!(rx.borrow_and_update().metrics, Field::Loading);

    let report = session.refresh().await;
    assert_eq!(report.content, GroupStatus::PartialSuccess);

    assert!(rx.has_changed().expect("session still alive"));
    let published = rx.borrow_and_update().clone();
    assert!(published.metrics.is_ready());
    assert!(published.recent_orders.is_ready());
    assert_eq!(published, session.state());
    assert!(session.last_report().is_some());
}

#[tokio::test]
async fn empty_aggregate_leaves_content_empty_and_services_failed() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    mount_json(&server, "/dashboard/profile", json!({ "city": "Nashik" })).await;
    mount_status(&server, "/dashboard/services", 500).await;
    mount_empty_content(&server).await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": null,
            "services": [],
            "recent": { "products": [], "orders": [], "notifications": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = run_cycle(&client(&server), &ACTOR, &options()).await;
    let state = result.state;
    let report = result.report;

    assert!(report.needs_fallback);
    assert_eq!(report.fallback, FallbackStatus::Empty);
    assert_eq!(state.recent_products, Field::Empty);
    assert_eq!(state.recent_orders, Field::Empty);
    assert_eq!(state.recent_notifications, Field::Empty);

    assert_eq!(state.services.error(), Some("Failed to load services"));
    assert!(!report.services_from_aggregate);
    assert!(!report
        .issues
        .iter()
        .any(|issue| matches!(issue, DashboardError::FallbackFailure { .. })));
    assert!(report
        .sources
        .iter()
        .any(|s| s.source == SourceId::AggregateDashboard && s.status == SourceStatus::Empty));
}

#[tokio::test]
async fn switching_actor_resets_session_to_loading() {
    let server = MockServer::start().await;

    mount_json(&server, "/dashboard/metrics", json!({ "products": 3 })).await;
    mount_json(&server, "/dashboard/profile", json!({ "city": "Nashik" })).await;
    mount_json(&server, "/dashboard/services", json!(["Soil testing"])).await;
    mount_json(
        &server,
        "/dashboard/recent/products",
        json!([{ "id": 1, "name": "Neem oil" }]),
    )
    .await;
    mount_json(&server, "/dashboard/recent/orders", json!([])).await;
    mount_json(&server, "/dashboard/recent/notifications", json!([])).await;

    let mut session = DashboardSession::new(client(&server), ACTOR, options());
    session.refresh().await;
    assert!(session.state().metrics.is_ready());
    assert!(session.last_report().is_some());

    let mut rx = session.subscribe();
    let other = Actor::Email("asha@agro.example".to_string());
    session.set_actor(other.clone());

    assert_eq!(session.actor(), &other);
    assert!(session.last_report().is_none());
    assert!(rx.has_changed().expect("session still alive"));
    assert_eq!(rx.borrow_and_update().clone(), DashboardState::loading());
    assert_eq!(session.state(), DashboardState::loading());
}
