use axum::{body::Body, http::Request, http::StatusCode};
use niche_common::store::InMemoryStore;
use tower::ServiceExt;

#[tokio::test]
async fn livez_healthy_and_unknown_routes_404() {
    let app = niche_api::create_router(niche_api::test_state(InMemoryStore::default()));

    let livez_response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/livez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(livez_response.status(), StatusCode::OK);

    let missing = app
        .oneshot(
            Request::builder()
                .uri("/api/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn similarity_route_rejects_get() {
    let app = niche_api::create_router(niche_api::test_state(InMemoryStore::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/similarity")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
