use crate::e2e::helpers;

use helpers::assertions::{assert_event_response, titles};
use helpers::fixtures::EventFixture;
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;
use test_context::test_context;

async fn seed(ctx: &TestContext) {
    let fixtures = &ctx.fixtures;
    fixtures
        .create_event(EventFixture::new("Parkdale", "Knitting Circle"))
        .await
        .unwrap();
    fixtures
        .create_event(EventFixture::new("Parkdale", "Story Time").on(10, 21, 10).on(10, 28, 10))
        .await
        .unwrap();
    fixtures
        .create_event(EventFixture::new("Lillian H. Smith", "Chess Night").on(10, 21, 10))
        .await
        .unwrap();
    fixtures
        .create_event(EventFixture::new("Lillian H. Smith", "Author Talk").on(10, 20, 18))
        .await
        .unwrap();
    fixtures
        .create_event(EventFixture::new("Parkdale", "Book Club").on(10, 19, 19).inactive_for_days(2))
        .await
        .unwrap();
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_active_events_in_display_order(ctx: &TestContext) {
    seed(ctx).await;

    let response = ctx.client.get("/api/events").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body: Value = response.json().unwrap();
    assert_eq!(
        titles(&body),
        vec!["Author Talk", "Chess Night", "Story Time", "Knitting Circle"]
    );
    assert_event_response(&body[0], "Lillian H. Smith", "Author Talk");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_events_by_feed(ctx: &TestContext) {
    seed(ctx).await;

    let response = ctx.client.get("/api/events?feed=Parkdale").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body: Value = response.json().unwrap();
    assert_eq!(titles(&body), vec!["Story Time", "Knitting Circle"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_occurrences_in_order(ctx: &TestContext) {
    seed(ctx).await;

    let response = ctx.client.get("/api/events?feed=Parkdale").await.unwrap();
    let body: Value = response.json().unwrap();

    let occurrences = body[0]["occurrences"].as_array().unwrap();
    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[0]["start"], "2025-10-21T10:00:00");
    assert_eq!(occurrences[0]["end_time"], "11:00:00");
    assert_eq!(occurrences[1]["start"], "2025-10-28T10:00:00");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_empty_list_for_unknown_feed(ctx: &TestContext) {
    seed(ctx).await;

    let response = ctx.client.get("/api/events?feed=Nowhere").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body: Value = response.json().unwrap();
    assert_eq!(body, serde_json::json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_allow_cross_origin_reads(ctx: &TestContext) {
    let response = ctx
        .client
        .get_with_headers("/api/events", &[("origin", "https://example.org")])
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("access-control-allow-origin").map(String::as_str),
        Some("*")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_writes_to_the_events_api(ctx: &TestContext) {
    let response = ctx.client.post_empty("/api/events").await.unwrap();
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
