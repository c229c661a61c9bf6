use crate::e2e::helpers;

use helpers::fixtures::EventFixture;
use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_render_one_section_per_day(ctx: &TestContext) {
    ctx.fixtures
        .create_event(EventFixture::new("Parkdale", "Story Time").on(10, 21, 10).on(10, 28, 10))
        .await
        .unwrap();
    ctx.fixtures
        .create_event(EventFixture::new("Parkdale", "Knitting Circle"))
        .await
        .unwrap();

    let response = ctx.client.get("/").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert!(response
        .header("content-type")
        .is_some_and(|v| v.starts_with("text/html")));

    let html = response.text();
    let first = html.find("Tuesday, October 21, 2025").expect("first day");
    let second = html.find("Tuesday, October 28, 2025").expect("second day");
    let tba = html.find("Date to be announced").expect("undated section");
    assert!(first < second && second < tba);
    assert_eq!(html.matches("Story Time</a>").count(), 2);
    assert!(html[tba..].contains("Knitting Circle"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_render_empty_calendar(ctx: &TestContext) {
    let response = ctx.client.get("/").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("No upcoming events."));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_escape_event_titles(ctx: &TestContext) {
    ctx.fixtures
        .create_event(EventFixture::new("Parkdale", "<script>alert(1)</script>").on(10, 21, 10))
        .await
        .unwrap();

    let html = ctx.client.get("/").await.unwrap().text();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}
