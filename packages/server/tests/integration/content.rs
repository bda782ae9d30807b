use serde_json::json;

use crate::common::{DEFAULT_COPYRIGHT, TestApp, routes};

#[tokio::test]
async fn empty_site_serves_only_the_default_footer() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::CONTENT).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"footer": {"copyright_text": DEFAULT_COPYRIGHT}}));
}

#[tokio::test]
async fn stored_section_merges_extra_attributes() {
    let app = TestApp::spawn().await;

    let put = app
        .put(
            &routes::section("hero"),
            &json!({
                "title": "We build brands",
                "subtitle": "Since 2010",
                "extra_attributes": {
                    "title": "ignored",
                    "cta_text": "Get in touch",
                },
            }),
        )
        .await;
    assert_eq!(put.status, 200, "{}", put.text);
    assert_eq!(put.body["slug"], "hero");
    assert_eq!(put.body["is_active"], true);

    let res = app.get(routes::CONTENT).await;
    let hero = &res.body["hero"];
    assert_eq!(hero["title"], "We build brands");
    assert_eq!(hero["subtitle"], "Since 2010");
    assert_eq!(hero["cta_text"], "Get in touch");
    assert!(res.body.get("about").is_none());
}

#[tokio::test]
async fn stored_footer_overrides_the_default() {
    let app = TestApp::spawn().await;

    app.put(&routes::section("footer"), &json!({"title": "© 2026 Folio"}))
        .await;
    let res = app.get(routes::CONTENT).await;

    assert_eq!(res.body["footer"]["copyright_text"], "© 2026 Folio");
}

#[tokio::test]
async fn deactivated_section_disappears() {
    let app = TestApp::spawn().await;

    app.put(&routes::section("about"), &json!({"title": "About us"}))
        .await;
    app.put(
        &routes::section("about"),
        &json!({"title": "About us", "is_active": false}),
    )
    .await;

    let res = app.get(routes::CONTENT).await;
    assert!(res.body.get("about").is_none());
}

#[tokio::test]
async fn unknown_slug_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .put(&routes::section("sidebar"), &json!({"title": "Nope"}))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .put(&routes::section("hero"), &json!({"title": "   "}))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "Title cannot be empty");
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app.put(&routes::section("hero"), &json!({"subtitle": 5})).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
