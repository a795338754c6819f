use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use lecturemark::api::router;
use lecturemark::player::NoopVideoPlayer;
use lecturemark::render::MarkdownRenderer;
use lecturemark::state::AppState;
use lecturemark::store::CourseStore;
use lecturemark::store::seed::demo_store;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(store: CourseStore) -> Router {
    router(AppState::new(
        store,
        Arc::new(NoopVideoPlayer),
        Arc::new(MarkdownRenderer),
    ))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("Failed to build request"))
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app_with(CourseStore::new());
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_pin_toggle_scenario() {
    let app = app_with(CourseStore::new());
    let (status, _) = send(
        &app,
        Method::POST,
        "/courses",
        Some(json!({ "id": "A101", "title": "Intro" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, course) = send(&app, Method::POST, "/courses/A101/pin", None).await;
    assert_eq!(course["isPinned"], true);
    let (_, course) = send(&app, Method::POST, "/courses/A101/pin", None).await;
    assert_eq!(course["isPinned"], false);

    let (status, _) = send(&app, Method::POST, "/courses/B202/pin", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_listing_puts_pinned_first() {
    let app = app_with(demo_store().expect("demo store"));
    let (status, courses) = send(&app, Method::GET, "/courses", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = courses
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["Group 26", "MIT 6.006", "MIT 18.650", "MIT Kanji"]);

    let (_, live) = send(&app, Method::GET, "/courses?live=true", None).await;
    assert_eq!(live.as_array().unwrap().len(), 1);
    assert_eq!(live[0]["id"], "Group 26");

    let (_, found) = send(&app, Method::GET, "/courses?q=statistics", None).await;
    assert_eq!(found[0]["id"], "MIT 18.650");
}

#[tokio::test]
async fn test_duplicate_course_id_replaces() {
    let app = app_with(demo_store().expect("demo store"));
    let (status, course) = send(
        &app,
        Method::POST,
        "/courses",
        Some(json!({ "id": "MIT 6.006", "title": "Algorithms, again" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["lectures"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let app = app_with(CourseStore::new());
    let (status, body) = send(
        &app,
        Method::POST,
        "/courses",
        Some(json!({ "id": "  ", "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "id must not be empty");
}

#[tokio::test]
async fn test_lecture_and_anchor_flow() {
    let app = app_with(CourseStore::new());
    send(
        &app,
        Method::POST,
        "/courses",
        Some(json!({ "id": "A101", "title": "Intro" })),
    )
    .await;

    for (id, title, date) in [
        ("1", "Algorithms", "2022-03-14"),
        ("2", "Graphs", "21.03.2022"),
        ("3", "Sorting Algorithms", "2022-03-28"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/courses/A101/lectures",
            Some(json!({ "id": id, "title": title, "date": date })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/courses/A101/lectures",
        Some(json!({ "id": "1", "title": "dup", "date": "2022-03-14" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, hits) = send(&app, Method::GET, "/courses/A101/lectures?q=ALGO", None).await;
    let titles: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sorting Algorithms", "Algorithms"]);

    let (_, anchors) = send(
        &app,
        Method::POST,
        "/courses/A101/lectures/1/anchors",
        Some(json!({ "title": "late", "minutes": 45, "seconds": 20, "description": "x" })),
    )
    .await;
    assert_eq!(anchors[0]["timestamp"], "00:45:20");

    let (_, anchors) = send(
        &app,
        Method::POST,
        "/courses/A101/lectures/1/anchors",
        Some(json!({ "title": "early", "minutes": 12, "seconds": 30, "description": "y" })),
    )
    .await;
    let seconds: Vec<u64> = anchors
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["timestampSeconds"].as_u64().unwrap())
        .collect();
    assert_eq!(seconds, vec![750, 2720]);

    let (status, _) = send(
        &app,
        Method::POST,
        "/courses/A101/lectures/1/anchors",
        Some(json!({ "title": "no description", "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let anchor_id = anchors[0]["id"].as_str().unwrap().to_string();
    let (_, updated) = send(
        &app,
        Method::PATCH,
        &format!("/courses/A101/lectures/1/anchors/{}", anchor_id),
        Some(json!({ "title": "renamed" })),
    )
    .await;
    assert_eq!(updated["title"], "renamed");
    assert_eq!(updated["timestampSeconds"], 750);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/courses/A101/lectures/1/anchors/{}", anchor_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_course_then_lecture_ops_are_not_found() {
    let app = app_with(demo_store().expect("demo store"));
    let (status, _) = send(&app, Method::DELETE, "/courses/Group%2026", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::POST, "/courses/Group%2026/lectures/1/favorite", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::POST,
        "/courses/Group%2026/lectures/1/anchors",
        Some(json!({ "title": "t", "description": "d" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, export) = send(&app, Method::GET, "/export", None).await;
    assert!(export.get("Group 26").is_none());
}

#[tokio::test]
async fn test_favorites_aggregation() {
    let app = app_with(demo_store().expect("demo store"));
    let (_, favorites) = send(&app, Method::GET, "/favorites", None).await;
    let pairs: Vec<(&str, &str)> = favorites
        .as_array()
        .unwrap()
        .iter()
        .map(|f| (f["courseId"].as_str().unwrap(), f["courseTitle"].as_str().unwrap()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("MIT 6.006", "MIT: Intro to Algorithms"),
            ("MIT 18.650", "Statistics for Applications"),
        ]
    );

    send(&app, Method::POST, "/courses/Group%2026/lectures/1/favorite", None).await;
    let (_, favorites) = send(&app, Method::GET, "/favorites", None).await;
    assert_eq!(favorites.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_favorites_unwatched_filter() {
    let app = app_with(demo_store().expect("demo store"));
    let (status, favorites) = send(&app, Method::GET, "/favorites?unwatched=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(favorites.as_array().unwrap().is_empty());

    send(&app, Method::POST, "/courses/Group%2026/lectures/3/favorite", None).await;
    send(&app, Method::POST, "/courses/Group%2026/lectures/1/favorite", None).await;
    let (_, favorites) = send(&app, Method::GET, "/favorites?unwatched=true", None).await;
    let favorites = favorites.as_array().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["courseId"], "Group 26");
    assert_eq!(favorites[0]["id"], "3");

    let (_, all) = send(&app, Method::GET, "/favorites", None).await;
    assert_eq!(all.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_global_anchor_publish_and_vote() {
    let app = app_with(demo_store().expect("demo store"));
    let path = "/courses/MIT%206.006/lectures/1750451689227";

    let (status, detail) = send(
        &app,
        Method::POST,
        &format!("{}/global-anchors", path),
        Some(json!({
            "title": "Merge Sort",
            "minutes": 10,
            "description": "Divide, sort, *merge*",
            "author": "Prof. Erik Demaine",
            "alsoPersonal": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["anchors"].as_array().unwrap().len(), 1);
    let global = &detail["globalAnchors"][0];
    assert_eq!(global["likes"], 0);
    let html = global["descriptionHtml"].as_str().unwrap();
    assert_eq!(html.trim_end(), "<p>Divide, sort, <em>merge</em></p>");

    let id = global["id"].as_str().unwrap();
    let (_, voted) = send(&app, Method::POST, &format!("{}/global-anchors/{}/like", path, id), None).await;
    assert_eq!(voted["likes"], 1);
    let (_, voted) = send(&app, Method::POST, &format!("{}/global-anchors/{}/dislike", path, id), None).await;
    assert_eq!(voted["likes"], 1);
    assert_eq!(voted["dislikes"], 1);
}

#[tokio::test]
async fn test_timeline_after_player_ready() {
    let app = app_with(demo_store().expect("demo store"));
    let path = "/courses/MIT%206.006/lectures/1750451578957";

    let (_, session) = send(&app, Method::POST, &format!("{}/open", path), None).await;
    assert_eq!(session["status"], "loading");

    let (_, outcome) = send(
        &app,
        Method::POST,
        "/player/events",
        Some(json!({
            "courseId": "MIT 6.006",
            "lectureId": "1750451578957",
            "event": { "type": "ready", "durationSeconds": 3000 }
        })),
    )
    .await;
    assert_eq!(outcome["session"]["status"], "ready");

    let (_, clusters) = send(&app, Method::GET, &format!("{}/timeline", path), None).await;
    // 750s, 1930s, 2720s of 3000s
    let clusters = clusters.as_array().unwrap();
    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[0]["position"], 25.0);
    assert_eq!(clusters[1]["entries"].as_array().unwrap().len(), 1);
    assert_eq!(clusters[0]["entries"][0]["entry"]["kind"], "personal");
    assert_eq!(clusters[0]["entries"][0]["entry"]["timestamp"], "12:30");

    let (_, global) = send(&app, Method::GET, &format!("{}/timeline?global=true", path), None).await;
    assert_eq!(global[0]["entries"][0]["entry"]["kind"], "global");
}

#[tokio::test]
async fn test_export_has_attachment_header() {
    let app = app_with(demo_store().expect("demo store"));
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/export").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"lecturemark-"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let dump: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(dump["MIT 6.006"]["isPinned"], true);
    assert!(dump["MIT 6.006"].get("id").is_none());
}
