use axum::body::Body;
use bytes::Bytes;
use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, Db};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "123456:TEST";
const BOUNDARY: &str = "mockboundary";

async fn body_bytes(response: axum::response::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn empty_post(uri: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Multipart body with text fields and at most one file part.
fn multipart_post(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((name, file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let resp = app(TOKEN)
        .oneshot(empty_post("/botnope/getMe"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error_code"], 401);
}

// --- getMe ---

#[tokio::test]
async fn get_me_without_body() {
    let resp = app(TOKEN)
        .oneshot(empty_post(&format!("/bot{TOKEN}/getMe")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["result"]["username"], "mock_bot");
}

// --- sendMessage ---

#[tokio::test]
async fn send_message_multipart_is_recorded() {
    let db = Db::default();
    let resp = app_with_state(TOKEN, db.clone())
        .oneshot(multipart_post(
            &format!("/bot{TOKEN}/sendMessage"),
            &[("chat_id", "87654321"), ("text", "hi")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"]["text"], "hi");
    assert_eq!(body["result"]["chat"]["id"], 87654321);

    let state = db.read().await;
    assert_eq!(state.calls.len(), 1);
    assert_eq!(state.calls[0].method, "sendMessage");
    assert_eq!(state.calls[0].fields["chat_id"], "87654321");
    assert_eq!(state.calls[0].fields.len(), 2);
}

#[tokio::test]
async fn send_message_urlencoded() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/bot{TOKEN}/sendMessage"))
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body("chat_id=5&text=hello+world".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"]["text"], "hello world");
}

#[tokio::test]
async fn send_message_without_text_is_bad_request() {
    let resp = app(TOKEN)
        .oneshot(multipart_post(&format!("/bot{TOKEN}/sendMessage"), &[("chat_id", "1")], None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["description"], "Bad Request: message text is empty");
}

// --- uploads ---

#[tokio::test]
async fn send_photo_records_file_part() {
    let db = Db::default();
    let resp = app_with_state(TOKEN, db.clone())
        .oneshot(multipart_post(
            &format!("/bot{TOKEN}/sendPhoto"),
            &[("chat_id", "1"), ("caption", "Chronoscape")],
            Some(("photo", "alexiuss.jpg", &[0xffu8, 0xd8, 0xff][..])),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let state = db.read().await;
    let file = &state.calls[0].files["photo"];
    assert_eq!(file.file_name.as_deref(), Some("alexiuss.jpg"));
    assert_eq!(file.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(file.size, 3);
    assert_eq!(state.calls[0].fields["caption"], "Chronoscape");
}

// --- getUpdates over GET ---

#[tokio::test]
async fn get_updates_reads_query_string() {
    let db = Db::default();
    db.write().await.pending_updates = vec![
        serde_json::json!({"update_id": 10}),
        serde_json::json!({"update_id": 11}),
    ];
    let resp = app_with_state(TOKEN, db.clone())
        .oneshot(
            Request::builder()
                .uri(format!("/bot{TOKEN}/getUpdates?offset=11"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], serde_json::json!([{"update_id": 11}]));
    assert_eq!(db.read().await.calls[0].http_method, "GET");
}

// --- failure injection ---

#[tokio::test]
async fn fail_next_answers_500_then_recovers() {
    let db = Db::default();
    db.write().await.fail_next = 1;
    let router = app_with_state(TOKEN, db.clone());

    let resp = router
        .clone()
        .oneshot(empty_post(&format!("/bot{TOKEN}/getMe")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = router
        .oneshot(empty_post(&format!("/bot{TOKEN}/getMe")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let state = db.read().await;
    assert_eq!(state.calls.len(), 2);
    assert_eq!(state.fail_next, 0);
}

// --- unknown method ---

#[tokio::test]
async fn unknown_method_is_404() {
    let resp = app(TOKEN)
        .oneshot(empty_post(&format!("/bot{TOKEN}/sendDice")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
