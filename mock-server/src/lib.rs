use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    routing::get,
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// A file part received in a multipart body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// One request as the mock saw it, recorded before any failure injection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecordedCall {
    pub http_method: String,
    pub method: String,
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, UploadedFile>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<RecordedCall>,
    /// Answer this many upcoming calls with HTTP 500.
    pub fail_next: usize,
    pub pending_updates: Vec<Value>,
    pub webhook_url: Option<String>,
    next_message_id: i64,
}

pub type Db = Arc<RwLock<MockState>>;

#[derive(Clone)]
struct AppState {
    token: Arc<str>,
    db: Db,
}

type Reply = (StatusCode, Json<Value>);

pub fn app(token: &str) -> Router {
    app_with_state(token, Db::default())
}

/// Build the router around caller-owned state, so tests can inspect
/// recorded calls and inject failures.
pub fn app_with_state(token: &str, db: Db) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db,
    };
    Router::new()
        .route("/{bot}/{method}", get(handle).post(handle))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

pub async fn run_with_state(listener: TcpListener, token: &str, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(token, db)).await
}

async fn handle(
    State(state): State<AppState>,
    Path((bot, method)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    request: Request,
) -> Reply {
    if bot.strip_prefix("bot") != Some(state.token.as_ref()) {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let http_method = request.method().to_string();
    let mut call = RecordedCall {
        http_method,
        method: method.clone(),
        fields: query.into_iter().collect(),
        files: BTreeMap::new(),
    };
    if let Err(description) = read_body(request, &state, &mut call).await {
        return failure(StatusCode::BAD_REQUEST, &description);
    }

    let mut db = state.db.write().await;
    tracing::debug!(method = %call.method, fields = call.fields.len(), files = call.files.len(), "received call");
    db.calls.push(call.clone());
    if db.fail_next > 0 {
        db.fail_next -= 1;
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }

    match dispatch(&mut db, &call) {
        Ok(result) => (StatusCode::OK, Json(json!({"ok": true, "result": result}))),
        Err((status, description)) => failure(status, &description),
    }
}

async fn read_body(request: Request, state: &AppState, call: &mut RecordedCall) -> Result<(), String> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| format!("Bad Request: {e}"))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| format!("Bad Request: {e}"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(ToString::to_string);
            let part_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await.map_err(|e| format!("Bad Request: {e}"))?;
            if file_name.is_some() {
                call.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type: part_type,
                        size: data.len(),
                    },
                );
            } else {
                call.fields
                    .insert(name, String::from_utf8_lossy(&data).into_owned());
            }
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
            .await
            .map_err(|e| format!("Bad Request: {e}"))?;
        call.fields.extend(fields);
    }
    Ok(())
}

fn dispatch(db: &mut MockState, call: &RecordedCall) -> Result<Value, (StatusCode, String)> {
    match call.method.as_str() {
        "getMe" => Ok(json!({
            "id": 123456,
            "is_bot": true,
            "first_name": "Mock Bot",
            "username": "mock_bot"
        })),
        "getUpdates" => {
            let offset = int_field(call, "offset")?.unwrap_or(0);
            let limit = int_field(call, "limit")?.unwrap_or(100).clamp(1, 100) as usize;
            db.pending_updates
                .retain(|update| update["update_id"].as_i64().unwrap_or(0) >= offset);
            Ok(Value::Array(db.pending_updates.iter().take(limit).cloned().collect()))
        }
        "setWebhook" => {
            let url = call.fields.get("url").cloned().unwrap_or_default();
            db.webhook_url = (!url.is_empty()).then_some(url);
            Ok(Value::Bool(true))
        }
        "sendChatAction" => {
            chat_id(call)?;
            Ok(Value::Bool(true))
        }
        "getUserProfilePhotos" => {
            int_field(call, "user_id")?
                .ok_or_else(|| bad_request("user_id is empty"))?;
            Ok(json!({"total_count": 0, "photos": []}))
        }
        "sendMessage" => {
            let text = call
                .fields
                .get("text")
                .filter(|text| !text.is_empty())
                .ok_or_else(|| bad_request("message text is empty"))?;
            let mut message = new_message(db, chat_id(call)?);
            message["text"] = Value::from(text.clone());
            Ok(message)
        }
        "forwardMessage" | "sendPhoto" | "sendAudio" | "sendDocument" | "sendSticker"
        | "sendVideo" | "sendLocation" => Ok(new_message(db, chat_id(call)?)),
        _ => Err((StatusCode::NOT_FOUND, "Not Found".to_string())),
    }
}

fn new_message(db: &mut MockState, chat_id: Value) -> Value {
    db.next_message_id += 1;
    json!({
        "message_id": db.next_message_id,
        "chat": {"id": chat_id},
        "date": 1435524670
    })
}

fn chat_id(call: &RecordedCall) -> Result<Value, (StatusCode, String)> {
    let raw = call
        .fields
        .get("chat_id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("chat_id is empty"))?;
    Ok(raw
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw.clone())))
}

fn int_field(call: &RecordedCall, name: &str) -> Result<Option<i64>, (StatusCode, String)> {
    call.fields
        .get(name)
        .map(|raw| raw.parse::<i64>().map_err(|_| bad_request(&format!("{name} must be an integer"))))
        .transpose()
}

fn bad_request(reason: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Bad Request: {reason}"))
}

fn failure(status: StatusCode, description: &str) -> Reply {
    (
        status,
        Json(json!({
            "ok": false,
            "error_code": status.as_u16(),
            "description": description
        })),
    )
}
