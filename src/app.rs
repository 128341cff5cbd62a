//! HTTP surface: one shared editor behind a mutex, JSON in and out.
//!
//! Each request is one edit-engine operation; the mutex serializes them so
//! every operation is applied as a single indivisible step. External
//! failures (snapshot I/O) are reported to the caller without rolling back
//! the in-memory edit that already applied.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::clipboard::PayloadKind;
use crate::column::ColumnId;
use crate::downloader;
use crate::engine::Editor;
use crate::error::EditError;
use crate::loader;
use crate::saving::SnapshotStore;
use crate::session::{SESSION_COOKIE, UserKey};
use crate::view::EditFocus;

pub struct AppState {
    editor: Mutex<Editor>,
    focus: Mutex<EditFocus>,
    store: SnapshotStore,
}

#[derive(Serialize)]
struct OpResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl OpResponse {
    fn ok() -> Json<Self> {
        Json(OpResponse {
            status: "ok".to_string(),
            message: None,
        })
    }

    fn noop(message: &str) -> Json<Self> {
        Json(OpResponse {
            status: "noop".to_string(),
            message: Some(message.to_string()),
        })
    }
}

// One mapping for every rejected operation. Validation failures are the
// caller's fault (422), stale indices are missing targets (404), external
// failures are ours (500).
fn error_response(e: EditError) -> Response {
    let status = if e.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if e == EditError::IndexOutOfRange {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    log::warn!("operation rejected: {e}");
    (
        status,
        Json(OpResponse {
            status: "error".to_string(),
            message: Some(e.to_string()),
        }),
    )
        .into_response()
}

pub async fn run(addr: &str, data_dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = Arc::new(AppState {
        editor: Mutex::new(Editor::new()),
        focus: Mutex::new(EditFocus::Viewing),
        store: SnapshotStore::new(data_dir),
    });

    let app = router(app_state);

    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_landing))
        .route("/api/sheet", get(get_sheet))
        .route("/api/load", post(load_csv))
        .route("/api/cell", post(set_cell))
        .route("/api/rows", post(add_row))
        .route("/api/rows/:index", delete(delete_row))
        .route("/api/columns", post(add_column))
        .route("/api/columns/:index", delete(delete_column))
        .route("/api/columns/rename", post(rename_column))
        .route("/api/columns/resize", post(resize_column))
        .route("/api/columns/move", post(move_column))
        .route("/api/undo", post(undo))
        .route("/api/page", post(set_page))
        .route("/api/focus", post(focus_action))
        .route("/api/clipboard/:action", post(clipboard_action))
        .route("/api/stats", get(get_stats))
        .route("/api/reset", post(reset))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/document", get(export_document))
        .route("/api/snapshots", post(save_snapshot).get(list_snapshots))
        .route("/api/snapshots/:id/load", post(load_snapshot))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn serve_landing() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>gridsheet</title></head>\
         <body><h1>gridsheet</h1>\
         <p>CSV grid editor API. Upload a CSV to <code>POST /api/load</code>, \
         read the current page from <code>GET /api/sheet</code>.</p>\
         </body></html>",
    )
}

// ---- sheet view ---------------------------------------------------------

#[derive(Serialize)]
struct ColumnDoc {
    id: ColumnId,
    name: String,
    width: u32,
}

async fn get_sheet(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let editor = state.editor.lock().unwrap();
    let columns: Vec<ColumnDoc> = editor
        .columns()
        .iter()
        .map(|c| ColumnDoc {
            id: c.id,
            name: c.name.clone(),
            width: c.width,
        })
        .collect();
    let page = editor.visible_page();

    Json(serde_json::json!({
        "columns": columns,
        "row_count": editor.grid().row_count(),
        "page_size": editor.page_size(),
        "page": page,
        "clipboard": editor.clipboard_kind(),
        "history_depth": editor.history_len(),
    }))
}

// ---- ingestion ----------------------------------------------------------

async fn load_csv(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut file_data = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("file") {
            file_data = field.bytes().await.unwrap_or_default().to_vec();
        }
    }

    if file_data.len() > loader::MAX_FILE_BYTES {
        return error_response(EditError::FileTooLarge {
            size: file_data.len(),
            max: loader::MAX_FILE_BYTES,
        });
    }

    let text = String::from_utf8_lossy(&file_data);
    match loader::parse_csv(&text) {
        Ok(dataset) => {
            let rows = dataset.rows.len();
            let cols = dataset.header.len();
            state.editor.lock().unwrap().load(dataset);
            *state.focus.lock().unwrap() = EditFocus::Viewing;
            log::info!("loaded dataset: {rows} rows, {cols} columns");
            OpResponse::ok().into_response()
        }
        Err(e) => error_response(e),
    }
}

// ---- cell and row operations --------------------------------------------

#[derive(Deserialize)]
struct CellUpdate {
    row: usize,
    col: usize,
    value: String,
}

async fn set_cell(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CellUpdate>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.set_cell(payload.row, payload.col, payload.value) {
        Ok(()) => OpResponse::ok().into_response(),
        Err(e) => error_response(e),
    }
}

async fn add_row(State(state): State<Arc<AppState>>) -> Json<OpResponse> {
    state.editor.lock().unwrap().add_row();
    Json(OpResponse {
        status: "ok".to_string(),
        message: None,
    })
}

async fn delete_row(State(state): State<Arc<AppState>>, Path(index): Path<usize>) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.delete_row(index) {
        Ok(()) => OpResponse::ok().into_response(),
        Err(e) => error_response(e),
    }
}

// ---- column operations --------------------------------------------------

#[derive(Deserialize)]
struct AddColumn {
    name: String,
    position: Option<usize>,
}

async fn add_column(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddColumn>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.add_column(&payload.name, payload.position) {
        Ok(id) => Json(serde_json::json!({ "status": "ok", "id": id })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_column(State(state): State<Arc<AppState>>, Path(index): Path<usize>) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.delete_column(index) {
        Ok(()) => OpResponse::ok().into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct RenameColumn {
    id: ColumnId,
    name: String,
}

async fn rename_column(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RenameColumn>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.rename_column(payload.id, &payload.name) {
        Ok(()) => OpResponse::ok().into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct ResizeColumn {
    id: ColumnId,
    width: u32,
}

async fn resize_column(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResizeColumn>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.resize_column(payload.id, payload.width) {
        Ok(()) => OpResponse::ok().into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct MoveColumn {
    from: usize,
    to: usize,
}

async fn move_column(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MoveColumn>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();
    match editor.move_column(payload.from, payload.to) {
        Ok(true) => OpResponse::ok().into_response(),
        Ok(false) => OpResponse::noop("move had no effect").into_response(),
        Err(e) => error_response(e),
    }
}

async fn undo(State(state): State<Arc<AppState>>) -> Json<OpResponse> {
    let mut editor = state.editor.lock().unwrap();
    if editor.undo() {
        Json(OpResponse {
            status: "ok".to_string(),
            message: None,
        })
    } else {
        Json(OpResponse {
            status: "noop".to_string(),
            message: Some("nothing to undo".to_string()),
        })
    }
}

// ---- pagination ---------------------------------------------------------

#[derive(Deserialize)]
struct PageRequest {
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn set_page(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PageRequest>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();
    if let Some(size) = payload.page_size {
        if let Err(e) = editor.set_page_size(size) {
            return error_response(e);
        }
    }
    if let Some(page) = payload.page {
        editor.set_page(page);
    }
    Json(serde_json::json!({ "status": "ok", "page": editor.visible_page() })).into_response()
}

// ---- edit focus ---------------------------------------------------------

#[derive(Deserialize)]
struct FocusRequest {
    action: String,
    row: Option<usize>,
    col: Option<usize>,
    value: Option<String>,
}

async fn focus_action(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FocusRequest>,
) -> Response {
    // Lock order everywhere: editor before focus.
    let mut editor = state.editor.lock().unwrap();
    let mut focus = state.focus.lock().unwrap();

    match payload.action.as_str() {
        "click" => {
            let (Some(row), Some(col)) = (payload.row, payload.col) else {
                return error_response(EditError::IndexOutOfRange);
            };
            if editor.grid().get(row, col).is_none() {
                return error_response(EditError::IndexOutOfRange);
            }
            focus.click(row, col);
        }
        "stage" => {
            focus.stage(payload.value.unwrap_or_default());
        }
        "confirm" => {
            let rows = editor.grid().row_count();
            let cols = editor.columns().len();
            if let Some(commit) = focus.confirm(rows, cols) {
                if let Some(value) = commit.value {
                    if let Err(e) = editor.set_cell(commit.row, commit.col, value) {
                        return error_response(e);
                    }
                }
            }
        }
        "cancel" => focus.cancel(),
        other => {
            return error_response(EditError::External(format!("unknown focus action: {other}")));
        }
    }

    Json(serde_json::json!({ "status": "ok", "editing": focus.is_editing() })).into_response()
}

// ---- clipboard ----------------------------------------------------------

#[derive(Deserialize)]
struct ClipboardTarget {
    kind: PayloadKind,
    row: Option<usize>,
    col: Option<usize>,
    position: Option<usize>,
}

async fn clipboard_action(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
    Json(target): Json<ClipboardTarget>,
) -> Response {
    let mut editor = state.editor.lock().unwrap();

    let result = match (action.as_str(), target.kind) {
        ("copy", PayloadKind::Cell) => with_cell(&target, |r, c| editor.copy_cell(r, c)),
        ("cut", PayloadKind::Cell) => with_cell(&target, |r, c| editor.cut_cell(r, c)),
        ("copy", PayloadKind::Row) => target
            .row
            .ok_or(EditError::IndexOutOfRange)
            .and_then(|r| editor.copy_row(r)),
        ("cut", PayloadKind::Row) => target
            .row
            .ok_or(EditError::IndexOutOfRange)
            .and_then(|r| editor.cut_row(r)),
        ("copy", PayloadKind::Column) => target
            .position
            .ok_or(EditError::IndexOutOfRange)
            .and_then(|p| editor.copy_column(p)),
        ("cut", PayloadKind::Column) => target
            .position
            .ok_or(EditError::IndexOutOfRange)
            .and_then(|p| editor.cut_column(p)),
        ("paste", kind) => {
            let pasted = match kind {
                PayloadKind::Cell => with_cell(&target, |r, c| editor.paste_cell(r, c)),
                PayloadKind::Row => target
                    .row
                    .ok_or(EditError::IndexOutOfRange)
                    .and_then(|r| editor.paste_row(r)),
                PayloadKind::Column => target
                    .position
                    .ok_or(EditError::IndexOutOfRange)
                    .and_then(|p| editor.paste_column(p)),
            };
            return match pasted {
                Ok(true) => OpResponse::ok().into_response(),
                Ok(false) => OpResponse::noop("clipboard empty or kind mismatch").into_response(),
                Err(e) => error_response(e),
            };
        }
        (other, _) => {
            return error_response(EditError::External(format!(
                "unknown clipboard action: {other}"
            )));
        }
    };

    match result {
        // The plain-text rendering rides along so the client can make its
        // best-effort system clipboard write.
        Ok(text) => Json(serde_json::json!({ "status": "ok", "text": text })).into_response(),
        Err(e) => error_response(e),
    }
}

fn with_cell<T>(
    target: &ClipboardTarget,
    f: impl FnOnce(usize, usize) -> Result<T, EditError>,
) -> Result<T, EditError> {
    match (target.row, target.col) {
        (Some(row), Some(col)) => f(row, col),
        _ => Err(EditError::IndexOutOfRange),
    }
}

// ---- stats and reset ----------------------------------------------------

async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let editor = state.editor.lock().unwrap();
    Json(editor.stats())
}

async fn reset(State(state): State<Arc<AppState>>) -> Json<OpResponse> {
    let mut editor = state.editor.lock().unwrap();
    if editor.reset() {
        *state.focus.lock().unwrap() = EditFocus::Viewing;
        Json(OpResponse {
            status: "ok".to_string(),
            message: None,
        })
    } else {
        Json(OpResponse {
            status: "noop".to_string(),
            message: Some("nothing loaded".to_string()),
        })
    }
}

// ---- export -------------------------------------------------------------

async fn export_csv(State(state): State<Arc<AppState>>) -> Response {
    let editor = state.editor.lock().unwrap();
    if editor.columns().is_empty() || editor.grid().is_empty() {
        return (StatusCode::CONFLICT, OpResponse::noop("sheet is empty")).into_response();
    }
    let csv = downloader::to_csv(editor.columns(), editor.grid());
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"table.csv\"",
        )
        .body(axum::body::Body::from(csv))
        .unwrap()
}

async fn export_document(State(state): State<Arc<AppState>>) -> Response {
    let editor = state.editor.lock().unwrap();
    if editor.columns().is_empty() || editor.grid().is_empty() {
        return (StatusCode::CONFLICT, OpResponse::noop("sheet is empty")).into_response();
    }
    match downloader::to_document(editor.columns(), editor.grid()) {
        Ok(buffer) => Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            )
            .header(
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"table.xlsx\"",
            )
            .body(axum::body::Body::from(buffer))
            .unwrap(),
        Err(e) => error_response(e),
    }
}

// ---- snapshots ----------------------------------------------------------

// Returns the caller's user key, minting one (and the cookie carrying it)
// on first contact. The key is opaque; there is no account behind it here.
fn ensure_user(jar: CookieJar) -> (CookieJar, UserKey) {
    if let Some(key) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| UserKey::parse(c.value()))
    {
        return (jar, key);
    }
    let key = UserKey::generate();
    let mut cookie = Cookie::new(SESSION_COOKIE, key.to_string());
    cookie.set_path("/");
    (jar.add(cookie), key)
}

#[derive(Deserialize)]
struct SaveQuery {
    name: String,
}

async fn save_snapshot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SaveQuery>,
    jar: CookieJar,
) -> Response {
    if params.name.trim().is_empty() {
        return error_response(EditError::EmptyName);
    }
    let (jar, user) = ensure_user(jar);

    let editor = state.editor.lock().unwrap();
    if editor.columns().is_empty() {
        return (StatusCode::CONFLICT, OpResponse::noop("sheet is empty")).into_response();
    }
    match state.store.save(
        &user.to_string(),
        &params.name,
        editor.columns(),
        editor.grid(),
    ) {
        Ok(id) => (
            jar,
            Json(serde_json::json!({ "status": "ok", "id": id })),
        )
            .into_response(),
        // Optimistic-write policy: the in-memory edit stands even though
        // persistence failed; the caller just sees the message.
        Err(e) => error_response(EditError::External(e.to_string())),
    }
}

async fn list_snapshots(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, user) = ensure_user(jar);
    match state.store.list(&user.to_string()) {
        Ok(metas) => (jar, Json(metas)).into_response(),
        Err(e) => error_response(EditError::External(e.to_string())),
    }
}

async fn load_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let Some(user) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| UserKey::parse(c.value()))
    else {
        return (StatusCode::NOT_FOUND, OpResponse::noop("no snapshots for caller")).into_response();
    };
    let Ok(id) = Uuid::parse_str(&id) else {
        return error_response(EditError::IndexOutOfRange);
    };

    match state.store.load(&user.to_string(), id) {
        Ok((columns, grid)) => {
            let mut editor = state.editor.lock().unwrap();
            editor.restore(columns, grid);
            *state.focus.lock().unwrap() = EditFocus::Viewing;
            OpResponse::ok().into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error_response(EditError::IndexOutOfRange)
        }
        Err(e) => error_response(EditError::External(e.to_string())),
    }
}
