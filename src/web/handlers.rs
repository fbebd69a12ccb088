//! HTTP handlers.
//!
//! Conversions block, so `/api/convert` moves them onto `spawn_blocking`; the
//! runtime keeps answering `/api/progress` polls for the same session while
//! OCR runs.

use crate::progress::ProgressSnapshot;
use crate::session::{run_request, ConversionRequest, PdfMode, SessionView};
use crate::web::page::INDEX_HTML;
use crate::web::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{error, info};

type HandlerError = (StatusCode, String);

/// Answer to an upload while the same session is still converting.
pub const CONVERSION_RUNNING: &str = "当前会话已有转换正在进行，请稍候。";

fn bad_request(e: impl std::fmt::Display) -> HandlerError {
    (StatusCode::BAD_REQUEST, format!("无效的上传请求: {e}"))
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn state(State(app): State<AppState>, headers: HeaderMap) -> (HeaderMap, Json<SessionView>) {
    let (session, set_cookie) = app.sessions.resolve(&headers);
    let view = session.state().view();
    (set_cookie, Json(view))
}

pub async fn progress(State(app): State<AppState>, headers: HeaderMap) -> Json<ProgressSnapshot> {
    let snapshot = app
        .sessions
        .lookup(&headers)
        .map(|session| session.progress.snapshot())
        .unwrap_or_default();
    Json(snapshot)
}

pub async fn convert(
    State(app): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(HeaderMap, Json<SessionView>), HandlerError> {
    let (session, set_cookie) = app.sessions.resolve(&headers);

    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut pdf_mode = PdfMode::default();
    let mut extra_text = false;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                upload = Some((file_name, bytes.to_vec()));
            }
            Some("mode") => {
                pdf_mode = PdfMode::from_form_value(&field.text().await.map_err(bad_request)?);
            }
            Some("extra_text") => {
                let value = field.text().await.map_err(bad_request)?;
                extra_text = matches!(value.trim(), "on" | "true" | "1");
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
        return Err(bad_request("missing file field"));
    };
    info!("Upload: {} ({} bytes, {:?})", file_name, bytes.len(), pdf_mode);

    let request = ConversionRequest {
        file_name,
        bytes,
        pdf_mode,
        extra_text,
    };
    let config = Arc::clone(&app.config);
    let tracker = session.progress.clone();

    if !tracker.try_begin() {
        return Err((StatusCode::CONFLICT, CONVERSION_RUNNING.to_string()));
    }
    let dispatch = tokio::task::spawn_blocking(move || run_request(&request, &config, &tracker))
        .await;
    session.progress.finish();

    let dispatch = dispatch.map_err(|e| {
        error!("Conversion task panicked: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("conversion task failed: {e}"),
        )
    })?;

    let mut state = session.state();
    state.record(dispatch);
    Ok((set_cookie, Json(state.view())))
}

pub async fn download(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(slot): Path<String>,
) -> Response {
    let Some(session) = app.sessions.lookup(&headers) else {
        return no_result();
    };
    let state = session.state();

    let payload = match slot.as_str() {
        "primary" => state.primary_download(),
        "secondary" => state.secondary_download(),
        _ => None,
    };

    match payload {
        Some((name, text)) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, content_disposition(&name)),
            ],
            text.to_string(),
        )
            .into_response(),
        None => no_result(),
    }
}

fn no_result() -> Response {
    (StatusCode::NOT_FOUND, "没有可下载的结果").into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(file_name)
    )
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
