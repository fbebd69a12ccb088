//! HTTP surface driven through the router without a socket.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use file2txt::session::{SessionView, UNSUPPORTED_FILE_WARNING};
use file2txt::web::handlers::CONVERSION_RUNNING;
use file2txt::web::{router, AppState};
use file2txt::{ConversionConfig, ConversionProgressCallback};
use tower::ServiceExt;

const BOUNDARY: &str = "file2txt-test-boundary";

fn app_state(scratch: &tempfile::TempDir) -> AppState {
    common::init_tracing();
    let config = ConversionConfig::builder()
        .scratch_dir(scratch.path())
        .build()
        .unwrap();
    AppState::new(config)
}

fn app(scratch: &tempfile::TempDir) -> Router {
    router(app_state(scratch), 16 * 1024 * 1024)
}

fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut req = Request::post("/api/convert").header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body)).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::get(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).unwrap()
}

/// `name=value` part of the response's `Set-Cookie`.
fn cookie_of(resp: &Response) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_string(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn view_of(resp: Response) -> SessionView {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

#[tokio::test]
async fn index_serves_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(&dir).oneshot(get("/", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(ct.starts_with("text/html"), "got: {ct}");
    assert!(body_string(resp).await.contains("文件转换器 Pro"));
}

#[tokio::test]
async fn fresh_state_sets_cookie_and_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(&dir).oneshot(get("/api/state", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie_of(&resp).starts_with("file2txt_session="));
    let view = view_of(resp).await;
    assert!(!view.has_result);
    assert!(view.processed_text.is_none());
    assert!(view.notice.is_none());
}

#[tokio::test]
async fn unsupported_upload_sets_notice() {
    let dir = tempfile::tempdir().unwrap();
    let body = multipart_body(Some(("notes.docx", b"whatever")), &[]);
    let resp = app(&dir).oneshot(upload(None, body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let view = view_of(resp).await;
    assert_eq!(view.notice.as_deref(), Some(UNSUPPORTED_FILE_WARNING));
    assert!(!view.has_result);
}

#[tokio::test]
async fn epub_upload_then_download() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let epub = common::build_epub(&[common::xhtml("<p>Downloadable chapter.</p>")]);

    let resp = app
        .clone()
        .oneshot(upload(None, multipart_body(Some(("book.epub", &epub)), &[])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = cookie_of(&resp);
    let view = view_of(resp).await;
    assert!(view.has_result);
    assert_eq!(view.file_name.as_deref(), Some("book_epub.txt"));
    assert!(view.toc.is_none());
    assert!(view.secondary_file_name.is_none());

    let resp = app
        .clone()
        .oneshot(get("/download/primary", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"book_epub.txt\"; filename*=UTF-8''book_epub.txt"
    );
    assert!(body_string(resp).await.contains("Downloadable chapter."));

    let resp = app
        .oneshot(get("/download/secondary", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn results_are_per_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let epub = common::build_epub(&[common::xhtml("<p>mine</p>")]);

    let resp = app
        .clone()
        .oneshot(upload(None, multipart_body(Some(("a.epub", &epub)), &[])))
        .await
        .unwrap();
    assert!(view_of(resp).await.has_result);

    let resp = app.oneshot(get("/api/state", None)).await.unwrap();
    assert!(!view_of(resp).await.has_result);
}

#[tokio::test]
async fn missing_file_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let body = multipart_body(None, &[("mode", "ocr")]);
    let resp = app(&dir).oneshot(upload(None, body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_without_result_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(&dir)
        .oneshot(get("/download/primary", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cookieless_downloads_create_no_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&dir);
    let app = router(state.clone(), 1024 * 1024);

    for _ in 0..50 {
        let resp = app
            .clone()
            .oneshot(get("/download/primary", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }
    let resp = app.oneshot(get("/api/progress", None)).await.unwrap();
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn second_upload_while_converting_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&dir);
    let app = router(state.clone(), 16 * 1024 * 1024);

    let (session, set) = state.sessions.resolve(&HeaderMap::new());
    let cookie = set[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(session.progress.try_begin());
    session.progress.on_progress(0.25);

    let epub = common::build_epub(&[common::xhtml("<p>second</p>")]);
    let resp = app
        .clone()
        .oneshot(upload(
            Some(&cookie),
            multipart_body(Some(("b.epub", &epub)), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_string(resp).await, CONVERSION_RUNNING);

    let resp = app
        .clone()
        .oneshot(get("/api/progress", Some(&cookie)))
        .await
        .unwrap();
    let snap: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(snap["active"], true);
    assert_eq!(snap["fraction"], 0.25);

    session.progress.finish();
    let resp = app
        .oneshot(upload(
            Some(&cookie),
            multipart_body(Some(("b.epub", &epub)), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(view_of(resp).await.has_result);
}

#[tokio::test]
async fn progress_is_idle_between_conversions() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(&dir).oneshot(get("/api/progress", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let snap: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(snap["active"], false);
}
