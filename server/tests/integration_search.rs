use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use docdex_core::{DocService, IndexConfig};
use docdex_server::{router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_root(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("guides")).unwrap();
    fs::write(dir.join("a.txt"), "bgp bgp ospf").unwrap();
    fs::write(dir.join("b.txt"), "ospf").unwrap();
    fs::write(dir.join("guides/bgp_routing.md"), "# Border Gateway Protocol\nrouter bgp 65001\nneighbor 192.168.1.2").unwrap();
    fs::write(dir.join("ignored.png"), [0u8, 1, 2]).unwrap();
}

fn app_for(dir: &std::path::Path, admin_token: Option<&str>) -> Router {
    let service = DocService::build(IndexConfig::new(dir)).unwrap();
    router(AppState { service: Arc::new(service), admin_token: admin_token.map(String::from) })
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (status, json) = get(app, "/search?q=ospf&k=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"], 2);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr[0]["relative_path"], "b.txt");
    assert_eq!(arr[0]["match_type"], "content");
    assert_eq!(arr[1]["relative_path"], "a.txt");
    assert_eq!(arr[1]["snippet"], "bgp bgp ospf");
}

#[tokio::test]
async fn search_reports_filename_matches() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (status, json) = get(app, "/search?q=bgp_routing").await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    // filename hit, then content hits for "bgp" in a.txt and the guide itself
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["relative_path"], "guides/bgp_routing.md");
    assert_eq!(arr[0]["match_type"], "filename");
}

#[tokio::test]
async fn search_highlights_and_caps() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (_, json) = get(app, "/search?q=OSPF&k=1&highlight=true").await;
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["relative_path"], "b.txt");
    assert_eq!(arr[0]["snippet"], "<em>ospf</em>");
}

#[tokio::test]
async fn highlight_with_tag_like_words() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (_, json) = get(app, "/search?q=bgp%20em&k=1&highlight=true").await;
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr[0]["relative_path"], "a.txt");
    assert_eq!(arr[0]["snippet"], "<em>bgp</em> <em>bgp</em> ospf");
}

#[tokio::test]
async fn empty_query_is_empty_not_error() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (status, json) = get(app, "/search?q=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn list_and_read() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (status, json) = get(app.clone(), "/docs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    let docs = json["documents"].as_array().unwrap();
    assert_eq!(docs[0]["relative_path"], "a.txt");
    assert_eq!(docs[0]["extension"], "txt");
    assert_eq!(docs[0]["size_bytes"], 12);
    assert_eq!(docs[0]["status"]["state"], "ok");
    assert!(docs[0].get("text").is_none());

    let (status, json) = get(app.clone(), "/docs/read?path=guides/bgp_routing.md").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["text"].as_str().unwrap().contains("router bgp 65001"));

    let (status, json) = get(app, "/docs/summary?path=guides/bgp_routing.md&max_lines=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"], "# Border Gateway Protocol");
}

#[tokio::test]
async fn read_errors_map_to_status() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), None);

    let (status, json) = get(app.clone(), "/docs/read?path=../../etc/passwd").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json["error"].as_str().unwrap().contains("Access denied"));

    let (status, _) = get(app.clone(), "/docs/read?path=missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app, "/docs/read?path=ignored.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn not_ready_before_install() {
    let dir = tempdir().unwrap();
    let service = DocService::new(IndexConfig::new(dir.path()));
    let app = router(AppState { service: Arc::new(service), admin_token: None });

    let (status, _) = get(app.clone(), "/docs").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (_, json) = get(app, "/health").await;
    assert_eq!(json["status"], "building");
}

#[tokio::test]
async fn rebuild_requires_admin_token() {
    let dir = tempdir().unwrap();
    build_tiny_root(dir.path());
    let app = app_for(dir.path(), Some("secret"));

    let req = Request::post("/index/rebuild").body(Body::empty()).unwrap();
    let (status, _) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    fs::write(dir.path().join("c.txt"), "eigrp").unwrap();
    let req = Request::post("/index/rebuild")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::empty())
        .unwrap();
    let (status, json) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"], 4);

    let (_, json) = get(app, "/search?q=eigrp").await;
    assert_eq!(json["results"][0]["relative_path"], "c.txt");
}
