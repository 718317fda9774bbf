use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use cartage::application::content_cache::ThreadRngJitter;
use cartage::application::sitemap::{SitemapConfig, SitemapService};
use cartage::infra::content::TomlContentStore;
use cartage::infra::http::{HttpState, build_router};
use serde_json::Value;
use time::macros::date;
use tower::ServiceExt;

fn write_doc(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("doc parent")).expect("create content dirs");
    fs::write(&path, body).expect("write doc");
}

fn seed_content(root: &Path) {
    write_doc(
        root,
        "cases/port-relocation.toml",
        "title = \"Port Relocation\"\ndate = 2024-03-01\n",
    );
    write_doc(
        root,
        "cases/cold-chain.toml",
        "title = \"Cold Chain Launch\"\ndate = 2024-04-15\n",
    );
    for (index, day) in [(1, 5), (2, 12), (3, 20)] {
        write_doc(
            root,
            &format!("insights/company/update-{index}.toml"),
            &format!("title = \"Company Update {index}\"\ndate = 2024-06-{day:02}\n"),
        );
    }
}

fn router_over(root: &Path, page_size: usize) -> Router {
    let content = Arc::new(TomlContentStore::load(root).expect("load content"));
    let sitemap = Arc::new(SitemapService::new(
        content.clone(),
        SitemapConfig {
            base_url: "https://www.example-logistics.com".to_string(),
            static_paths: vec!["/".to_string()],
            service_slugs: vec!["customs-clearance".to_string()],
            page_size,
            default_lastmod: date!(2024 - 01 - 01),
        },
    ));

    build_router(HttpState {
        content,
        jitter: Arc::new(ThreadRngJitter),
        sitemap,
        page_size,
    })
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec();
    (status, content_type, body)
}

#[tokio::test]
async fn sitemap_endpoint_serves_xml() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, content_type, body) = get(router_over(root.path(), 6), "/sitemap.xml").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/xml"));
    let xml = String::from_utf8(body).expect("utf8 body");
    assert!(xml.contains("/cases/port-relocation"));
    assert!(xml.contains("/services/customs-clearance"));
}

#[tokio::test]
async fn case_detail_includes_neighbors_and_related() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, _, body) = get(router_over(root.path(), 6), "/api/cases/port-relocation").await;

    assert_eq!(status, StatusCode::OK);
    let detail: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(detail["article"]["path"], "/cases/port-relocation");
    // cold-chain is newer, so it sits on the `previous` side.
    assert_eq!(detail["neighbors"]["previous"]["slug"], "cold-chain");
    assert!(detail["neighbors"]["next"].is_null());
    assert_eq!(detail["related"].as_array().expect("related array").len(), 1);
}

#[tokio::test]
async fn unknown_case_slug_is_not_found() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, _, _) = get(router_over(root.path(), 6), "/api/cases/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn insights_listing_paginates_over_the_full_list() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, _, body) = get(
        router_over(root.path(), 2),
        "/api/insights?category=company&page=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let page: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(page["total"], 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["page_count"], 2);
    // Newest-first across pages: the oldest article lands on page 2.
    let items = page["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "update-1");
}

#[tokio::test]
async fn invalid_category_is_rejected() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, _, _) = get(
        router_over(root.path(), 6),
        "/api/insights?category=press",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn service_catalog_is_served() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, _, body) = get(
        router_over(root.path(), 6),
        "/api/services/customs-clearance",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let service: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(service["slug"], "customs-clearance");

    let (status, _, _) = get(router_over(root.path(), 6), "/api/services/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_probe_responds() {
    let root = tempfile::tempdir().expect("tempdir");
    seed_content(root.path());

    let (status, _, _) = get(router_over(root.path(), 6), "/_health").await;

    assert_eq!(status, StatusCode::OK);
}
