//! End-to-end serve coverage: build the sample site, serve it over a real
//! listener, and exercise dispatch through HTTP.

mod common;

use std::collections::HashMap;

use tokio::net::TcpListener;

use corridor::{run_build, server, DispatchTable, HttpServer, Method};

use common::{sample_site, Site};

async fn serve_site() -> (String, Site) {
    let site = sample_site();
    let artifacts = run_build(&site.config, &site.registry).await.unwrap();
    let table = DispatchTable::load(&artifacts.manifest, &site.registry).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&site.config.server, table);
    tokio::spawn(server.run(listener));

    (format!("http://{addr}"), site)
}

#[tokio::test]
async fn page_with_data_serves_html() {
    let (base, _site) = serve_site().await;
    let response = reqwest::get(format!("{base}/")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response
        .headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = response.text().await.unwrap();
    assert!(body.contains("welcome home"));
    assert!(body.contains("site shell"));
}

#[tokio::test]
async fn api_endpoint_serves_json_with_path_params() {
    let (base, _site) = serve_site().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(format!("{base}/users/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["id"], "42");
    assert_eq!(body["method"], "GET");

    let body: serde_json::Value = client
        .post(format!("{base}/users/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["method"], "POST");
}

#[tokio::test]
async fn undeclared_method_does_not_match() {
    let (base, _site) = serve_site().await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{base}/users/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn static_sibling_wins_over_dynamic() {
    let (base, _site) = serve_site().await;

    let body: serde_json::Value = reqwest::get(format!("{base}/users/profile"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["fixed"], "profile");
}

#[tokio::test]
async fn directory_index_serves_the_directory_path() {
    let (base, _site) = serve_site().await;

    let body: serde_json::Value = reqwest::get(format!("{base}/users"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["users"][0], "ada");
}

#[tokio::test]
async fn override_layout_replaces_the_inherited_shell() {
    let (base, _site) = serve_site().await;

    let body = reqwest::get(format!("{base}/admin/panel"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("admin shell"));
    assert!(body.contains("panel"));
    assert!(!body.contains("site shell"));
}

#[tokio::test]
async fn handler_failure_serves_the_error_boundary() {
    let (base, _site) = serve_site().await;

    let response = reqwest::get(format!("{base}/fragile")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body = response.text().await.unwrap();
    assert!(body.contains("boundary: backing store unavailable"));

    // The failure is contained to that request.
    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn unmatched_path_is_404() {
    let (base, _site) = serve_site().await;

    let response = reqwest::get(format!("{base}/no/such/route")).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn swapped_table_changes_responses_without_restart() {
    let site = sample_site();
    let artifacts = run_build(&site.config, &site.registry).await.unwrap();
    let table = DispatchTable::load(&artifacts.manifest, &site.registry).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&site.config.server, table);
    let handle = server.table_handle();
    tokio::spawn(server.run(listener));
    let base = format!("http://{addr}");

    assert_eq!(reqwest::get(format!("{base}/about")).await.unwrap().status(), 200);

    // Drop the about page and rebuild, as the dev loop would.
    std::fs::remove_file(site.config.build.routes_dir.join("about.rs")).unwrap();
    let artifacts = run_build(&site.config, &site.registry).await.unwrap();
    let table = DispatchTable::load(&artifacts.manifest, &site.registry).unwrap();
    handle.store(std::sync::Arc::new(table));

    assert_eq!(reqwest::get(format!("{base}/about")).await.unwrap().status(), 404);
    assert_eq!(reqwest::get(format!("{base}/")).await.unwrap().status(), 200);
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_table() {
    let site = sample_site();
    let artifacts = run_build(&site.config, &site.registry).await.unwrap();
    let table = DispatchTable::load(&artifacts.manifest, &site.registry).unwrap();

    let http = HttpServer::new(&site.config.server, table);
    let handle = http.table_handle();
    drop(http);

    // An unregistered route file makes the rebuild fail; the table in the
    // handle must survive untouched.
    let orphan = site.config.build.routes_dir.join("orphan.rs");
    std::fs::write(&orphan, b"").unwrap();
    server::reload(&site.config, &site.registry, &handle).await;
    let response = handle
        .load()
        .dispatch(Method::Get, "/about", HashMap::new(), HashMap::new());
    assert_eq!(response.status, 200);

    // With the tree valid again the swap goes through: removing the about
    // page is visible after the next reload.
    std::fs::remove_file(&orphan).unwrap();
    std::fs::remove_file(site.config.build.routes_dir.join("about.rs")).unwrap();
    server::reload(&site.config, &site.registry, &handle).await;
    let response = handle
        .load()
        .dispatch(Method::Get, "/about", HashMap::new(), HashMap::new());
    assert_eq!(response.status, 404);
}
