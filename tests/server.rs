//! End-to-end tests: config file → mux → live HTTP server.

use std::io::Write;
use std::time::{Duration, Instant};

use proxy_mux::config::loader::load_config;
use proxy_mux::lifecycle::startup;

mod common;

const CONFIG: &str = r#"
[cluster]
enabled = true
role = "master"
is_master_handler = false
name = "edge"
cluster_id = "c-01"
load_policy = "least_connections"

[[routes]]
pattern = "/health"
body = "ok"

[[routes]]
pattern = "/version?format=json"
content_type = "application/json"
body = '{"version":"1"}'

[fallback]
kind = "redirect"
upstream = "http://upstream.internal:8000"

[observability]
cluster_info_path = "/cluster"
"#;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_config_driven_node() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let config = load_config(file.path()).unwrap();
    let mux = startup::prepare(&config).unwrap();
    let (addr, shutdown) = common::start_server(config, mux).await;
    let client = client();

    let res = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = client
        .get(format!("http://{}/version?format=json", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"version":"1"}"#);

    // Same path, different query: not an exact match.
    let res = client
        .get(format!("http://{}/version", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 307);
    assert_eq!(
        res.headers()["location"],
        "http://upstream.internal:8000/version"
    );

    let res = client
        .get(format!("http://{}/cluster", addr))
        .send()
        .await
        .unwrap();
    let cluster: serde_json::Value = res.json().await.unwrap();
    assert_eq!(cluster["role"], "master");
    assert_eq!(cluster["cluster_id"], "c-01");
    assert_eq!(cluster["load_policy"], "least_connections");

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_clients() {
    let config = proxy_mux::config::loader::parse_config(
        r#"
        [[routes]]
        pattern = "/health"
        body = "ok"

        [fallback]
        kind = "static"
        status = 503
        body = "no upstream"
        "#,
    )
    .unwrap();
    let mux = startup::prepare(&config).unwrap();
    let (addr, shutdown) = common::start_server(config, mux).await;
    let client = client();

    let concurrency = 16;
    let requests_per_task = 25;
    let start = Instant::now();

    let mut handles = Vec::new();
    for task in 0..concurrency {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let mut served = 0;
            for i in 0..requests_per_task {
                let (path, expected) = if (task + i) % 2 == 0 {
                    ("/health", 200)
                } else {
                    ("/elsewhere", 503)
                };
                let res = client
                    .get(format!("http://{}{}", addr, path))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(res.status(), expected);
                served += 1;
            }
            served
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert_eq!(total, concurrency * requests_per_task);
    assert!(start.elapsed() < Duration::from_secs(30));

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let config = proxy_mux::config::loader::parse_config(
        r#"
        [fallback]
        kind = "static"
        "#,
    )
    .unwrap();
    let mux = startup::prepare(&config).unwrap();
    let (addr, shutdown) = common::start_server(config, mux).await;
    let client = client();

    let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 502);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client.get(format!("http://{}/", addr)).send().await.is_err());
}
