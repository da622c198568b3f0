use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use errandlink_core::testing::fixtures;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config
fn minimal_config(port: u16, endpoint: &str) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[client]
endpoint = "{}"
token = "startup-token"

[callback]
secret = "123456"
require_secret = true
"#,
        port, endpoint
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_errandlink"))
        .env("ERRANDLINK_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_and_config_endpoints() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port, "http://127.0.0.1:1"));
    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");
    let text = response.text().await.unwrap();
    assert!(!text.contains("startup-token"));
    assert!(!text.contains("123456"));

    server.kill().await.ok();
}

#[tokio::test]
async fn test_callback_fetches_attachments_from_backend() {
    let backend = MockServer::start().await;
    for (collection, id) in [
        ("c3_responseattachment", "708"),
        ("c3_responseattachment", "709"),
        ("c3_areaarchive", "12"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/ng/api/json/{}/{}", collection, id)))
            .and(header("authorization", "Bearer startup-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(fixtures::attachment_document(id, "f.txt", b"data")),
            )
            .expect(1)
            .mount(&backend)
            .await;
    }

    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port, &backend.uri()));
    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let url = format!("http://127.0.0.1:{}/callback", port);

    let rejected = client
        .post(&url)
        .body(fixtures::answered_callback_without_links(None).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);

    let accepted = client
        .post(&url)
        .body(fixtures::answered_callback_without_links(Some("123456")).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status().as_u16(), 200);
    let json: serde_json::Value = accepted.json().await.unwrap();
    assert_eq!(json["status"], "ok");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_errandlink"))
            .env("ERRANDLINK_CONFIG", "/nonexistent/config.toml")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_required_secret_without_value_exits_with_error() {
    let temp_file = write_config(
        r#"
[client]
endpoint = "http://localhost"
token = "t"

[callback]
require_secret = true
"#,
    );

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_errandlink"))
            .env("ERRANDLINK_CONFIG", temp_file.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}
