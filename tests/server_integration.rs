//! Integration tests for the HTTP trigger endpoint

use serde_json::{json, Value};
use sessionlift::cli::build_router;
use sessionlift::config::HandoffSettings;
use sessionlift::handoff::{HandoffWriter, ObjectRef};
use sessionlift::pipeline::ExportPipeline;
use sessionlift::store::MemoryStore;
use sessionlift::types::RecordKind;
use sessionlift::warehouse::{LoadJob, LoadState, TableSchema, Warehouse};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Warehouse that accepts every load
struct AcceptingWarehouse;

#[async_trait::async_trait]
impl Warehouse for AcceptingWarehouse {
    async fn submit_load(
        &self,
        _source: &ObjectRef,
        _schema: &TableSchema,
    ) -> sessionlift::Result<LoadJob> {
        Ok(LoadJob {
            id: "job-1".to_string(),
            dataset: "game_analytics".to_string(),
            table: "sessions".to_string(),
        })
    }

    async fn load_state(&self, _job: &LoadJob) -> sessionlift::Result<LoadState> {
        Ok(LoadState::Done)
    }
}

struct TestServer {
    addr: SocketAddr,
    store: Arc<MemoryStore>,
    _handoff_dir: tempfile::TempDir,
}

async fn spawn_server() -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let handoff_dir = tempfile::tempdir().unwrap();
    let writer = HandoffWriter::new(&HandoffSettings {
        destination: handoff_dir.path().to_str().unwrap().to_string(),
        object_name: "sessions.ndjson".to_string(),
    })
    .unwrap();

    let pipeline = Arc::new(ExportPipeline::new(
        Arc::clone(&store) as Arc<dyn sessionlift::store::TelemetryStore>,
        writer,
        Arc::new(AcceptingWarehouse),
        2,
    ));

    let app = build_router(pipeline);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        store,
        _handoff_dir: handoff_dir,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Poll a run's status page until it leaves the running state
async fn await_terminal_state(base: &str, run_id: &str) -> Value {
    let client = client();
    for _ in 0..100 {
        let body: Value = client
            .get(format!("{base}/admin/analytics/runs/{run_id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if body["data"]["state"] != "running" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("run {run_id} never finished");
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = spawn_server().await;
    let base = format!("http://{}", server.addr);

    let body: Value = client()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_trigger_returns_run_handle() {
    let server = spawn_server().await;
    let base = format!("http://{}", server.addr);

    server
        .store
        .insert(
            RecordKind::Session,
            json!({
                "id": "s-1",
                "startTime": "2026-08-01T10:00:00Z",
                "endTime": "2026-08-01T10:10:00Z"
            }),
        )
        .await
        .unwrap();

    let body: Value = client()
        .get(format!("{base}/admin/analytics/export"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    let run_id = body["data"]["run_id"].as_str().unwrap().to_string();
    assert!(run_id.starts_with("run-"));

    let terminal = await_terminal_state(&base, &run_id).await;
    assert_eq!(terminal["data"]["state"], "succeeded");
    assert_eq!(terminal["data"]["report"]["sessions_exported"], 1);
    assert_eq!(terminal["data"]["report"]["keys_deleted"], 1);

    // The run deleted the exported session from the store.
    assert_eq!(server.store.len(RecordKind::Session).await, 0);
}

#[tokio::test]
async fn test_trigger_with_redirect() {
    let server = spawn_server().await;
    let base = format!("http://{}", server.addr);

    let response = client()
        .get(format!("{base}/admin/analytics/export?redirect=true"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/admin/analytics/runs/run-"));
}

#[tokio::test]
async fn test_unknown_run_is_404() {
    let server = spawn_server().await;
    let base = format!("http://{}", server.addr);

    let response = client()
        .get(format!("{base}/admin/analytics/runs/run-nope"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}
