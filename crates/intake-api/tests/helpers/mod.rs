//! Test helpers: build the router over an in-memory store and a temp storage root.
//!
//! Run from workspace root: `cargo test -p intake-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use intake_api::setup::{routes, services};
use intake_api::AppState;
use intake_core::models::FileRecord;
use intake_core::Config;
use intake_db::{FileRecordStore, InMemoryFileRecordStore};
use intake_storage::{LocalStorage, Storage};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

pub const UPLOAD_PATH: &str = "/api/v1/files/upload";

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: InMemoryFileRecordStore,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Poll until the record has a conversion outcome matching `done`.
    pub async fn wait_for<F>(&self, id: Uuid, done: F) -> FileRecord
    where
        F: Fn(&FileRecord) -> bool,
    {
        for _ in 0..500 {
            if let Some(record) = self.store.get(id).await.unwrap() {
                if done(&record) {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("record {} never reached the expected state", id);
    }

    pub async fn wait_for_conversion(&self, id: Uuid) -> FileRecord {
        self.wait_for(id, |r| r.file_path.is_some() || r.error_message.is_some())
            .await
    }

    /// Every regular file below `dir` inside the storage root, relative to the root.
    pub fn files_under(&self, dir: &str) -> Vec<String> {
        let mut out = Vec::new();
        collect_files(self.root(), &self.root().join(dir), &mut out);
        out.sort();
        out
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else {
            let relative = path.strip_prefix(root).unwrap();
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = Config {
        upload_root: temp_dir.path().display().to_string(),
        conversion_max_workers: 2,
        ..Config::default()
    };

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(temp_dir.path())
            .await
            .expect("Failed to create local storage"),
    );
    let store = InMemoryFileRecordStore::new();

    let state = services::initialize_services(config.clone(), Arc::new(store.clone()), storage);
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        store,
        _temp_dir: temp_dir,
    }
}

pub fn file_part(name: &str, data: Vec<u8>, mime: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(name)
        .mime_type(mime)
}

/// Upload `(filename, bytes, mime)` triples as repeated `files` fields.
pub async fn upload(client: &TestServer, files: Vec<(&str, Vec<u8>, &str)>) -> TestResponse {
    let form = files
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, data, mime)| {
            form.add_part("files", file_part(name, data, mime))
        });
    client.post(UPLOAD_PATH).multipart(form).await
}

pub const RAW_BOUNDARY: &str = "intake-test-boundary";

/// One `files` part of a hand-written multipart body, without the closing boundary.
pub fn raw_part(filename: &str, extra_headers: &str, data: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\
         Content-Type: text/plain\r\n{}\r\n{}\r\n",
        RAW_BOUNDARY, filename, extra_headers, data
    )
}

/// Post a hand-written multipart body as is.
pub async fn upload_raw(client: &TestServer, body: String) -> TestResponse {
    client
        .post(UPLOAD_PATH)
        .content_type(&format!("multipart/form-data; boundary={}", RAW_BOUNDARY))
        .bytes(bytes::Bytes::from(body))
        .await
}

/// Record ids from an upload response body, in response order.
pub fn uploaded_ids(body: &serde_json::Value) -> Vec<Uuid> {
    body["files"]
        .as_array()
        .expect("Expected 'files' in upload response")
        .iter()
        .map(|f| Uuid::parse_str(f["id"].as_str().unwrap()).unwrap())
        .collect()
}
