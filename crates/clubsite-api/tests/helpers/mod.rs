//! Test helpers: build the router over a throwaway uploads directory.
//!
//! Run from workspace root: `cargo test -p clubsite-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use clubsite_api::setup;
use clubsite_api::AppState;
use clubsite_core::Config;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server plus the directory backing `/uploads`.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn uploads_dir(&self) -> &Path {
        self.uploads.path()
    }
}

/// Local-mode app with default limits.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Local-mode app with config tweaks applied before the router is built.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let uploads = TempDir::new().expect("Failed to create uploads dir");
    let mut config = Config::local(uploads.path());
    customize(&mut config);

    let (state, router) = setup::build_app(config)
        .await
        .expect("Failed to build app");
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        uploads,
    }
}
