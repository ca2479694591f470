//! Integration tests for server lifecycle.

mod common;

use std::time::Duration;

use common::{FakeExtractor, TestHarness};

#[tokio::test]
async fn cancellation_shuts_the_server_down() {
    let h = TestHarness::start(FakeExtractor::new()).await;
    assert_eq!(h.get("/health").await.status(), 200);

    h.shutdown.cancel();
    let finished = tokio::time::timeout(Duration::from_secs(5), h.server)
        .await
        .expect("server did not stop after cancellation")
        .expect("server task panicked");
    assert!(finished.is_ok());

    assert!(reqwest::get(format!("http://{}/health", h.addr)).await.is_err());
}
