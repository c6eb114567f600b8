//! Cross-crate integration tests
//!
//! These tests drive the scheduler against real folders while the source
//! changes underneath it, the way the binary runs in production.

use std::sync::Arc;
use std::time::Duration;

use mirror_core::sync::EXITING;
use mirror_core::{MemorySink, Scheduler, Severity, SyncCycle, SyncSettings};
use mirror_fs::PathCase;
use mirror_test_utils::TestTree;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn start(tree: &TestTree, sink: &Arc<MemorySink>) -> (CancellationToken, tokio::task::JoinHandle<mirror_core::SchedulerSummary>) {
    let settings = SyncSettings::new(tree.source(), tree.replica())
        .with_interval(Duration::from_millis(20))
        .with_path_case(PathCase::Sensitive);
    let scheduler = Scheduler::new(Arc::new(SyncCycle::new(settings, sink.clone())));
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });
    (cancel, handle)
}

/// Poll until `check` holds, failing the test after ten seconds.
async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let result = tokio::time::timeout(Duration::from_secs(10), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for: {what}");
}

fn mirrored(tree: &TestTree) -> bool {
    tree.replica().is_dir() && tree.source_listing() == tree.replica_listing()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_replica_follows_source_across_passes() {
    let tree = TestTree::new();
    tree.write_source("docs/readme.txt", "v1");
    tree.write_source("notes.txt", "keep");
    let sink = Arc::new(MemorySink::new());
    let (cancel, handle) = start(&tree, &sink);

    eventually("initial mirror", || mirrored(&tree)).await;

    // Add, change and remove entries while the loop runs
    tree.write_source("docs/new.txt", "fresh");
    tree.write_source("docs/readme.txt", "version two");
    std::fs::remove_file(tree.source().join("notes.txt")).unwrap();

    eventually("changes mirrored", || {
        mirrored(&tree) && !tree.replica().join("notes.txt").exists()
    })
    .await;
    assert_eq!(tree.read_replica("docs/readme.txt"), "version two");

    cancel.cancel();
    let summary = handle.await.unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.failed_passes, 0);
    assert!(summary.passes >= 2);
    assert_eq!(sink.notices(Severity::Info).last().map(String::as_str), Some(EXITING));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_loop_survives_source_disappearing() {
    let tree = TestTree::new();
    tree.write_source("a.txt", "abc");
    let sink = Arc::new(MemorySink::new());
    let (cancel, handle) = start(&tree, &sink);

    eventually("initial mirror", || mirrored(&tree)).await;

    // Source goes away: passes fail, the loop keeps going
    let parked = tree.root().join("parked");
    std::fs::rename(tree.source(), &parked).unwrap();
    eventually("a failed pass", || !sink.notices(Severity::Error).is_empty()).await;

    // Source comes back with new content
    std::fs::rename(&parked, tree.source()).unwrap();
    tree.write_source("b.txt", "back");
    eventually("recovery", || {
        mirrored(&tree) && tree.replica().join("b.txt").exists()
    })
    .await;

    cancel.cancel();
    let summary = handle.await.unwrap();
    assert!(summary.failed_passes >= 1);
    assert!(
        sink.notices(Severity::Error)[0].starts_with("Unexpected error: Source folder does not exist")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_replica_deleted_externally_is_rebuilt() {
    let tree = TestTree::new();
    tree.write_source("deep/er/file.bin", [0u8, 1, 2, 3]);
    let sink = Arc::new(MemorySink::new());
    let (cancel, handle) = start(&tree, &sink);

    eventually("initial mirror", || mirrored(&tree)).await;
    std::fs::remove_dir_all(tree.replica()).unwrap();
    eventually("rebuilt replica", || mirrored(&tree)).await;

    cancel.cancel();
    handle.await.unwrap();
}
