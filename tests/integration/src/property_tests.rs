//! Property tests: one pass converges any tree, a second pass changes nothing

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mirror_core::{MemorySink, SyncCycle, SyncSettings};
use mirror_fs::PathCase;
use mirror_test_utils::TestTree;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

type Layout = BTreeMap<String, Vec<u8>>;

fn layout() -> impl Strategy<Value = Layout> {
    prop::collection::btree_map(
        "[a-c]{1,2}(/[a-c]{1,2}){0,2}",
        prop::collection::vec(any::<u8>(), 0..48),
        0..10,
    )
}

/// Write a layout, dropping entries whose path collides with another
/// entry (a file where a directory is needed, or the reverse).
///
/// Returns the files actually written.
fn materialize(root: &Path, layout: &Layout) -> Vec<PathBuf> {
    fs::create_dir_all(root).unwrap();
    let mut written = Vec::new();
    for (rel, content) in layout {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
            && fs::create_dir_all(parent).is_err()
        {
            continue;
        }
        if fs::write(&path, content).is_ok() {
            written.push(path);
        }
    }
    written
}

fn pass(tree: &TestTree, sink: &Arc<MemorySink>) {
    let settings = SyncSettings::new(tree.source(), tree.replica()).with_path_case(PathCase::Sensitive);
    let report = SyncCycle::new(settings, sink.clone())
        .run_once(&CancellationToken::new())
        .unwrap();
    assert!(report.is_completed());
    assert_eq!(report.stats.errors, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_pass_converges_and_second_is_quiet(source in layout(), replica in layout()) {
        let tree = TestTree::new();
        materialize(tree.source(), &source);
        // Old replica files, so same-length stale content is not mistaken
        // for a fresh copy by the modification-time check
        for file in materialize(tree.replica(), &replica) {
            tree.age(&file, Duration::from_secs(3600));
        }
        let sink = Arc::new(MemorySink::new());

        pass(&tree, &sink);
        prop_assert_eq!(tree.source_listing(), tree.replica_listing());

        sink.clear();
        pass(&tree, &sink);
        prop_assert!(sink.actions().is_empty(), "second pass acted: {:?}", sink.actions());
    }
}
