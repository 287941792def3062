//! Black-box S6 scenario from `spec.md` §8: an ignored directory and its
//! entire subtree are skipped, while a sibling with a merely similar name
//! is scanned normally.

use std::sync::Arc;
use std::time::Duration;

use listing::{MockDir, MockListingClient};
use scanner::sink::RecordingSink;
use scanner::{FileSink, MasterConfig, PathConverter, ScannerMaster};

fn tree() -> MockListingClient {
    let mut client = MockListingClient::new();
    client.insert(
        "/store",
        MockDir {
            dirs: vec!["tmp".to_string(), "tmpother".to_string()],
            files: vec![],
        },
    );
    client.insert(
        "/store/tmp",
        MockDir {
            dirs: vec!["x".to_string()],
            files: vec![],
        },
    );
    client.insert(
        "/store/tmp/x",
        MockDir {
            dirs: vec![],
            files: vec![("y.root".to_string(), 42)],
        },
    );
    client.insert(
        "/store/tmpother",
        MockDir {
            dirs: vec![],
            files: vec![("keep.root".to_string(), 7)],
        },
    );
    client
}

#[test]
fn ignored_directory_subtree_is_skipped_but_similarly_named_sibling_is_not() {
    let client = Arc::new(tree());
    let path_converter = PathConverter::new("", "", "", "/store");

    let file_sink = Arc::new(RecordingSink::new());

    let config = MasterConfig {
        max_scanners: 2,
        timeout: Duration::from_secs(1),
        include_sizes: true,
        recursive_threshold: 0,
        max_files: None,
        ignore_list: vec!["/store/tmp".to_string()],
        compute_empty_dirs: false,
        display_progress: false,
    };

    let master = ScannerMaster::new(client, path_converter, "/store", config, Arc::clone(&file_sink) as Arc<dyn FileSink>, None, None);
    let outcome = master.run();

    assert!(outcome.counters.gave_up.is_empty());
    assert_eq!(file_sink.items(), vec!["/store/tmpother/keep.root".to_string()]);
    assert_eq!(outcome.counters.total_size, 7);
}
