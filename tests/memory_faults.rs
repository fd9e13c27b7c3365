//! Provider misbehaviour: refused creates, refused or misreported deletes, and
//! streams that will not open.

use scoped_tree::prelude::*;
use scoped_tree::{delete_node, DeleteOutcome, ErrorKind, MemoryProvider};

fn setup() -> (ScopedTree<MemoryProvider>, RootGrant) {
    let provider = MemoryProvider::new();
    let root = provider.add_root("mem://faults");
    (ScopedTree::new(provider), root)
}

fn write(tree: &ScopedTree<MemoryProvider>, root: &RootGrant, path: &str, data: &str) {
    tree.write_file(root, &WriteRequest::new(path, data)).unwrap();
}

fn read(tree: &ScopedTree<MemoryProvider>, root: &RootGrant, path: &str) -> String {
    tree.read_file(root, &ReadRequest::new(path)).unwrap().data
}

fn exists(tree: &ScopedTree<MemoryProvider>, root: &RootGrant, path: &str) -> bool {
    tree.exists(root, path).unwrap().exists
}

#[test]
fn recursive_rmdir_continues_past_stuck_nodes() {
    let (tree, root) = setup();
    write(&tree, &root, "d/a/x.txt", "x");
    write(&tree, &root, "d/b/y.txt", "y");
    tree.provider().refuse_delete("a");
    tree.provider().refuse_delete("d");

    tree.rmdir(&root, &RmdirRequest::new("d").recursive(true)).unwrap();

    // the stuck nodes remain, everything else went
    assert!(exists(&tree, &root, "d/a"));
    assert!(!exists(&tree, &root, "d/a/x.txt"));
    assert!(!exists(&tree, &root, "d/b"));
    let left = tree.readdir(&root, Some("d")).unwrap();
    assert_eq!(left.entries.len(), 1);
    assert_eq!(left.entries[0].name, "a");
}

#[test]
fn move_succeeds_when_source_delete_is_misreported() {
    let (tree, root) = setup();
    write(&tree, &root, "src.txt", "moving");
    tree.provider().misreport_delete("src.txt");

    tree.move_file(&root, &TransferRequest::new("src.txt", "out/dst.txt")).unwrap();
    assert_eq!(read(&tree, &root, "out/dst.txt"), "moving");
    assert!(!exists(&tree, &root, "src.txt"));
}

#[test]
fn move_succeeds_when_source_delete_is_refused() {
    let (tree, root) = setup();
    write(&tree, &root, "pinned.txt", "copy me");
    tree.provider().refuse_delete("pinned.txt");

    tree.move_file(&root, &TransferRequest::new("pinned.txt", "moved.txt")).unwrap();
    assert_eq!(read(&tree, &root, "moved.txt"), "copy me");
    assert!(exists(&tree, &root, "pinned.txt"));
}

#[test]
fn delete_file_fails_when_provider_says_false() {
    let (tree, root) = setup();
    write(&tree, &root, "stuck.txt", "x");
    tree.provider().refuse_delete("stuck.txt");

    let err = tree.delete_file(&root, "stuck.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert_eq!(err.to_string(), "deleteFile failed: Delete returned false");
    assert!(exists(&tree, &root, "stuck.txt"));
}

#[test]
fn overwrite_fails_when_destination_cannot_be_removed() {
    let (tree, root) = setup();
    write(&tree, &root, "from.txt", "new");
    write(&tree, &root, "to.txt", "old");
    tree.provider().refuse_delete("to.txt");

    let err = tree
        .move_file(&root, &TransferRequest::new("from.txt", "to.txt").overwrite(true))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert!(err.to_string().contains("Failed to delete existing destination"));
    assert_eq!(read(&tree, &root, "from.txt"), "new");
    assert_eq!(read(&tree, &root, "to.txt"), "old");
}

#[test]
fn refused_directory_create_names_the_segment() {
    let (tree, root) = setup();
    tree.provider().refuse_create("locked");

    let err = tree.mkdir(&root, "open/locked/deeper").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert!(err.to_string().contains("locked"), "{err}");
    // segments before the refusal stay created
    assert!(exists(&tree, &root, "open"));
    assert!(!exists(&tree, &root, "open/locked"));
}

#[test]
fn refused_destination_create_fails_copy() {
    let (tree, root) = setup();
    write(&tree, &root, "a.txt", "x");
    tree.provider().refuse_create("b.txt");

    let err = tree.copy_file(&root, &TransferRequest::new("a.txt", "b.txt")).unwrap_err();
    assert!(err.to_string().contains("Failed to create destination file"));
    assert!(exists(&tree, &root, "a.txt"));
}

#[test]
fn unopenable_stream_is_a_provider_failure_not_a_decode_failure() {
    let (tree, root) = setup();
    tree.provider().refuse_open("sealed.txt");

    let err = tree.write_file(&root, &WriteRequest::new("sealed.txt", "data")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert!(err.to_string().starts_with("writeFile failed: failed to open output stream"));

    let err = tree.read_file(&root, &ReadRequest::new("sealed.txt")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
}

#[test]
fn failed_byte_write_is_an_io_failure_even_though_the_file_was_created() {
    let (tree, root) = setup();
    tree.provider().fail_writes("broken.txt");

    let err = tree
        .write_file(&root, &WriteRequest::new("logs/broken.txt", "payload"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(err.to_string().starts_with("writeFile failed:"), "{err}");
    assert!(exists(&tree, &root, "logs/broken.txt"));

    let err = tree
        .append_file(&root, &WriteRequest::new("logs/broken.txt", "more"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
}

#[test]
fn failed_copy_leaves_the_source_untouched() {
    let (tree, root) = setup();
    write(&tree, &root, "src/a.txt", "precious");
    tree.provider().fail_writes("b.txt");

    let err = tree.copy_file(&root, &TransferRequest::new("src/a.txt", "out/b.txt")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(err.to_string().starts_with("copy failed:"), "{err}");

    let err = tree.move_file(&root, &TransferRequest::new("src/a.txt", "out/b.txt").overwrite(true))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(err.to_string().starts_with("move failed:"), "{err}");
    assert_eq!(read(&tree, &root, "src/a.txt"), "precious");
}

#[test]
fn delete_outcome_distinguishes_quirky_reports_from_stuck_nodes() {
    let provider = MemoryProvider::new();
    let grant = provider.add_root("mem://outcome");
    let root = provider.dereference(&grant).unwrap();
    let quirky = provider.create_file(&root, "text/plain", "quirky").unwrap();
    let stuck = provider.create_file(&root, "text/plain", "stuck").unwrap();
    let fine = provider.create_file(&root, "text/plain", "fine").unwrap();
    provider.misreport_delete("quirky");
    provider.refuse_delete("stuck");

    assert_eq!(delete_node(&provider, Some(&root), &fine), DeleteOutcome::Deleted);
    assert_eq!(delete_node(&provider, Some(&root), &quirky), DeleteOutcome::ReportedFailure);
    assert_eq!(delete_node(&provider, Some(&root), &stuck), DeleteOutcome::StillPresent);
    assert_eq!(delete_node(&provider, None, &stuck), DeleteOutcome::ReportedFailure);
}
