use scoped_tree::prelude::*;
use scoped_tree::tree::walk::resolve;
use scoped_tree::{ErrorKind, MemoryProvider, NodeKind};

fn setup() -> (ScopedTree<MemoryProvider>, RootGrant) {
    let provider = MemoryProvider::new();
    let root = provider.add_root("mem://root");
    (ScopedTree::new(provider), root)
}

fn read(tree: &ScopedTree<MemoryProvider>, root: &RootGrant, path: &str) -> String {
    tree.read_file(root, &ReadRequest::new(path)).unwrap().data
}

fn write(tree: &ScopedTree<MemoryProvider>, root: &RootGrant, path: &str, data: &str) {
    tree.write_file(root, &WriteRequest::new(path, data)).unwrap();
}

#[test]
fn walkthrough_mkdir_write_read_stat() {
    let (tree, root) = setup();

    tree.mkdir(&root, "a/b/c").unwrap();

    let listing = tree.readdir(&root, Some("a")).unwrap();
    assert_eq!(listing.entries.len(), 1);
    assert_eq!(listing.entries[0].name, "b");
    assert!(listing.entries[0].is_dir);
    assert_eq!(listing.entries[0].size, None);

    tree.write_file(
        &root,
        &WriteRequest::new("a/b/c/f.txt", "hello").encoding(Encoding::Utf8),
    )
    .unwrap();

    let got = tree
        .read_file(&root, &ReadRequest::new("a/b/c/f.txt").encoding(Encoding::Utf8))
        .unwrap();
    assert_eq!(got.data, "hello");

    let st = tree.stat(&root, "a/b/c/f.txt").unwrap();
    assert_eq!(st.kind, NodeKind::File);
    assert_eq!(st.size, Some(5));
    assert!(st.uri.starts_with("memory://node/"));
    assert!(st.mtime.is_some_and(|s| s > 0.0));
}

#[test]
fn mkdir_twice_leaves_one_node_per_segment() {
    let (tree, root) = setup();
    tree.mkdir(&root, "x/y").unwrap();
    tree.mkdir(&root, "x/y").unwrap();

    let top = tree.readdir(&root, None).unwrap();
    assert_eq!(top.entries.len(), 1);
    assert_eq!(top.entries[0].name, "x");
    let inner = tree.readdir(&root, Some("x")).unwrap();
    assert_eq!(inner.entries.len(), 1);
    assert_eq!(inner.entries[0].name, "y");
}

#[test]
fn base64_round_trip_preserves_arbitrary_bytes() {
    let (tree, root) = setup();
    let bytes: Vec<u8> = vec![0, 159, 146, 150, 255, b'\n', 0x7f];
    let payload = Encoding::Base64.encode(&bytes);

    tree.write_file(&root, &WriteRequest::new("bin/blob", payload).encoding(Encoding::Base64))
        .unwrap();
    let got = tree
        .read_file(&root, &ReadRequest::new("bin/blob").encoding(Encoding::Base64))
        .unwrap();
    assert_eq!(Encoding::Base64.decode(&got.data).unwrap(), bytes);
    assert_eq!(tree.stat(&root, "bin/blob").unwrap().size, Some(bytes.len() as u64));
}

#[test]
fn write_truncates_and_append_accumulates() {
    let (tree, root) = setup();
    write(&tree, &root, "log.txt", "first version");
    write(&tree, &root, "log.txt", "abc");
    tree.append_file(&root, &WriteRequest::new("log.txt", "def")).unwrap();
    assert_eq!(read(&tree, &root, "log.txt"), "abcdef");
}

#[test]
fn non_recursive_mkdir_needs_existing_parents() {
    let (tree, root) = setup();

    let err = tree.mkdir_with(&root, &MkdirRequest::new("p/q").recursive(false)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!tree.exists(&root, "p").unwrap().exists);

    tree.mkdir_with(&root, &MkdirRequest::new("p").recursive(false)).unwrap();
    tree.mkdir_with(&root, &MkdirRequest::new("p/q").recursive(false)).unwrap();
    tree.mkdir_with(&root, &MkdirRequest::new("p/q").recursive(false)).unwrap();
    assert!(tree.exists(&root, "p/q").unwrap().is_directory);

    write(&tree, &root, "f.txt", "x");
    let err = tree.mkdir_with(&root, &MkdirRequest::new("f.txt/sub").recursive(false)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongKind);
    let err = tree.mkdir_with(&root, &MkdirRequest::new("p//r").recursive(false)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn append_creates_missing_file_and_parents() {
    let (tree, root) = setup();
    tree.append_file(&root, &WriteRequest::new("new/dir/a.log", "line\n")).unwrap();
    assert_eq!(read(&tree, &root, "new/dir/a.log"), "line\n");
}

#[test]
fn delete_then_exists_is_false_and_delete_is_idempotent() {
    let (tree, root) = setup();
    write(&tree, &root, "d/f.txt", "x");
    assert!(tree.exists(&root, "d/f.txt").unwrap().exists);

    tree.delete_file(&root, "d/f.txt").unwrap();
    let ex = tree.exists(&root, "d/f.txt").unwrap();
    assert!(!ex.exists);
    assert!(!ex.is_directory);

    tree.delete_file(&root, "d/f.txt").unwrap();
    tree.delete_file(&root, "never/was/here").unwrap();
}

#[test]
fn exists_reports_directories() {
    let (tree, root) = setup();
    tree.mkdir(&root, "dir").unwrap();
    let ex = tree.exists(&root, "dir").unwrap();
    assert!(ex.exists && ex.is_directory);
}

#[test]
fn rmdir_without_recursive_refuses_non_empty_directory() {
    let (tree, root) = setup();
    write(&tree, &root, "d/one.txt", "1");
    write(&tree, &root, "d/two.txt", "2");
    let before = tree.readdir(&root, Some("d")).unwrap();

    let err = tree.rmdir(&root, &RmdirRequest::new("d")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotEmpty);
    assert!(err.to_string().contains("not empty"), "{err}");

    let after = tree.readdir(&root, Some("d")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn rmdir_removes_empty_and_recursive_trees() {
    let (tree, root) = setup();
    tree.mkdir(&root, "empty").unwrap();
    tree.rmdir(&root, &RmdirRequest::new("empty")).unwrap();
    assert!(!tree.exists(&root, "empty").unwrap().exists);

    write(&tree, &root, "t/a/b/c.txt", "deep");
    write(&tree, &root, "t/z.txt", "shallow");
    tree.rmdir(&root, &RmdirRequest::new("t").recursive(true)).unwrap();
    assert!(!tree.exists(&root, "t").unwrap().exists);
    assert!(tree.readdir(&root, None).unwrap().entries.is_empty());
}

#[test]
fn rmdir_rejects_missing_and_files() {
    let (tree, root) = setup();
    write(&tree, &root, "f.txt", "x");
    let missing = tree.rmdir(&root, &RmdirRequest::new("nope")).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
    let file = tree.rmdir(&root, &RmdirRequest::new("f.txt")).unwrap_err();
    assert_eq!(file.kind(), ErrorKind::WrongKind);
}

#[test]
fn move_without_overwrite_leaves_both_sides_alone() {
    let (tree, root) = setup();
    write(&tree, &root, "from.txt", "source");
    write(&tree, &root, "to.txt", "dest");

    let err = tree
        .move_file(&root, &TransferRequest::new("from.txt", "to.txt"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert!(err.to_string().contains("overwrite=false"));
    assert_eq!(read(&tree, &root, "from.txt"), "source");
    assert_eq!(read(&tree, &root, "to.txt"), "dest");
}

#[test]
fn move_with_overwrite_replaces_destination_and_removes_source() {
    let (tree, root) = setup();
    write(&tree, &root, "from.txt", "source");
    write(&tree, &root, "to.txt", "dest");

    tree.move_file(&root, &TransferRequest::new("from.txt", "to.txt").overwrite(true))
        .unwrap();
    assert_eq!(read(&tree, &root, "to.txt"), "source");
    assert!(!tree.exists(&root, "from.txt").unwrap().exists);
    assert_eq!(tree.readdir(&root, None).unwrap().entries.len(), 1);
}

#[test]
fn copy_preserves_source_and_creates_destination_chain() {
    let (tree, root) = setup();
    write(&tree, &root, "src/a.txt", "payload");

    tree.copy_file(&root, &TransferRequest::new("src/a.txt", "dst/deep/b.txt"))
        .unwrap();
    assert_eq!(read(&tree, &root, "dst/deep/b.txt"), "payload");
    assert_eq!(read(&tree, &root, "src/a.txt"), "payload");
}

#[test]
fn created_files_carry_the_configured_content_types() {
    let (tree, root) = setup();
    write(&tree, &root, "plain.txt", "x");
    tree.write_file(&root, &WriteRequest::new("page.html", "<p>").mime_type("text/html"))
        .unwrap();
    tree.copy_file(&root, &TransferRequest::new("page.html", "copy.html"))
        .unwrap();

    let provider = tree.provider();
    let root_node = provider.dereference(&root).unwrap();
    let mime = |p: &str| resolve(provider, &root_node, p).unwrap().mime_type();
    assert_eq!(mime("plain.txt"), "text/plain");
    assert_eq!(mime("page.html"), "text/html");
    assert_eq!(mime("copy.html"), "application/octet-stream");
}

#[test]
fn move_onto_itself_is_a_no_op() {
    let (tree, root) = setup();
    write(&tree, &root, "same.txt", "keep");
    tree.move_file(&root, &TransferRequest::new("same.txt", "same.txt").overwrite(true))
        .unwrap();
    assert_eq!(read(&tree, &root, "same.txt"), "keep");
}

#[test]
fn overwriting_a_directory_that_holds_the_source_is_refused() {
    let (tree, root) = setup();
    write(&tree, &root, "a/b/f.txt", "only copy");

    for dest in ["a", "a/b"] {
        let err = tree
            .move_file(&root, &TransferRequest::new("a/b/f.txt", dest).overwrite(true))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKind, "{dest}");
        let err = tree
            .copy_file(&root, &TransferRequest::new("a/b/f.txt", dest).overwrite(true))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKind, "{dest}");
    }
    assert_eq!(read(&tree, &root, "a/b/f.txt"), "only copy");

    // an unrelated directory is still replaced when overwriting
    tree.mkdir(&root, "other/sub").unwrap();
    tree.copy_file(&root, &TransferRequest::new("a/b/f.txt", "other").overwrite(true))
        .unwrap();
    assert_eq!(read(&tree, &root, "other"), "only copy");
}

#[test]
fn transfer_rejects_missing_or_directory_sources() {
    let (tree, root) = setup();
    tree.mkdir(&root, "dir").unwrap();

    let missing = tree
        .copy_file(&root, &TransferRequest::new("ghost.txt", "x.txt"))
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
    assert!(missing.to_string().contains("Source not found"));

    let dir = tree
        .move_file(&root, &TransferRequest::new("dir", "x.txt"))
        .unwrap_err();
    assert_eq!(dir.kind(), ErrorKind::WrongKind);
}

#[test]
fn uri_lookup_never_rejects_on_absence() {
    let (tree, root) = setup();
    write(&tree, &root, "a.txt", "x");
    let uri = tree.get_uri_for_path(&root, "a.txt").unwrap().uri;
    assert_eq!(uri, Some(tree.stat(&root, "a.txt").unwrap().uri));
    assert_eq!(tree.get_uri_for_path(&root, "b.txt").unwrap().uri, None);
}

#[test]
fn read_of_directory_or_missing_path_is_not_found() {
    let (tree, root) = setup();
    tree.mkdir(&root, "dir").unwrap();
    for p in ["dir", "missing.txt"] {
        let err = tree.read_file(&root, &ReadRequest::new(p)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{p}");
    }
}

#[test]
fn kind_conflicts_along_the_path_are_rejected() {
    let (tree, root) = setup();
    write(&tree, &root, "f", "x");
    tree.mkdir(&root, "d").unwrap();

    let through_file = tree.write_file(&root, &WriteRequest::new("f/g.txt", "y")).unwrap_err();
    assert_eq!(through_file.kind(), ErrorKind::WrongKind);

    let onto_dir = tree.write_file(&root, &WriteRequest::new("d", "y")).unwrap_err();
    assert_eq!(onto_dir.kind(), ErrorKind::WrongKind);

    let list_file = tree.readdir(&root, Some("f")).unwrap_err();
    assert_eq!(list_file.kind(), ErrorKind::WrongKind);
}

#[test]
fn required_fields_are_validated() {
    let (tree, root) = setup();

    let blank = tree.stat(&root, "  ").unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::InvalidArgument);

    let mut no_data = WriteRequest::new("a.txt", "");
    no_data.data = None;
    let err = tree.write_file(&root, &no_data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.to_string(), "writeFile failed: data missing");

    let no_to = TransferRequest { from: Some("a".into()), to: None, overwrite: false };
    let err = tree.copy_file(&root, &no_to).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn bad_base64_leaves_nothing_behind() {
    let (tree, root) = setup();
    let err = tree
        .write_file(&root, &WriteRequest::new("dir/bad.bin", "%%%").encoding(Encoding::Base64))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(!tree.exists(&root, "dir").unwrap().exists);
}

#[test]
fn empty_segments_do_not_resolve_and_cannot_be_created() {
    let (tree, root) = setup();
    write(&tree, &root, "a/b.txt", "x");

    assert!(!tree.exists(&root, "/a/b.txt").unwrap().exists);
    assert!(!tree.exists(&root, "a//b.txt").unwrap().exists);
    assert!(tree.exists(&root, r"a\b.txt").unwrap().exists);

    let err = tree.mkdir(&root, "a//c").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = tree.write_file(&root, &WriteRequest::new("a/", "x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn invalid_blank_and_revoked_roots_fail_fast() {
    let provider = MemoryProvider::new();
    let good = provider.add_root("mem://granted");
    let tree = ScopedTree::new(provider);
    write(&tree, &good, "a.txt", "x");

    let blank = tree.exists(&RootGrant::new(""), "a.txt").unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::InvalidRoot);
    assert!(blank.to_string().contains("'folder.id' missing"));

    let unknown = tree.stat(&RootGrant::new("mem://other"), "a.txt").unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::InvalidRoot);
    assert_eq!(unknown.to_string(), "stat failed: Invalid folder reference: mem://other");

    tree.provider().revoke_root("mem://granted");
    let revoked = tree.read_file(&good, &ReadRequest::new("a.txt")).unwrap_err();
    assert_eq!(revoked.kind(), ErrorKind::InvalidRoot);
}
