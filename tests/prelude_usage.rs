use scoped_tree::prelude::*;
use scoped_tree::MemoryProvider;

#[test]
fn prelude_exports_expected_items() {
    let provider = MemoryProvider::new();
    let root: RootGrant = provider.add_root("mem://prelude");
    let tree = ScopedTree::new(provider);

    let res: OpResult<()> = tree.write_file(&root, &WriteRequest::new("a.txt", "x"));
    assert!(res.is_ok());

    // Types are reachable without further imports.
    let _ = ReadRequest::new("a.txt").encoding(Encoding::Base64);
    let _ = RmdirRequest::new("d").recursive(true);
    let _ = TransferRequest::new("a", "b").overwrite(true);
    let _err: Option<OperationError> = None;
    assert!(tree.provider().dereference(&root).is_some_and(|n| n.is_dir()));
}
