//! Resource release tests for sprig.
//!
//! The tree owns its nodes and their elements outright; the index only holds
//! node handles. These tests use `Arc` strong counts to observe that every
//! element is released exactly when the tree (or its contents) goes away.

use sprig::sync::SharedTree;
use sprig::Tree;
use std::sync::Arc;

// ===========================================================================
// Drop Tests
// ===========================================================================

/// Dropping the tree releases every element.
#[test]
fn drop_releases_elements() {
	let payload = Arc::new(());
	let mut tree: Tree<i32, Arc<()>> = Tree::new();

	for key in [5, 3, 8, 1, 4, 7, 9] {
		tree.add(key, Arc::clone(&payload));
	}
	assert_eq!(Arc::strong_count(&payload), 8);

	drop(tree);
	assert_eq!(Arc::strong_count(&payload), 1);
}

/// Shadowed duplicates are still owned by the tree and released with it.
#[test]
fn drop_releases_shadowed_duplicates() {
	let payload = Arc::new(());
	let mut tree: Tree<i32, Arc<()>> = Tree::new();

	for _ in 0..10 {
		tree.add(1, Arc::clone(&payload));
	}
	assert_eq!(tree.distinct_keys(), 1);
	assert_eq!(Arc::strong_count(&payload), 11);

	drop(tree);
	assert_eq!(Arc::strong_count(&payload), 1);
}

/// Deep chains are released without recursion.
#[test]
fn drop_degenerate_chain() {
	let payload = Arc::new(());
	let mut tree: Tree<u32, Arc<()>> = Tree::new();

	for key in 0..3_000 {
		tree.add(key, Arc::clone(&payload));
	}
	assert_eq!(tree.depth(), 3_000);

	drop(tree);
	assert_eq!(Arc::strong_count(&payload), 1);
}

/// `clear` releases elements while keeping the tree usable.
#[test]
fn clear_releases_elements() {
	let payload = Arc::new(());
	let mut tree: Tree<i32, Arc<()>> = (0..100).map(|k| (k, Arc::clone(&payload))).collect();
	assert_eq!(Arc::strong_count(&payload), 101);

	tree.clear();
	assert_eq!(Arc::strong_count(&payload), 1);

	tree.add(1, Arc::clone(&payload));
	assert_eq!(Arc::strong_count(&payload), 2);
}

/// Range results borrow elements rather than cloning them.
#[test]
fn range_does_not_clone() {
	let payload = Arc::new(());
	let tree: Tree<i32, Arc<()>> = (0..10).map(|k| (k, Arc::clone(&payload))).collect();

	let picked = tree.range(&2, &5);
	assert_eq!(picked.len(), 4);
	assert_eq!(Arc::strong_count(&payload), 11);
}

/// Keys are stored twice (node and index) and released from both.
#[test]
fn drop_releases_keys() {
	let key = Arc::new(42);
	let shared: SharedTree<Arc<i32>, ()> = SharedTree::new();
	shared.add(Arc::clone(&key), ());
	assert_eq!(Arc::strong_count(&key), 3);

	drop(shared);
	assert_eq!(Arc::strong_count(&key), 1);
}
