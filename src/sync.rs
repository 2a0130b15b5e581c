//! Shared access to a tree from several threads.
//!
//! [`IndexedTree`] has no internal locking. [`SharedTree`] guards a whole tree
//! with one `parking_lot::RwLock`: any number of concurrent readers, or a
//! single writer. Node views borrow from the tree, so they are only handed
//! out inside closures that run while the lock is held.
//!
//! ```
//! use sprig::sync::SharedTree;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let tree: Arc<SharedTree<u32, u32>> = Arc::new(SharedTree::new());
//!
//! let handles: Vec<_> = (0..4)
//! 	.map(|t| {
//! 		let tree = Arc::clone(&tree);
//! 		thread::spawn(move || {
//! 			for i in 0..10 {
//! 				tree.add(t * 10 + i, i);
//! 			}
//! 		})
//! 	})
//! 	.collect();
//!
//! for h in handles {
//! 	h.join().unwrap();
//! }
//!
//! assert_eq!(tree.len(), 40);
//! assert_eq!(tree.lookup(&25, |n| *n.element()), Some(5));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::index::{DefaultIndex, KeyIndex};
use crate::{IndexedTree, NodeId, NodeRef};

/// An [`IndexedTree`] behind a reader-writer lock.
pub struct SharedTree<K, E, I = DefaultIndex<K>> {
	inner: RwLock<IndexedTree<K, E, I>>,
}

impl<K, E, I: KeyIndex<K>> Default for SharedTree<K, E, I> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, E, I> From<IndexedTree<K, E, I>> for SharedTree<K, E, I> {
	fn from(tree: IndexedTree<K, E, I>) -> Self {
		SharedTree {
			inner: RwLock::new(tree),
		}
	}
}

impl<K, E, I: KeyIndex<K>> SharedTree<K, E, I> {
	pub fn new() -> Self {
		SharedTree {
			inner: RwLock::new(IndexedTree::new()),
		}
	}
}

impl<K, E, I> SharedTree<K, E, I> {
	/// Unwraps the guarded tree.
	pub fn into_inner(self) -> IndexedTree<K, E, I> {
		self.inner.into_inner()
	}

	/// Runs `f` with shared access to the tree.
	///
	/// Other readers may run at the same time; writers wait until `f` returns.
	pub fn read<R, F>(&self, f: F) -> R
	where
		F: FnOnce(&IndexedTree<K, E, I>) -> R,
	{
		let guard = self.inner.read();
		f(&guard)
	}

	/// Runs `f` with exclusive access to the tree.
	pub fn write<R, F>(&self, f: F) -> R
	where
		F: FnOnce(&mut IndexedTree<K, E, I>) -> R,
	{
		let mut guard = self.inner.write();
		f(&mut guard)
	}

	pub fn len(&self) -> usize {
		self.read(|tree| tree.len())
	}

	pub fn is_empty(&self) -> bool {
		self.read(|tree| tree.is_empty())
	}
}

impl<K: Clone + Ord, E, I: KeyIndex<K>> SharedTree<K, E, I> {
	/// Inserts under the write lock. See [`IndexedTree::add`].
	pub fn add(&self, key: K, element: E) -> NodeId {
		self.write(|tree| tree.add(key, element))
	}

	/// Looks up `key` through the index and passes the node to `f`.
	///
	/// The closure extracts whatever it needs while the read lock is held.
	///
	/// # Example
	///
	/// ```
	/// use sprig::sync::SharedTree;
	///
	/// let tree: SharedTree<i32, String> = SharedTree::new();
	/// tree.add(1, "one".to_string());
	///
	/// assert_eq!(tree.lookup(&1, |n| n.element().len()), Some(3));
	/// assert_eq!(tree.lookup(&2, |n| n.element().len()), None);
	/// ```
	pub fn lookup<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
		F: FnOnce(NodeRef<'_, K, E>) -> R,
	{
		self.read(|tree| tree.get(key).map(f))
	}

	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		self.read(|tree| tree.contains(key))
	}

	/// Clones the elements whose keys lie in `[start, end]`, in order.
	pub fn range_cloned<Q>(&self, start: &Q, end: &Q) -> Vec<E>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
		E: Clone,
	{
		self.read(|tree| tree.range_iter(start, end).map(|node| node.element().clone()).collect())
	}
}

impl<K: fmt::Debug, E: fmt::Debug, I> fmt::Debug for SharedTree<K, E, I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.inner.try_read() {
			Some(tree) => f.debug_tuple("SharedTree").field(&*tree).finish(),
			None => f.write_str("SharedTree(<locked>)"),
		}
	}
}
