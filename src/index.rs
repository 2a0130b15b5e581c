//! The key-to-node index.
//!
//! The index is a cache of information the tree shape already holds: every
//! key resolves to the node carrying it without a descent. The tree only
//! depends on the [`KeyIndex`] capability, so the hashing concern stays out of
//! the tree logic and a different map can be plugged in through
//! [`IndexedTree::with_index`](crate::IndexedTree::with_index).
//!
//! The index stores [`NodeId`]s, never nodes. It has no say in how long a node
//! lives.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxHashMap;

use crate::node::NodeId;

/// The index used by [`Tree`](crate::Tree).
pub type DefaultIndex<K> = FxHashMap<K, NodeId>;

/// An associative store from keys to node handles with O(1) expected
/// operations and no ordering guarantees.
pub trait KeyIndex<K> {
	/// Creates an empty index able to hold `capacity` keys without growing.
	fn with_capacity(capacity: usize) -> Self
	where
		Self: Sized;

	/// Maps `key` to `id`, returning the handle it previously mapped to.
	///
	/// A later insertion of the same key replaces the earlier one.
	fn put(&mut self, key: K, id: NodeId) -> Option<NodeId>;

	/// Returns the handle `key` maps to.
	fn lookup<Q>(&self, key: &Q) -> Option<NodeId>
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq;

	/// Returns `true` if `key` is present.
	fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		self.lookup(key).is_some()
	}

	/// Number of distinct keys.
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Forgets every key.
	fn clear(&mut self);
}

impl<K, S> KeyIndex<K> for HashMap<K, NodeId, S>
where
	K: Hash + Eq,
	S: BuildHasher + Default,
{
	fn with_capacity(capacity: usize) -> Self {
		HashMap::with_capacity_and_hasher(capacity, S::default())
	}

	#[inline]
	fn put(&mut self, key: K, id: NodeId) -> Option<NodeId> {
		self.insert(key, id)
	}

	#[inline]
	fn lookup<Q>(&self, key: &Q) -> Option<NodeId>
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		self.get(key).copied()
	}

	#[inline]
	fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		self.contains_key(key)
	}

	fn len(&self) -> usize {
		HashMap::len(self)
	}

	fn clear(&mut self) {
		HashMap::clear(self)
	}
}
