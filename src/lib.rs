//! # Sprig: An In-Memory Binary Tree With a Direct Key Index
//!
//! This crate provides an unbalanced binary search tree whose nodes can also be
//! reached through a hash index from key to node. Point lookups go straight
//! through the index in O(1) expected time, while the tree shape keeps ordered
//! traversal, minimum/maximum queries, nearest-node searches and closed-interval
//! range extraction available.
//!
//! ## Design Overview
//!
//! **Node Arena**: Every node lives in a `Vec` owned by the tree and is named by a
//! [`NodeId`]. Children are linked by id and each child keeps its parent's id as a
//! navigational back-reference. Dropping the tree drops the arena, and with it
//! every node and element. Ids carry a tag unique to the tree (and renewed by
//! [`clear`](IndexedTree::clear)), so a handle never names a node of a tree other
//! than the one it came from.
//!
//! **Key Index**: A [`KeyIndex`](index::KeyIndex) maps each key to the id of the
//! most recently inserted node carrying it. The index duplicates what a descent
//! would find, so it never owns anything.
//!
//! **Ties Go Left**: [`add`](IndexedTree::add) descends left when the new key is
//! less than or equal to the visited key, and right otherwise. Duplicate keys are
//! kept as separate nodes; the index resolves such a key to the newest one.
//!
//! **No Balancing**: The tree never rotates. Inserting keys in sorted order
//! produces a chain whose depth equals the number of nodes. All traversals use
//! explicit stacks so such chains are handled without deep recursion.
//!
//! ### Tree Structure
//!
//! ```text
//!   index (FxHashMap)                 arena (Vec<Node>)
//!  ┌─────────────────┐        ┌──────────────────────────────┐
//!  │  5 ──► #0       │        │ #0  key 5   left #1 right #2 │  <- root
//!  │  3 ──► #1       │        │ #1  key 3   parent #0        │
//!  │  8 ──► #2       │        │ #2  key 8   parent #0        │
//!  └─────────────────┘        └──────────────────────────────┘
//!
//!                5
//!              /   \
//!             3     8
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use sprig::Tree;
//!
//! let mut tree: Tree<i32, &str> = Tree::new();
//!
//! // Insert key-element pairs
//! tree.add(5, "five");
//! tree.add(3, "three");
//! tree.add(8, "eight");
//!
//! // Point lookups go through the index
//! assert_eq!(tree.get(&3).map(|n| *n.element()), Some("three"));
//! assert!(tree.contains(&8));
//!
//! // Ordered queries walk the tree
//! assert_eq!(tree.first().map(|n| *n.key()), Some(3));
//! assert_eq!(tree.last().map(|n| *n.key()), Some(8));
//! assert_eq!(tree.range(&3, &5), vec![&"three", &"five"]);
//! ```
//!
//! ## Thread Safety
//!
//! The tree itself has no internal locking. Writes need `&mut self` and reads
//! `&self`, so sharing across threads requires an external lock. The
//! [`sync::SharedTree`] wrapper provides one.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

pub mod error;
pub mod index;
pub mod iter;
pub mod node;
pub mod sync;

use error::Error;
use index::{DefaultIndex, KeyIndex};
use node::{next_tag, Node};

pub use node::{NodeId, NodeRef, Side};

// ---------------------------------------------------------------------------
// Public Type Aliases
// ---------------------------------------------------------------------------

/// An indexed tree using the default `FxHashMap` index.
///
/// This is the recommended type for most use cases. To plug in another map
/// (for example a `HashMap` with a DoS-resistant hasher), use [`IndexedTree`]
/// directly with a custom `I` parameter.
pub type Tree<K, E> = IndexedTree<K, E, DefaultIndex<K>>;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An unbalanced binary search tree with a key-to-node index.
///
/// # Type Parameters
///
/// - `K`: The key type. Insertion and index lookups need `Clone + Ord + Hash`.
/// - `E`: The element type stored with each key.
/// - `I`: The index backend, see [`KeyIndex`].
///
/// # Invariants
///
/// - Every node in the arena is reachable from the root, and `len()` counts them.
/// - The root has no parent; every other node's parent links to it as a child.
/// - Every indexed key resolves to the newest node carrying that key. With
///   duplicate keys the index holds fewer entries than the tree holds nodes.
/// - Nodes inserted through [`add`](Self::add) keep search-tree order: a left
///   subtree holds keys less than or equal to its parent's, a right subtree
///   strictly greater ones. [`add_left`](Self::add_left) and
///   [`add_right`](Self::add_right) do not check order.
pub struct IndexedTree<K, E, I = DefaultIndex<K>> {
	/// Tag stamped on every id this tree hands out. Renewed by `clear`.
	tag: u64,

	/// The first node ever created, if any.
	root: Option<NodeId>,

	/// Node storage. A node's id is its position, and nodes are only appended.
	nodes: Vec<Node<K, E>>,

	/// Key to newest node with that key.
	index: I,
}

impl<K, E, I: KeyIndex<K>> Default for IndexedTree<K, E, I> {
	fn default() -> Self {
		Self::new()
	}
}

/// A clone is a separate tree with its own tag: handles of the original do
/// not resolve in it. Look nodes up again by key, or walk from the root.
impl<K: Clone, E: Clone, I: KeyIndex<K>> Clone for IndexedTree<K, E, I> {
	fn clone(&self) -> Self {
		let tag = next_tag();
		let retag = |id: NodeId| id.retag(tag);
		let nodes: Vec<Node<K, E>> = self
			.nodes
			.iter()
			.map(|node| Node {
				key: node.key.clone(),
				element: node.element.clone(),
				parent: node.parent.map(retag),
				left: node.left.map(retag),
				right: node.right.map(retag),
			})
			.collect();
		// Arena order is insertion order, so later duplicates win as before
		let mut index = I::with_capacity(nodes.len());
		for (pos, node) in nodes.iter().enumerate() {
			index.put(node.key.clone(), NodeId::new(tag, pos));
		}
		IndexedTree {
			tag,
			root: self.root.map(retag),
			nodes,
			index,
		}
	}
}

// ===========================================================================
// Construction
// ===========================================================================

impl<K, E, I: KeyIndex<K>> IndexedTree<K, E, I> {
	/// Creates an empty tree without allocating.
	pub fn new() -> Self {
		IndexedTree {
			tag: next_tag(),
			root: None,
			nodes: Vec::new(),
			index: I::with_capacity(0),
		}
	}

	/// Creates an empty tree with room for `capacity` nodes in both the arena
	/// and the index.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let mut tree: Tree<u32, ()> = Tree::with_capacity(1024);
	/// tree.add(1, ());
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn with_capacity(capacity: usize) -> Self {
		IndexedTree {
			tag: next_tag(),
			root: None,
			nodes: Vec::with_capacity(capacity),
			index: I::with_capacity(capacity),
		}
	}

	/// Creates an empty tree that indexes its keys in `index`.
	///
	/// Any mapping already present in `index` is discarded, since it could not
	/// name a node of the new tree.
	///
	/// # Example
	///
	/// ```
	/// use sprig::{IndexedTree, NodeId};
	/// use std::collections::HashMap;
	///
	/// let index: HashMap<String, NodeId> = HashMap::new();
	/// let mut tree = IndexedTree::with_index(index);
	/// tree.add("b".to_string(), 2);
	/// tree.add("a".to_string(), 1);
	///
	/// assert_eq!(tree.get("a").map(|n| *n.element()), Some(1));
	/// ```
	pub fn with_index(mut index: I) -> Self {
		index.clear();
		IndexedTree {
			tag: next_tag(),
			root: None,
			nodes: Vec::new(),
			index,
		}
	}

	/// Removes every node, leaving an empty tree.
	///
	/// Handles obtained before the call no longer resolve, not even to nodes
	/// created afterwards at the same position.
	pub fn clear(&mut self) {
		debug!(len = self.nodes.len(), "clearing tree");
		self.tag = next_tag();
		self.root = None;
		self.nodes.clear();
		self.index.clear();
	}
}

// ===========================================================================
// Insertion
// ===========================================================================

impl<K: Clone + Ord, E, I: KeyIndex<K>> IndexedTree<K, E, I> {
	/// Establishes the root of an empty tree.
	///
	/// Returns `None` and leaves the tree unchanged if a root already exists.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let mut tree: Tree<i32, &str> = Tree::new();
	/// let root = tree.set_root(1, "one").unwrap();
	///
	/// assert_eq!(tree.set_root(2, "two"), None);
	/// assert_eq!(tree.root().map(|n| n.id()), Some(root));
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn set_root(&mut self, key: K, element: E) -> Option<NodeId> {
		self.try_set_root(key, element).ok()
	}

	/// Like [`set_root`](Self::set_root), reporting [`Error::RootExists`]
	/// instead of `None`.
	pub fn try_set_root(&mut self, key: K, element: E) -> error::Result<NodeId> {
		if self.root.is_some() {
			trace!(len = self.nodes.len(), "root already established");
			return Err(Error::RootExists);
		}
		let id = self.allocate(None, key, element);
		self.root = Some(id);
		debug!(root = %id, "root established");
		Ok(id)
	}

	/// Inserts a key-element pair, returning the handle of the new node.
	///
	/// An empty tree gets the node as its root. Otherwise the key descends from
	/// the root, to the left while it is less than or equal to the visited key
	/// and to the right otherwise, and the node is attached at the first free
	/// slot on that path.
	///
	/// Existing keys are not replaced: a duplicate becomes a new node in the
	/// left subtree of its twin, and the index is moved to the new node.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let mut tree: Tree<i32, &str> = Tree::new();
	/// let first = tree.add(1, "one");
	/// let second = tree.add(1, "uno");
	///
	/// assert_eq!(tree.len(), 2);
	/// assert_eq!(tree.get(&1).map(|n| n.id()), Some(second));
	/// assert_eq!(tree.node(second).and_then(|n| n.parent()).map(|p| p.id()), Some(first));
	/// ```
	pub fn add(&mut self, key: K, element: E) -> NodeId {
		let Some(mut current) = self.root else {
			let id = self.allocate(None, key, element);
			self.root = Some(id);
			debug!(root = %id, "root established");
			return id;
		};

		loop {
			let node = &self.nodes[current.to_raw()];
			let side = if key <= node.key {
				Side::Left
			} else {
				Side::Right
			};
			match node.child(side) {
				Some(child) => current = child,
				None => return self.link(current, side, key, element),
			}
		}
	}

	/// Attaches a new node as the left child of `parent`.
	///
	/// Returns `None`, leaving the tree unchanged, if `parent` does not name a
	/// node of this tree or already has a left child. The key is not checked
	/// against the search-tree order.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let mut tree: Tree<i32, ()> = Tree::new();
	/// let root = tree.add(10, ());
	///
	/// assert!(tree.add_left(root, 5, ()).is_some());
	/// assert!(tree.add_left(root, 6, ()).is_none()); // Slot taken
	/// assert_eq!(tree.len(), 2);
	/// ```
	pub fn add_left(&mut self, parent: NodeId, key: K, element: E) -> Option<NodeId> {
		self.attach(parent, Side::Left, key, element).ok()
	}

	/// Attaches a new node as the right child of `parent`.
	///
	/// Mirrors [`add_left`](Self::add_left).
	pub fn add_right(&mut self, parent: NodeId, key: K, element: E) -> Option<NodeId> {
		self.attach(parent, Side::Right, key, element).ok()
	}

	/// Like [`add_left`](Self::add_left), reporting why a refusal happened.
	pub fn try_add_left(&mut self, parent: NodeId, key: K, element: E) -> error::Result<NodeId> {
		self.attach(parent, Side::Left, key, element)
	}

	/// Like [`add_right`](Self::add_right), reporting why a refusal happened.
	pub fn try_add_right(&mut self, parent: NodeId, key: K, element: E) -> error::Result<NodeId> {
		self.attach(parent, Side::Right, key, element)
	}

	/// Attaches a new node under `parent` on the given side.
	///
	/// # Errors
	///
	/// - [`Error::UnknownNode`] if `parent` does not name a node of this tree.
	/// - [`Error::Occupied`] if the child slot is taken.
	///
	/// The tree is unchanged in both cases.
	pub fn attach(&mut self, parent: NodeId, side: Side, key: K, element: E) -> error::Result<NodeId> {
		let node = match self.nodes.get(parent.to_raw()) {
			Some(node) if parent.tree() == self.tag => node,
			_ => {
				trace!(%parent, %side, "attach refused: unknown parent");
				return Err(Error::UnknownNode(parent));
			}
		};
		if node.child(side).is_some() {
			trace!(%parent, %side, "attach refused: slot occupied");
			return Err(Error::Occupied {
				side,
			});
		}
		Ok(self.link(parent, side, key, element))
	}

	/// Creates a node under `parent` in a slot known to be free.
	fn link(&mut self, parent: NodeId, side: Side, key: K, element: E) -> NodeId {
		let id = self.allocate(Some(parent), key, element);
		*self.nodes[parent.to_raw()].child_mut(side) = Some(id);
		id
	}

	/// Appends a node to the arena and indexes its key.
	fn allocate(&mut self, parent: Option<NodeId>, key: K, element: E) -> NodeId {
		let id = NodeId::new(self.tag, self.nodes.len());
		if let Some(shadowed) = self.index.put(key.clone(), id) {
			trace!(%id, %shadowed, "duplicate key, index moved to newest node");
		}
		self.nodes.push(Node::new(parent, key, element));
		id
	}
}

// ===========================================================================
// Point Queries
// ===========================================================================

impl<K, E, I: KeyIndex<K>> IndexedTree<K, E, I> {
	/// Returns the node indexed under `key`, without descending the tree.
	///
	/// With duplicate keys this is the most recently inserted node.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let mut tree: Tree<String, u32> = Tree::new();
	/// tree.add("apple".to_string(), 3);
	///
	/// // Borrowed forms of the key work too
	/// assert_eq!(tree.get("apple").map(|n| *n.element()), Some(3));
	/// assert!(tree.get("pear").is_none());
	/// ```
	pub fn get<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, E>>
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		let id = self.index.lookup(key)?;
		NodeRef::resolve(&self.nodes, self.tag, id)
	}

	/// Returns `true` if some node carries `key`.
	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		self.index.contains(key)
	}

	/// Number of distinct keys in the index.
	///
	/// Equal to [`len`](Self::len) unless some key was inserted more than once.
	pub fn distinct_keys(&self) -> usize {
		self.index.len()
	}
}

// ===========================================================================
// Structural Queries
// ===========================================================================

impl<K, E, I> IndexedTree<K, E, I> {
	/// The root node, or `None` for an empty tree.
	pub fn root(&self) -> Option<NodeRef<'_, K, E>> {
		NodeRef::resolve(&self.nodes, self.tag, self.root?)
	}

	/// Resolves a handle to a node view.
	///
	/// Returns `None` if the handle does not name a node of this tree: it came
	/// from another tree, or from this one before a [`clear`](Self::clear).
	pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K, E>> {
		NodeRef::resolve(&self.nodes, self.tag, id)
	}

	/// The leftmost node, which holds the minimum key of an ordered tree.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let tree: Tree<i32, ()> = [5, 3, 8, 1, 4, 7, 9].into_iter().map(|k| (k, ())).collect();
	/// assert_eq!(tree.first().map(|n| *n.key()), Some(1));
	/// assert_eq!(tree.last().map(|n| *n.key()), Some(9));
	/// ```
	pub fn first(&self) -> Option<NodeRef<'_, K, E>> {
		self.extreme(Side::Left)
	}

	/// The rightmost node, which holds the maximum key of an ordered tree.
	pub fn last(&self) -> Option<NodeRef<'_, K, E>> {
		self.extreme(Side::Right)
	}

	/// Follows `side` children from the root until there are none.
	fn extreme(&self, side: Side) -> Option<NodeRef<'_, K, E>> {
		let mut current = self.root?;
		while let Some(child) = self.nodes[current.to_raw()].child(side) {
			current = child;
		}
		NodeRef::resolve(&self.nodes, self.tag, current)
	}

	/// Returns the node at which a search for `key` stops.
	///
	/// Starting at the root, the search moves left while `key` is smaller than
	/// the visited key and a left child exists, and right while it is greater
	/// and a right child exists. The node where it can go no further is either
	/// a node carrying `key` or a neighbour of where `key` would be inserted.
	///
	/// Returns `None` for an empty tree.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let tree: Tree<i32, ()> = [10, 5, 15].into_iter().map(|k| (k, ())).collect();
	///
	/// assert_eq!(tree.nearest(&5).map(|n| *n.key()), Some(5));
	/// assert_eq!(tree.nearest(&7).map(|n| *n.key()), Some(5));
	/// assert_eq!(tree.nearest(&12).map(|n| *n.key()), Some(15));
	/// ```
	pub fn nearest<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, E>>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut current = self.root?;
		loop {
			let node = &self.nodes[current.to_raw()];
			let next = match key.cmp(node.key.borrow()) {
				Ordering::Less => node.left,
				Ordering::Greater => node.right,
				Ordering::Equal => None,
			};
			match next {
				Some(child) => current = child,
				None => return NodeRef::resolve(&self.nodes, self.tag, current),
			}
		}
	}

	/// Starting point for a scan beginning at `key`. Same descent as
	/// [`nearest`](Self::nearest).
	pub fn get_from<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, E>>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.nearest(key)
	}

	/// End point for a scan stopping at `key`. Same descent as
	/// [`nearest`](Self::nearest).
	pub fn get_to<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, E>>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.nearest(key)
	}

	/// Number of nodes in the tree, duplicates included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns `true` if the tree has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of nodes on the longest path from the root to a leaf.
	///
	/// Zero for an empty tree. Since the tree never rebalances this can be as
	/// large as [`len`](Self::len).
	pub fn depth(&self) -> usize {
		let Some(root) = self.root else {
			return 0;
		};
		let mut deepest = 0;
		let mut stack = vec![(root, 1usize)];
		while let Some((id, level)) = stack.pop() {
			deepest = deepest.max(level);
			let node = &self.nodes[id.to_raw()];
			stack.extend(node.left.map(|left| (left, level + 1)));
			stack.extend(node.right.map(|right| (right, level + 1)));
		}
		deepest
	}
}

// ===========================================================================
// Ordered Traversal
// ===========================================================================

impl<K, E, I> IndexedTree<K, E, I> {
	/// In-order iterator over all nodes.
	pub fn iter(&self) -> iter::Iter<'_, K, E> {
		iter::Iter::new(&self.nodes, self.tag, self.root)
	}

	/// Keys in in-order sequence.
	pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
		self.iter().map(|node| node.key())
	}

	/// Elements in in-order sequence.
	pub fn elements(&self) -> impl Iterator<Item = &E> + '_ {
		self.iter().map(|node| node.element())
	}

	/// Lazily yields the nodes whose keys lie in `[start, end]`, in order.
	///
	/// See [`iter::Range`] for how subtrees are pruned.
	pub fn range_iter<'q, Q>(&self, start: &'q Q, end: &'q Q) -> iter::Range<'_, 'q, K, E, Q>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		iter::Range::new(&self.nodes, self.tag, self.root, start, end)
	}

	/// Returns the elements whose keys lie in the closed interval
	/// `[start, end]`, in ascending key order.
	///
	/// An empty tree or an inverted interval (`start > end`) yields an empty
	/// vector.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	///
	/// let tree: Tree<i32, i32> = [1, 3, 5, 7, 9].into_iter().map(|k| (k, k)).collect();
	/// assert_eq!(tree.range(&3, &7), vec![&3, &5, &7]);
	/// assert!(tree.range(&7, &3).is_empty());
	/// ```
	pub fn range<Q>(&self, start: &Q, end: &Q) -> Vec<&E>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.range_iter(start, end).map(|node| node.element()).collect()
	}

	/// Appends the elements whose keys lie in `[start, end]` to `out`, in
	/// ascending key order.
	///
	/// # Example
	///
	/// ```
	/// use sprig::Tree;
	/// use std::collections::VecDeque;
	///
	/// let tree: Tree<i32, &str> = [(2, "b"), (1, "a"), (3, "c")].into_iter().collect();
	///
	/// let mut out = VecDeque::new();
	/// out.push_back(&"z");
	/// tree.range_into(&1, &2, &mut out);
	/// assert_eq!(out, [&"z", &"a", &"b"]);
	/// ```
	pub fn range_into<'a, Q, C>(&'a self, start: &Q, end: &Q, out: &mut C)
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
		C: Extend<&'a E>,
	{
		out.extend(self.range_iter(start, end).map(|node| node.element()));
	}
}

impl<'t, K, E, I> IntoIterator for &'t IndexedTree<K, E, I> {
	type Item = NodeRef<'t, K, E>;
	type IntoIter = iter::Iter<'t, K, E>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<K: Clone + Ord, E, I: KeyIndex<K>> Extend<(K, E)> for IndexedTree<K, E, I> {
	fn extend<T: IntoIterator<Item = (K, E)>>(&mut self, iter: T) {
		for (key, element) in iter {
			self.add(key, element);
		}
	}
}

impl<K: Clone + Ord, E, I: KeyIndex<K>> FromIterator<(K, E)> for IndexedTree<K, E, I> {
	fn from_iter<T: IntoIterator<Item = (K, E)>>(iter: T) -> Self {
		let mut tree = Self::new();
		tree.extend(iter);
		tree
	}
}

impl<K: fmt::Debug, E: fmt::Debug, I> fmt::Debug for IndexedTree<K, E, I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter().map(|node| (node.key(), node.element()))).finish()
	}
}

// ===========================================================================
// Test-Only Validation Module
// ===========================================================================

/// Invariant validation for testing.
#[cfg(any(test, feature = "test-utils"))]
impl<K: Ord + Hash + fmt::Debug, E, I: KeyIndex<K>> IndexedTree<K, E, I> {
	/// Validates all tree invariants. Panics with diagnostic info if any invariant is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Reachability: every arena node is reached exactly once from the root,
	///    through links that carry this tree's tag
	/// 2. Parent links: the root has no parent, every child points back to its parent
	/// 3. Index consistency: every key resolves to the newest node carrying it
	/// 4. Cardinality: index size equals the number of distinct keys
	pub fn assert_invariants(&self) {
		let Some(root) = self.root else {
			assert!(self.nodes.is_empty(), "Tree without root holds {} nodes", self.nodes.len());
			assert!(self.index.is_empty(), "Tree without root has {} indexed keys", self.index.len());
			return;
		};

		assert_eq!(root.tree(), self.tag, "Root {} carries another tree's tag", root);

		// Invariant 2: the root has no parent
		assert_eq!(self.nodes[root.to_raw()].parent, None, "Root {} has a parent", root);

		// Invariant 1: reachability, walked iteratively to tolerate deep chains
		let mut seen = vec![false; self.nodes.len()];
		let mut stack = vec![root];
		while let Some(id) = stack.pop() {
			assert!(id.to_raw() < self.nodes.len(), "Link to {} points outside the arena", id);
			assert!(!seen[id.to_raw()], "Node {} reached twice", id);
			seen[id.to_raw()] = true;

			let node = &self.nodes[id.to_raw()];
			for child in [node.left, node.right].into_iter().flatten() {
				assert_eq!(child.tree(), self.tag, "Child {} of {} carries another tree's tag", child, id);
				// Invariant 2: back-reference
				assert_eq!(
					self.nodes[child.to_raw()].parent,
					Some(id),
					"Child {} of {} (key {:?}) does not point back",
					child,
					id,
					node.key
				);
				stack.push(child);
			}
		}
		let unreachable = seen.iter().filter(|s| !**s).count();
		assert_eq!(unreachable, 0, "{} nodes are not reachable from the root", unreachable);

		// Invariant 3: index consistency
		let mut newest = 0usize;
		for (pos, node) in self.nodes.iter().enumerate() {
			let indexed = self
				.index
				.lookup(&node.key)
				.unwrap_or_else(|| panic!("Key {:?} of node #{} is not indexed", node.key, pos));
			assert_eq!(indexed.tree(), self.tag, "Key {:?} resolves to another tree's node {}", node.key, indexed);
			assert!(
				indexed.to_raw() >= pos,
				"Key {:?} resolves to {}, older than node #{}",
				node.key,
				indexed,
				pos
			);
			assert_eq!(self.nodes[indexed.to_raw()].key, node.key, "Key {:?} resolves to a node with another key", node.key);
			if indexed.to_raw() == pos {
				newest += 1;
			}
		}

		// Invariant 4: one index entry per distinct key
		assert_eq!(self.index.len(), newest, "Index holds {} keys, tree has {} distinct keys", self.index.len(), newest);
	}

	/// Asserts that an in-order walk yields non-decreasing keys.
	///
	/// Holds for trees built through [`add`](Self::add) alone.
	pub fn assert_ordered(&self) {
		let mut previous: Option<&K> = None;
		for node in self.iter() {
			if let Some(prev) = previous {
				assert!(prev <= node.key(), "Key {:?} follows greater key {:?}", node.key(), prev);
			}
			previous = Some(node.key());
		}
	}
}
