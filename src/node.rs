//! Node storage and borrowed node views.
//!
//! Nodes live in an arena owned by the tree. Links between nodes are
//! [`NodeId`]s (positions in that arena), so a child's back-reference to its
//! parent is a plain index rather than a pointer and never keeps anything alive.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A handle naming a node inside one [`IndexedTree`](crate::IndexedTree).
///
/// Handles are cheap to copy and stay valid until the tree is cleared, because
/// nodes are never removed individually. Every handle carries the tag of the
/// tree that produced it, so a handle from another tree, or from before a
/// [`clear`](crate::IndexedTree::clear), is refused instead of naming whatever
/// node now occupies its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
	tree: u64,
	pos: usize,
}

/// Tag zero is never handed out, so raw handles belong to no tree.
static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Returns a tag no other tree (or earlier generation of a tree) has used.
#[inline]
pub(crate) fn next_tag() -> u64 {
	NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

impl NodeId {
	#[inline]
	pub(crate) const fn new(tree: u64, pos: usize) -> NodeId {
		NodeId {
			tree,
			pos,
		}
	}

	/// Builds a handle from a raw arena position.
	///
	/// The handle carries no tree tag, so no tree accepts it. Mostly useful in
	/// tests.
	#[inline]
	pub const fn from_raw(raw: usize) -> NodeId {
		NodeId::new(0, raw)
	}

	/// The arena position of this handle.
	#[inline]
	pub const fn to_raw(self) -> usize {
		self.pos
	}

	#[inline]
	pub(crate) const fn tree(self) -> u64 {
		self.tree
	}

	/// The same position under another tree tag.
	#[inline]
	pub(crate) const fn retag(self, tree: u64) -> NodeId {
		NodeId::new(tree, self.pos)
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.pos)
	}
}

/// Which child slot of a node an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
	Left,
	Right,
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Side::Left => f.write_str("left"),
			Side::Right => f.write_str("right"),
		}
	}
}

/// A node of the tree as stored in the arena.
pub(crate) struct Node<K, E> {
	pub(crate) key: K,
	pub(crate) element: E,
	pub(crate) parent: Option<NodeId>,
	pub(crate) left: Option<NodeId>,
	pub(crate) right: Option<NodeId>,
}

impl<K, E> Node<K, E> {
	pub(crate) fn new(parent: Option<NodeId>, key: K, element: E) -> Node<K, E> {
		Node {
			key,
			element,
			parent,
			left: None,
			right: None,
		}
	}

	#[inline]
	pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
		match side {
			Side::Left => self.left,
			Side::Right => self.right,
		}
	}

	#[inline]
	pub(crate) fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
		match side {
			Side::Left => &mut self.left,
			Side::Right => &mut self.right,
		}
	}
}

impl<K: fmt::Debug, E: fmt::Debug> fmt::Debug for Node<K, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("key", &self.key)
			.field("element", &self.element)
			.field("parent", &self.parent)
			.field("left", &self.left)
			.field("right", &self.right)
			.finish()
	}
}

/// A read-only view of one node, borrowed from the tree.
///
/// All navigation accessors return `None` at the boundary of the tree: the
/// root has no parent and a leaf has no children.
pub struct NodeRef<'t, K, E> {
	nodes: &'t [Node<K, E>],
	id: NodeId,
}

impl<K, E> Clone for NodeRef<'_, K, E> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<K, E> Copy for NodeRef<'_, K, E> {}

impl<'t, K, E> NodeRef<'t, K, E> {
	/// Resolves `id` against the arena of the tree tagged `tree`, returning
	/// `None` for a stale or foreign handle.
	#[inline]
	pub(crate) fn resolve(nodes: &'t [Node<K, E>], tree: u64, id: NodeId) -> Option<NodeRef<'t, K, E>> {
		if id.tree == tree && id.pos < nodes.len() {
			Some(NodeRef {
				nodes,
				id,
			})
		} else {
			None
		}
	}

	#[inline]
	fn inner(&self) -> &'t Node<K, E> {
		// Construction goes through `resolve`, so the position is in bounds.
		&self.nodes[self.id.pos]
	}

	#[inline]
	fn hop(&self, to: Option<NodeId>) -> Option<NodeRef<'t, K, E>> {
		to.map(|id| NodeRef {
			nodes: self.nodes,
			id,
		})
	}

	/// The handle of this node, usable with `add_left`/`add_right`.
	#[inline]
	pub fn id(&self) -> NodeId {
		self.id
	}

	#[inline]
	pub fn key(&self) -> &'t K {
		&self.inner().key
	}

	#[inline]
	pub fn element(&self) -> &'t E {
		&self.inner().element
	}

	pub fn parent(&self) -> Option<NodeRef<'t, K, E>> {
		self.hop(self.inner().parent)
	}

	pub fn left(&self) -> Option<NodeRef<'t, K, E>> {
		self.hop(self.inner().left)
	}

	pub fn right(&self) -> Option<NodeRef<'t, K, E>> {
		self.hop(self.inner().right)
	}

	/// The child on the given side, if any.
	pub fn child(&self, side: Side) -> Option<NodeRef<'t, K, E>> {
		self.hop(self.inner().child(side))
	}

	pub fn is_root(&self) -> bool {
		self.inner().parent.is_none()
	}

	pub fn is_leaf(&self) -> bool {
		let node = self.inner();
		node.left.is_none() && node.right.is_none()
	}
}

impl<K, E> PartialEq for NodeRef<'_, K, E> {
	/// Two views are equal when they name the same node of the same tree.
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && self.nodes.as_ptr() == other.nodes.as_ptr()
	}
}

impl<K, E> Eq for NodeRef<'_, K, E> {}

impl<K: fmt::Debug, E: fmt::Debug> fmt::Debug for NodeRef<'_, K, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let node = self.inner();
		f.debug_struct("NodeRef")
			.field("id", &self.id)
			.field("key", &node.key)
			.field("element", &node.element)
			.finish()
	}
}
