//! In-order iterators for the `IndexedTree` data structure.
//!
//! Both iterators keep an explicit stack of pending nodes instead of recursing,
//! because the tree is not balanced and its depth can grow with the number of
//! nodes.
use crate::node::{Node, NodeId, NodeRef};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::iter::FusedIterator;

/// Pending nodes of a traversal. Most trees are shallow enough to stay inline.
type Stack = SmallVec<[NodeId; 32]>;

/// In-order iterator over every node of the tree.
///
/// For a tree built with [`add`](crate::IndexedTree::add) alone, the keys come
/// out in non-decreasing order.
pub struct Iter<'t, K, E> {
	nodes: &'t [Node<K, E>],
	tree: u64,
	stack: Stack,
	remaining: usize,
}

impl<'t, K, E> Iter<'t, K, E> {
	pub(crate) fn new(nodes: &'t [Node<K, E>], tree: u64, root: Option<NodeId>) -> Iter<'t, K, E> {
		let mut iter = Iter {
			nodes,
			tree,
			stack: Stack::new(),
			remaining: nodes.len(),
		};
		if let Some(root) = root {
			iter.descend(root);
		}
		iter
	}

	/// Pushes `id` and its chain of left children.
	fn descend(&mut self, mut id: NodeId) {
		let nodes = self.nodes;
		loop {
			self.stack.push(id);
			match nodes[id.to_raw()].left {
				Some(left) => id = left,
				None => break,
			}
		}
	}
}

impl<'t, K, E> Iterator for Iter<'t, K, E> {
	type Item = NodeRef<'t, K, E>;

	fn next(&mut self) -> Option<Self::Item> {
		let id = self.stack.pop()?;
		if let Some(right) = self.nodes[id.to_raw()].right {
			self.descend(right);
		}
		self.remaining = self.remaining.saturating_sub(1);
		NodeRef::resolve(self.nodes, self.tree, id)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<K, E> ExactSizeIterator for Iter<'_, K, E> {}

impl<K, E> FusedIterator for Iter<'_, K, E> {}

/// In-order iterator over the nodes whose keys lie in a closed interval.
///
/// Subtrees that cannot hold keys of the interval are skipped: the left
/// subtree of a node is entered only if the node's key is at least `start`,
/// the right subtree only if the node's key is below `end`. Pruning relies on
/// the search-tree order that [`add`](crate::IndexedTree::add) maintains.
/// Nodes attached out of order through `add_left`/`add_right` may be missed.
pub struct Range<'t, 'q, K, E, Q: ?Sized> {
	nodes: &'t [Node<K, E>],
	tree: u64,
	start: &'q Q,
	end: &'q Q,
	stack: Stack,
}

impl<'t, 'q, K, E, Q> Range<'t, 'q, K, E, Q>
where
	K: Borrow<Q>,
	Q: ?Sized + Ord,
{
	pub(crate) fn new(
		nodes: &'t [Node<K, E>],
		tree: u64,
		root: Option<NodeId>,
		start: &'q Q,
		end: &'q Q,
	) -> Range<'t, 'q, K, E, Q> {
		let mut range = Range {
			nodes,
			tree,
			start,
			end,
			stack: Stack::new(),
		};
		// An inverted interval is empty; do not traverse at all
		if let (Some(root), true) = (root, start <= end) {
			range.descend(root);
		}
		range
	}

	/// Pushes `id` and its left chain while the left side can still hold keys
	/// at or above `start`.
	fn descend(&mut self, mut id: NodeId) {
		let nodes = self.nodes;
		loop {
			self.stack.push(id);
			let node = &nodes[id.to_raw()];
			let key: &Q = node.key.borrow();
			match node.left {
				Some(left) if key >= self.start => id = left,
				_ => break,
			}
		}
	}
}

impl<'t, K, E, Q> Iterator for Range<'t, '_, K, E, Q>
where
	K: Borrow<Q>,
	Q: ?Sized + Ord,
{
	type Item = NodeRef<'t, K, E>;

	fn next(&mut self) -> Option<Self::Item> {
		let nodes = self.nodes;
		while let Some(id) = self.stack.pop() {
			let node = &nodes[id.to_raw()];
			let key: &Q = node.key.borrow();

			// Everything right of a key equal to `end` is strictly greater
			if key < self.end {
				if let Some(right) = node.right {
					self.descend(right);
				}
			}

			if key >= self.start && key <= self.end {
				return NodeRef::resolve(nodes, self.tree, id);
			}
		}
		None
	}
}

impl<K, E, Q> FusedIterator for Range<'_, '_, K, E, Q>
where
	K: Borrow<Q>,
	Q: ?Sized + Ord,
{
}

#[cfg(test)]
mod tests {
	use crate::Tree;

	fn sample() -> Tree<i32, i32> {
		let mut tree = Tree::new();
		for key in [5, 3, 8, 1, 4, 7, 9] {
			tree.add(key, key * 10);
		}
		tree
	}

	#[test]
	fn iter_is_in_order() {
		let tree = sample();
		let keys: Vec<i32> = tree.iter().map(|n| *n.key()).collect();
		assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
	}

	#[test]
	fn iter_exact_size() {
		let tree = sample();
		let mut iter = tree.iter();
		assert_eq!(iter.len(), 7);
		iter.next();
		iter.next();
		assert_eq!(iter.len(), 5);
		assert_eq!(iter.count(), 5);
	}

	#[test]
	fn iter_empty() {
		let tree: Tree<i32, i32> = Tree::new();
		assert!(tree.iter().next().is_none());
		assert_eq!(tree.iter().len(), 0);
	}

	#[test]
	fn range_inner_interval() {
		let tree = sample();
		let keys: Vec<i32> = tree.range_iter(&3, &7).map(|n| *n.key()).collect();
		assert_eq!(keys, vec![3, 4, 5, 7]);
	}

	#[test]
	fn range_bounds_between_keys() {
		let tree = sample();
		let keys: Vec<i32> = tree.range_iter(&2, &6).map(|n| *n.key()).collect();
		assert_eq!(keys, vec![3, 4, 5]);
	}

	#[test]
	fn range_single_point() {
		let tree = sample();
		let keys: Vec<i32> = tree.range_iter(&8, &8).map(|n| *n.key()).collect();
		assert_eq!(keys, vec![8]);
	}

	#[test]
	fn range_outside_keys() {
		let tree = sample();
		assert_eq!(tree.range_iter(&10, &20).count(), 0);
		assert_eq!(tree.range_iter(&-5, &0).count(), 0);
	}

	#[test]
	fn range_inverted_is_empty() {
		let tree = sample();
		assert_eq!(tree.range_iter(&7, &3).count(), 0);
	}

	#[test]
	fn range_is_fused() {
		let tree = sample();
		let mut range = tree.range_iter(&9, &9);
		assert!(range.next().is_some());
		assert!(range.next().is_none());
		assert!(range.next().is_none());
	}

	#[test]
	fn range_keeps_duplicates() {
		let mut tree: Tree<i32, &str> = Tree::new();
		tree.add(5, "a");
		tree.add(5, "b");
		tree.add(6, "c");
		tree.add(5, "d");

		let elements: Vec<&str> = tree.range_iter(&5, &5).map(|n| *n.element()).collect();
		// Ties go left, so later duplicates come first in order
		assert_eq!(elements, vec!["d", "b", "a"]);
	}

	#[test]
	fn range_prunes_left_subtree_below_start() {
		let mut tree: Tree<i32, i32> = Tree::new();
		let root = tree.add(10, 10);
		let two = tree.add_left(root, 2, 2).unwrap();
		// Out of order: 8 hides below 2, which is already under `start`
		tree.add_left(two, 8, 8).unwrap();

		let keys: Vec<i32> = tree.range_iter(&5, &20).map(|n| *n.key()).collect();
		assert_eq!(keys, vec![10]);
		assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![8, 2, 10]);
	}

	#[test]
	fn range_on_degenerate_tree() {
		let mut tree: Tree<u32, u32> = Tree::new();
		// Ascending insertion builds a right spine
		for key in 0..5_000 {
			tree.add(key, key);
		}
		assert_eq!(tree.depth(), 5_000);

		let total: u64 = tree.range_iter(&4_990, &4_999).map(|n| *n.element() as u64).sum();
		assert_eq!(total, (4_990..5_000).sum::<u64>());
		assert_eq!(tree.iter().count(), 5_000);
	}
}
