//! # Error Types for the Indexed Tree
//!
//! The tree never fails in a way that corrupts its state. Every structural
//! operation either applies completely or leaves the tree untouched, and the
//! reason for a refusal is described by [`Error`].
//!
//! ## Error Flow
//!
//! ```text
//! attach(parent, side, ..)
//!      │
//!      ▼
//! Resolve parent handle ──────► Err(UnknownNode) ──► no mutation
//!      │
//!      ▼
//! Inspect child slot ─────────► Err(Occupied)    ──► no mutation
//!      │
//!      ▼ (free)
//! Allocate node, link parent, index key
//!      │
//!      ▼
//! Ok(NodeId)
//! ```
//!
//! The plain operations (`add_left`, `add_right`, `set_root`) collapse these
//! errors into `None`. The `try_` variants surface them.

use thiserror::Error;

use crate::node::{NodeId, Side};

/// Reasons a structural operation on the tree was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The requested child slot of the parent is already taken.
	///
	/// Child slots are the only bound on the shape of the tree, and an occupied
	/// slot is never overwritten.
	#[error("the {side} child slot of the parent node is occupied")]
	Occupied {
		/// The side that was requested.
		side: Side,
	},

	/// The handle does not name a node of this tree.
	///
	/// Reported for a handle obtained from a different tree, from this tree
	/// before a [`clear`](crate::IndexedTree::clear), or forged with
	/// [`NodeId::from_raw`]. Its position is never looked at in those cases.
	#[error("node {0} does not belong to this tree")]
	UnknownNode(NodeId),

	/// A root is already established.
	#[error("the tree already has a root")]
	RootExists,
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
