//! # Concurrency Tests for SharedTree
//!
//! The tree has no internal locking; `SharedTree` serialises writers and lets
//! readers run together. These tests check that no insertion is lost and that
//! readers always observe a consistent tree.

use rand::prelude::*;
use rand::rngs::StdRng;
use sprig::sync::SharedTree;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

// ===========================================================================
// Concurrent Insert Tests
// ===========================================================================

#[test]
fn concurrent_add_disjoint_ranges() {
	let tree = Arc::new(SharedTree::<i32, i32>::new());
	let num_threads = 4;
	let entries_per_thread = 250;

	let handles: Vec<_> = (0..num_threads)
		.map(|t| {
			let tree = Arc::clone(&tree);
			thread::spawn(move || {
				for i in 0..entries_per_thread {
					let key = t * entries_per_thread + i;
					tree.add(key, key * 10);
				}
			})
		})
		.collect();

	for h in handles {
		h.join().unwrap();
	}

	assert_eq!(tree.len(), (num_threads * entries_per_thread) as usize);
	for key in 0..num_threads * entries_per_thread {
		assert_eq!(tree.lookup(&key, |n| *n.element()), Some(key * 10), "Key {} missing", key);
	}
	tree.read(|t| {
		t.assert_invariants();
		t.assert_ordered();
	});
}

#[test]
fn concurrent_add_overlapping_keys() {
	let tree = Arc::new(SharedTree::<i32, usize>::new());
	let num_threads = 4;

	let handles: Vec<_> = (0..num_threads)
		.map(|t| {
			let tree = Arc::clone(&tree);
			thread::spawn(move || {
				let mut rng = StdRng::seed_from_u64(t as u64);
				for _ in 0..500 {
					tree.add(rng.random_range(0..100), t);
				}
			})
		})
		.collect();

	for h in handles {
		h.join().unwrap();
	}

	// Every add creates a node, duplicates included
	assert_eq!(tree.len(), num_threads * 500);
	tree.read(|t| {
		assert!(t.distinct_keys() <= 100);
		t.assert_invariants();
	});
}

// ===========================================================================
// Readers Alongside a Writer
// ===========================================================================

#[test]
fn readers_see_consistent_ranges() {
	let tree = Arc::new(SharedTree::<i32, i32>::new());
	let done = Arc::new(AtomicBool::new(false));

	let writer = {
		let tree = Arc::clone(&tree);
		let done = Arc::clone(&done);
		thread::spawn(move || {
			let mut rng = StdRng::seed_from_u64(99);
			let mut keys: Vec<i32> = (0..2_000).collect();
			keys.shuffle(&mut rng);
			for key in keys {
				tree.add(key, key);
			}
			done.store(true, Ordering::Release);
		})
	};

	let readers: Vec<_> = (0..3)
		.map(|_| {
			let tree = Arc::clone(&tree);
			let done = Arc::clone(&done);
			thread::spawn(move || {
				let mut observations = 0usize;
				loop {
					let finished = done.load(Ordering::Acquire);
					let range = tree.range_cloned(&500, &1_499);
					// Whatever prefix of the writes is visible, ranges come out sorted
					assert!(range.windows(2).all(|w| w[0] < w[1]));
					assert!(range.iter().all(|k| (500..=1_499).contains(k)));
					observations += 1;
					if finished {
						break;
					}
				}
				observations
			})
		})
		.collect();

	writer.join().unwrap();
	for r in readers {
		assert!(r.join().unwrap() > 0);
	}

	assert_eq!(tree.len(), 2_000);
	assert_eq!(tree.range_cloned(&500, &1_499).len(), 1_000);
}

#[test]
fn write_closure_is_atomic() {
	let tree = Arc::new(SharedTree::<i32, i32>::new());

	let handles: Vec<_> = (0..4)
		.map(|t| {
			let tree = Arc::clone(&tree);
			thread::spawn(move || {
				for i in 0..100 {
					// Each closure adds a pair; readers never see half of it
					tree.write(|tree| {
						let base = (t * 100 + i) * 2;
						tree.add(base, base);
						tree.add(base + 1, base + 1);
					});
					assert_eq!(tree.len() % 2, 0);
				}
			})
		})
		.collect();

	for h in handles {
		h.join().unwrap();
	}
	assert_eq!(tree.len(), 800);
}
