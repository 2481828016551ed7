// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A binary heap indexed by an arbitrary key, supporting O(log n) removal
//! and re-prioritization of an arbitrary element, not just the root.
//!
//! `std::collections::BinaryHeap` only exposes push/pop; the mempool's
//! priority queue and the candidate ranker's elected/buffer heaps both need
//! to pull an element out, or fix it up after its ordering key changes, by
//! identity rather than by being the current max. This is the Rust
//! equivalent of Go's `container/heap` used together with an explicit index
//! field on the heap element.

use std::collections::HashMap;
use std::hash::Hash as StdHash;

/// A heap over `T`, ordered by the `above` comparator and indexed by `K`.
///
/// `above(a, b)` must return true when `a` belongs closer to the root than
/// `b` (i.e. `a < b` for a min-heap, `a > b` for a max-heap, ties broken
/// however the caller likes).
pub struct IndexedHeap<K, T> {
	items: Vec<T>,
	positions: HashMap<K, usize>,
	key_of: fn(&T) -> K,
	above: fn(&T, &T) -> bool,
}

impl<K, T> IndexedHeap<K, T>
where
	K: Eq + StdHash + Copy,
{
	/// Builds an empty heap.
	pub fn new(key_of: fn(&T) -> K, above: fn(&T, &T) -> bool) -> Self {
		IndexedHeap {
			items: Vec::new(),
			positions: HashMap::new(),
			key_of,
			above,
		}
	}

	/// Number of elements currently held.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether the heap holds no elements.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Whether `key` is currently present in the heap.
	pub fn contains(&self, key: &K) -> bool {
		self.positions.contains_key(key)
	}

	/// Borrows the element at the root (min or max, per the comparator).
	pub fn peek(&self) -> Option<&T> {
		self.items.first()
	}

	/// Borrows the element identified by `key`, wherever it sits in the heap.
	pub fn get(&self, key: &K) -> Option<&T> {
		self.positions.get(key).map(|&i| &self.items[i])
	}

	/// Iterates the heap's elements in unspecified (storage) order.
	pub fn iter(&self) -> impl Iterator<Item = &T> {
		self.items.iter()
	}

	/// Inserts `item`, restoring the heap property.
	pub fn push(&mut self, item: T) {
		let key = (self.key_of)(&item);
		let idx = self.items.len();
		self.items.push(item);
		self.positions.insert(key, idx);
		self.sift_up(idx);
	}

	/// Removes and returns the root element.
	pub fn pop(&mut self) -> Option<T> {
		if self.items.is_empty() {
			return None;
		}
		self.remove_at(0)
	}

	/// Removes and returns the element identified by `key`, if present.
	pub fn remove(&mut self, key: &K) -> Option<T> {
		let idx = *self.positions.get(key)?;
		self.remove_at(idx)
	}

	/// Re-establishes the heap property for the element identified by
	/// `key` after its ordering key has changed in place. No-op if `key`
	/// isn't present.
	pub fn fix(&mut self, key: &K) {
		if let Some(&idx) = self.positions.get(key) {
			let moved_down = self.sift_down(idx);
			if !moved_down {
				self.sift_up(idx);
			}
		}
	}

	fn remove_at(&mut self, idx: usize) -> Option<T> {
		let last = self.items.len() - 1;
		self.swap_slots(idx, last);
		let removed = self.items.pop();
		if let Some(r) = &removed {
			self.positions.remove(&(self.key_of)(r));
		}
		if idx < self.items.len() {
			let moved_down = self.sift_down(idx);
			if !moved_down {
				self.sift_up(idx);
			}
		}
		removed
	}

	fn swap_slots(&mut self, i: usize, j: usize) {
		if i == j {
			return;
		}
		self.items.swap(i, j);
		let ki = (self.key_of)(&self.items[i]);
		let kj = (self.key_of)(&self.items[j]);
		self.positions.insert(ki, i);
		self.positions.insert(kj, j);
	}

	fn sift_up(&mut self, mut idx: usize) {
		while idx > 0 {
			let parent = (idx - 1) / 2;
			if (self.above)(&self.items[idx], &self.items[parent]) {
				self.swap_slots(idx, parent);
				idx = parent;
			} else {
				break;
			}
		}
	}

	/// Returns true if any swap took place.
	fn sift_down(&mut self, mut idx: usize) -> bool {
		let mut moved = false;
		loop {
			let left = 2 * idx + 1;
			let right = 2 * idx + 2;
			let mut best = idx;
			if left < self.items.len() && (self.above)(&self.items[left], &self.items[best]) {
				best = left;
			}
			if right < self.items.len() && (self.above)(&self.items[right], &self.items[best]) {
				best = right;
			}
			if best == idx {
				break;
			}
			self.swap_slots(idx, best);
			idx = best;
			moved = true;
		}
		moved
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	struct Item {
		id: u32,
		priority: i64,
	}

	fn key_of(i: &Item) -> u32 {
		i.id
	}

	fn max_above(a: &Item, b: &Item) -> bool {
		a.priority > b.priority
	}

	fn min_above(a: &Item, b: &Item) -> bool {
		a.priority < b.priority
	}

	#[test]
	fn max_heap_pops_in_descending_order() {
		let mut heap: IndexedHeap<u32, Item> = IndexedHeap::new(key_of, max_above);
		for (id, p) in [(1, 5), (2, 9), (3, 1), (4, 7)] {
			heap.push(Item { id, priority: p });
		}
		let mut popped = Vec::new();
		while let Some(i) = heap.pop() {
			popped.push(i.priority);
		}
		assert_eq!(popped, vec![9, 7, 5, 1]);
	}

	#[test]
	fn min_heap_pops_in_ascending_order() {
		let mut heap: IndexedHeap<u32, Item> = IndexedHeap::new(key_of, min_above);
		for (id, p) in [(1, 5), (2, 9), (3, 1), (4, 7)] {
			heap.push(Item { id, priority: p });
		}
		let mut popped = Vec::new();
		while let Some(i) = heap.pop() {
			popped.push(i.priority);
		}
		assert_eq!(popped, vec![1, 5, 7, 9]);
	}

	#[test]
	fn remove_by_key_mid_heap() {
		let mut heap: IndexedHeap<u32, Item> = IndexedHeap::new(key_of, max_above);
		for (id, p) in [(1, 5), (2, 9), (3, 1), (4, 7)] {
			heap.push(Item { id, priority: p });
		}
		let removed = heap.remove(&3).unwrap();
		assert_eq!(removed.priority, 1);
		assert_eq!(heap.len(), 3);
		assert!(!heap.contains(&3));

		let mut popped = Vec::new();
		while let Some(i) = heap.pop() {
			popped.push(i.priority);
		}
		assert_eq!(popped, vec![9, 7, 5]);
	}

	#[test]
	fn fix_after_in_place_priority_change() {
		let mut heap: IndexedHeap<u32, Item> = IndexedHeap::new(key_of, max_above);
		for (id, p) in [(1, 5), (2, 1), (3, 3)] {
			heap.push(Item { id, priority: p });
		}
		// bump id=2's priority above everything else, then fix it up.
		{
			let idx = *heap.positions.get(&2).unwrap();
			heap.items[idx].priority = 100;
		}
		heap.fix(&2);
		assert_eq!(heap.peek().unwrap().id, 2);
	}
}
