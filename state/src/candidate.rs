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

//! Two-tier candidate ranking: a top-K elected set plus a bounded
//! runner-up buffer, both ordered by vote total with address byte order
//! breaking ties deterministically.
//!
//! The buffer is logically one set but is held in two `IndexedHeap`s — one
//! ordered to peek the weakest member (for eviction), one to peek the
//! strongest (for promotion) — kept in lockstep on every mutation. This
//! mirrors the dual min/max heap construction recommended for the ranker
//! instead of an order-statistic tree, favoring cache locality.

use std::collections::HashMap;

use chain_core::Address;
use chain_util::IndexedHeap;

/// A candidate and its current aggregate vote total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
	/// The candidate's address.
	pub address: Address,
	/// Aggregate votes: sum of balances of every account currently voting
	/// for this address (including its own balance, via a self-vote).
	pub votes: u64,
}

fn key_of(c: &Candidate) -> Address {
	c.address
}

/// True if `a` outranks `b`: more votes, or equal votes and a smaller
/// address. Used to order the elected and buffer-max heaps (best first).
fn stronger(a: &Candidate, b: &Candidate) -> bool {
	if a.votes != b.votes {
		a.votes > b.votes
	} else {
		a.address < b.address
	}
}

/// True if `a` is weaker than `b`, the inverse ranking used to peek the
/// worst member of a set (elected's demotion candidate, buffer's eviction
/// candidate).
fn weaker(a: &Candidate, b: &Candidate) -> bool {
	if a.votes != b.votes {
		a.votes < b.votes
	} else {
		a.address > b.address
	}
}

/// Total order matching `stronger`: strongest first.
fn rank_cmp(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
	b.votes.cmp(&a.votes).then_with(|| a.address.cmp(&b.address))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Location {
	Elected,
	Buffer,
}

/// The two-tier candidate ranker.
pub struct CandidateRanker {
	elected_size: usize,
	buffer_size: usize,
	location: HashMap<Address, Location>,
	// Root = weakest elected member, for comparison against the buffer's best.
	elected: IndexedHeap<Address, Candidate>,
	// Root = weakest buffer member, evicted first when the buffer overflows.
	buffer_min: IndexedHeap<Address, Candidate>,
	// Root = strongest buffer member, promoted first when elected has room.
	buffer_max: IndexedHeap<Address, Candidate>,
}

impl CandidateRanker {
	/// Builds an empty ranker with the given elected-set and buffer capacities.
	pub fn new(elected_size: usize, buffer_size: usize) -> CandidateRanker {
		CandidateRanker {
			elected_size,
			buffer_size,
			location: HashMap::new(),
			elected: IndexedHeap::new(key_of, weaker),
			buffer_min: IndexedHeap::new(key_of, weaker),
			buffer_max: IndexedHeap::new(key_of, stronger),
		}
	}

	/// Stable snapshot of the elected set, strongest first.
	pub fn elected(&self) -> Vec<Candidate> {
		let mut v: Vec<Candidate> = self.elected.iter().copied().collect();
		v.sort_by(rank_cmp);
		v
	}

	/// Stable snapshot of the runner-up buffer, strongest first.
	pub fn buffer(&self) -> Vec<Candidate> {
		let mut v: Vec<Candidate> = self.buffer_min.iter().copied().collect();
		v.sort_by(rank_cmp);
		v
	}

	/// Whether `addr` is currently held in either heap.
	pub fn contains(&self, addr: &Address) -> bool {
		self.location.contains_key(addr)
	}

	fn push_buffer(&mut self, c: Candidate) {
		self.buffer_min.push(c);
		self.buffer_max.push(c);
		self.location.insert(c.address, Location::Buffer);
	}

	fn pop_buffer(&mut self, addr: &Address) -> Option<Candidate> {
		self.buffer_max.remove(addr);
		let c = self.buffer_min.remove(addr);
		self.location.remove(addr);
		c
	}

	fn evict_buffer_if_over_capacity(&mut self) {
		while self.buffer_min.len() > self.buffer_size {
			if let Some(weakest) = self.buffer_min.peek().copied() {
				self.pop_buffer(&weakest.address);
			} else {
				break;
			}
		}
	}

	/// Rebalances elected vs. buffer after a single candidate's vote total
	/// changed: while the buffer's strongest outranks the elected set's
	/// weakest, swap them.
	fn rebalance(&mut self) {
		loop {
			let elected_weakest = match self.elected.peek() {
				Some(c) => *c,
				None => break,
			};
			let buffer_strongest = match self.buffer_max.peek() {
				Some(c) => *c,
				None => break,
			};
			if !stronger(&buffer_strongest, &elected_weakest) {
				break;
			}
			self.elected.remove(&elected_weakest.address);
			self.pop_buffer(&buffer_strongest.address);
			self.elected.push(buffer_strongest);
			self.location.insert(buffer_strongest.address, Location::Elected);
			self.push_buffer(elected_weakest);
			self.evict_buffer_if_over_capacity();
		}
	}

	/// Updates `addr`'s vote total, inserting it if new. Handles promotion,
	/// demotion and buffer eviction so the ranker's invariants hold after
	/// the call returns.
	pub fn update(&mut self, addr: Address, votes: u64) {
		let candidate = Candidate { address: addr, votes };

		match self.location.get(&addr).copied() {
			Some(Location::Elected) => {
				self.elected.remove(&addr);
				self.elected.push(candidate);
				self.rebalance();
			}
			Some(Location::Buffer) => {
				self.pop_buffer(&addr);
				self.push_buffer(candidate);
				self.rebalance();
			}
			None => {
				if self.elected.len() < self.elected_size {
					self.elected.push(candidate);
					self.location.insert(addr, Location::Elected);
				} else {
					let elected_weakest = *self.elected.peek().expect("elected_size is non-zero when full");
					if stronger(&candidate, &elected_weakest) {
						self.elected.remove(&elected_weakest.address);
						self.elected.push(candidate);
						self.location.insert(addr, Location::Elected);
						self.push_buffer(elected_weakest);
						self.evict_buffer_if_over_capacity();
					} else {
						self.push_buffer(candidate);
						self.evict_buffer_if_over_capacity();
					}
				}
			}
		}
	}

	/// Removes `addr` from whichever heap holds it, promoting the buffer's
	/// strongest member into the elected set if a slot opened up.
	pub fn drop(&mut self, addr: &Address) {
		match self.location.get(addr).copied() {
			Some(Location::Elected) => {
				self.elected.remove(addr);
				self.location.remove(addr);
				if let Some(strongest) = self.buffer_max.peek().copied() {
					self.pop_buffer(&strongest.address);
					self.elected.push(strongest);
					self.location.insert(strongest.address, Location::Elected);
				}
			}
			Some(Location::Buffer) => {
				self.pop_buffer(addr);
			}
			None => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(byte: u8) -> Address {
		Address::from_bytes([byte; 20])
	}

	#[test]
	fn fills_elected_before_buffer() {
		let mut r = CandidateRanker::new(2, 3);
		r.update(addr(1), 10);
		r.update(addr(2), 20);
		assert_eq!(r.elected().len(), 2);
		assert_eq!(r.buffer().len(), 0);
	}

	#[test]
	fn new_strong_candidate_displaces_weakest_elected() {
		let mut r = CandidateRanker::new(2, 3);
		r.update(addr(1), 10);
		r.update(addr(2), 20);
		r.update(addr(3), 30);

		let elected: Vec<Address> = r.elected().iter().map(|c| c.address).collect();
		assert!(elected.contains(&addr(2)));
		assert!(elected.contains(&addr(3)));
		assert!(!elected.contains(&addr(1)));
		assert_eq!(r.buffer().len(), 1);
	}

	#[test]
	fn tie_break_favors_smaller_address() {
		let mut r = CandidateRanker::new(1, 2);
		r.update(addr(5), 100);
		r.update(addr(1), 100);
		assert_eq!(r.elected()[0].address, addr(1));
		assert_eq!(r.buffer()[0].address, addr(5));
	}

	#[test]
	fn buffer_evicts_weakest_when_full() {
		let mut r = CandidateRanker::new(1, 1);
		r.update(addr(9), 50);
		r.update(addr(1), 40);
		r.update(addr(2), 30);
		r.update(addr(3), 20);
		assert_eq!(r.buffer().len(), 1);
		assert_eq!(r.buffer()[0].address, addr(1));
	}

	#[test]
	fn drop_promotes_from_buffer() {
		let mut r = CandidateRanker::new(1, 2);
		r.update(addr(1), 100);
		r.update(addr(2), 50);
		r.drop(&addr(1));
		assert_eq!(r.elected()[0].address, addr(2));
		assert_eq!(r.buffer().len(), 0);
	}

	#[test]
	fn update_with_same_votes_is_idempotent() {
		let mut r = CandidateRanker::new(2, 2);
		r.update(addr(1), 10);
		r.update(addr(2), 20);
		let before = r.elected();
		r.update(addr(1), 10);
		assert_eq!(r.elected(), before);
	}
}
