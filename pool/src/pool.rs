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

//! The mempool proper: admission, orphan resolution, double-spend removal
//! and priority-ordered block-payload selection.
//!
//! Every public operation takes the reader/writer lock appropriate to
//! whether it mutates pool state; internal helpers never re-acquire it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use log::debug;

use chain_core::{Hash, Hashed, SourcePointer, Transaction};
use chain_util::IndexedHeap;

use crate::chain_view::ChainView;
use crate::error::{Error, ErrorKind};
use crate::types::{OrphanTx, PoolConfig, Tag, TxDesc};
use crate::orphan::OrphanTable;
use crate::utxo_view::UtxoView;

/// Outcome of an admission attempt.
pub enum Admission {
	/// The transaction was admitted; here is its descriptor.
	Accepted(TxDesc),
	/// One or more parents are unknown or fully spent; these are their
	/// hashes. Not a rejection — the caller decides orphan disposition.
	MissingParents(Vec<Hash>),
}

#[derive(Clone, Copy)]
struct HeapEntry {
	hash: Hash,
	priority: f64,
}

fn heap_key(e: &HeapEntry) -> Hash {
	e.hash
}

// Higher priority sorts toward the root; ties broken by hash byte order so
// that `pick_txs` is deterministic across nodes.
fn heap_above(a: &HeapEntry, b: &HeapEntry) -> bool {
	if a.priority != b.priority {
		a.priority > b.priority
	} else {
		a.hash < b.hash
	}
}

struct Inner {
	tx_descs: HashMap<Hash, TxDesc>,
	heap: IndexedHeap<Hash, HeapEntry>,
	source_pointers: HashMap<SourcePointer, Hash>,
	orphans: OrphanTable,
	utxo_view: UtxoView,
}

impl Inner {
	fn new(config: &PoolConfig, chain: Arc<dyn ChainView>, now: i64) -> Inner {
		Inner {
			tx_descs: HashMap::new(),
			heap: IndexedHeap::new(heap_key, heap_above),
			source_pointers: HashMap::new(),
			orphans: OrphanTable::new(config, now),
			utxo_view: UtxoView::new(chain),
		}
	}

	fn has_tx(&self, hash: &Hash) -> bool {
		self.tx_descs.contains_key(hash)
	}

	fn maybe_accept(
		&mut self,
		config: &PoolConfig,
		chain: &dyn ChainView,
		tx: Transaction,
		now: i64,
		reject_dup_orphans: bool,
	) -> Result<Admission, Error> {
		let hash = tx.hash();

		if self.has_tx(&hash) || (reject_dup_orphans && self.orphans.contains(&hash)) {
			debug!("admission rejected {}: duplicate", hash);
			return Err(ErrorKind::DuplicateTx.into());
		}
		if tx.coinbase {
			debug!("admission rejected {}: coinbase", hash);
			return Err(ErrorKind::CoinbaseInMempool.into());
		}
		for input in &tx.inputs {
			if self.source_pointers.contains_key(&input.previous_output) {
				debug!("admission rejected {}: double spend", hash);
				return Err(ErrorKind::DoubleSpend.into());
			}
		}

		self.utxo_view.refresh();
		let missing = self.utxo_view.fetch_inputs(&tx);
		if !missing.is_empty() {
			return Ok(Admission::MissingParents(missing));
		}

		if tx.lock_time as i64 > now {
			debug!("admission rejected {}: locked until {}", hash, tx.lock_time);
			return Err(ErrorKind::Locked.into());
		}

		// The fee market is not modeled beyond the structural guard below;
		// the upstream pool this is patterned on always computed a zero fee
		// here too, so the guard is currently inert (see calculate_min_fee).
		let fee = 0u64;
		let size = tx.total_size();
		if size >= config.default_block_priority_size.saturating_sub(1000) && fee < crate::types::calculate_min_fee(size) {
			debug!("admission rejected {}: fee too low", hash);
			return Err(ErrorKind::FeeTooLow.into());
		}

		let height = chain.tip_height()?;
		let desc = TxDesc::new(tx.clone(), hash, now, height, fee);

		for input in &tx.inputs {
			self.source_pointers.insert(input.previous_output, hash);
		}
		self.utxo_view.add_tx_outputs(hash, &tx);
		self.tx_descs.insert(hash, desc.clone());
		self.heap.push(HeapEntry { hash, priority: 0.0 });

		Ok(Admission::Accepted(desc))
	}

	/// BFS over `root`'s outputs, admitting any orphan whose inputs they
	/// satisfy. Mirrors the upstream pool: at most one orphan per
	/// conflicting SourcePointer bucket is admitted (the first that
	/// succeeds), and a hard admission error removes that orphan (and its
	/// descendants) without trying the remaining candidates in the bucket.
	fn resolve_orphans(
		&mut self,
		config: &PoolConfig,
		chain: &dyn ChainView,
		root: Hash,
		now: i64,
	) -> Vec<TxDesc> {
		let mut accepted = Vec::new();
		let mut queue = VecDeque::new();
		queue.push_back(root);

		while let Some(item) = queue.pop_front() {
			let out_len = match self.tx_descs.get(&item) {
				Some(desc) => desc.tx.outputs.len(),
				None => continue,
			};
			for idx in 0..out_len as u32 {
				let ptr = SourcePointer::new(item, idx);
				for candidate_hash in self.orphans.depending_on(&ptr) {
					let candidate_tx = match self.orphans.get(&candidate_hash) {
						Some(o) => o.tx.clone(),
						None => continue,
					};
					match self.maybe_accept(config, chain, candidate_tx, now, false) {
						Err(_) => {
							self.orphans.remove_recursive(candidate_hash);
							break;
						}
						Ok(Admission::MissingParents(_)) => continue,
						Ok(Admission::Accepted(desc)) => {
							accepted.push(desc);
							self.orphans.remove(&candidate_hash);
							queue.push_back(candidate_hash);
							break;
						}
					}
				}
			}
		}

		accepted
	}

	fn remove_tx(&mut self, hash: Hash, remove_descendants: bool, update_heap: bool) -> Vec<Hash> {
		let desc = match self.tx_descs.get(&hash) {
			Some(d) => d.clone(),
			None => return Vec::new(),
		};

		let mut removed = vec![hash];
		if remove_descendants {
			for idx in 0..desc.tx.outputs.len() as u32 {
				let ptr = SourcePointer::new(hash, idx);
				if let Some(child_hash) = self.source_pointers.get(&ptr).copied() {
					removed.extend(self.remove_tx(child_hash, true, update_heap));
				}
			}
		}

		if update_heap {
			self.heap.remove(&hash);
		}
		self.tx_descs.remove(&hash);
		for input in &desc.tx.inputs {
			self.source_pointers.remove(&input.previous_output);
		}
		self.utxo_view.remove_tx_outputs(&hash);

		removed
	}

	fn remove_double_spends(&mut self, tx: &Transaction) -> Vec<Hash> {
		let mut removed = Vec::new();
		for input in &tx.inputs {
			if let Some(conflicting) = self.source_pointers.get(&input.previous_output).copied() {
				removed.extend(self.remove_tx(conflicting, true, true));
			}
		}
		removed
	}
}

/// The mempool: a concurrent, size-bounded pool of admitted and orphaned
/// transactions.
pub struct Mempool {
	config: PoolConfig,
	chain: Arc<dyn ChainView>,
	inner: RwLock<Inner>,
	last_updated_unix_time: AtomicI64,
}

impl Mempool {
	/// Builds an empty mempool bound to `chain` under `config`.
	pub fn new(config: PoolConfig, chain: Arc<dyn ChainView>, now: i64) -> Mempool {
		let inner = Inner::new(&config, chain.clone(), now);
		Mempool {
			config,
			chain,
			inner: RwLock::new(inner),
			last_updated_unix_time: AtomicI64::new(now),
		}
	}

	/// Attempts to admit `tx`. See `Admission` for the possible outcomes;
	/// admission errors disqualify only this transaction.
	pub fn maybe_accept(&self, tx: Transaction, now: i64, reject_dup_orphans: bool) -> Result<Admission, Error> {
		let mut inner = self.inner.write();
		let result = inner.maybe_accept(&self.config, &*self.chain, tx, now, reject_dup_orphans)?;
		if let Admission::Accepted(_) = result {
			self.touch(now);
		}
		Ok(result)
	}

	/// Admits `tx`, resolving any orphans it unblocks. Returns the
	/// descriptors of `tx` and every orphan admitted as a consequence, in
	/// discovery order. If `tx` itself has missing parents, it is
	/// quarantined (when `allow_orphan`) instead.
	pub fn process_tx(
		&self,
		tx: Transaction,
		allow_orphan: bool,
		tag: Option<Tag>,
		now: i64,
	) -> Result<Vec<TxDesc>, Error> {
		let mut inner = self.inner.write();
		let admitted = inner.maybe_accept(&self.config, &*self.chain, tx.clone(), now, true)?;

		match admitted {
			Admission::Accepted(desc) => {
				self.touch(now);
				let hash = desc.hash;
				let resolved = inner.resolve_orphans(&self.config, &*self.chain, hash, now);

				inner.orphans.remove_double_spends(&tx);
				for d in &resolved {
					inner.orphans.remove_double_spends(&d.tx);
				}

				let mut result = vec![desc];
				result.extend(resolved);
				Ok(result)
			}
			Admission::MissingParents(missing) => {
				if !allow_orphan {
					debug!("orphan disallowed for {}", tx.hash());
					return Err(ErrorKind::OrphanDisallowed.into());
				}
				let hash = tx.hash();
				let orphan = OrphanTx {
					tag,
					tx,
					hash,
					expiration_time: now + self.config.orphan_tx_ttl_secs,
				};
				inner.orphans.maybe_add(orphan, &self.config)?;
				inner.orphans.sweep_expired(now, &self.config);
				let _ = missing; // informational only; surfaced to callers that inspect the error path directly.
				Ok(Vec::new())
			}
		}
	}

	/// Removes `hash`, optionally cascading to pool transactions that spend
	/// its outputs. `update_heap` should be false only when the caller has
	/// already popped the entry out of the priority queue itself (block
	/// assembly).
	pub fn remove_tx(&self, hash: Hash, remove_descendants: bool, update_heap: bool) -> Vec<Hash> {
		let mut inner = self.inner.write();
		inner.remove_tx(hash, remove_descendants, update_heap)
	}

	/// Removes every pool transaction that conflicts with one of `tx`'s
	/// inputs, along with their descendants.
	pub fn remove_double_spends(&self, tx: &Transaction) -> Vec<Hash> {
		let mut inner = self.inner.write();
		inner.remove_double_spends(tx)
	}

	/// Whether `hash` identifies a currently accepted pool transaction.
	pub fn has_tx(&self, hash: &Hash) -> bool {
		self.inner.read().has_tx(hash)
	}

	/// Whether `hash` identifies a currently quarantined orphan.
	pub fn has_orphan_tx(&self, hash: &Hash) -> bool {
		self.inner.read().orphans.contains(hash)
	}

	/// Whether `hash` identifies either an accepted or an orphaned transaction.
	pub fn has_tx_or_orphan_tx(&self, hash: &Hash) -> bool {
		self.has_tx(hash) || self.has_orphan_tx(hash)
	}

	/// Snapshot of every accepted transaction's descriptor.
	pub fn tx_descs(&self) -> Vec<TxDesc> {
		self.inner.read().tx_descs.values().cloned().collect()
	}

	/// Removes `hash` from the orphan table, without following dependents.
	pub fn remove_orphan_tx(&self, hash: &Hash) -> Option<OrphanTx> {
		self.inner.write().orphans.remove(hash)
	}

	/// Removes every orphan carrying `tag`.
	pub fn remove_orphan_txs_by_tag(&self, tag: Tag) -> Vec<Hash> {
		self.inner.write().orphans.remove_by_tag(tag)
	}

	/// Recomputes every admitted transaction's priority, then repeatedly
	/// selects the highest-priority transaction while it still fits the
	/// block's size and count budget. Stops at the first transaction that
	/// doesn't fit rather than skipping ahead to smaller ones.
	///
	/// Returns the selected transactions and the deletion waitlist the
	/// caller must pass back to `remove_tx_in_block` once the block is
	/// finalized (or discard, re-pushing the entries itself, if it isn't).
	pub fn pick_txs(&self, now: i64) -> (Vec<Transaction>, HashMap<Hash, TxDesc>) {
		let mut inner = self.inner.write();

		for desc in inner.tx_descs.values_mut() {
			let age = (now - desc.added_time).max(0) as f64;
			let size = desc.tx.total_size().max(1) as f64;
			let value = desc.tx.total_out_value() as f64;
			desc.priority = age * value / size;
		}

		inner.heap = IndexedHeap::new(heap_key, heap_above);
		for (&hash, desc) in inner.tx_descs.iter() {
			inner.heap.push(HeapEntry { hash, priority: desc.priority });
		}

		let mut selected = Vec::new();
		let mut waitlist = HashMap::new();
		let mut cum_size = 0usize;

		loop {
			let top = match inner.heap.peek() {
				Some(e) => *e,
				None => break,
			};
			let desc = inner.tx_descs.get(&top.hash).expect("heap entry without a tx_desc").clone();
			let size = desc.tx.total_size();
			if cum_size + size > self.config.default_block_max_size || selected.len() >= self.config.default_tx_max_num_in_block {
				break;
			}
			cum_size += size;
			selected.push(desc.tx.clone());
			inner.heap.pop();
			waitlist.insert(top.hash, desc);
		}

		(selected, waitlist)
	}

	/// Finalizes a block's transaction selection: discards waitlist entries
	/// that made it into the block, and pushes everything else back onto
	/// the priority queue for the next `pick_txs`.
	pub fn remove_tx_in_block(&self, block_txs: &[Transaction], mut waitlist: HashMap<Hash, TxDesc>) {
		let mut inner = self.inner.write();
		for tx in block_txs {
			let hash = tx.hash();
			inner.remove_tx(hash, true, false);
			waitlist.remove(&hash);
		}
		for (hash, desc) in waitlist {
			inner.heap.push(HeapEntry { hash, priority: desc.priority });
		}
	}

	/// The last unix time at which the pool's accepted-set changed.
	pub fn last_time_pool_updated(&self) -> i64 {
		self.last_updated_unix_time.load(Ordering::SeqCst)
	}

	fn touch(&self, now: i64) {
		self.last_updated_unix_time.store(now, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain_view::test_util::MockChainView;
	use chain_core::{TxInput, TxOutput};

	fn pool_with_chain() -> (Mempool, Arc<MockChainView>) {
		let chain = Arc::new(MockChainView::new());
		let pool = Mempool::new(PoolConfig::default(), chain.clone(), 0);
		(pool, chain)
	}

	fn funded_tx(parent: Hash, idx: u32, value: u64, out_value: u64) -> Transaction {
		Transaction::new(vec![TxInput::new(SourcePointer::new(parent, idx))], vec![TxOutput::new(out_value, vec![])], 0)
	}

	#[test]
	fn admits_tx_whose_parent_is_confirmed() {
		let (pool, chain) = pool_with_chain();
		let parent_hash = Hash::from_slice(&[1u8; 32]);
		chain.add_outputs(parent_hash, vec![TxOutput::new(100, vec![])]);

		let tx = funded_tx(parent_hash, 0, 100, 90);
		match pool.maybe_accept(tx.clone(), 0, true).unwrap() {
			Admission::Accepted(desc) => assert_eq!(desc.hash, tx.hash()),
			Admission::MissingParents(m) => panic!("unexpected missing parents: {:?}", m),
		}
		assert!(pool.has_tx(&tx.hash()));
	}

	#[test]
	fn unknown_parent_reports_missing() {
		let (pool, _chain) = pool_with_chain();
		let tx = funded_tx(Hash::from_slice(&[2u8; 32]), 0, 1, 1);
		match pool.maybe_accept(tx, 0, true).unwrap() {
			Admission::MissingParents(m) => assert_eq!(m.len(), 1),
			Admission::Accepted(_) => panic!("expected missing parents"),
		}
	}

	#[test]
	fn second_spender_of_same_output_is_rejected() {
		let (pool, chain) = pool_with_chain();
		let parent_hash = Hash::from_slice(&[5u8; 32]);
		chain.add_outputs(parent_hash, vec![TxOutput::new(100, vec![])]);

		let t1 = funded_tx(parent_hash, 0, 100, 50);
		let t2 = Transaction::new(
			vec![TxInput::new(SourcePointer::new(parent_hash, 0))],
			vec![TxOutput::new(40, vec![])],
			0,
		);
		assert!(matches!(pool.maybe_accept(t1, 0, true).unwrap(), Admission::Accepted(_)));
		let err = pool.maybe_accept(t2, 0, true).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::DoubleSpend);
	}

	#[test]
	fn orphan_resolves_once_parent_arrives() {
		let (pool, chain) = pool_with_chain();

		let parent = Transaction::new(vec![], vec![TxOutput::new(10, vec![])], 0);
		let parent_hash = parent.hash();
		let child = funded_tx(parent_hash, 0, 10, 5);

		let descs = pool.process_tx(child.clone(), true, None, 0).unwrap();
		assert!(descs.is_empty());
		assert!(pool.has_orphan_tx(&child.hash()));

		chain.add_outputs(parent_hash, vec![TxOutput::new(10, vec![])]);
		let descs = pool.process_tx(parent, true, None, 1).unwrap();
		let hashes: Vec<Hash> = descs.iter().map(|d| d.hash).collect();
		assert_eq!(hashes, vec![parent_hash, child.hash()]);
		assert!(!pool.has_orphan_tx(&child.hash()));
		assert!(pool.has_tx(&child.hash()));
	}

	#[test]
	fn pick_txs_respects_max_size() {
		let (pool, chain) = pool_with_chain();
		let mut config = PoolConfig::default();
		config.default_block_max_size = 1;
		let pool = Mempool::new(config, chain.clone(), 0);

		let parent_hash = Hash::from_slice(&[7u8; 32]);
		chain.add_outputs(parent_hash, vec![TxOutput::new(5, vec![])]);
		let tx = funded_tx(parent_hash, 0, 5, 5);
		pool.maybe_accept(tx, 0, true).unwrap();

		let (selected, waitlist) = pool.pick_txs(100);
		assert!(selected.is_empty());
		assert!(waitlist.is_empty());
	}

	#[test]
	fn remove_tx_in_block_discards_matched_and_requeues_rest() {
		let (pool, chain) = pool_with_chain();
		let p1 = Hash::from_slice(&[8u8; 32]);
		let p2 = Hash::from_slice(&[9u8; 32]);
		chain.add_outputs(p1, vec![TxOutput::new(5, vec![])]);
		chain.add_outputs(p2, vec![TxOutput::new(5, vec![])]);

		let tx1 = funded_tx(p1, 0, 5, 5);
		let tx2 = funded_tx(p2, 0, 5, 5);
		pool.maybe_accept(tx1.clone(), 0, true).unwrap();
		pool.maybe_accept(tx2.clone(), 0, true).unwrap();

		let (selected, waitlist) = pool.pick_txs(100);
		assert_eq!(selected.len(), 2);

		pool.remove_tx_in_block(&[tx1.clone()], waitlist);
		assert!(!pool.has_tx(&tx1.hash()));
		assert!(pool.has_tx(&tx2.hash()));

		let (selected_again, _) = pool.pick_txs(100);
		assert_eq!(selected_again.len(), 1);
		assert_eq!(selected_again[0].hash(), tx2.hash());
	}
}
