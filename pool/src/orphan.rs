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

//! The orphan table: transactions quarantined because one or more parents
//! are unknown to the node, indexed so that parent arrival or a double
//! spend can find and evict the right entries without a full scan.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use chain_core::{Hash, SourcePointer};

use crate::types::{OrphanTx, PoolConfig, Tag};

/// Quarantine for transactions whose parents are not yet known.
pub struct OrphanTable {
	orphans: HashMap<Hash, OrphanTx>,
	/// Reverse index: a parent's SourcePointer to the orphans that spend it.
	by_source: HashMap<SourcePointer, HashSet<Hash>>,
	/// Optional tag index, maintained only when `enable_tag_index` is set.
	by_tag: Option<HashMap<Tag, HashSet<Hash>>>,
	next_expiration_scan_time: i64,
}

impl OrphanTable {
	/// Builds an empty orphan table.
	pub fn new(config: &PoolConfig, now: i64) -> OrphanTable {
		OrphanTable {
			orphans: HashMap::new(),
			by_source: HashMap::new(),
			by_tag: if config.enable_tag_index { Some(HashMap::new()) } else { None },
			next_expiration_scan_time: now + config.orphan_tx_expire_scan_interval_secs,
		}
	}

	/// Current number of quarantined orphans.
	pub fn len(&self) -> usize {
		self.orphans.len()
	}

	/// Whether the table holds no orphans.
	pub fn is_empty(&self) -> bool {
		self.orphans.is_empty()
	}

	/// Whether `hash` is currently quarantined.
	pub fn contains(&self, hash: &Hash) -> bool {
		self.orphans.contains_key(hash)
	}

	/// Borrows the orphan entry for `hash`, if present.
	pub fn get(&self, hash: &Hash) -> Option<&OrphanTx> {
		self.orphans.get(hash)
	}

	/// Orphans whose inputs reference the given SourcePointer.
	pub fn depending_on(&self, ptr: &SourcePointer) -> Vec<Hash> {
		self.by_source.get(ptr).map(|set| set.iter().copied().collect()).unwrap_or_default()
	}

	/// Inserts `orphan`, evicting the oldest entry first if the table is at
	/// `config.max_orphan_tx_num` capacity. Rejects orphans whose serialized
	/// size exceeds `config.max_orphan_tx_size`.
	///
	/// Returns the hash of any entry evicted to make room.
	pub fn maybe_add(&mut self, orphan: OrphanTx, config: &PoolConfig) -> Result<Option<Hash>, crate::error::Error> {
		if orphan.tx.total_size() > config.max_orphan_tx_size {
			return Err(crate::error::ErrorKind::OrphanTooLarge.into());
		}

		let mut evicted = None;
		if self.orphans.len() >= config.max_orphan_tx_num {
			if let Some(oldest) = self.oldest_hash() {
				self.remove(&oldest);
				evicted = Some(oldest);
			}
		}

		debug!("orphan add: {} (tag={:?})", orphan.hash, orphan.tag);
		if let Some(hash) = evicted {
			debug!("orphan evicted on full table: {}", hash);
		}
		self.index(&orphan);
		self.orphans.insert(orphan.hash, orphan);
		Ok(evicted)
	}

	fn oldest_hash(&self) -> Option<Hash> {
		self.orphans.values().min_by_key(|o| o.expiration_time).map(|o| o.hash)
	}

	fn index(&mut self, orphan: &OrphanTx) {
		for input in &orphan.tx.inputs {
			self.by_source.entry(input.previous_output).or_default().insert(orphan.hash);
		}
		if let (Some(tag), Some(by_tag)) = (orphan.tag, self.by_tag.as_mut()) {
			by_tag.entry(tag).or_default().insert(orphan.hash);
		}
	}

	fn deindex(&mut self, orphan: &OrphanTx) {
		for input in &orphan.tx.inputs {
			if let Some(set) = self.by_source.get_mut(&input.previous_output) {
				set.remove(&orphan.hash);
				if set.is_empty() {
					self.by_source.remove(&input.previous_output);
				}
			}
		}
		if let (Some(tag), Some(by_tag)) = (orphan.tag, self.by_tag.as_mut()) {
			if let Some(set) = by_tag.get_mut(&tag) {
				set.remove(&orphan.hash);
				if set.is_empty() {
					by_tag.remove(&tag);
				}
			}
		}
	}

	/// Removes a single orphan, without following dependents. Returns the
	/// removed entry, if it was present.
	pub fn remove(&mut self, hash: &Hash) -> Option<OrphanTx> {
		let orphan = self.orphans.remove(hash)?;
		debug!("orphan removed: {}", hash);
		self.deindex(&orphan);
		Some(orphan)
	}

	/// Removes `hash` and, transitively, every orphan that spends one of
	/// its outputs. Uses an explicit BFS queue to bound stack depth on deep
	/// dependency chains.
	pub fn remove_recursive(&mut self, hash: Hash) -> Vec<Hash> {
		let mut removed = Vec::new();
		let mut queue = VecDeque::new();
		queue.push_back(hash);

		while let Some(h) = queue.pop_front() {
			let orphan = match self.remove(&h) {
				Some(o) => o,
				None => continue,
			};
			for out_index in 0..orphan.tx.outputs.len() as u32 {
				let ptr = SourcePointer::new(h, out_index);
				for dependent in self.depending_on(&ptr) {
					queue.push_back(dependent);
				}
			}
			removed.push(h);
		}
		removed
	}

	/// Removes every orphan whose input conflicts with an input of `tx`,
	/// following dependents transitively.
	pub fn remove_double_spends(&mut self, tx: &chain_core::Transaction) -> Vec<Hash> {
		let mut removed = Vec::new();
		for input in &tx.inputs {
			for dependent in self.depending_on(&input.previous_output) {
				removed.extend(self.remove_recursive(dependent));
			}
		}
		removed
	}

	/// Removes every orphan carrying `tag`.
	pub fn remove_by_tag(&mut self, tag: Tag) -> Vec<Hash> {
		let hashes: Vec<Hash> = self
			.by_tag
			.as_ref()
			.and_then(|by_tag| by_tag.get(&tag))
			.map(|set| set.iter().copied().collect())
			.unwrap_or_default();
		let mut removed = Vec::new();
		for h in hashes {
			if self.remove(&h).is_some() {
				removed.push(h);
			}
		}
		removed
	}

	/// If `now` has passed the next scheduled sweep time, removes every
	/// expired orphan and reschedules the next sweep. A no-op (cheap) call
	/// otherwise, matching the lazy, on-add scan discipline.
	pub fn sweep_expired(&mut self, now: i64, config: &PoolConfig) -> Vec<Hash> {
		if now < self.next_expiration_scan_time {
			return Vec::new();
		}
		let expired: Vec<Hash> = self.orphans.values().filter(|o| o.expiration_time <= now).map(|o| o.hash).collect();
		let mut removed = Vec::new();
		for h in expired {
			if self.remove(&h).is_some() {
				removed.push(h);
			}
		}
		self.next_expiration_scan_time = now + config.orphan_tx_expire_scan_interval_secs;
		if !removed.is_empty() {
			debug!("orphan expiry sweep removed {} entries", removed.len());
		}
		removed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chain_core::{Hashed, Transaction, TxInput, TxOutput};

	fn orphan_for(tx: Transaction, expires_at: i64) -> OrphanTx {
		let hash = tx.hash();
		OrphanTx {
			tag: None,
			tx,
			hash,
			expiration_time: expires_at,
		}
	}

	#[test]
	fn parent_arrival_finds_dependent_orphan() {
		let config = PoolConfig::default();
		let mut table = OrphanTable::new(&config, 0);

		let parent_hash = Hash::from_slice(&[3u8; 32]);
		let child = Transaction::new(
			vec![TxInput::new(SourcePointer::new(parent_hash, 0))],
			vec![TxOutput::new(1, vec![])],
			0,
		);
		let child_hash = child.hash();
		table.maybe_add(orphan_for(child, 1_000), &config).unwrap();

		let deps = table.depending_on(&SourcePointer::new(parent_hash, 0));
		assert_eq!(deps, vec![child_hash]);
	}

	#[test]
	fn recursive_removal_follows_chain() {
		let config = PoolConfig::default();
		let mut table = OrphanTable::new(&config, 0);

		let a = Transaction::new(vec![], vec![TxOutput::new(1, vec![])], 0);
		let a_hash = a.hash();
		table.maybe_add(orphan_for(a, 1_000), &config).unwrap();

		let b = Transaction::new(vec![TxInput::new(SourcePointer::new(a_hash, 0))], vec![TxOutput::new(1, vec![])], 0);
		let b_hash = b.hash();
		table.maybe_add(orphan_for(b, 1_000), &config).unwrap();

		let removed = table.remove_recursive(a_hash);
		assert_eq!(removed.len(), 2);
		assert!(removed.contains(&a_hash));
		assert!(removed.contains(&b_hash));
		assert!(table.is_empty());
	}

	#[test]
	fn eviction_picks_oldest_when_full() {
		let mut config = PoolConfig::default();
		config.max_orphan_tx_num = 1;
		let mut table = OrphanTable::new(&config, 0);

		let old = Transaction::new(vec![], vec![TxOutput::new(1, vec![])], 0);
		let old_hash = old.hash();
		table.maybe_add(orphan_for(old, 10), &config).unwrap();

		let newer = Transaction::new(vec![], vec![TxOutput::new(2, vec![])], 1);
		let newer_hash = newer.hash();
		let evicted = table.maybe_add(orphan_for(newer, 20), &config).unwrap();

		assert_eq!(evicted, Some(old_hash));
		assert!(table.contains(&newer_hash));
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn expiry_sweep_removes_past_entries() {
		let config = PoolConfig::default();
		let mut table = OrphanTable::new(&config, 0);
		let tx = Transaction::new(vec![], vec![TxOutput::new(1, vec![])], 0);
		let hash = tx.hash();
		table.maybe_add(orphan_for(tx, 5), &config).unwrap();

		let removed = table.sweep_expired(config.orphan_tx_expire_scan_interval_secs + 10, &config);
		assert_eq!(removed, vec![hash]);
		assert!(table.is_empty());
	}
}
