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

//! Snapshot-plus-overlay view of unspent outputs used to resolve a
//! transaction's parents at admission time.
//!
//! The base snapshot comes from the confirmed chain (`ChainView`); the
//! overlay layers in outputs created by transactions still sitting in the
//! mempool, so a child transaction spending its still-unconfirmed parent's
//! output can be admitted without waiting for a block.

use std::collections::HashMap;
use std::sync::Arc;

use chain_core::{Hash, Transaction, TxOutput};

use crate::chain_view::{ChainView, UtxoEntry};

/// Combines the confirmed chain's UTXO set with a local overlay of
/// in-mempool outputs.
pub struct UtxoView {
	chain: Arc<dyn ChainView>,
	overlay: HashMap<Hash, Vec<UtxoEntry>>,
}

impl UtxoView {
	/// Builds a view over `chain`'s confirmed set with an empty overlay.
	pub fn new(chain: Arc<dyn ChainView>) -> UtxoView {
		UtxoView {
			chain,
			overlay: HashMap::new(),
		}
	}

	/// Adds `tx`'s outputs to the overlay, making them resolvable as
	/// parents for other pool transactions. Called when `tx` is admitted.
	pub fn add_tx_outputs(&mut self, tx_hash: Hash, tx: &Transaction) {
		let entries = tx.outputs.iter().cloned().map(UtxoEntry::Output).collect();
		self.overlay.insert(tx_hash, entries);
	}

	/// Removes a transaction's outputs from the overlay, e.g. when it is
	/// evicted from the pool or superseded by confirmation.
	pub fn remove_tx_outputs(&mut self, tx_hash: &Hash) {
		self.overlay.remove(tx_hash);
	}

	fn lookup(&self, tx_hash: &Hash, out_index: u32) -> Option<&UtxoEntry> {
		self.overlay.get(tx_hash).and_then(|entries| entries.get(out_index as usize))
	}

	/// Pulls a fresh confirmed-set snapshot from the chain view, leaving
	/// any overlay entries added since the last refresh untouched unless
	/// the chain itself now has an entry for the same hash (confirmation
	/// wins over the overlay).
	pub fn refresh(&mut self) {
		for (hash, entries) in self.chain.utxo_pool() {
			self.overlay.insert(hash, entries);
		}
	}

	/// Resolves every input of `tx` against the current view. Returns the
	/// hashes of parents that are missing or fully spent, in input order,
	/// deduplicated. An empty result means all inputs are fulfilled.
	pub fn fetch_inputs(&self, tx: &Transaction) -> Vec<Hash> {
		let mut missing = Vec::new();
		for input in &tx.inputs {
			let ptr = &input.previous_output;
			let available = matches!(self.lookup(&ptr.tx_hash, ptr.out_index), Some(UtxoEntry::Output(_)));
			if !available && !missing.contains(&ptr.tx_hash) {
				missing.push(ptr.tx_hash);
			}
		}
		missing
	}

	/// Sum of the values of `tx`'s resolved inputs. Only meaningful once
	/// `fetch_inputs` returns empty.
	pub fn total_in_value(&self, tx: &Transaction) -> u64 {
		tx.inputs
			.iter()
			.filter_map(|input| {
				let ptr = &input.previous_output;
				match self.lookup(&ptr.tx_hash, ptr.out_index) {
					Some(UtxoEntry::Output(out)) => Some(out.value),
					_ => None,
				}
			})
			.sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain_view::test_util::MockChainView;
	use chain_core::{Hashed, SourcePointer, TxInput};

	fn tx_with_input(parent: Hash, index: u32) -> Transaction {
		Transaction::new(vec![TxInput::new(SourcePointer::new(parent, index))], vec![TxOutput::new(1, vec![])], 0)
	}

	#[test]
	fn resolves_parent_from_chain_snapshot() {
		let chain = Arc::new(MockChainView::new());
		let parent_hash = Hash::from_slice(&[1u8; 32]);
		chain.add_outputs(parent_hash, vec![TxOutput::new(50, vec![])]);

		let mut view = UtxoView::new(chain);
		view.refresh();

		let tx = tx_with_input(parent_hash, 0);
		assert!(view.fetch_inputs(&tx).is_empty());
		assert_eq!(view.total_in_value(&tx), 50);
	}

	#[test]
	fn resolves_parent_from_mempool_overlay() {
		let chain = Arc::new(MockChainView::new());
		let mut view = UtxoView::new(chain);

		let parent = Transaction::new(vec![], vec![TxOutput::new(30, vec![])], 0);
		let parent_hash = parent.hash();
		view.add_tx_outputs(parent_hash, &parent);

		let child = tx_with_input(parent_hash, 0);
		assert!(view.fetch_inputs(&child).is_empty());
	}

	#[test]
	fn unknown_parent_is_reported_missing() {
		let chain = Arc::new(MockChainView::new());
		let view = UtxoView::new(chain);
		let tx = tx_with_input(Hash::from_slice(&[9u8; 32]), 0);
		assert_eq!(view.fetch_inputs(&tx), vec![Hash::from_slice(&[9u8; 32])]);
	}

	#[test]
	fn spent_parent_is_reported_missing() {
		let chain = Arc::new(MockChainView::new());
		let parent_hash = Hash::from_slice(&[2u8; 32]);
		chain.add_outputs(parent_hash, vec![TxOutput::new(10, vec![])]);
		chain.mark_spent(parent_hash, 0);

		let mut view = UtxoView::new(chain);
		view.refresh();

		let tx = tx_with_input(parent_hash, 0);
		assert_eq!(view.fetch_inputs(&tx), vec![parent_hash]);
	}
}
