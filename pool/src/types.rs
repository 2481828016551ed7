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

//! Pool-internal bookkeeping types: the descriptor wrapping an accepted
//! transaction, a quarantined orphan, and the pool's tunables.

use chain_core::{Hash, Transaction};

/// A tag used to group orphans for bulk purge (e.g. all orphans received
/// from a disconnecting peer). Opaque to the pool itself.
pub type Tag = u64;

/// Bookkeeping wrapped around an accepted pool transaction.
///
/// `heap_index` mirrors the Go source's index field on the priority-queue
/// element; it is maintained by `IndexedHeap` and otherwise left alone.
#[derive(Clone, Debug)]
pub struct TxDesc {
	/// The accepted transaction.
	pub tx: Transaction,
	/// Hash of `tx`, cached to avoid re-serializing on every heap operation.
	pub hash: Hash,
	/// Wall-clock time of admission, as a unix timestamp.
	pub added_time: i64,
	/// Chain tip height at the time of admission.
	pub block_height: u64,
	/// Total fee paid by `tx` (sum of inputs minus sum of outputs).
	pub fee: u64,
	/// Fee rate, scaled per kilobyte: `fee * 1000 / size`.
	pub fee_per_kb: u64,
	/// Current block-assembly priority; recomputed by `pick_txs`.
	pub priority: f64,
}

impl TxDesc {
	/// Builds a new descriptor for a just-admitted transaction.
	pub fn new(tx: Transaction, hash: Hash, added_time: i64, block_height: u64, fee: u64) -> TxDesc {
		let size = tx.total_size().max(1) as u64;
		TxDesc {
			tx,
			hash,
			added_time,
			block_height,
			fee,
			fee_per_kb: fee * 1000 / size,
			priority: 0.0,
		}
	}
}

/// A transaction quarantined because one or more of its parents are not
/// yet known.
#[derive(Clone, Debug)]
pub struct OrphanTx {
	/// Optional grouping tag (e.g. originating peer); used for bulk purge.
	pub tag: Option<Tag>,
	/// The quarantined transaction.
	pub tx: Transaction,
	/// Hash of `tx`.
	pub hash: Hash,
	/// Unix time after which this entry is eligible for expiry.
	pub expiration_time: i64,
}

/// Tunables recognized by the mempool. Defaults mirror the values the
/// mempool was validated against.
#[derive(Clone, Debug)]
pub struct PoolConfig {
	/// Capacity of the orphan table.
	pub max_orphan_tx_num: usize,
	/// Maximum serialized size, in bytes, of a single orphan entry.
	pub max_orphan_tx_size: usize,
	/// Seconds an orphan may sit in quarantine before expiring.
	pub orphan_tx_ttl_secs: i64,
	/// Seconds between lazy expiry sweeps.
	pub orphan_tx_expire_scan_interval_secs: i64,
	/// Transaction size, in bytes, above which the fee-rate floor applies.
	pub default_block_priority_size: usize,
	/// Maximum cumulative size of a block's selected transactions.
	pub default_block_max_size: usize,
	/// Maximum transaction count in a single block selection.
	pub default_tx_max_num_in_block: usize,
	/// Whether the orphan tag index is maintained.
	pub enable_tag_index: bool,
}

impl Default for PoolConfig {
	fn default() -> PoolConfig {
		PoolConfig {
			max_orphan_tx_num: 10_000,
			max_orphan_tx_size: 8_192,
			orphan_tx_ttl_secs: 30 * 60,
			orphan_tx_expire_scan_interval_secs: 5 * 60,
			default_block_priority_size: 12_345,
			default_block_max_size: 23_456,
			default_tx_max_num_in_block: 350,
			enable_tag_index: false,
		}
	}
}

/// Returns the minimum fee (in base units) required to admit a transaction
/// of the given serialized size under the current fee-market rules.
///
/// The upstream implementation this pool is modeled on always returns 0
/// here; the fee-too-low guard at admission is therefore structural today
/// rather than active, per the open question on fee-market policy.
pub fn calculate_min_fee(_size: usize) -> u64 {
	0
}
