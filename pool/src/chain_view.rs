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

//! The external collaborator the mempool consults for chain tip height and
//! the confirmed unspent-output set. Consensus, persistence and networking
//! all live on the other side of this trait.

use std::collections::HashMap;

use chain_core::{Hash, TxOutput};

use crate::error::Error;

/// An entry in the confirmed UTXO set: either still unspent, or known to
/// have been spent (retained so double-spend detection can distinguish
/// "never existed" from "already consumed").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UtxoEntry {
	/// The output is unspent and available.
	Output(TxOutput),
	/// The output existed but has already been spent.
	Spent,
}

/// Read-only view onto chain state the mempool depends on but does not own.
pub trait ChainView: Send + Sync {
	/// Height of the current chain tip.
	fn tip_height(&self) -> Result<u64, Error>;

	/// Snapshot of the confirmed unspent-output set, keyed by the hash of
	/// the transaction that created each output.
	fn utxo_pool(&self) -> HashMap<Hash, Vec<UtxoEntry>>;
}
