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

//! The transaction model: UTXO inputs/outputs, and the two account-based
//! mutation kinds (transfers and votes) consumed directly by the state
//! factory rather than by UTXO consumption.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::hash::{Hash, Hashed};
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// A pointer to a specific output of a specific transaction: `(tx_hash,
/// out_index)`. Used both as a `TxInput`'s reference and as the key space
/// of the mempool's double-spend index.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct SourcePointer {
	/// Hash of the transaction that created the referenced output.
	pub tx_hash: Hash,
	/// Index of the output within that transaction.
	pub out_index: u32,
}

impl SourcePointer {
	/// Builds a new source pointer.
	pub fn new(tx_hash: Hash, out_index: u32) -> SourcePointer {
		SourcePointer { tx_hash, out_index }
	}
}

impl Writeable for SourcePointer {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_fixed_bytes(self.tx_hash.to_slice())?;
		writer.write_u32(self.out_index)
	}
}

impl Readable for SourcePointer {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, ser::Error> {
		let tx_hash = Hash::from_slice(&reader.read_fixed_bytes(32)?);
		let out_index = reader.read_u32()?;
		Ok(SourcePointer { tx_hash, out_index })
	}
}

/// A reference to a prior output consumed by a transaction.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TxInput {
	/// The output being spent.
	pub previous_output: SourcePointer,
}

impl TxInput {
	/// Builds a new input spending the given output.
	pub fn new(previous_output: SourcePointer) -> TxInput {
		TxInput { previous_output }
	}
}

impl Writeable for TxInput {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.previous_output.write(writer)
	}
}

impl Readable for TxInput {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, ser::Error> {
		Ok(TxInput {
			previous_output: SourcePointer::read(reader)?,
		})
	}
}

/// A newly created output: a value plus an opaque lock script the consensus
/// layer is responsible for interpreting.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TxOutput {
	/// Output value, always non-negative.
	pub value: u64,
	/// Opaque lock script bytes.
	pub lock_script: Vec<u8>,
}

impl TxOutput {
	/// Builds a new output.
	pub fn new(value: u64, lock_script: Vec<u8>) -> TxOutput {
		TxOutput { value, lock_script }
	}
}

impl Writeable for TxOutput {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u64(self.value)?;
		writer.write_bytes(&self.lock_script)
	}
}

impl Readable for TxOutput {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, ser::Error> {
		let value = reader.read_u64()?;
		let lock_script = reader.read_bytes()?;
		Ok(TxOutput { value, lock_script })
	}
}

/// A UTXO-consuming transaction: ordered inputs, ordered outputs, a
/// `lock_time` below which it may not be included, and a coinbase flag.
///
/// `coinbase` transactions mint new value and never arrive through the
/// mempool; they are rejected on admission (see the pool crate).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Transaction {
	/// Inputs, in canonical order.
	pub inputs: Vec<TxInput>,
	/// Outputs, in canonical order.
	pub outputs: Vec<TxOutput>,
	/// Earliest unix time (or block height, chain-defined) at which this
	/// transaction may be included.
	pub lock_time: u64,
	/// True for block-reward transactions; never valid in the mempool.
	pub coinbase: bool,
}

impl Transaction {
	/// Builds a new non-coinbase transaction.
	pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, lock_time: u64) -> Transaction {
		Transaction {
			inputs,
			outputs,
			lock_time,
			coinbase: false,
		}
	}

	/// Total serialized size of this transaction, in bytes. Drives the fee
	/// rate computation and block-assembly size accounting.
	pub fn total_size(&self) -> usize {
		ser::ser_vec(self)
			.map(|b| b.len())
			.unwrap_or(0)
	}

	/// Sum of all output values.
	pub fn total_out_value(&self) -> u64 {
		self.outputs.iter().map(|o| o.value).sum()
	}
}

impl Writeable for Transaction {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u64(self.inputs.len() as u64)?;
		for input in &self.inputs {
			input.write(writer)?;
		}
		writer.write_u64(self.outputs.len() as u64)?;
		for output in &self.outputs {
			output.write(writer)?;
		}
		writer.write_u64(self.lock_time)?;
		writer.write_u8(if self.coinbase { 1 } else { 0 })
	}
}

impl Readable for Transaction {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, ser::Error> {
		let in_len = reader.read_u64()?;
		let mut inputs = Vec::with_capacity(in_len as usize);
		for _ in 0..in_len {
			inputs.push(TxInput::read(reader)?);
		}
		let out_len = reader.read_u64()?;
		let mut outputs = Vec::with_capacity(out_len as usize);
		for _ in 0..out_len {
			outputs.push(TxOutput::read(reader)?);
		}
		let lock_time = reader.read_u64()?;
		let coinbase = reader.read_u8()? != 0;
		Ok(Transaction {
			inputs,
			outputs,
			lock_time,
			coinbase,
		})
	}
}

impl Hashed for Transaction {
	fn hash_bytes(&self) -> Vec<u8> {
		ser::ser_vec(self).expect("transaction serialization is infallible for in-memory buffers")
	}
}

/// A direct balance mutation: debits `sender`, credits `recipient`. Applied
/// by the state factory rather than through UTXO consumption.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Transfer {
	/// Sending account.
	pub sender: Address,
	/// Receiving account.
	pub recipient: Address,
	/// Sender's account nonce this transfer is expected to consume.
	pub nonce: u64,
	/// Amount moved from sender to recipient.
	pub amount: u64,
}

impl Transfer {
	/// Builds a new transfer.
	pub fn new(sender: Address, recipient: Address, nonce: u64, amount: u64) -> Transfer {
		Transfer {
			sender,
			recipient,
			nonce,
			amount,
		}
	}
}

/// A candidacy declaration or vote cast by `voter`.
///
/// `votee == voter` declares candidacy (a self-vote). `votee == None`
/// withdraws whatever vote `voter` previously cast (including a
/// self-vote, which drops candidacy).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Vote {
	/// Voter's account nonce this vote is expected to consume.
	pub nonce: u64,
	/// Address of the voting account.
	pub voter: Address,
	/// Address being voted for, or `None` to withdraw.
	pub votee: Option<Address>,
}

impl Vote {
	/// Builds a new vote.
	pub fn new(nonce: u64, voter: Address, votee: Option<Address>) -> Vote {
		Vote { nonce, voter, votee }
	}

	/// Whether this vote is a self-vote (candidacy declaration).
	pub fn is_self_vote(&self) -> bool {
		self.votee == Some(self.voter)
	}

	/// Whether this vote withdraws a prior vote.
	pub fn is_withdrawal(&self) -> bool {
		self.votee.is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_tx() -> Transaction {
		let parent = Hash::from_slice(&[7u8; 32]);
		Transaction::new(
			vec![TxInput::new(SourcePointer::new(parent, 0))],
			vec![TxOutput::new(100, vec![1, 2, 3])],
			0,
		)
	}

	#[test]
	fn serialize_round_trips() {
		let tx = sample_tx();
		let bytes = ser::ser_vec(&tx).unwrap();
		let mut cursor = &bytes[..];
		let back: Transaction = ser::deserialize(&mut cursor).unwrap();
		assert_eq!(tx, back);
	}

	#[test]
	fn hash_is_stable_for_identical_transactions() {
		let a = sample_tx();
		let b = sample_tx();
		assert_eq!(a.hash(), b.hash());
	}

	#[test]
	fn hash_differs_on_output_change() {
		let a = sample_tx();
		let mut b = sample_tx();
		b.outputs[0].value = 101;
		assert_ne!(a.hash(), b.hash());
	}

	#[test]
	fn total_size_is_observable() {
		let tx = sample_tx();
		assert!(tx.total_size() > 0);
	}

	#[test]
	fn self_vote_detection() {
		let addr = Address::from_public_key(b"candidate");
		let v = Vote::new(1, addr, Some(addr));
		assert!(v.is_self_vote());
		assert!(!v.is_withdrawal());
	}

	#[test]
	fn withdrawal_detection() {
		let addr = Address::from_public_key(b"voter");
		let v = Vote::new(1, addr, None);
		assert!(v.is_withdrawal());
		assert!(!v.is_self_vote());
	}
}
