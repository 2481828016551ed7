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

//! Per-address account state: balance, nonce and voting status.

use chain_core::ser::{self, Readable, Reader, Writeable, Writer};
use chain_core::Address;

/// The state the trie stores for a single address.
///
/// `votee == Some(self.address)` is a self-vote (candidacy declaration);
/// `votee == None` means the account currently votes for no one.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AccountState {
	/// The account this state belongs to.
	pub address: Address,
	/// Strictly increasing per successful transfer sent from this account.
	pub nonce: u64,
	/// Current balance; never allowed to go negative.
	pub balance: u64,
	/// Address this account currently votes for, if any.
	pub votee: Option<Address>,
	/// Whether `votee == Some(address)` (kept redundantly for fast checks).
	pub self_vote: bool,
	/// Whether this account has ever self-voted and not since withdrawn.
	pub is_candidate: bool,
}

impl AccountState {
	/// Builds a fresh, zero-valued state for `address`.
	pub fn new(address: Address, balance: u64) -> AccountState {
		AccountState {
			address,
			nonce: 0,
			balance,
			votee: None,
			self_vote: false,
			is_candidate: false,
		}
	}

	/// Builds the zero-valued state reported for an address with no trie entry.
	pub fn zero(address: Address) -> AccountState {
		AccountState::new(address, 0)
	}

	/// Whether this state is indistinguishable from a fresh, never-created account.
	pub fn is_zero(&self) -> bool {
		self.nonce == 0 && self.balance == 0 && self.votee.is_none() && !self.is_candidate
	}
}

impl Writeable for AccountState {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_fixed_bytes(self.address.as_bytes())?;
		writer.write_u64(self.nonce)?;
		writer.write_u64(self.balance)?;
		match self.votee {
			Some(addr) => {
				writer.write_u8(1)?;
				writer.write_fixed_bytes(addr.as_bytes())?;
			}
			None => writer.write_u8(0)?,
		}
		writer.write_u8(if self.self_vote { 1 } else { 0 })?;
		writer.write_u8(if self.is_candidate { 1 } else { 0 })
	}
}

impl Readable for AccountState {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, ser::Error> {
		let address = Address::from_bytes(array20(&reader.read_fixed_bytes(20)?));
		let nonce = reader.read_u64()?;
		let balance = reader.read_u64()?;
		let votee = match reader.read_u8()? {
			0 => None,
			1 => Some(Address::from_bytes(array20(&reader.read_fixed_bytes(20)?))),
			_ => return Err(ser::Error::CorruptedData),
		};
		let self_vote = reader.read_u8()? != 0;
		let is_candidate = reader.read_u8()? != 0;
		Ok(AccountState {
			address,
			nonce,
			balance,
			votee,
			self_vote,
			is_candidate,
		})
	}
}

fn array20(data: &[u8]) -> [u8; 20] {
	let mut out = [0u8; 20];
	out.copy_from_slice(data);
	out
}

/// Serializes `state` to its canonical wire form.
pub fn state_to_bytes(state: &AccountState) -> Result<Vec<u8>, ser::Error> {
	ser::ser_vec(state)
}

/// Deserializes `bytes` produced by `state_to_bytes`, failing with
/// `FailedToUnmarshalState`-worthy corruption errors on malformed input.
pub fn bytes_to_state(bytes: &[u8]) -> Result<AccountState, ser::Error> {
	let mut cursor = bytes;
	ser::deserialize(&mut cursor)
}
