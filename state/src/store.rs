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

//! Account state persisted through a `Trie`, keyed by address.

use chain_core::{Address, Hash};

use crate::account::{bytes_to_state, state_to_bytes, AccountState};
use crate::error::{Error, ErrorKind};
use crate::trie::Trie;

/// Wraps a `Trie` with typed account-state access.
pub struct StateStore<T: Trie> {
	trie: T,
}

impl<T: Trie> StateStore<T> {
	/// Builds a store over `trie`.
	pub fn new(trie: T) -> StateStore<T> {
		StateStore { trie }
	}

	fn key(addr: &Address) -> Vec<u8> {
		addr.as_bytes().to_vec()
	}

	/// Looks up `addr`'s state, returning `None` if it was never created.
	/// Distinguishes "never created" from the zero-valued state so the
	/// state factory can reject transfers from unknown senders.
	pub fn try_get(&self, addr: &Address) -> Result<Option<AccountState>, Error> {
		let raw = self.trie.get(&Self::key(addr)).map_err(|e| {
			log::error!("trie read failed for {}: {}", addr, e);
			e
		})?;
		match raw {
			None => Ok(None),
			Some(bytes) => bytes_to_state(&bytes).map(Some).map_err(|_| ErrorKind::FailedToUnmarshalState.into()),
		}
	}

	/// Looks up `addr`'s state, reporting the zero-valued state for an
	/// address with no trie entry rather than an error.
	pub fn get_or_default(&self, addr: Address) -> Result<AccountState, Error> {
		Ok(self.try_get(&addr)?.unwrap_or_else(|| AccountState::zero(addr)))
	}

	/// Persists `state` under its own address.
	pub fn put(&mut self, state: &AccountState) -> Result<(), Error> {
		let bytes = state_to_bytes(state).map_err(|_| ErrorKind::FailedToUnmarshalState)?;
		self.trie.upsert(&Self::key(&state.address), &bytes).map_err(|e| {
			log::error!("trie write failed for {}: {}", state.address, e);
			e
		})
	}

	/// Installs a fresh state for `addr` with `init_balance`. Fails if a
	/// non-zero state already exists for this address.
	pub fn create_state(&mut self, addr: Address, init_balance: u64) -> Result<AccountState, Error> {
		if let Some(existing) = self.try_get(&addr)? {
			if !existing.is_zero() {
				return Err(ErrorKind::StateAlreadyExists.into());
			}
		}
		let state = AccountState::new(addr, init_balance);
		self.put(&state)?;
		Ok(state)
	}

	/// The account's current nonce (0 for a never-created account).
	pub fn nonce(&self, addr: &Address) -> Result<u64, Error> {
		Ok(self.get_or_default(*addr)?.nonce)
	}

	/// Sets the account's nonce.
	pub fn set_nonce(&mut self, addr: Address, nonce: u64) -> Result<(), Error> {
		let mut state = self.get_or_default(addr)?;
		state.nonce = nonce;
		self.put(&state)
	}

	/// The account's current balance (0 for a never-created account).
	pub fn balance(&self, addr: &Address) -> Result<u64, Error> {
		Ok(self.get_or_default(*addr)?.balance)
	}

	/// Credits `addr`'s balance by `delta`, creating the account if absent.
	pub fn add_balance(&mut self, addr: Address, delta: u64) -> Result<(), Error> {
		let mut state = self.get_or_default(addr)?;
		state.balance += delta;
		self.put(&state)
	}

	/// Debits `addr`'s balance by `delta`. Fails if `delta` exceeds the
	/// current balance.
	pub fn sub_balance(&mut self, addr: Address, delta: u64) -> Result<(), Error> {
		let mut state = self.get_or_default(addr)?;
		state.balance = state
			.balance
			.checked_sub(delta)
			.ok_or_else(|| Error::from(ErrorKind::InvalidTransfer(crate::error::TransferFault::InsufficientBalance)))?;
		self.put(&state)
	}

	/// The trie's current committed root hash.
	pub fn root_hash(&self) -> Hash {
		self.trie.root_hash()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::trie::MemTrie;

	fn addr(byte: u8) -> Address {
		Address::from_bytes([byte; 20])
	}

	#[test]
	fn read_miss_reports_zero_state_not_error() {
		let store = StateStore::new(MemTrie::new());
		let state = store.get_or_default(addr(1)).unwrap();
		assert!(state.is_zero());
	}

	#[test]
	fn create_state_then_try_get_finds_it() {
		let mut store = StateStore::new(MemTrie::new());
		store.create_state(addr(1), 100).unwrap();
		let state = store.try_get(&addr(1)).unwrap().unwrap();
		assert_eq!(state.balance, 100);
	}

	#[test]
	fn create_state_twice_fails() {
		let mut store = StateStore::new(MemTrie::new());
		store.create_state(addr(1), 100).unwrap();
		assert!(store.create_state(addr(1), 50).is_err());
	}

	#[test]
	fn sub_balance_rejects_overdraft() {
		let mut store = StateStore::new(MemTrie::new());
		store.create_state(addr(1), 10).unwrap();
		assert!(store.sub_balance(addr(1), 20).is_err());
		assert_eq!(store.balance(&addr(1)).unwrap(), 10);
	}

	#[test]
	fn root_hash_changes_after_mutation() {
		let mut store = StateStore::new(MemTrie::new());
		let before = store.root_hash();
		store.create_state(addr(1), 10).unwrap();
		assert_ne!(before, store.root_hash());
	}
}
