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

//! Account addresses.
//!
//! An address is the 20 low-order bytes of the blake2b digest of an
//! account's public key, printed as a lowercase hex string. It carries no
//! network prefix or checksum; that belongs to a wire-facing layer outside
//! this crate.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::blake2b_hash;

const ADDRESS_LEN: usize = 20;

/// An account identifier derived from a public key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
	/// Derives the address for a given public key's byte encoding.
	pub fn from_public_key(pubkey_bytes: &[u8]) -> Address {
		let digest = blake2b_hash(pubkey_bytes);
		let mut out = [0u8; ADDRESS_LEN];
		out.copy_from_slice(&digest.to_slice()[..ADDRESS_LEN]);
		Address(out)
	}

	/// Wraps a raw 20-byte address, e.g. one read off the wire.
	pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Address {
		Address(bytes)
	}

	/// Byte slice view of the address.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

// Deterministic tie-breaking between candidates with equal vote totals
// compares addresses by their raw byte order.
impl PartialOrd for Address {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Address {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.cmp(&other.0)
	}
}

impl fmt::Debug for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self)
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for b in self.0.iter() {
			write!(f, "{:02x}", b)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_pubkey_same_address() {
		let a = Address::from_public_key(b"alice-pubkey");
		let b = Address::from_public_key(b"alice-pubkey");
		assert_eq!(a, b);
	}

	#[test]
	fn different_pubkey_different_address() {
		let a = Address::from_public_key(b"alice-pubkey");
		let b = Address::from_public_key(b"bob-pubkey");
		assert_ne!(a, b);
	}

	#[test]
	fn ordering_is_byte_order() {
		let a = Address::from_bytes([0x01; ADDRESS_LEN]);
		let b = Address::from_bytes([0x02; ADDRESS_LEN]);
		assert!(a < b);
	}
}
