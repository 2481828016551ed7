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

//! Fixed-width content hash used pervasively to identify transactions,
//! outputs and account state entries.

use std::fmt;

use blake2_rfc::blake2b::blake2b;
use serde::{Deserialize, Serialize};

/// A 32-byte opaque digest with value equality, used to uniquely identify
/// transactions and the outputs they create.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

/// The zero hash, used as a sentinel for "no parent" or "not yet known".
pub const ZERO_HASH: Hash = Hash([0; 32]);

impl Hash {
	/// Builds a Hash from a 32-byte array.
	pub fn new(bytes: [u8; 32]) -> Hash {
		Hash(bytes)
	}

	/// Builds a Hash from a slice, panicking if the slice isn't 32 bytes long.
	/// Only used for data we produced ourselves (e.g. a prior `to_slice`).
	pub fn from_slice(data: &[u8]) -> Hash {
		let mut out = [0u8; 32];
		out.copy_from_slice(data);
		Hash(out)
	}

	/// Byte slice view of the hash.
	pub fn to_slice(&self) -> &[u8] {
		&self.0
	}

	/// Whether this is the zero (sentinel) hash.
	pub fn is_zero(&self) -> bool {
		self.0 == [0u8; 32]
	}
}

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self)
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for b in self.0.iter() {
			write!(f, "{:02x}", b)?;
		}
		Ok(())
	}
}

/// Types that derive their identity from a digest of their canonical
/// serialization.
pub trait Hashed {
	/// Canonical bytes this type hashes over.
	fn hash_bytes(&self) -> Vec<u8>;

	/// Digest of `hash_bytes`, using the protocol's hash function.
	fn hash(&self) -> Hash {
		blake2b_hash(&self.hash_bytes())
	}
}

/// Digests `data` with the chain's hash function (blake2b, 32-byte output).
pub fn blake2b_hash(data: &[u8]) -> Hash {
	let digest = blake2b(32, &[], data);
	Hash::from_slice(digest.as_bytes())
}
