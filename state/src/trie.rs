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

//! The trie interface the state store persists account state through.
//! Persistence, pruning and proof generation all live on the other side of
//! this trait; the state factory only ever sees byte keys and byte values.

use std::collections::BTreeMap;

use chain_core::hash::blake2b_hash;
use chain_core::Hash;

use crate::error::Error;

/// A key/value trie keyed by opaque byte strings, exposing a deterministic
/// root hash over its contents.
pub trait Trie: Send + Sync {
	/// Looks up `key`, returning `None` if absent.
	fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

	/// Inserts or overwrites `key`.
	fn upsert(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error>;

	/// Removes `key`, if present.
	fn delete(&mut self, key: &[u8]) -> Result<(), Error>;

	/// The trie's current root hash.
	fn root_hash(&self) -> Hash;
}

/// An in-memory `Trie` over a sorted map. The root hash is a digest over
/// every key/value pair in sorted key order, so it is deterministic and
/// independent of insertion order (P3).
#[derive(Default)]
pub struct MemTrie {
	entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemTrie {
	/// Builds an empty trie.
	pub fn new() -> MemTrie {
		MemTrie::default()
	}
}

impl Trie for MemTrie {
	fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
		Ok(self.entries.get(key).cloned())
	}

	fn upsert(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error> {
		self.entries.insert(key.to_vec(), value.to_vec());
		Ok(())
	}

	fn delete(&mut self, key: &[u8]) -> Result<(), Error> {
		self.entries.remove(key);
		Ok(())
	}

	fn root_hash(&self) -> Hash {
		let mut buf = Vec::new();
		for (k, v) in &self.entries {
			buf.extend_from_slice(&(k.len() as u64).to_le_bytes());
			buf.extend_from_slice(k);
			buf.extend_from_slice(&(v.len() as u64).to_le_bytes());
			buf.extend_from_slice(v);
		}
		blake2b_hash(&buf)
	}
}
