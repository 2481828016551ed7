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

//! Account state and candidate ranking for the chain.
//!
//! A `StateFactory` owns a trie-backed `StateStore` and a `CandidateRanker`,
//! and is the only thing allowed to apply transfers and votes: `commit`
//! stages every mutation in an overlay, flushes it to the trie only once the
//! whole batch preflights clean, and only then updates the ranker.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

extern crate failure;
#[macro_use]
extern crate failure_derive;

pub mod account;
pub mod candidate;
pub mod error;
pub mod factory;
pub mod store;
pub mod trie;

pub use crate::account::AccountState;
pub use crate::candidate::{Candidate, CandidateRanker};
pub use crate::error::{Error, ErrorKind, TransferFault, VoteFault};
pub use crate::factory::{StateFactory, DEFAULT_CANDIDATE_BUFFER_SIZE, DEFAULT_CANDIDATE_SIZE};
pub use crate::store::StateStore;
pub use crate::trie::{MemTrie, Trie};
