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

//! The transaction-admission and candidate-ranking core's mempool half:
//! UTXO resolution, orphan quarantine, double-spend handling and
//! priority-ordered block-payload selection.
//!
//! Consensus, persistence and networking are all out of scope; this crate
//! only consults the `ChainView` trait for the facts it needs (tip height,
//! confirmed UTXO set) and never reaches further than that.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

extern crate failure;
#[macro_use]
extern crate failure_derive;

pub mod chain_view;
pub mod error;
pub mod orphan;
pub mod pool;
pub mod types;
pub mod utxo_view;

pub use crate::chain_view::{ChainView, UtxoEntry};
pub use crate::error::{Error, ErrorKind};
pub use crate::orphan::OrphanTable;
pub use crate::pool::{Admission, Mempool};
pub use crate::types::{OrphanTx, PoolConfig, Tag, TxDesc};
pub use crate::utxo_view::UtxoView;
