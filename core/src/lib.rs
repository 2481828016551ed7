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

//! Hash, address and transaction primitives for the chain core.
//!
//! This crate has no notion of consensus, networking or persistence; it only
//! defines the wire-stable building blocks that the mempool and state
//! factory crates build on top of.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

extern crate failure;
#[macro_use]
extern crate failure_derive;

pub mod address;
pub mod error;
pub mod hash;
pub mod ser;
pub mod transaction;

pub use crate::address::Address;
pub use crate::error::{Error, ErrorKind};
pub use crate::hash::{Hash, Hashed};
pub use crate::transaction::{SourcePointer, Transaction, Transfer, TxInput, TxOutput, Vote};
