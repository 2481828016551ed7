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

//! Error types for the UTXO view and mempool.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

/// Error definition.
#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Mempool and UTXO-view error definitions.
///
/// Admission errors are local to a single transaction and never abort the
/// caller's batch; they only disqualify that transaction.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// The transaction (by hash) is already accepted in the pool.
	#[fail(display = "duplicate transaction")]
	DuplicateTx,
	/// A coinbase transaction was submitted through the mempool.
	#[fail(display = "coinbase transactions are not accepted into the mempool")]
	CoinbaseInMempool,
	/// An input conflicts with an already-accepted pool transaction.
	#[fail(display = "double spend")]
	DoubleSpend,
	/// The transaction's `lock_time` has not yet elapsed.
	#[fail(display = "transaction is time-locked")]
	Locked,
	/// Fee is below the computed minimum for the transaction's size.
	#[fail(display = "fee too low")]
	FeeTooLow,
	/// The transaction has missing parents but orphan admission was disallowed.
	#[fail(display = "orphan transactions are disallowed by the caller")]
	OrphanDisallowed,
	/// The transaction is too large to be quarantined as an orphan.
	#[fail(display = "orphan transaction exceeds the maximum orphan size")]
	OrphanTooLarge,
	/// A fatal, non-recoverable error surfaced unchanged from the trie/chain view.
	#[fail(display = "io error: {}", _0)]
	IoError(String),
}

impl Fail for Error {
	fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	/// Returns the error kind.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}
