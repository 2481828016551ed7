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

//! Error types for the trie-backed state store and the state factory.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

/// Error definition.
#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Reasons a transfer fails preflight validation.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum TransferFault {
	/// The transfer would drive the sender's balance negative.
	#[fail(display = "insufficient balance")]
	InsufficientBalance,
	/// The transfer's nonce does not immediately follow the sender's current nonce.
	#[fail(display = "nonce gap")]
	NonceGap,
	/// The sender has no state in the store.
	#[fail(display = "unknown sender")]
	UnknownSender,
}

/// Reasons a vote fails preflight validation.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum VoteFault {
	/// The voter has no state in the store.
	#[fail(display = "unknown voter")]
	UnknownVoter,
}

/// State-store and state-factory error definitions.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// A transfer in the batch failed preflight; the whole batch is aborted.
	#[fail(display = "invalid transfer: {}", _0)]
	InvalidTransfer(TransferFault),
	/// A vote in the batch failed preflight; the whole batch is aborted.
	#[fail(display = "invalid vote: {}", _0)]
	InvalidVote(VoteFault),
	/// `create_state` was called for an address that already has non-zero state.
	#[fail(display = "state already exists")]
	StateAlreadyExists,
	/// A stored value could not be decoded as account state.
	#[fail(display = "failed to unmarshal state")]
	FailedToUnmarshalState,
	/// A fatal, non-recoverable error surfaced unchanged from the trie.
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
