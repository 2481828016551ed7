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

//! Crate-wide error type for `chain_core`.

use std::env;
use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

use crate::ser;

/// Error definition.
#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Errors arising from hash, address and transaction primitives.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// Serialization or deserialization error.
	#[fail(display = "serialization error: {}", _0)]
	Ser(ser::Error),
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
		let show_bt = env::var("RUST_BACKTRACE").map(|r| r == "1").unwrap_or(false);
		let mut output = format!("{}", self.inner);
		if show_bt {
			let backtrace = self.backtrace().map(|b| format!("{}", b)).unwrap_or_else(|| "Unknown".to_string());
			output.push_str(&format!("\nBacktrace: {}", backtrace));
		}
		Display::fmt(&output, f)
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

impl From<ser::Error> for Error {
	fn from(error: ser::Error) -> Error {
		Error {
			inner: Context::new(ErrorKind::Ser(error)),
		}
	}
}
