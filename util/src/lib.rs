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

//! Logging and a couple of low-level utilities shared across the mempool
//! and state-factory crates. Nothing here is domain-specific.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

#[macro_use]
extern crate lazy_static;

pub use parking_lot::{Mutex, MutexGuard};

pub mod heap;
pub use crate::heap::IndexedHeap;

pub mod logger;
pub use crate::logger::{init_logger, init_test_logger};

pub mod types;
pub use crate::types::{LogLevel, LoggingConfig};

use std::cell::{Ref, RefCell};

/// Encapsulation of a `RefCell<Option<T>>` for one-time initialization after
/// construction. Fails hard (panics) if borrowed before `init` is called.
#[derive(Clone)]
pub struct OneTime<T> {
	inner: RefCell<Option<T>>,
}

unsafe impl<T> Sync for OneTime<T> {}
unsafe impl<T> Send for OneTime<T> {}

impl<T> Default for OneTime<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> OneTime<T> {
	/// Builds a new uninitialized `OneTime`.
	pub fn new() -> OneTime<T> {
		OneTime {
			inner: RefCell::new(None),
		}
	}

	/// Initializes the `OneTime`, should only be called once after construction.
	pub fn init(&self, value: T) {
		let mut inner_mut = self.inner.borrow_mut();
		*inner_mut = Some(value);
	}

	/// Whether the `OneTime` has been initialized.
	pub fn is_initialized(&self) -> bool {
		self.inner.borrow().is_some()
	}

	/// Borrows the `OneTime`, should only be called after initialization.
	pub fn borrow(&self) -> Ref<T> {
		Ref::map(self.inner.borrow(), |o| o.as_ref().expect("OneTime read before init"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_time_round_trips() {
		let ot: OneTime<u32> = OneTime::new();
		assert!(!ot.is_initialized());
		ot.init(7);
		assert!(ot.is_initialized());
		assert_eq!(*ot.borrow(), 7);
	}
}
