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

//! Serialization and deserialization layer specialized for binary encoding.
//!
//! To use it, implement `Writeable` or `Readable` and then use the
//! `serialize`/`deserialize` helpers on them as appropriate. This is the
//! canonical wire format for hashing transactions and for moving them
//! between the mempool and persistence layers.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Errors arising from serializing or deserializing.
#[derive(Debug, Fail)]
pub enum Error {
	/// Wraps an io error produced when reading or writing.
	#[fail(display = "IO error: {}", _0)]
	IOErr(String),
	/// Expected a given value that wasn't found.
	#[fail(display = "unexpected data: expected {:?}, got {:?}", expected, received)]
	UnexpectedData {
		/// Bytes that were expected.
		expected: Vec<u8>,
		/// Bytes actually read.
		received: Vec<u8>,
	},
	/// Data wasn't in a consumable format.
	#[fail(display = "corrupted data")]
	CorruptedData,
	/// Asked to read an unreasonably large chunk of data.
	#[fail(display = "read too large: {}", _0)]
	TooLargeReadErr(String),
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::IOErr(e.to_string())
	}
}

/// Maximum length accepted for a single fixed-bytes read.
const MAX_FIXED_READ: usize = 100_000;

/// Types that can be serialized to a binary stream.
pub trait Writeable {
	/// Writes `self` into the given writer.
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error>;
}

/// Types that can be deserialized from a binary stream.
pub trait Readable: Sized {
	/// Reads an instance of `Self` from the given reader.
	fn read<R: Reader>(reader: &mut R) -> Result<Self, Error>;
}

/// Write primitives used to encode wire types.
pub trait Writer {
	/// Writes a u8.
	fn write_u8(&mut self, n: u8) -> Result<(), Error>;
	/// Writes a u32 in big-endian order.
	fn write_u32(&mut self, n: u32) -> Result<(), Error>;
	/// Writes a u64 in big-endian order.
	fn write_u64(&mut self, n: u64) -> Result<(), Error>;
	/// Writes an i64 in big-endian order.
	fn write_i64(&mut self, n: i64) -> Result<(), Error>;
	/// Writes a length-prefixed byte vector.
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
	/// Writes a fixed number of bytes with no length prefix; the reader is
	/// expected to already know the length.
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// Read primitives used to decode wire types.
pub trait Reader {
	/// Reads a u8.
	fn read_u8(&mut self) -> Result<u8, Error>;
	/// Reads a u32 in big-endian order.
	fn read_u32(&mut self) -> Result<u32, Error>;
	/// Reads a u64 in big-endian order.
	fn read_u64(&mut self) -> Result<u64, Error>;
	/// Reads an i64 in big-endian order.
	fn read_i64(&mut self) -> Result<i64, Error>;
	/// Reads a length-prefixed byte vector.
	fn read_bytes(&mut self) -> Result<Vec<u8>, Error>;
	/// Reads a fixed number of bytes.
	fn read_fixed_bytes(&mut self, length: usize) -> Result<Vec<u8>, Error>;
	/// Reads a byte, erroring unless it matches `val`.
	fn expect_u8(&mut self, val: u8) -> Result<u8, Error>;
}

/// Deserializes a `Readable` from any `std::io::Read` implementation.
pub fn deserialize<T: Readable>(source: &mut dyn Read) -> Result<T, Error> {
	let mut reader = BinReader { source };
	T::read(&mut reader)
}

/// Serializes a `Writeable` into any `std::io::Write` implementation.
pub fn serialize<W: Writeable>(sink: &mut dyn Write, thing: &W) -> Result<(), Error> {
	let mut writer = BinWriter { sink };
	thing.write(&mut writer)
}

/// Serializes a `Writeable` directly into a `Vec<u8>`.
pub fn ser_vec<W: Writeable>(thing: &W) -> Result<Vec<u8>, Error> {
	let mut vec = Vec::new();
	serialize(&mut vec, thing)?;
	Ok(vec)
}

struct BinReader<'a> {
	source: &'a mut dyn Read,
}

impl<'a> Reader for BinReader<'a> {
	fn read_u8(&mut self) -> Result<u8, Error> {
		Ok(self.source.read_u8()?)
	}
	fn read_u32(&mut self) -> Result<u32, Error> {
		Ok(self.source.read_u32::<BigEndian>()?)
	}
	fn read_u64(&mut self) -> Result<u64, Error> {
		Ok(self.source.read_u64::<BigEndian>()?)
	}
	fn read_i64(&mut self) -> Result<i64, Error> {
		Ok(self.source.read_i64::<BigEndian>()?)
	}
	fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
		let len = self.read_u64()?;
		self.read_fixed_bytes(len as usize)
	}
	fn read_fixed_bytes(&mut self, length: usize) -> Result<Vec<u8>, Error> {
		if length > MAX_FIXED_READ {
			return Err(Error::TooLargeReadErr(format!(
				"fixed bytes length too large: {}",
				length
			)));
		}
		let mut buf = vec![0; length];
		self.source.read_exact(&mut buf)?;
		Ok(buf)
	}
	fn expect_u8(&mut self, val: u8) -> Result<u8, Error> {
		let b = self.read_u8()?;
		if b == val {
			Ok(b)
		} else {
			Err(Error::UnexpectedData {
				expected: vec![val],
				received: vec![b],
			})
		}
	}
}

struct BinWriter<'a> {
	sink: &'a mut dyn Write,
}

impl<'a> Writer for BinWriter<'a> {
	fn write_u8(&mut self, n: u8) -> Result<(), Error> {
		Ok(self.sink.write_u8(n)?)
	}
	fn write_u32(&mut self, n: u32) -> Result<(), Error> {
		Ok(self.sink.write_u32::<BigEndian>(n)?)
	}
	fn write_u64(&mut self, n: u64) -> Result<(), Error> {
		Ok(self.sink.write_u64::<BigEndian>(n)?)
	}
	fn write_i64(&mut self, n: i64) -> Result<(), Error> {
		Ok(self.sink.write_i64::<BigEndian>(n)?)
	}
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.write_u64(bytes.len() as u64)?;
		Ok(self.sink.write_all(bytes)?)
	}
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		Ok(self.sink.write_all(bytes)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Pair(u64, u32);

	impl Writeable for Pair {
		fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error> {
			writer.write_u64(self.0)?;
			writer.write_u32(self.1)
		}
	}

	impl Readable for Pair {
		fn read<R: Reader>(reader: &mut R) -> Result<Self, Error> {
			let a = reader.read_u64()?;
			let b = reader.read_u32()?;
			Ok(Pair(a, b))
		}
	}

	#[test]
	fn round_trips_through_vec() {
		let p = Pair(42, 7);
		let bytes = ser_vec(&p).unwrap();
		let mut cursor = &bytes[..];
		let back: Pair = deserialize(&mut cursor).unwrap();
		assert_eq!(back.0, 42);
		assert_eq!(back.1, 7);
	}

	#[test]
	fn expect_u8_rejects_mismatch() {
		let bytes = vec![5u8];
		let mut cursor = &bytes[..];
		let mut reader = BinReader { source: &mut cursor };
		assert!(reader.expect_u8(9).is_err());
	}

	#[test]
	fn refuses_oversized_fixed_read() {
		let bytes = vec![0u8; 4];
		let mut cursor = &bytes[..];
		let mut reader = BinReader { source: &mut cursor };
		match reader.read_fixed_bytes(MAX_FIXED_READ + 1) {
			Err(Error::TooLargeReadErr(_)) => {}
			other => panic!("expected TooLargeReadErr, got {:?}", other),
		}
	}
}
