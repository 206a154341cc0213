use crate::nrbf::{ProtocolError, Result};

/// Longest 7-bit length prefix the format allows for an `i32` length.
const MAX_LENGTH_PREFIX_BYTES: u32 = 5;

/// Simple bounded cursor over an immutable byte slice.
///
/// All multi-byte reads are little-endian; reads never move backwards.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(ProtocolError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one unsigned byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read one signed byte.
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(i8::from_le_bytes(self.read_array()?))
	}

	/// Read a one-byte boolean; any non-zero byte is `true`.
	pub fn read_bool(&mut self) -> Result<bool> {
		Ok(self.read_u8()? != 0)
	}

	/// Read a little-endian `i16`.
	pub fn read_i16_le(&mut self) -> Result<i16> {
		Ok(i16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64_le(&mut self) -> Result<i64> {
		Ok(i64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		Ok(u64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian IEEE-754 `f64`.
	pub fn read_f64_le(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.read_array()?))
	}

	/// Read a signed `i32` count and reject negative values.
	pub fn read_count(&mut self, what: &'static str) -> Result<usize> {
		let value = self.read_i32_le()?;
		usize::try_from(value).map_err(|_| ProtocolError::NegativeLength { what, value, at: self.pos })
	}

	/// Read a 7-bit-group length prefix (low group first, high bit continues).
	pub fn read_length_prefix(&mut self) -> Result<usize> {
		let at = self.pos;
		let mut value = 0_u64;
		for group in 0..MAX_LENGTH_PREFIX_BYTES {
			let byte = self.read_u8()?;
			value |= u64::from(byte & 0x7F) << (7 * group);
			if byte & 0x80 == 0 {
				if value > i32::MAX as u64 {
					return Err(ProtocolError::InvalidLengthPrefix { at });
				}
				return Ok(value as usize);
			}
		}
		Err(ProtocolError::InvalidLengthPrefix { at })
	}

	/// Read a length-prefixed UTF-8 string.
	pub fn read_string(&mut self) -> Result<String> {
		let len = self.read_length_prefix()?;
		let at = self.pos;
		let raw = self.read_exact(len)?;
		let text = std::str::from_utf8(raw).map_err(|_| ProtocolError::InvalidStringEncoding { at })?;
		Ok(text.to_owned())
	}
}
