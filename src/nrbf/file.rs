use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::nrbf::{DecodeOptions, DistillOptions, DistilledValue, ParsedStream, RecordKind, Result, SerializationHeader, distill_with, parse_bytes};

/// One parsed MS-NRBF message loaded from a file or buffer.
pub struct NrbfFile {
	/// Total input size in bytes.
	pub byte_len: usize,
	stream: ParsedStream,
}

impl NrbfFile {
	/// Read and parse a file with default limits.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_with(path, &DecodeOptions::default())
	}

	/// Read and parse a file.
	pub fn open_with(path: impl AsRef<Path>, opt: &DecodeOptions) -> Result<Self> {
		let raw = fs::read(path)?;
		Self::from_bytes(&raw, opt)
	}

	/// Parse an in-memory buffer.
	pub fn from_bytes(bytes: &[u8], opt: &DecodeOptions) -> Result<Self> {
		Ok(Self {
			byte_len: bytes.len(),
			stream: parse_bytes(bytes, opt)?,
		})
	}

	/// Parsed record stream.
	pub fn stream(&self) -> &ParsedStream {
		&self.stream
	}

	/// Distill from the root object with default limits.
	pub fn distill(&self) -> Result<DistilledValue> {
		distill_with(&self.stream, &DistillOptions::default())
	}

	/// Distill from the root object.
	pub fn distill_with(&self, opt: &DistillOptions) -> Result<DistilledValue> {
		distill_with(&self.stream, opt)
	}

	/// Summary counts for the parsed stream.
	pub fn stats(&self) -> StreamStats {
		StreamStats {
			byte_len: self.byte_len,
			header: *self.stream.header(),
			record_count: self.stream.len(),
			trailing_bytes: self.stream.trailing_bytes(),
			kinds: self.stream.kind_counts(),
		}
	}
}

/// Summary of one parsed stream.
#[derive(Debug, Clone)]
pub struct StreamStats {
	/// Total input size.
	pub byte_len: usize,
	/// Leading header.
	pub header: SerializationHeader,
	/// Stored records, including expanded nulls and nested records.
	pub record_count: usize,
	/// Bytes after the terminator.
	pub trailing_bytes: usize,
	/// Record counts per kind.
	pub kinds: BTreeMap<RecordKind, usize>,
}
