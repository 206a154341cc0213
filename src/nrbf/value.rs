use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::nrbf::{PathStep, PrimitiveValue, ProtocolError, Result, ValuePath};

/// Integer with its encoded width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integer {
	/// Signed byte.
	I8(i8),
	/// 16-bit.
	I16(i16),
	/// 32-bit.
	I32(i32),
	/// 64-bit.
	I64(i64),
	/// Unsigned 32-bit.
	U32(u32),
}

impl Integer {
	/// Widen to `i64`; lossless for every width.
	pub fn as_i64(self) -> i64 {
		match self {
			Self::I8(value) => i64::from(value),
			Self::I16(value) => i64::from(value),
			Self::I32(value) => i64::from(value),
			Self::I64(value) => value,
			Self::U32(value) => i64::from(value),
		}
	}

	/// Encoded width in bits.
	pub fn bits(self) -> u32 {
		match self {
			Self::I8(_) => 8,
			Self::I16(_) => 16,
			Self::I32(_) | Self::U32(_) => 32,
			Self::I64(_) => 64,
		}
	}
}

/// Distilled object graph: references resolved, records flattened to plain values.
#[derive(Debug, Clone, PartialEq)]
pub enum DistilledValue {
	/// Null reference or null slot.
	Null,
	/// Boolean.
	Bool(bool),
	/// Integer of a given width.
	Int(Integer),
	/// Double.
	Float64(f64),
	/// Raw DateTime tick count.
	Timestamp(u64),
	/// String.
	String(Box<str>),
	/// Byte array.
	Bytes(Vec<u8>),
	/// Array of values.
	Sequence(Vec<DistilledValue>),
	/// Class instance.
	Mapping(Mapping),
}

impl DistilledValue {
	/// Short label of the variant.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "Null",
			Self::Bool(_) => "Bool",
			Self::Int(_) => "Int",
			Self::Float64(_) => "Float64",
			Self::Timestamp(_) => "Timestamp",
			Self::String(_) => "String",
			Self::Bytes(_) => "Bytes",
			Self::Sequence(_) => "Sequence",
			Self::Mapping(_) => "Mapping",
		}
	}

	/// Whether the value is `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Mapping payload.
	pub fn as_mapping(&self) -> Option<&Mapping> {
		match self {
			Self::Mapping(mapping) => Some(mapping),
			_ => None,
		}
	}

	/// Sequence payload.
	pub fn as_sequence(&self) -> Option<&[DistilledValue]> {
		match self {
			Self::Sequence(items) => Some(items),
			_ => None,
		}
	}

	/// String payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Byte array payload.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Self::Bytes(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Integer payload widened to `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(value.as_i64()),
			_ => None,
		}
	}

	/// Numeric payload widened to `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Float64(value) => Some(*value),
			Self::Int(value) => Some(value.as_i64() as f64),
			_ => None,
		}
	}

	/// Member of a mapping by normalized name.
	pub fn get(&self, name: &str) -> Option<&DistilledValue> {
		self.as_mapping().and_then(|mapping| mapping.get(name))
	}

	/// Follow `path` through mappings and sequences.
	pub fn lookup(&self, path: &ValuePath) -> Result<&DistilledValue> {
		let mut current = self;
		for (depth, step) in path.steps.iter().enumerate() {
			let next = match (step, current) {
				(PathStep::Field(name), Self::Mapping(mapping)) => mapping.get(name),
				(PathStep::Index(index), Self::Sequence(items)) => items.get(*index),
				_ => None,
			};
			current = next.ok_or_else(|| ProtocolError::ValuePathNotFound {
				path: path.render_prefix(depth + 1),
			})?;
		}
		Ok(current)
	}
}

impl From<PrimitiveValue> for DistilledValue {
	fn from(value: PrimitiveValue) -> Self {
		match value {
			PrimitiveValue::Boolean(value) => Self::Bool(value),
			PrimitiveValue::Byte(value) => Self::Int(Integer::I8(value)),
			PrimitiveValue::Double(value) => Self::Float64(value),
			PrimitiveValue::Int16(value) => Self::Int(Integer::I16(value)),
			PrimitiveValue::Int32(value) => Self::Int(Integer::I32(value)),
			PrimitiveValue::Int64(value) => Self::Int(Integer::I64(value)),
			PrimitiveValue::DateTime(ticks) => Self::Timestamp(ticks),
			PrimitiveValue::UInt32(value) => Self::Int(Integer::U32(value)),
		}
	}
}

/// Class instance as ordered name/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
	/// Class name from the metadata.
	pub class_name: Box<str>,
	/// Members in declared order.
	pub entries: Vec<MappingEntry>,
}

/// One mapping member.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
	/// Normalized member name.
	pub name: Box<str>,
	/// Distilled member value.
	pub value: DistilledValue,
}

impl Mapping {
	/// Empty mapping for `class_name`.
	pub fn new(class_name: &str) -> Self {
		Self {
			class_name: class_name.into(),
			entries: Vec::new(),
		}
	}

	/// Member by name.
	pub fn get(&self, name: &str) -> Option<&DistilledValue> {
		self.entries.iter().find(|entry| entry.name.as_ref() == name).map(|entry| &entry.value)
	}

	/// Insert a member; a repeated name keeps its first position and takes the new value.
	pub fn insert(&mut self, name: &str, value: DistilledValue) {
		if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name.as_ref() == name) {
			entry.value = value;
			return;
		}
		self.entries.push(MappingEntry { name: name.into(), value });
	}

	/// Member names in order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| entry.name.as_ref())
	}

	/// Number of members.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether there are no members.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Serialize for DistilledValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(value) => serializer.serialize_bool(*value),
			Self::Int(Integer::U32(value)) => serializer.serialize_u32(*value),
			Self::Int(value) => serializer.serialize_i64(value.as_i64()),
			Self::Float64(value) => serializer.serialize_f64(*value),
			Self::Timestamp(ticks) => serializer.serialize_u64(*ticks),
			Self::String(value) => serializer.serialize_str(value),
			Self::Bytes(bytes) => {
				let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
				for byte in bytes {
					seq.serialize_element(byte)?;
				}
				seq.end()
			}
			Self::Sequence(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Mapping(mapping) => {
				let mut map = serializer.serialize_map(Some(mapping.len()))?;
				for entry in &mapping.entries {
					map.serialize_entry(entry.name.as_ref(), &entry.value)?;
				}
				map.end()
			}
		}
	}
}
