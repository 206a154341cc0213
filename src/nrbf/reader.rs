use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::sync::Arc;

use log::{debug, info, trace};

use crate::nrbf::bytes::Cursor;
use crate::nrbf::{
	BinaryArrayRecord, BinaryArrayType, BinaryLibrary, BinaryType, ClassMetadata, ClassRecord, Member, MemberType, ObjectArrayRecord, PrimitiveArrayRecord,
	PrimitiveType, PrimitiveValue, ProtocolError, Record, RecordIdx, RecordKind, Result, SerializationHeader, StringRecord,
};

/// Runtime limits for record decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum nesting depth of embedded records.
	pub max_depth: u32,
	/// Maximum element count of any single array.
	pub max_array_elems: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_array_elems: 64 * 1024 * 1024,
		}
	}
}

impl DecodeOptions {
	/// Preset for untrusted input: shallow nesting, small arrays.
	pub fn strict() -> Self {
		Self {
			max_depth: 16,
			max_array_elems: 1024 * 1024,
		}
	}
}

/// All records of one message, in completion order, plus an object id index.
///
/// The header is always first and the terminator always last. Nested
/// records precede the record that embeds them.
#[derive(Debug, Clone)]
pub struct ParsedStream {
	records: Vec<Record>,
	by_id: HashMap<u32, Vec<RecordIdx>>,
	header: SerializationHeader,
	trailing_bytes: usize,
}

impl ParsedStream {
	/// All records in completion order.
	pub fn records(&self) -> &[Record] {
		&self.records
	}

	/// Number of stored records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Whether the stream holds no records. Never true for a parsed stream.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Look up a record by position.
	pub fn get(&self, idx: RecordIdx) -> Option<&Record> {
		self.records.get(idx.0)
	}

	/// Iterate records with their positions.
	pub fn iter(&self) -> impl Iterator<Item = (RecordIdx, &Record)> {
		self.records.iter().enumerate().map(|(idx, record)| (RecordIdx(idx), record))
	}

	/// Leading serialization header.
	pub fn header(&self) -> &SerializationHeader {
		&self.header
	}

	/// Object id of the graph root.
	pub fn root_id(&self) -> u32 {
		self.header.root_id
	}

	/// Every record declaring `object_id`, in completion order.
	pub fn records_with_id(&self, object_id: u32) -> &[RecordIdx] {
		self.by_id.get(&object_id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// The single record declaring `object_id`, or the number of matches.
	pub fn find_unique(&self, object_id: u32) -> std::result::Result<RecordIdx, usize> {
		match self.records_with_id(object_id) {
			[only] => Ok(*only),
			other => Err(other.len()),
		}
	}

	/// Record counts per kind.
	pub fn kind_counts(&self) -> BTreeMap<RecordKind, usize> {
		let mut counts = BTreeMap::new();
		for record in &self.records {
			*counts.entry(record.kind()).or_insert(0) += 1;
		}
		counts
	}

	/// Bytes left unread after the terminator.
	pub fn trailing_bytes(&self) -> usize {
		self.trailing_bytes
	}
}

/// Parse one message from an in-memory buffer.
pub fn parse_bytes(bytes: &[u8], opt: &DecodeOptions) -> Result<ParsedStream> {
	RecordReader::new(bytes, opt).read_to_end()
}

/// Read `reader` to its end, then parse one message from the bytes.
pub fn parse_reader<R: Read>(mut reader: R, opt: &DecodeOptions) -> Result<ParsedStream> {
	let mut bytes = Vec::new();
	reader.read_to_end(&mut bytes)?;
	parse_bytes(&bytes, opt)
}

/// Single-pass record decoder over a byte buffer.
pub struct RecordReader<'a, 'o> {
	cursor: Cursor<'a>,
	opt: &'o DecodeOptions,
	records: Vec<Record>,
	by_id: HashMap<u32, Vec<RecordIdx>>,
	declared: HashMap<u32, usize>,
	class_metadata: HashMap<u32, Arc<ClassMetadata>>,
	header: Option<SerializationHeader>,
	finished: bool,
}

impl<'a, 'o> RecordReader<'a, 'o> {
	/// Create a reader positioned at the first byte of `bytes`.
	pub fn new(bytes: &'a [u8], opt: &'o DecodeOptions) -> Self {
		Self {
			cursor: Cursor::new(bytes),
			opt,
			records: Vec::new(),
			by_id: HashMap::new(),
			declared: HashMap::new(),
			class_metadata: HashMap::new(),
			header: None,
			finished: false,
		}
	}

	/// Current byte offset.
	pub fn pos(&self) -> usize {
		self.cursor.pos()
	}

	/// Whether the terminator has been read.
	pub fn is_finished(&self) -> bool {
		self.finished
	}

	/// Records stored so far.
	pub fn records(&self) -> &[Record] {
		&self.records
	}

	/// Decode records until the terminator and return the finished stream.
	pub fn read_to_end(mut self) -> Result<ParsedStream> {
		while !self.finished {
			self.next_record()?;
		}

		// Only a terminator sets `finished`, and next_record refuses anything before the header.
		let header = self.header.ok_or(ProtocolError::HeaderNotFirst { found: RecordKind::MessageEnd })?;

		info!(
			"parsed {} records ({} ids) in {} bytes, root id {}",
			self.records.len(),
			self.by_id.len(),
			self.cursor.pos(),
			header.root_id
		);

		Ok(ParsedStream {
			records: self.records,
			by_id: self.by_id,
			header,
			trailing_bytes: self.cursor.remaining(),
		})
	}

	/// Decode and store one top-level record, including everything it embeds.
	pub fn next_record(&mut self) -> Result<RecordIdx> {
		let at = self.cursor.pos();
		let kind = self.read_kind()?;
		if self.header.is_none() && kind != RecordKind::SerializationHeader {
			return Err(ProtocolError::HeaderNotFirst { found: kind });
		}

		let record = self.decode_body(kind, 0)?;
		match &record {
			Record::SerializationHeader(header) if self.header.is_none() => self.header = Some(*header),
			Record::MessageEnd => self.finished = true,
			Record::ObjectNullMultiple256 { .. } => return Err(ProtocolError::UnexpectedMemberKind {
				owner: "top level".to_owned(),
				category: BinaryType::Object,
				found: kind,
			}),
			_ => {}
		}

		let idx = self.push(record);
		debug!("record {} {} at offset {at}", idx.0, kind.as_str());
		Ok(idx)
	}

	fn read_kind(&mut self) -> Result<RecordKind> {
		let tag = self.cursor.read_u8()?;
		RecordKind::from_tag(tag).ok_or(ProtocolError::UnknownRecordKind(tag))
	}

	fn push(&mut self, record: Record) -> RecordIdx {
		let idx = RecordIdx(self.records.len());
		if let Some(object_id) = record.object_id() {
			self.by_id.entry(object_id).or_default().push(idx);
		}
		self.records.push(record);
		idx
	}

	fn declare(&mut self, object_id: u32) {
		*self.declared.entry(object_id).or_insert(0) += 1;
	}

	fn decode_body(&mut self, kind: RecordKind, depth: u32) -> Result<Record> {
		if depth > self.opt.max_depth {
			return Err(ProtocolError::DecodeDepthExceeded { max_depth: self.opt.max_depth });
		}

		let record = match kind {
			RecordKind::SerializationHeader => Record::SerializationHeader(SerializationHeader {
				root_id: self.cursor.read_u32_le()?,
				header_id: self.cursor.read_u32_le()?,
				major_version: self.cursor.read_u32_le()?,
				minor_version: self.cursor.read_u32_le()?,
			}),
			RecordKind::BinaryLibrary => {
				let library_id = self.cursor.read_u32_le()?;
				self.declare(library_id);
				let name = self.cursor.read_string()?;
				Record::BinaryLibrary(BinaryLibrary { library_id, name })
			}
			RecordKind::ClassWithMembersAndTypes => {
				let metadata = self.read_class_metadata()?;
				let library_id = self.cursor.read_u32_le()?;
				Record::ClassWithMembersAndTypes(self.read_class_members(metadata.object_id, Some(library_id), metadata, depth)?)
			}
			RecordKind::SystemClassWithMembersAndTypes => {
				let metadata = self.read_class_metadata()?;
				Record::SystemClassWithMembersAndTypes(self.read_class_members(metadata.object_id, None, metadata, depth)?)
			}
			RecordKind::ClassWithId => {
				let object_id = self.cursor.read_u32_le()?;
				let metadata_id = self.cursor.read_u32_le()?;
				let metadata = self.lookup_metadata(metadata_id)?;
				self.declare(object_id);
				self.class_metadata.insert(object_id, Arc::clone(&metadata));
				let mut class = self.read_class_members(object_id, None, metadata, depth)?;
				class.metadata_id = metadata_id;
				Record::ClassWithId(class)
			}
			RecordKind::BinaryObjectString => {
				let object_id = self.cursor.read_u32_le()?;
				self.declare(object_id);
				let value = self.cursor.read_string()?;
				Record::BinaryObjectString(StringRecord { object_id, value })
			}
			RecordKind::BinaryArray => Record::BinaryArray(self.read_binary_array(depth)?),
			RecordKind::MemberReference => Record::MemberReference {
				id_ref: self.cursor.read_u32_le()?,
			},
			RecordKind::ObjectNull => Record::ObjectNull,
			RecordKind::MessageEnd => Record::MessageEnd,
			RecordKind::ObjectNullMultiple256 => Record::ObjectNullMultiple256 {
				null_count: self.cursor.read_u8()?,
			},
			RecordKind::ArraySinglePrimitive => Record::ArraySinglePrimitive(self.read_primitive_array()?),
			RecordKind::ArraySingleObject => {
				let object_id = self.cursor.read_u32_le()?;
				self.declare(object_id);
				let len = self.cursor.read_count("array length")?;
				let elements = self.read_slots(len, BinaryType::Object, object_id, depth)?;
				Record::ArraySingleObject(ObjectArrayRecord { object_id, elements })
			}
		};

		Ok(record)
	}

	fn lookup_metadata(&self, metadata_id: u32) -> Result<Arc<ClassMetadata>> {
		let declared = self.declared.get(&metadata_id).copied().unwrap_or(0);
		match self.class_metadata.get(&metadata_id) {
			Some(metadata) if declared == 1 => Ok(Arc::clone(metadata)),
			Some(_) => Err(ProtocolError::AmbiguousOrMissingMetadata { metadata_id, found: declared }),
			None => Err(ProtocolError::AmbiguousOrMissingMetadata { metadata_id, found: 0 }),
		}
	}

	fn read_class_metadata(&mut self) -> Result<Arc<ClassMetadata>> {
		let object_id = self.cursor.read_u32_le()?;
		self.declare(object_id);
		let name = self.cursor.read_string()?;
		let member_count = self.cursor.read_u32_le()? as usize;

		let mut member_names = Vec::with_capacity(member_count.min(self.cursor.remaining()));
		for _ in 0..member_count {
			member_names.push(self.cursor.read_string()?);
		}

		let table_at = self.cursor.pos();
		let categories = self.cursor.read_exact(member_count)?;
		let mut member_types = Vec::with_capacity(member_count);
		for (offset, tag) in categories.iter().enumerate() {
			member_types.push(self.read_member_type(*tag, table_at + offset)?);
		}

		let metadata = Arc::new(ClassMetadata {
			object_id,
			name,
			member_names,
			member_types,
		});
		self.class_metadata.insert(object_id, Arc::clone(&metadata));
		Ok(metadata)
	}

	fn read_member_type(&mut self, tag: u8, at: usize) -> Result<MemberType> {
		let category = BinaryType::from_tag(tag).ok_or(ProtocolError::UnknownMemberTypeKind { tag, at })?;
		Ok(match category {
			BinaryType::Primitive => MemberType::Primitive(self.read_primitive_type()?),
			BinaryType::String => MemberType::String,
			BinaryType::Object => MemberType::Object,
			BinaryType::SystemClass => MemberType::SystemClass {
				class_name: self.cursor.read_string()?,
			},
			BinaryType::Class => MemberType::Class {
				class_name: self.cursor.read_string()?,
				library_id: self.cursor.read_u32_le()?,
			},
			BinaryType::ObjectArray => MemberType::ObjectArray,
			BinaryType::StringArray => MemberType::StringArray,
			BinaryType::PrimitiveArray => MemberType::PrimitiveArray(self.cursor.read_u8()?),
		})
	}

	fn read_primitive_type(&mut self) -> Result<PrimitiveType> {
		let at = self.cursor.pos();
		let tag = self.cursor.read_u8()?;
		PrimitiveType::from_tag(tag).ok_or(ProtocolError::UnknownPrimitiveKind { tag, at })
	}

	fn read_primitive(&mut self, primitive: PrimitiveType) -> Result<PrimitiveValue> {
		Ok(match primitive {
			PrimitiveType::Boolean => PrimitiveValue::Boolean(self.cursor.read_bool()?),
			PrimitiveType::Byte => PrimitiveValue::Byte(self.cursor.read_i8()?),
			PrimitiveType::Double => PrimitiveValue::Double(self.cursor.read_f64_le()?),
			PrimitiveType::Int16 => PrimitiveValue::Int16(self.cursor.read_i16_le()?),
			PrimitiveType::Int32 => PrimitiveValue::Int32(self.cursor.read_i32_le()?),
			PrimitiveType::Int64 => PrimitiveValue::Int64(self.cursor.read_i64_le()?),
			PrimitiveType::DateTime => PrimitiveValue::DateTime(self.cursor.read_u64_le()?),
			PrimitiveType::UInt32 => PrimitiveValue::UInt32(self.cursor.read_u32_le()?),
		})
	}

	fn read_class_members(&mut self, object_id: u32, library_id: Option<u32>, metadata: Arc<ClassMetadata>, depth: u32) -> Result<ClassRecord> {
		let mut members = Vec::with_capacity(metadata.member_count());
		for (name, member_type) in metadata.member_names.iter().zip(&metadata.member_types) {
			let member = match member_type {
				MemberType::Primitive(primitive) => Member::Primitive(self.read_primitive(*primitive)?),
				other => {
					let category = other.category();
					let record = self.read_slot(depth + 1)?;
					check_member_kind(category, record.kind(), || format!("{}.{}", metadata.name, name))?;
					trace!("member {}.{} -> {}", metadata.name, name, record.kind().as_str());
					Member::Record(self.push(record))
				}
			};
			members.push(member);
		}

		Ok(ClassRecord {
			object_id,
			metadata_id: metadata.object_id,
			library_id,
			metadata,
			members,
		})
	}

	/// Decode the record filling one member or array slot, storing any
	/// library declarations that precede it.
	fn read_slot(&mut self, depth: u32) -> Result<Record> {
		loop {
			let kind = self.read_kind()?;
			let record = self.decode_body(kind, depth)?;
			if let Record::BinaryLibrary(library) = &record {
				trace!("library {} declared inline", library.library_id);
				self.push(record);
				continue;
			}
			return Ok(record);
		}
	}

	/// Fill exactly `count` slots, expanding null runs into single nulls.
	fn read_slots(&mut self, count: usize, category: BinaryType, owner_id: u32, depth: u32) -> Result<Vec<RecordIdx>> {
		self.check_array_len(count)?;

		let mut slots = Vec::with_capacity(count.min(self.cursor.remaining()));
		while slots.len() < count {
			let record = self.read_slot(depth + 1)?;
			if let Record::ObjectNullMultiple256 { null_count } = record {
				let nulls = usize::from(null_count);
				let remaining = count - slots.len();
				if nulls > remaining {
					return Err(ProtocolError::NullRunOverflow { count: nulls, remaining });
				}
				trace!("array {owner_id}: {nulls} nulls at slot {}", slots.len());
				for _ in 0..nulls {
					slots.push(self.push(Record::ObjectNull));
				}
				continue;
			}

			check_member_kind(category, record.kind(), || format!("array {owner_id}[{}]", slots.len()))?;
			slots.push(self.push(record));
		}

		Ok(slots)
	}

	fn read_binary_array(&mut self, depth: u32) -> Result<BinaryArrayRecord> {
		let object_id = self.cursor.read_u32_le()?;
		self.declare(object_id);

		let at = self.cursor.pos();
		let tag = self.cursor.read_u8()?;
		let array_type = BinaryArrayType::from_tag(tag).ok_or(ProtocolError::UnknownBinaryArrayType { tag, at })?;

		let rank = self.cursor.read_count("array rank")?;
		let mut lengths = Vec::with_capacity(rank.min(self.cursor.remaining()));
		for _ in 0..rank {
			lengths.push(self.cursor.read_count("array length")?);
		}

		let lower_bounds = if array_type.has_lower_bounds() {
			let mut bounds = Vec::with_capacity(rank.min(self.cursor.remaining()));
			for _ in 0..rank {
				bounds.push(self.cursor.read_i32_le()?);
			}
			Some(bounds)
		} else {
			None
		};

		let type_at = self.cursor.pos();
		let type_tag = self.cursor.read_u8()?;
		let element_type = self.read_member_type(type_tag, type_at)?;

		let count = lengths.iter().try_fold(1_usize, |acc, len| acc.checked_mul(*len)).ok_or(ProtocolError::ArrayTooLarge {
			count: usize::MAX,
			max: self.opt.max_array_elems,
		})?;

		let category = element_type.category();
		let elements = match category {
			BinaryType::Class | BinaryType::SystemClass => self.read_slots(count, category, object_id, depth)?,
			_ => return Err(ProtocolError::UnsupportedArrayElementKind { object_id, category }),
		};

		Ok(BinaryArrayRecord {
			object_id,
			array_type,
			lengths,
			lower_bounds,
			element_type,
			elements,
		})
	}

	fn read_primitive_array(&mut self) -> Result<PrimitiveArrayRecord> {
		let object_id = self.cursor.read_u32_le()?;
		self.declare(object_id);
		let len = self.cursor.read_count("array length")?;
		let tag = self.cursor.read_u8()?;
		if PrimitiveType::from_tag(tag) != Some(PrimitiveType::Byte) {
			return Err(ProtocolError::UnsupportedPrimitiveArrayKind { object_id, tag });
		}

		self.check_array_len(len)?;
		let values = self.cursor.read_exact(len)?.to_vec();
		Ok(PrimitiveArrayRecord { object_id, values })
	}

	fn check_array_len(&self, count: usize) -> Result<()> {
		if count > self.opt.max_array_elems {
			return Err(ProtocolError::ArrayTooLarge {
				count,
				max: self.opt.max_array_elems,
			});
		}
		Ok(())
	}
}

fn check_member_kind(category: BinaryType, found: RecordKind, owner: impl FnOnce() -> String) -> Result<()> {
	if category.permitted_kinds().contains(&found) {
		return Ok(());
	}
	Err(ProtocolError::UnexpectedMemberKind {
		owner: owner(),
		category,
		found,
	})
}

#[cfg(test)]
mod tests;
