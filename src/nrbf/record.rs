use std::sync::Arc;

use crate::nrbf::{BinaryArrayType, BinaryType, PrimitiveType, RecordKind};

/// Position of a record in the flat [`ParsedStream`](crate::nrbf::ParsedStream) list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordIdx(pub usize);

/// One decoded record.
///
/// Container payloads refer to their nested records by [`RecordIdx`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
	/// Stream header naming the root object.
	SerializationHeader(SerializationHeader),
	/// Class instance reusing earlier metadata.
	ClassWithId(ClassRecord),
	/// System class instance with inline metadata.
	SystemClassWithMembersAndTypes(ClassRecord),
	/// Library class instance with inline metadata.
	ClassWithMembersAndTypes(ClassRecord),
	/// Addressable string.
	BinaryObjectString(StringRecord),
	/// General array.
	BinaryArray(BinaryArrayRecord),
	/// Deferred reference to an object id.
	MemberReference {
		/// Referenced object id.
		id_ref: u32,
	},
	/// Single null, also used for each slot of an expanded null run.
	ObjectNull,
	/// Stream terminator.
	MessageEnd,
	/// Library declaration.
	BinaryLibrary(BinaryLibrary),
	/// Null run as read from the wire; never stored in a parsed stream.
	ObjectNullMultiple256 {
		/// Number of null slots covered.
		null_count: u8,
	},
	/// Single-dimension primitive array.
	ArraySinglePrimitive(PrimitiveArrayRecord),
	/// Single-dimension object array.
	ArraySingleObject(ObjectArrayRecord),
}

impl Record {
	/// Kind tag of this record.
	pub fn kind(&self) -> RecordKind {
		match self {
			Self::SerializationHeader(_) => RecordKind::SerializationHeader,
			Self::ClassWithId(_) => RecordKind::ClassWithId,
			Self::SystemClassWithMembersAndTypes(_) => RecordKind::SystemClassWithMembersAndTypes,
			Self::ClassWithMembersAndTypes(_) => RecordKind::ClassWithMembersAndTypes,
			Self::BinaryObjectString(_) => RecordKind::BinaryObjectString,
			Self::BinaryArray(_) => RecordKind::BinaryArray,
			Self::MemberReference { .. } => RecordKind::MemberReference,
			Self::ObjectNull => RecordKind::ObjectNull,
			Self::MessageEnd => RecordKind::MessageEnd,
			Self::BinaryLibrary(_) => RecordKind::BinaryLibrary,
			Self::ObjectNullMultiple256 { .. } => RecordKind::ObjectNullMultiple256,
			Self::ArraySinglePrimitive(_) => RecordKind::ArraySinglePrimitive,
			Self::ArraySingleObject(_) => RecordKind::ArraySingleObject,
		}
	}

	/// Object id introduced by this record, if it is addressable.
	pub fn object_id(&self) -> Option<u32> {
		match self {
			Self::ClassWithId(class) | Self::SystemClassWithMembersAndTypes(class) | Self::ClassWithMembersAndTypes(class) => Some(class.object_id),
			Self::BinaryObjectString(item) => Some(item.object_id),
			Self::BinaryArray(item) => Some(item.object_id),
			Self::BinaryLibrary(item) => Some(item.library_id),
			Self::ArraySinglePrimitive(item) => Some(item.object_id),
			Self::ArraySingleObject(item) => Some(item.object_id),
			Self::SerializationHeader(_) | Self::MemberReference { .. } | Self::ObjectNull | Self::MessageEnd | Self::ObjectNullMultiple256 { .. } => None,
		}
	}

	/// Class payload for any of the three class-bearing kinds.
	pub fn class(&self) -> Option<&ClassRecord> {
		match self {
			Self::ClassWithId(class) | Self::SystemClassWithMembersAndTypes(class) | Self::ClassWithMembersAndTypes(class) => Some(class),
			_ => None,
		}
	}
}

/// `SerializationHeaderRecord` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializationHeader {
	/// Object id of the graph root.
	pub root_id: u32,
	/// Header id.
	pub header_id: u32,
	/// Format major version.
	pub major_version: u32,
	/// Format minor version.
	pub minor_version: u32,
}

/// `BinaryLibrary` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLibrary {
	/// Library id used by class records.
	pub library_id: u32,
	/// Assembly name.
	pub name: String,
}

/// Class name, member names, and member type descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
	/// Object id of the record that declared this metadata.
	pub object_id: u32,
	/// Fully qualified class name.
	pub name: String,
	/// Raw member names in declared order.
	pub member_names: Vec<String>,
	/// Member type descriptors, parallel to `member_names`.
	pub member_types: Vec<MemberType>,
}

impl ClassMetadata {
	/// Number of declared members.
	pub fn member_count(&self) -> usize {
		self.member_names.len()
	}
}

/// Member type descriptor: category plus additional type info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberType {
	/// Inline primitive of the given type.
	Primitive(PrimitiveType),
	/// String.
	String,
	/// Any object.
	Object,
	/// System class by name.
	SystemClass {
		/// Class name.
		class_name: String,
	},
	/// Library class by name.
	Class {
		/// Class name.
		class_name: String,
		/// Declaring library id.
		library_id: u32,
	},
	/// Array of objects.
	ObjectArray,
	/// Array of strings.
	StringArray,
	/// Array of primitives; raw primitive type byte.
	PrimitiveArray(u8),
}

impl MemberType {
	/// Category of this descriptor.
	pub fn category(&self) -> BinaryType {
		match self {
			Self::Primitive(_) => BinaryType::Primitive,
			Self::String => BinaryType::String,
			Self::Object => BinaryType::Object,
			Self::SystemClass { .. } => BinaryType::SystemClass,
			Self::Class { .. } => BinaryType::Class,
			Self::ObjectArray => BinaryType::ObjectArray,
			Self::StringArray => BinaryType::StringArray,
			Self::PrimitiveArray(_) => BinaryType::PrimitiveArray,
		}
	}
}

/// Decoded inline primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
	/// Boolean.
	Boolean(bool),
	/// Signed byte.
	Byte(i8),
	/// Double.
	Double(f64),
	/// 16-bit integer.
	Int16(i16),
	/// 32-bit integer.
	Int32(i32),
	/// 64-bit integer.
	Int64(i64),
	/// Raw 8-byte tick count.
	DateTime(u64),
	/// Unsigned 32-bit integer.
	UInt32(u32),
}

/// One decoded class member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member {
	/// Inline primitive value.
	Primitive(PrimitiveValue),
	/// Nested record (reference, null, string, class, or array).
	Record(RecordIdx),
}

/// Payload shared by the three class-bearing record kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
	/// Object id of this instance.
	pub object_id: u32,
	/// Id of the record whose metadata is used (equal to `object_id` for inline metadata).
	pub metadata_id: u32,
	/// Library id for `ClassWithMembersAndTypes`.
	pub library_id: Option<u32>,
	/// Class metadata, shared with every `ClassWithId` instance reusing it.
	pub metadata: Arc<ClassMetadata>,
	/// Member values in declared order.
	pub members: Vec<Member>,
}

/// `BinaryObjectString` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRecord {
	/// Object id.
	pub object_id: u32,
	/// Decoded string.
	pub value: String,
}

/// `BinaryArray` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryArrayRecord {
	/// Object id.
	pub object_id: u32,
	/// Array shape.
	pub array_type: BinaryArrayType,
	/// Per-dimension lengths.
	pub lengths: Vec<usize>,
	/// Per-dimension lower bounds for offset shapes.
	pub lower_bounds: Option<Vec<i32>>,
	/// Element type descriptor.
	pub element_type: MemberType,
	/// One record per slot, `product(lengths)` in total.
	pub elements: Vec<RecordIdx>,
}

impl BinaryArrayRecord {
	/// Number of dimensions.
	pub fn rank(&self) -> usize {
		self.lengths.len()
	}
}

/// `ArraySinglePrimitive` fields; only byte arrays are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveArrayRecord {
	/// Object id.
	pub object_id: u32,
	/// Raw element bytes.
	pub values: Vec<u8>,
}

/// `ArraySingleObject` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArrayRecord {
	/// Object id.
	pub object_id: u32,
	/// One record per slot.
	pub elements: Vec<RecordIdx>,
}
