//! Closed tag sets of the MS-NRBF grammar.

/// Record kind selected by the leading tag byte of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
	/// `SerializationHeaderRecord`, always first.
	SerializationHeader,
	/// Class instance reusing earlier metadata.
	ClassWithId,
	/// System class instance with inline metadata and member types.
	SystemClassWithMembersAndTypes,
	/// Library class instance with inline metadata and member types.
	ClassWithMembersAndTypes,
	/// Addressable string.
	BinaryObjectString,
	/// General (possibly multi-dimensional) array.
	BinaryArray,
	/// Reference to an object id.
	MemberReference,
	/// Single null.
	ObjectNull,
	/// Stream terminator.
	MessageEnd,
	/// Library name declaration.
	BinaryLibrary,
	/// Run of up to 255 nulls.
	ObjectNullMultiple256,
	/// Single-dimension array of primitives.
	ArraySinglePrimitive,
	/// Single-dimension array of objects.
	ArraySingleObject,
}

impl RecordKind {
	/// Map a tag byte to its record kind.
	pub fn from_tag(tag: u8) -> Option<Self> {
		Some(match tag {
			0 => Self::SerializationHeader,
			1 => Self::ClassWithId,
			4 => Self::SystemClassWithMembersAndTypes,
			5 => Self::ClassWithMembersAndTypes,
			6 => Self::BinaryObjectString,
			7 => Self::BinaryArray,
			9 => Self::MemberReference,
			10 => Self::ObjectNull,
			11 => Self::MessageEnd,
			12 => Self::BinaryLibrary,
			13 => Self::ObjectNullMultiple256,
			15 => Self::ArraySinglePrimitive,
			16 => Self::ArraySingleObject,
			_ => return None,
		})
	}

	/// Tag byte written for this kind.
	pub fn tag(self) -> u8 {
		match self {
			Self::SerializationHeader => 0,
			Self::ClassWithId => 1,
			Self::SystemClassWithMembersAndTypes => 4,
			Self::ClassWithMembersAndTypes => 5,
			Self::BinaryObjectString => 6,
			Self::BinaryArray => 7,
			Self::MemberReference => 9,
			Self::ObjectNull => 10,
			Self::MessageEnd => 11,
			Self::BinaryLibrary => 12,
			Self::ObjectNullMultiple256 => 13,
			Self::ArraySinglePrimitive => 15,
			Self::ArraySingleObject => 16,
		}
	}

	/// Stable record type name as used by the format documentation.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SerializationHeader => "SerializationHeaderRecord",
			Self::ClassWithId => "ClassWithId",
			Self::SystemClassWithMembersAndTypes => "SystemClassWithMembersAndTypes",
			Self::ClassWithMembersAndTypes => "ClassWithMembersAndTypes",
			Self::BinaryObjectString => "BinaryObjectString",
			Self::BinaryArray => "BinaryArray",
			Self::MemberReference => "MemberReference",
			Self::ObjectNull => "ObjectNull",
			Self::MessageEnd => "MessageEnd",
			Self::BinaryLibrary => "BinaryLibrary",
			Self::ObjectNullMultiple256 => "ObjectNullMultiple256",
			Self::ArraySinglePrimitive => "ArraySinglePrimitive",
			Self::ArraySingleObject => "ArraySingleObject",
		}
	}
}

/// Primitive type of an inline member value or primitive array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
	/// 1 byte, non-zero is true.
	Boolean,
	/// 1 byte, signed.
	Byte,
	/// 8 bytes IEEE-754.
	Double,
	/// 2 bytes.
	Int16,
	/// 4 bytes.
	Int32,
	/// 8 bytes.
	Int64,
	/// 8-byte tick count.
	DateTime,
	/// 4 bytes unsigned.
	UInt32,
}

impl PrimitiveType {
	/// Map a primitive type byte to its type.
	pub fn from_tag(tag: u8) -> Option<Self> {
		Some(match tag {
			1 => Self::Boolean,
			2 => Self::Byte,
			6 => Self::Double,
			7 => Self::Int16,
			8 => Self::Int32,
			9 => Self::Int64,
			13 => Self::DateTime,
			15 => Self::UInt32,
			_ => return None,
		})
	}

	/// Primitive type byte written for this type.
	pub fn tag(self) -> u8 {
		match self {
			Self::Boolean => 1,
			Self::Byte => 2,
			Self::Double => 6,
			Self::Int16 => 7,
			Self::Int32 => 8,
			Self::Int64 => 9,
			Self::DateTime => 13,
			Self::UInt32 => 15,
		}
	}

	/// Encoded width in bytes.
	pub fn size(self) -> usize {
		match self {
			Self::Boolean | Self::Byte => 1,
			Self::Int16 => 2,
			Self::Int32 | Self::UInt32 => 4,
			Self::Double | Self::Int64 | Self::DateTime => 8,
		}
	}
}

/// Member type category from a class's member type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryType {
	/// Inline primitive.
	Primitive,
	/// String record.
	String,
	/// Any object.
	Object,
	/// Class from the system library.
	SystemClass,
	/// Class from a declared library.
	Class,
	/// Array of objects.
	ObjectArray,
	/// Array of strings.
	StringArray,
	/// Array of primitives.
	PrimitiveArray,
}

impl BinaryType {
	/// Map a category byte to its category.
	pub fn from_tag(tag: u8) -> Option<Self> {
		Some(match tag {
			0 => Self::Primitive,
			1 => Self::String,
			2 => Self::Object,
			3 => Self::SystemClass,
			4 => Self::Class,
			5 => Self::ObjectArray,
			6 => Self::StringArray,
			7 => Self::PrimitiveArray,
			_ => return None,
		})
	}

	/// Record kinds a member of this category may decode to.
	pub fn permitted_kinds(self) -> &'static [RecordKind] {
		use RecordKind::*;

		match self {
			Self::Primitive => &[],
			Self::String => &[BinaryObjectString, MemberReference, ObjectNull],
			Self::Object => &[
				ClassWithId,
				SystemClassWithMembersAndTypes,
				ClassWithMembersAndTypes,
				BinaryObjectString,
				BinaryArray,
				MemberReference,
				ObjectNull,
				ArraySinglePrimitive,
				ArraySingleObject,
			],
			Self::SystemClass => &[MemberReference, ObjectNull, SystemClassWithMembersAndTypes, ArraySingleObject, BinaryArray, ClassWithId],
			Self::Class => &[MemberReference, ObjectNull, ClassWithMembersAndTypes, BinaryArray, ClassWithId],
			Self::ObjectArray => &[MemberReference, ObjectNull, ArraySingleObject, BinaryArray],
			Self::StringArray => &[MemberReference, ObjectNull, BinaryArray],
			Self::PrimitiveArray => &[MemberReference, ObjectNull, ArraySinglePrimitive],
		}
	}
}

/// Shape of a `BinaryArray` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryArrayType {
	/// Single dimension, zero-based.
	Single,
	/// Array of arrays, zero-based.
	Jagged,
	/// Multi-dimensional, zero-based.
	Rectangular,
	/// Single dimension with lower bound.
	SingleOffset,
	/// Jagged with lower bound.
	JaggedOffset,
	/// Rectangular with lower bounds.
	RectangularOffset,
}

impl BinaryArrayType {
	/// Map a shape byte to its array type.
	pub fn from_tag(tag: u8) -> Option<Self> {
		Some(match tag {
			0 => Self::Single,
			1 => Self::Jagged,
			2 => Self::Rectangular,
			3 => Self::SingleOffset,
			4 => Self::JaggedOffset,
			5 => Self::RectangularOffset,
			_ => return None,
		})
	}

	/// Whether per-dimension lower bounds follow the lengths.
	pub fn has_lower_bounds(self) -> bool {
		matches!(self, Self::SingleOffset | Self::JaggedOffset | Self::RectangularOffset)
	}
}
