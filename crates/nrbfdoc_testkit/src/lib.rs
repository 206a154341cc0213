//! Shared test helpers: a byte-level MS-NRBF message encoder and fixture paths.

use std::path::{Path, PathBuf};

/// Record tag bytes.
pub mod tag {
	/// `SerializationHeaderRecord`.
	pub const HEADER: u8 = 0;
	/// `ClassWithId`.
	pub const CLASS_WITH_ID: u8 = 1;
	/// `SystemClassWithMembersAndTypes`.
	pub const SYSTEM_CLASS_WITH_MEMBERS_AND_TYPES: u8 = 4;
	/// `ClassWithMembersAndTypes`.
	pub const CLASS_WITH_MEMBERS_AND_TYPES: u8 = 5;
	/// `BinaryObjectString`.
	pub const BINARY_OBJECT_STRING: u8 = 6;
	/// `BinaryArray`.
	pub const BINARY_ARRAY: u8 = 7;
	/// `MemberReference`.
	pub const MEMBER_REFERENCE: u8 = 9;
	/// `ObjectNull`.
	pub const OBJECT_NULL: u8 = 10;
	/// `MessageEnd`.
	pub const MESSAGE_END: u8 = 11;
	/// `BinaryLibrary`.
	pub const BINARY_LIBRARY: u8 = 12;
	/// `ObjectNullMultiple256`.
	pub const OBJECT_NULL_MULTIPLE_256: u8 = 13;
	/// `ArraySinglePrimitive`.
	pub const ARRAY_SINGLE_PRIMITIVE: u8 = 15;
	/// `ArraySingleObject`.
	pub const ARRAY_SINGLE_OBJECT: u8 = 16;
}

/// Primitive type bytes.
pub mod prim {
	/// Boolean.
	pub const BOOLEAN: u8 = 1;
	/// Byte.
	pub const BYTE: u8 = 2;
	/// Double.
	pub const DOUBLE: u8 = 6;
	/// Int16.
	pub const INT16: u8 = 7;
	/// Int32.
	pub const INT32: u8 = 8;
	/// Int64.
	pub const INT64: u8 = 9;
	/// DateTime.
	pub const DATE_TIME: u8 = 13;
	/// UInt32.
	pub const UINT32: u8 = 15;
	/// Single, outside the decoded primitive set.
	pub const SINGLE: u8 = 11;
}

/// Member type descriptor written into a class member type table.
#[derive(Debug, Clone, Copy)]
pub enum TypeSpec<'a> {
	/// Inline primitive with type byte.
	Primitive(u8),
	/// String.
	String,
	/// Object.
	Object,
	/// System class by name.
	SystemClass(&'a str),
	/// Library class by name and library id.
	Class(&'a str, u32),
	/// Object array.
	ObjectArray,
	/// String array.
	StringArray,
	/// Primitive array with type byte.
	PrimitiveArray(u8),
}

impl TypeSpec<'_> {
	fn category(self) -> u8 {
		match self {
			Self::Primitive(_) => 0,
			Self::String => 1,
			Self::Object => 2,
			Self::SystemClass(_) => 3,
			Self::Class(..) => 4,
			Self::ObjectArray => 5,
			Self::StringArray => 6,
			Self::PrimitiveArray(_) => 7,
		}
	}
}

/// Append-only encoder for hand-built messages.
///
/// Callers are responsible for writing member values in the order and shape
/// their class metadata declares.
#[derive(Debug, Default, Clone)]
pub struct MessageBuilder {
	buf: Vec<u8>,
}

impl MessageBuilder {
	/// Start an empty message.
	pub fn new() -> Self {
		Self::default()
	}

	/// Finished bytes.
	pub fn build(&self) -> Vec<u8> {
		self.buf.clone()
	}

	/// Bytes written so far.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Whether nothing has been written.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Append raw bytes.
	pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
		self.buf.extend_from_slice(bytes);
		self
	}

	/// Serialization header with version 1.0.
	pub fn header(&mut self, root_id: u32, header_id: u32) -> &mut Self {
		self.buf.push(tag::HEADER);
		self.u32(root_id).u32(header_id).u32(1).u32(0)
	}

	/// Library declaration.
	pub fn library(&mut self, library_id: u32, name: &str) -> &mut Self {
		self.buf.push(tag::BINARY_LIBRARY);
		self.u32(library_id).string(name)
	}

	/// `ClassWithMembersAndTypes` prefix; member values follow.
	pub fn class(&mut self, object_id: u32, name: &str, members: &[(&str, TypeSpec<'_>)], library_id: u32) -> &mut Self {
		self.buf.push(tag::CLASS_WITH_MEMBERS_AND_TYPES);
		self.class_info(object_id, name, members);
		self.u32(library_id)
	}

	/// `SystemClassWithMembersAndTypes` prefix; member values follow.
	pub fn system_class(&mut self, object_id: u32, name: &str, members: &[(&str, TypeSpec<'_>)]) -> &mut Self {
		self.buf.push(tag::SYSTEM_CLASS_WITH_MEMBERS_AND_TYPES);
		self.class_info(object_id, name, members)
	}

	/// `ClassWithId` prefix; member values follow.
	pub fn class_with_id(&mut self, object_id: u32, metadata_id: u32) -> &mut Self {
		self.buf.push(tag::CLASS_WITH_ID);
		self.u32(object_id).u32(metadata_id)
	}

	/// Addressable string.
	pub fn string_record(&mut self, object_id: u32, value: &str) -> &mut Self {
		self.buf.push(tag::BINARY_OBJECT_STRING);
		self.u32(object_id).string(value)
	}

	/// Member reference.
	pub fn reference(&mut self, id_ref: u32) -> &mut Self {
		self.buf.push(tag::MEMBER_REFERENCE);
		self.u32(id_ref)
	}

	/// Single null.
	pub fn null(&mut self) -> &mut Self {
		self.buf.push(tag::OBJECT_NULL);
		self
	}

	/// Run of `count` nulls.
	pub fn null_run(&mut self, count: u8) -> &mut Self {
		self.buf.push(tag::OBJECT_NULL_MULTIPLE_256);
		self.buf.push(count);
		self
	}

	/// Terminator.
	pub fn end(&mut self) -> &mut Self {
		self.buf.push(tag::MESSAGE_END);
		self
	}

	/// Byte array with its values.
	pub fn byte_array(&mut self, object_id: u32, values: &[u8]) -> &mut Self {
		self.buf.push(tag::ARRAY_SINGLE_PRIMITIVE);
		self.u32(object_id).i32(values.len() as i32);
		self.buf.push(prim::BYTE);
		self.raw(values)
	}

	/// Primitive array prefix with an arbitrary element type byte.
	pub fn primitive_array(&mut self, object_id: u32, len: i32, primitive: u8) -> &mut Self {
		self.buf.push(tag::ARRAY_SINGLE_PRIMITIVE);
		self.u32(object_id).i32(len);
		self.buf.push(primitive);
		self
	}

	/// `ArraySingleObject` prefix; `len` slot records follow.
	pub fn object_array(&mut self, object_id: u32, len: i32) -> &mut Self {
		self.buf.push(tag::ARRAY_SINGLE_OBJECT);
		self.u32(object_id).i32(len)
	}

	/// `BinaryArray` prefix; `product(lengths)` slot records follow.
	pub fn binary_array(&mut self, object_id: u32, array_type: u8, lengths: &[i32], lower_bounds: Option<&[i32]>, element: TypeSpec<'_>) -> &mut Self {
		self.buf.push(tag::BINARY_ARRAY);
		self.u32(object_id);
		self.buf.push(array_type);
		self.i32(lengths.len() as i32);
		for len in lengths {
			self.i32(*len);
		}
		for bound in lower_bounds.unwrap_or(&[]) {
			self.i32(*bound);
		}
		self.buf.push(element.category());
		self.type_info(element)
	}

	/// Inline boolean member.
	pub fn bool(&mut self, value: bool) -> &mut Self {
		self.buf.push(u8::from(value));
		self
	}

	/// Inline signed byte member.
	pub fn i8(&mut self, value: i8) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Inline `i16` member.
	pub fn i16(&mut self, value: i16) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Inline `i32` member or field.
	pub fn i32(&mut self, value: i32) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Inline `i64` member.
	pub fn i64(&mut self, value: i64) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Inline `u32` member or field.
	pub fn u32(&mut self, value: u32) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Inline `u64` member (DateTime ticks).
	pub fn u64(&mut self, value: u64) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Inline `f64` member.
	pub fn f64(&mut self, value: f64) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Length-prefixed UTF-8 string.
	pub fn string(&mut self, value: &str) -> &mut Self {
		self.length_prefix(value.len());
		self.raw(value.as_bytes())
	}

	/// 7-bit-group length prefix.
	pub fn length_prefix(&mut self, mut len: usize) -> &mut Self {
		loop {
			let byte = (len & 0x7F) as u8;
			len >>= 7;
			if len == 0 {
				self.buf.push(byte);
				return self;
			}
			self.buf.push(byte | 0x80);
		}
	}

	fn class_info(&mut self, object_id: u32, name: &str, members: &[(&str, TypeSpec<'_>)]) -> &mut Self {
		self.u32(object_id).string(name).u32(members.len() as u32);
		for (member, _) in members {
			self.string(member);
		}
		for (_, spec) in members {
			self.buf.push(spec.category());
		}
		for (_, spec) in members {
			self.type_info(*spec);
		}
		self
	}

	fn type_info(&mut self, spec: TypeSpec<'_>) -> &mut Self {
		match spec {
			TypeSpec::Primitive(primitive) | TypeSpec::PrimitiveArray(primitive) => {
				self.buf.push(primitive);
				self
			}
			TypeSpec::SystemClass(name) => self.string(name),
			TypeSpec::Class(name, library_id) => self.string(name).u32(library_id),
			TypeSpec::String | TypeSpec::Object | TypeSpec::ObjectArray | TypeSpec::StringArray => self,
		}
	}
}

/// Shape of the message produced by [`sample_cine_message`].
pub mod sample_cine {
	/// Outer pixel dimension.
	pub const COLUMNS: usize = 4;
	/// Inner pixel dimension.
	pub const ROWS: usize = 3;
	/// Acquisition time: 2023-11-14T22:13:20Z as 100 ns ticks since 1900.
	pub const TICKS: i64 = (2_208_988_800 + 1_700_000_000) * 10_000_000;
	/// Unix seconds matching [`TICKS`].
	pub const UNIX_SECONDS: f64 = 1_700_000_000.0;

	/// Intensity stored for (`column`, `row`).
	pub fn intensity(column: usize, row: usize) -> u8 {
		(column * 16 + row) as u8
	}
}

/// A transversal cine frame with auto-property member names, shared
/// metadata, a string reference, and a null member.
pub fn sample_cine_message() -> Vec<u8> {
	use sample_cine::{COLUMNS, ROWS, TICKS, intensity};

	let point = [("X", TypeSpec::Primitive(prim::DOUBLE)), ("Y", TypeSpec::Primitive(prim::DOUBLE)), ("Z", TypeSpec::Primitive(prim::DOUBLE))];
	let mut data = Vec::with_capacity(COLUMNS * ROWS * 2);
	for column in 0..COLUMNS {
		for row in 0..ROWS {
			data.extend_from_slice(&[0, intensity(column, row)]);
		}
	}

	let mut msg = MessageBuilder::new();
	msg.header(1, 0).library(2, "CineLib, Version=1.0.0.0");
	msg.class(
		1,
		"Cine.Frame",
		&[
			("<TwoDSlicedata>k__BackingField", TypeSpec::Class("Cine.TwoDSliceData", 2)),
			("_label", TypeSpec::String),
			("_alias", TypeSpec::String),
			("<Previous>k__BackingField", TypeSpec::Object),
		],
		2,
	);
	msg.class(
		3,
		"Cine.TwoDSliceData",
		&[
			("<PatientPosition>k__BackingField", TypeSpec::Class("Cine.PatientPosition", 2)),
			("<Origin>k__BackingField", TypeSpec::Class("Geometry.Point3D", 2)),
			("<VoxelSize>k__BackingField", TypeSpec::Class("Geometry.VoxelSize", 2)),
			("<Dimension>k__BackingField", TypeSpec::Class("Geometry.Dimension", 2)),
			("<Orientation>k__BackingField", TypeSpec::Class("Geometry.Orientation", 2)),
			("<Data>k__BackingField", TypeSpec::PrimitiveArray(prim::BYTE)),
			("<Elapsed100NanosecondInterval>k__BackingField", TypeSpec::Primitive(prim::INT64)),
		],
		2,
	);
	msg.class(4, "Cine.PatientPosition", &[("value__", TypeSpec::Primitive(prim::INT32))], 2).i32(3);
	msg.class(5, "Geometry.Point3D", &point, 2).f64(-120.0).f64(35.5).f64(12.0);
	msg.class(
		6,
		"Geometry.VoxelSize",
		&[
			("XInmm", TypeSpec::Primitive(prim::DOUBLE)),
			("YInmm", TypeSpec::Primitive(prim::DOUBLE)),
			("ZInmm", TypeSpec::Primitive(prim::DOUBLE)),
		],
		2,
	)
	.f64(1.25)
	.f64(1.25)
	.f64(6.0);
	msg.class(
		7,
		"Geometry.Dimension",
		&[
			("Columns", TypeSpec::Primitive(prim::INT32)),
			("Rows", TypeSpec::Primitive(prim::INT32)),
			("Slices", TypeSpec::Primitive(prim::INT32)),
		],
		2,
	)
	.i32(COLUMNS as i32)
	.i32(ROWS as i32)
	.i32(1);
	msg.class(
		8,
		"Geometry.Orientation",
		&[
			("RowDirectionCosines", TypeSpec::Class("Geometry.Point3D", 2)),
			("ColumnDirectionCosines", TypeSpec::Class("Geometry.Point3D", 2)),
		],
		2,
	);
	msg.class_with_id(9, 5).f64(1.0).f64(0.0).f64(0.0);
	msg.class_with_id(10, 5).f64(0.0).f64(1.0).f64(0.0);
	msg.byte_array(11, &data).i64(TICKS);
	msg.string_record(12, "frame 1").reference(12).null().end();
	msg.build()
}

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Write `bytes` to a fixture file under the target directory and return its path.
pub fn write_fixture(name: &str, bytes: &[u8]) -> PathBuf {
	let dir = target_dir().join("nrbfdoc-fixtures");
	std::fs::create_dir_all(&dir).expect("fixture dir is creatable");
	let path = dir.join(name);
	std::fs::write(&path, bytes).expect("fixture is writable");
	path
}
