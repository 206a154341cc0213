use thiserror::Error;

use crate::nrbf::{BinaryType, RecordKind};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while reading, decoding, and distilling MS-NRBF streams.
#[derive(Debug, Error)]
pub enum ProtocolError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// First record of the stream was not a serialization header.
	#[error("first record must be SerializationHeader, got {found:?}")]
	HeaderNotFirst {
		/// Kind of the record found in first position.
		found: RecordKind,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Record tag byte outside the supported kind set.
	#[error("unknown record type 0x{0:02X}")]
	UnknownRecordKind(u8),
	/// Primitive type byte outside the supported primitive set.
	#[error("unknown primitive type 0x{tag:02X} at offset {at}")]
	UnknownPrimitiveKind {
		/// Offending primitive type byte.
		tag: u8,
		/// Offset of the byte.
		at: usize,
	},
	/// Member type category byte outside `0..=7`.
	#[error("unknown member type category 0x{tag:02X} at offset {at}")]
	UnknownMemberTypeKind {
		/// Offending category byte.
		tag: u8,
		/// Offset of the byte.
		at: usize,
	},
	/// Binary array shape byte outside `0..=5`.
	#[error("unknown binary array type 0x{tag:02X} at offset {at}")]
	UnknownBinaryArrayType {
		/// Offending shape byte.
		tag: u8,
		/// Offset of the byte.
		at: usize,
	},
	/// Binary array element category without a decode rule.
	#[error("unsupported binary array element type {category:?} (object id {object_id})")]
	UnsupportedArrayElementKind {
		/// Array object id.
		object_id: u32,
		/// Declared element category.
		category: BinaryType,
	},
	/// Primitive array element type without a decode rule.
	#[error("unsupported primitive array element type 0x{tag:02X} (object id {object_id})")]
	UnsupportedPrimitiveArrayKind {
		/// Array object id.
		object_id: u32,
		/// Primitive type byte.
		tag: u8,
	},
	/// Nested record kind is not permitted for the declared member category.
	#[error("{owner}: {category:?} slot cannot hold {found:?}")]
	UnexpectedMemberKind {
		/// `Class.member` or `array <id>[slot]` being filled.
		owner: String,
		/// Declared member category.
		category: BinaryType,
		/// Kind of the decoded record.
		found: RecordKind,
	},
	/// `ClassWithId` metadata id did not resolve to exactly one class record.
	#[error("expected exactly one metadata record with object id {metadata_id}, found {found}")]
	AmbiguousOrMissingMetadata {
		/// Requested metadata id.
		metadata_id: u32,
		/// Number of matching declarations.
		found: usize,
	},
	/// Member reference did not resolve to exactly one record.
	#[error("expected exactly one record with object id {id_ref}, found {found}")]
	AmbiguousOrMissingReference {
		/// Referenced object id.
		id_ref: u32,
		/// Number of matching records.
		found: usize,
	},
	/// Header root id did not resolve to exactly one record.
	#[error("root object {root_id} not found (matches: {found})")]
	RootNotFound {
		/// Declared root id.
		root_id: u32,
		/// Number of matching records.
		found: usize,
	},
	/// Length-prefixed string bytes were not valid UTF-8.
	#[error("invalid utf-8 string at offset {at}")]
	InvalidStringEncoding {
		/// Offset of the first string byte.
		at: usize,
	},
	/// 7-bit length prefix ran past five bytes or exceeded `i32::MAX`.
	#[error("invalid length prefix at offset {at}")]
	InvalidLengthPrefix {
		/// Offset of the first prefix byte.
		at: usize,
	},
	/// Signed count field was negative.
	#[error("negative {what} {value} at offset {at}")]
	NegativeLength {
		/// Field being read.
		what: &'static str,
		/// Parsed signed value.
		value: i32,
		/// Offset after the read.
		at: usize,
	},
	/// Null run covered more slots than remained in its array.
	#[error("null run of {count} overflows array: {remaining} slots remaining")]
	NullRunOverflow {
		/// Nulls declared by the run.
		count: usize,
		/// Slots still unfilled.
		remaining: usize,
	},
	/// Reader recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Distiller recursion depth exceeded configured limit.
	#[error("distill depth exceeded (max={max_depth})")]
	DistillDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Record index does not address a record of the stream.
	#[error("record index {index} out of range ({len} records)")]
	RecordIndexOutOfRange {
		/// Requested position.
		index: usize,
		/// Number of stored records.
		len: usize,
	},
	/// Array element count exceeded configured limit.
	#[error("array too large: count={count}, max={max}")]
	ArrayTooLarge {
		/// Requested element count.
		count: usize,
		/// Maximum permitted element count.
		max: usize,
	},
	/// Record kind has no distilled value form.
	#[error("record kind {kind:?} cannot be distilled")]
	UndistillableRecord {
		/// Kind of the offending record.
		kind: RecordKind,
	},
	/// Reference resolved to an object currently being distilled.
	#[error("cyclic reference to object id {id}")]
	CyclicReference {
		/// Object id closing the cycle.
		id: u32,
	},
	/// Value path expression syntax is invalid.
	#[error("invalid value path: {path}")]
	InvalidValuePath {
		/// Original user-provided path string.
		path: String,
	},
	/// Value path did not select anything in the distilled tree.
	#[error("value path not found: {path}")]
	ValuePathNotFound {
		/// Rendered path prefix that failed.
		path: String,
	},
	/// Distilled tree does not match the expected consumer schema.
	#[error("schema mismatch at {path}: {reason}")]
	SchemaMismatch {
		/// Dotted path of the offending value.
		path: String,
		/// Human-readable expectation.
		reason: String,
	},
}
