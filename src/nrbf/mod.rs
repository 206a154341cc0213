mod bytes;
mod cine;
mod distill;
mod error;
mod file;
mod kind;
mod path;
mod reader;
mod record;
mod value;

/// Bounded little-endian byte cursor.
pub use bytes::Cursor;
/// Cine slice extraction types.
pub use cine::{CineSlice, SliceDirection};
/// Graph distillation entry points and options.
pub use distill::{DistillOptions, distill, distill_record, distill_with, normalize_member_name};
/// Error and result aliases.
pub use error::{ProtocolError, Result};
/// File abstraction and stream statistics.
pub use file::{NrbfFile, StreamStats};
/// Wire enumerations.
pub use kind::{BinaryArrayType, BinaryType, PrimitiveType, RecordKind};
/// Value path parser types.
pub use path::{PathStep, ValuePath};
/// Record reader entry points and options.
pub use reader::{DecodeOptions, ParsedStream, RecordReader, parse_bytes, parse_reader};
/// Decoded record types.
pub use record::{
	BinaryArrayRecord, BinaryLibrary, ClassMetadata, ClassRecord, Member, MemberType, ObjectArrayRecord, PrimitiveArrayRecord, PrimitiveValue, Record, RecordIdx,
	SerializationHeader, StringRecord,
};
/// Distilled value types.
pub use value::{DistilledValue, Integer, Mapping, MappingEntry};
