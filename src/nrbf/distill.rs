use std::collections::HashSet;

use log::{debug, trace};

use crate::nrbf::{ClassRecord, DistilledValue, Mapping, Member, ParsedStream, ProtocolError, Record, RecordIdx, Result};

const BACKING_FIELD_SUFFIX: &str = ">k__BackingField";

/// Runtime limits for distillation.
#[derive(Debug, Clone)]
pub struct DistillOptions {
	/// Maximum recursion depth through nested records and references.
	pub max_depth: u32,
}

impl Default for DistillOptions {
	fn default() -> Self {
		Self { max_depth: 256 }
	}
}

/// Distill the whole stream, starting from the header's root object.
pub fn distill(stream: &ParsedStream) -> Result<DistilledValue> {
	distill_with(stream, &DistillOptions::default())
}

/// Distill the whole stream with explicit limits.
pub fn distill_with(stream: &ParsedStream, opt: &DistillOptions) -> Result<DistilledValue> {
	debug!("distilling from root id {}", stream.root_id());
	distill_record(stream, RecordIdx(0), opt)
}

/// Distill the subtree rooted at one record.
pub fn distill_record(stream: &ParsedStream, idx: RecordIdx, opt: &DistillOptions) -> Result<DistilledValue> {
	let mut distiller = Distiller {
		stream,
		opt,
		in_progress: HashSet::new(),
	};
	distiller.record(idx, 0)
}

/// Recover a logical field name from a serialized member name.
///
/// `<Name>k__BackingField` becomes `Name`; otherwise leading underscores are dropped.
pub fn normalize_member_name(raw: &str) -> &str {
	if let Some(inner) = raw.strip_prefix('<').and_then(|rest| rest.rfind(BACKING_FIELD_SUFFIX).map(|end| &rest[..end])) {
		return inner;
	}
	raw.trim_start_matches('_')
}

struct Distiller<'a> {
	stream: &'a ParsedStream,
	opt: &'a DistillOptions,
	in_progress: HashSet<u32>,
}

impl<'a> Distiller<'a> {
	fn record(&mut self, idx: RecordIdx, depth: u32) -> Result<DistilledValue> {
		if depth > self.opt.max_depth {
			return Err(ProtocolError::DistillDepthExceeded { max_depth: self.opt.max_depth });
		}

		let stream = self.stream;
		let record = stream.get(idx).ok_or(ProtocolError::RecordIndexOutOfRange {
			index: idx.0,
			len: stream.len(),
		})?;
		trace!("distill record {} {}", idx.0, record.kind().as_str());

		match record {
			Record::SerializationHeader(header) => {
				let root = stream.find_unique(header.root_id).map_err(|found| ProtocolError::RootNotFound {
					root_id: header.root_id,
					found,
				})?;
				self.record(root, depth + 1)
			}
			Record::MemberReference { id_ref } => {
				let target = stream
					.find_unique(*id_ref)
					.map_err(|found| ProtocolError::AmbiguousOrMissingReference { id_ref: *id_ref, found })?;
				if self.in_progress.contains(id_ref) {
					return Err(ProtocolError::CyclicReference { id: *id_ref });
				}
				self.record(target, depth + 1)
			}
			Record::ObjectNull | Record::ObjectNullMultiple256 { .. } => Ok(DistilledValue::Null),
			Record::BinaryObjectString(item) => Ok(DistilledValue::String(item.value.as_str().into())),
			Record::ArraySinglePrimitive(item) => Ok(DistilledValue::Bytes(item.values.clone())),
			Record::BinaryArray(item) => self.enter(item.object_id, |this| this.sequence(&item.elements, depth)),
			Record::ArraySingleObject(item) => self.enter(item.object_id, |this| this.sequence(&item.elements, depth)),
			Record::ClassWithId(class) | Record::SystemClassWithMembersAndTypes(class) | Record::ClassWithMembersAndTypes(class) => {
				self.enter(class.object_id, |this| this.class(class, depth))
			}
			Record::BinaryLibrary(_) | Record::MessageEnd => Err(ProtocolError::UndistillableRecord { kind: record.kind() }),
		}
	}

	fn enter(&mut self, object_id: u32, body: impl FnOnce(&mut Self) -> Result<DistilledValue>) -> Result<DistilledValue> {
		if !self.in_progress.insert(object_id) {
			return Err(ProtocolError::CyclicReference { id: object_id });
		}
		let out = body(self);
		self.in_progress.remove(&object_id);
		out
	}

	fn sequence(&mut self, elements: &[RecordIdx], depth: u32) -> Result<DistilledValue> {
		let mut items = Vec::with_capacity(elements.len());
		for element in elements {
			items.push(self.record(*element, depth + 1)?);
		}
		Ok(DistilledValue::Sequence(items))
	}

	fn class(&mut self, class: &ClassRecord, depth: u32) -> Result<DistilledValue> {
		let metadata = &class.metadata;
		let mut mapping = Mapping::new(&metadata.name);
		for (name, member) in metadata.member_names.iter().zip(&class.members) {
			let value = match member {
				Member::Primitive(value) => DistilledValue::from(*value),
				Member::Record(idx) => self.record(*idx, depth + 1)?,
			};
			mapping.insert(normalize_member_name(name), value);
		}
		Ok(DistilledValue::Mapping(mapping))
	}
}
