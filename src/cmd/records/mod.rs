use std::path::PathBuf;

use nrbfdoc::nrbf::{NrbfFile, Record, RecordIdx, Result};

use crate::cmd::print::truncate;
use crate::cmd::util::{decode_options, emit_json};

const MAX_SUMMARY_LEN: usize = 60;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub limit: Option<usize>,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-array")]
	pub max_array: Option<usize>,
}

/// List stored records in completion order.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		limit,
		json,
		max_depth,
		max_array,
	} = args;

	let file = NrbfFile::open_with(&path, &decode_options(max_depth, max_array))?;
	let stream = file.stream();
	let limit = limit.unwrap_or(usize::MAX);

	if json {
		let payload = RecordsJson {
			path: path.display().to_string(),
			total: stream.len(),
			records: stream
				.iter()
				.take(limit)
				.map(|(idx, record)| RecordRowJson {
					index: idx.0,
					kind: record.kind().as_str(),
					object_id: record.object_id(),
					summary: summarize(record),
				})
				.collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("records: {}", stream.len());
	for (idx, record) in stream.iter().take(limit) {
		let id = record.object_id().map_or_else(|| "-".to_owned(), |id| id.to_string());
		println!("  {:>6} {:<32} id={:<6} {}", idx.0, record.kind().as_str(), id, summarize(record));
	}
	if stream.len() > limit {
		println!("  ... {} more", stream.len() - limit);
	}

	Ok(())
}

/// One-line description of a record's payload.
pub(crate) fn summarize(record: &Record) -> String {
	match record {
		Record::SerializationHeader(header) => format!(
			"root={} header={} v{}.{}",
			header.root_id, header.header_id, header.major_version, header.minor_version
		),
		Record::ClassWithId(class) | Record::SystemClassWithMembersAndTypes(class) | Record::ClassWithMembersAndTypes(class) => {
			format!("{} ({} members, metadata {})", class.metadata.name, class.metadata.member_count(), class.metadata_id)
		}
		Record::BinaryObjectString(item) => format!("\"{}\"", truncate(&item.value, MAX_SUMMARY_LEN)),
		Record::BinaryArray(item) => format!("{:?} {:?} of {:?}", item.array_type, item.lengths, item.element_type.category()),
		Record::MemberReference { id_ref } => format!("-> {id_ref}"),
		Record::ObjectNull | Record::MessageEnd => String::new(),
		Record::BinaryLibrary(item) => truncate(&item.name, MAX_SUMMARY_LEN),
		Record::ObjectNullMultiple256 { null_count } => format!("{null_count} nulls"),
		Record::ArraySinglePrimitive(item) => format!("bytes[{}]", item.values.len()),
		Record::ArraySingleObject(item) => format!("objects[{}] {}", item.elements.len(), first_slots(&item.elements)),
	}
}

fn first_slots(elements: &[RecordIdx]) -> String {
	let shown: Vec<_> = elements.iter().take(4).map(|idx| format!("#{}", idx.0)).collect();
	if elements.len() > shown.len() {
		format!("[{}, ...]", shown.join(", "))
	} else {
		format!("[{}]", shown.join(", "))
	}
}

#[derive(serde::Serialize)]
struct RecordsJson {
	path: String,
	total: usize,
	records: Vec<RecordRowJson>,
}

#[derive(serde::Serialize)]
struct RecordRowJson {
	index: usize,
	kind: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	object_id: Option<u32>,
	summary: String,
}
