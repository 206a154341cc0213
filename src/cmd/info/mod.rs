use std::path::PathBuf;

use nrbfdoc::nrbf::{NrbfFile, Result};

use crate::cmd::util::{decode_options, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-array")]
	pub max_array: Option<usize>,
}

/// Print header fields and per-kind record counts.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		max_depth,
		max_array,
	} = args;

	let file = NrbfFile::open_with(&path, &decode_options(max_depth, max_array))?;
	let stats = file.stats();

	let mut kinds: Vec<_> = stats.kinds.iter().map(|(kind, count)| (kind.as_str(), *count)).collect();
	kinds.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			byte_len: stats.byte_len,
			version: format!("{}.{}", stats.header.major_version, stats.header.minor_version),
			root_id: stats.header.root_id,
			header_id: stats.header.header_id,
			record_count: stats.record_count,
			trailing_bytes: stats.trailing_bytes,
			kinds: kinds.into_iter().map(|(kind, count)| KindCountJson { kind, count }).collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("byte_len: {}", stats.byte_len);
	println!("version: {}.{}", stats.header.major_version, stats.header.minor_version);
	println!("root_id: {}", stats.header.root_id);
	println!("header_id: {}", stats.header.header_id);
	println!("record_count: {}", stats.record_count);
	println!("trailing_bytes: {}", stats.trailing_bytes);
	println!("kinds:");
	for (kind, count) in kinds {
		println!("  {kind}: {count}");
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	byte_len: usize,
	version: String,
	root_id: u32,
	header_id: u32,
	record_count: usize,
	trailing_bytes: usize,
	kinds: Vec<KindCountJson>,
}

#[derive(serde::Serialize)]
struct KindCountJson {
	kind: &'static str,
	count: usize,
}
