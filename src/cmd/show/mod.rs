use std::path::PathBuf;

use nrbfdoc::nrbf::{DistilledValue, NrbfFile, Result, ValuePath};

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::{decode_options, distill_options, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long = "path")]
	pub path_expr: Option<String>,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-array")]
	pub max_array: Option<usize>,
	#[arg(long = "distill-depth")]
	pub distill_depth: Option<u32>,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
}

/// Distill the stream from its root and print the value, or the part selected by `--path`.
pub fn run(args: Args) -> Result<()> {
	let Args {
		file: path,
		path_expr,
		json,
		max_depth,
		max_array,
		distill_depth,
		max_items,
	} = args;

	let value_path = path_expr.as_deref().map(ValuePath::parse).transpose()?;

	let file = NrbfFile::open_with(&path, &decode_options(max_depth, max_array))?;
	let root = file.distill_with(&distill_options(distill_depth))?;
	let value = match &value_path {
		Some(value_path) => root.lookup(value_path)?,
		None => &root,
	};

	if json {
		let payload = ShowJson {
			path: path.display().to_string(),
			root_id: file.stream().root_id(),
			path_expr: value_path.as_ref().map(ToString::to_string),
			value,
		};
		return emit_json(&payload);
	}

	let mut print = PrintOptions::default();
	if let Some(max_items) = max_items {
		print.max_array_items = max_items;
	}

	println!("path: {}", path.display());
	println!("root_id: {}", file.stream().root_id());
	if let Some(value_path) = &value_path {
		println!("path_expr: {value_path}");
	}
	println!("value:");
	print_value(value, 2, print)?;

	Ok(())
}

#[derive(serde::Serialize)]
struct ShowJson<'a> {
	path: String,
	root_id: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	path_expr: Option<String>,
	value: &'a DistilledValue,
}

#[cfg(test)]
mod tests;
