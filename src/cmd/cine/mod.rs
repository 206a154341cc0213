use std::path::PathBuf;

use nrbfdoc::nrbf::{CineSlice, NrbfFile, Result};

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

/// Extract the 2D cine slice and print its geometry, timing, and intensity range.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		max_depth,
		max_array,
	} = args;

	let file = NrbfFile::open_with(&path, &decode_options(max_depth, max_array))?;
	let slice = CineSlice::from_value(&file.distill()?)?;
	let (min, max) = intensity_range(&slice);

	if json {
		let payload = CineJson {
			path: path.display().to_string(),
			direction: slice.direction.as_str(),
			columns: slice.columns,
			rows: slice.rows,
			origin: slice.origin,
			voxel_size: slice.voxel_size,
			isotropic_spacing: slice.isotropic_spacing(),
			row_direction: slice.row_direction,
			column_direction: slice.column_direction,
			elapsed_ticks: slice.elapsed_ticks,
			unix_seconds: slice.unix_seconds(),
			min_intensity: min,
			max_intensity: max,
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("direction: {}", slice.direction.as_str());
	println!("size: {}x{}", slice.columns, slice.rows);
	println!("origin: {:?}", slice.origin);
	println!("voxel_size: {:?}", slice.voxel_size);
	println!("isotropic_spacing: {}", slice.isotropic_spacing());
	println!("row_direction: {:?}", slice.row_direction);
	println!("column_direction: {:?}", slice.column_direction);
	println!("elapsed_ticks: {}", slice.elapsed_ticks);
	println!("unix_seconds: {:.3}", slice.unix_seconds());
	match (min, max) {
		(Some(min), Some(max)) => println!("intensity: {min}..={max}"),
		_ => println!("intensity: -"),
	}

	Ok(())
}

fn intensity_range(slice: &CineSlice) -> (Option<u8>, Option<u8>) {
	(slice.pixels.iter().copied().min(), slice.pixels.iter().copied().max())
}

#[derive(serde::Serialize)]
struct CineJson {
	path: String,
	direction: &'static str,
	columns: usize,
	rows: usize,
	origin: [f64; 3],
	voxel_size: [f64; 3],
	isotropic_spacing: f64,
	row_direction: [f64; 3],
	column_direction: [f64; 3],
	elapsed_ticks: i64,
	unix_seconds: f64,
	min_intensity: Option<u8>,
	max_intensity: Option<u8>,
}
