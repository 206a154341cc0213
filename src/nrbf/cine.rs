//! Cine slice extraction from a distilled `TwoDSlicedata` graph.

use crate::nrbf::{DistilledValue, ProtocolError, Result, ValuePath};

const SLICE_ROOT: &str = "TwoDSlicedata";
/// `PatientPosition.value__` for head-first supine.
const HEAD_FIRST_SUPINE: i64 = 3;
/// Seconds between 1900-01-01 and 1970-01-01, UTC.
const SECONDS_1900_TO_UNIX_EPOCH: i64 = 2_208_988_800;
const TICKS_PER_SECOND: i64 = 10_000_000;
const BYTES_PER_PIXEL: usize = 2;

const TRANSVERSAL_COSINES: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
const SAGITTAL_COSINES: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, -1.0];
const CORONAL_COSINES: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 0.0, -1.0];

/// Anatomical plane of a cine slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceDirection {
	/// Axial plane.
	Transversal,
	/// Left-right plane.
	Sagittal,
	/// Front-back plane.
	Coronal,
}

impl SliceDirection {
	/// Classify row and column direction cosines, `[row.xyz, col.xyz]`.
	pub fn from_cosines(cosines: &[f64; 6]) -> Option<Self> {
		if all_close(cosines, &TRANSVERSAL_COSINES) {
			Some(Self::Transversal)
		} else if all_close(cosines, &SAGITTAL_COSINES) {
			Some(Self::Sagittal)
		} else if all_close(cosines, &CORONAL_COSINES) {
			Some(Self::Coronal)
		} else {
			None
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Transversal => "transversal",
			Self::Sagittal => "sagittal",
			Self::Coronal => "coronal",
		}
	}
}

/// Geometry, timing, and pixels of one 2D cine frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CineSlice {
	/// Patient-space origin in mm.
	pub origin: [f64; 3],
	/// Voxel size in mm, in stored order.
	pub voxel_size: [f64; 3],
	/// Outer pixel dimension.
	pub columns: usize,
	/// Inner pixel dimension.
	pub rows: usize,
	/// Row direction cosines.
	pub row_direction: [f64; 3],
	/// Column direction cosines.
	pub column_direction: [f64; 3],
	/// Plane derived from the direction cosines.
	pub direction: SliceDirection,
	/// 100 ns ticks since 1900-01-01T00:00:00Z.
	pub elapsed_ticks: i64,
	/// One intensity byte per pixel, `columns * rows`, column-major outer.
	pub pixels: Vec<u8>,
}

impl CineSlice {
	/// Extract a slice from the distilled root of a cine file.
	pub fn from_value(value: &DistilledValue) -> Result<Self> {
		let position = integer(value, "TwoDSlicedata.PatientPosition.value__")?;
		if position != HEAD_FIRST_SUPINE {
			return Err(mismatch(
				"TwoDSlicedata.PatientPosition.value__",
				format!("expected patient position {HEAD_FIRST_SUPINE}, got {position}"),
			));
		}

		let slices = integer(value, "TwoDSlicedata.Dimension.Slices")?;
		if slices != 1 {
			return Err(mismatch("TwoDSlicedata.Dimension.Slices", format!("expected one slice, got {slices}")));
		}
		let columns = count(value, "TwoDSlicedata.Dimension.Columns")?;
		let rows = count(value, "TwoDSlicedata.Dimension.Rows")?;

		let row_direction = vec3(value, "TwoDSlicedata.Orientation.RowDirectionCosines")?;
		let column_direction = vec3(value, "TwoDSlicedata.Orientation.ColumnDirectionCosines")?;
		let cosines = [
			row_direction[0],
			row_direction[1],
			row_direction[2],
			column_direction[0],
			column_direction[1],
			column_direction[2],
		];
		let direction = SliceDirection::from_cosines(&cosines)
			.ok_or_else(|| mismatch("TwoDSlicedata.Orientation", format!("unknown direction cosines {cosines:?}")))?;

		let data = at(value, "TwoDSlicedata.Data")?;
		let data = data
			.as_bytes()
			.ok_or_else(|| mismatch("TwoDSlicedata.Data", format!("expected Bytes, got {}", data.kind_name())))?;
		let expected = columns
			.checked_mul(rows)
			.and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
			.ok_or_else(|| mismatch("TwoDSlicedata.Dimension", "pixel count overflows".to_owned()))?;
		if data.len() != expected {
			return Err(mismatch(
				"TwoDSlicedata.Data",
				format!("expected {expected} bytes for {columns}x{rows} pixels, got {}", data.len()),
			));
		}
		let pixels = data.iter().skip(1).step_by(BYTES_PER_PIXEL).copied().collect();

		Ok(Self {
			origin: vec3(value, "TwoDSlicedata.Origin")?,
			voxel_size: [
				number(value, "TwoDSlicedata.VoxelSize.XInmm")?,
				number(value, "TwoDSlicedata.VoxelSize.YInmm")?,
				number(value, "TwoDSlicedata.VoxelSize.ZInmm")?,
			],
			columns,
			rows,
			row_direction,
			column_direction,
			direction,
			elapsed_ticks: integer(value, "TwoDSlicedata.Elapsed100NanosecondInterval")?,
			pixels,
		})
	}

	/// Smallest voxel edge, used for all three axes of the in-plane grid.
	pub fn isotropic_spacing(&self) -> f64 {
		self.voxel_size.iter().copied().fold(f64::INFINITY, f64::min)
	}

	/// Acquisition time as seconds since the Unix epoch, UTC.
	pub fn unix_seconds(&self) -> f64 {
		let whole = self.elapsed_ticks.div_euclid(TICKS_PER_SECOND) - SECONDS_1900_TO_UNIX_EPOCH;
		let frac = self.elapsed_ticks.rem_euclid(TICKS_PER_SECOND) as f64 / TICKS_PER_SECOND as f64;
		whole as f64 + frac
	}

	/// Pixel intensity at (`column`, `row`).
	pub fn pixel(&self, column: usize, row: usize) -> Option<u8> {
		if column >= self.columns || row >= self.rows {
			return None;
		}
		self.pixels.get(column * self.rows + row).copied()
	}
}

fn all_close(actual: &[f64; 6], expected: &[f64; 6]) -> bool {
	actual.iter().zip(expected).all(|(a, b)| (a - b).abs() <= 1e-8 + 1e-5 * b.abs())
}

fn mismatch(path: &str, reason: String) -> ProtocolError {
	ProtocolError::SchemaMismatch { path: path.to_owned(), reason }
}

fn at<'v>(value: &'v DistilledValue, path: &str) -> Result<&'v DistilledValue> {
	let parsed = ValuePath::parse(path)?;
	value.lookup(&parsed).map_err(|_| mismatch(path, format!("missing under {SLICE_ROOT}")))
}

fn number(value: &DistilledValue, path: &str) -> Result<f64> {
	let item = at(value, path)?;
	item.as_f64().ok_or_else(|| mismatch(path, format!("expected number, got {}", item.kind_name())))
}

fn integer(value: &DistilledValue, path: &str) -> Result<i64> {
	let item = at(value, path)?;
	match item {
		DistilledValue::Int(int) => Ok(int.as_i64()),
		DistilledValue::Timestamp(ticks) => i64::try_from(*ticks).map_err(|_| mismatch(path, format!("tick count {ticks} out of range"))),
		other => Err(mismatch(path, format!("expected integer, got {}", other.kind_name()))),
	}
}

fn count(value: &DistilledValue, path: &str) -> Result<usize> {
	let raw = integer(value, path)?;
	usize::try_from(raw).map_err(|_| mismatch(path, format!("expected non-negative count, got {raw}")))
}

fn vec3(value: &DistilledValue, path: &str) -> Result<[f64; 3]> {
	Ok([
		number(value, &format!("{path}.X"))?,
		number(value, &format!("{path}.Y"))?,
		number(value, &format!("{path}.Z"))?,
	])
}
