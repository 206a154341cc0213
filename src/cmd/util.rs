use std::io::Write;

use nrbfdoc::nrbf::{DecodeOptions, DistillOptions, Result};
use serde::Serialize;

/// Write `payload` to stdout as pretty JSON followed by a newline.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	let mut out = std::io::stdout().lock();
	serde_json::to_writer_pretty(&mut out, payload).map_err(std::io::Error::from)?;
	writeln!(out)?;
	Ok(())
}

/// Reader limits from optional CLI overrides.
pub(crate) fn decode_options(max_depth: Option<u32>, max_array: Option<usize>) -> DecodeOptions {
	let mut opt = DecodeOptions::default();
	if let Some(max_depth) = max_depth {
		opt.max_depth = max_depth;
	}
	if let Some(max_array) = max_array {
		opt.max_array_elems = max_array;
	}
	opt
}

/// Distiller limits from an optional CLI override.
pub(crate) fn distill_options(max_depth: Option<u32>) -> DistillOptions {
	let mut opt = DistillOptions::default();
	if let Some(max_depth) = max_depth {
		opt.max_depth = max_depth;
	}
	opt
}
