use std::fmt;
use std::io::Write;

use nrbfdoc::nrbf::DistilledValue;

/// Output truncation and formatting limits for distilled values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of members printed for a single mapping.
	pub max_fields_per_mapping: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for sequences.
	pub max_array_items: usize,
	/// Maximum recursive print depth for nested sequences/mappings.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_fields_per_mapping: 80,
			max_string_len: 200,
			max_array_items: 16,
			max_print_depth: 8,
		}
	}
}

/// Print one distilled value tree to stdout.
pub fn print_value(value: &DistilledValue, indent: usize, options: PrintOptions) -> std::io::Result<()> {
	let mut out = String::new();
	render_value(&mut out, value, indent, 0, options).map_err(std::io::Error::other)?;
	std::io::stdout().lock().write_all(out.as_bytes())
}

/// Render one distilled value tree as indented text.
pub fn render_value(out: &mut impl fmt::Write, value: &DistilledValue, indent: usize, depth: u32, options: PrintOptions) -> fmt::Result {
	let pad = " ".repeat(indent);
	match value {
		DistilledValue::Null => writeln!(out, "{pad}null"),
		DistilledValue::Bool(v) => writeln!(out, "{pad}{v}"),
		DistilledValue::Int(v) => writeln!(out, "{pad}{}", v.as_i64()),
		DistilledValue::Float64(v) => writeln!(out, "{pad}{v}"),
		DistilledValue::Timestamp(v) => writeln!(out, "{pad}ticks({v})"),
		DistilledValue::Bytes(v) => writeln!(out, "{pad}bytes[{}]", v.len()),
		DistilledValue::String(v) => writeln!(out, "{pad}\"{}\"", truncate(v, options.max_string_len)),
		DistilledValue::Sequence(items) => {
			if depth >= options.max_print_depth {
				return writeln!(out, "{pad}[... {} items]", items.len());
			}
			writeln!(out, "{pad}[")?;
			for item in items.iter().take(options.max_array_items) {
				render_value(out, item, indent + 2, depth + 1, options)?;
			}
			if items.len() > options.max_array_items {
				writeln!(out, "{pad}  ... {} more", items.len() - options.max_array_items)?;
			}
			writeln!(out, "{pad}]")
		}
		DistilledValue::Mapping(item) => {
			if depth >= options.max_print_depth {
				return writeln!(out, "{pad}{} {{ ... }}", item.class_name);
			}
			writeln!(out, "{pad}{} {{", item.class_name)?;
			for entry in item.entries.iter().take(options.max_fields_per_mapping) {
				write!(out, "{pad}  {} = ", entry.name)?;
				if matches!(entry.value, DistilledValue::Mapping(_) | DistilledValue::Sequence(_)) {
					writeln!(out)?;
					render_value(out, &entry.value, indent + 4, depth + 1, options)?;
				} else {
					render_value(out, &entry.value, 0, depth + 1, options)?;
				}
			}
			if item.len() > options.max_fields_per_mapping {
				writeln!(out, "{pad}  ... {} more fields", item.len() - options.max_fields_per_mapping)?;
			}
			writeln!(out, "{pad}}}")
		}
	}
}

/// Cut `input` to `max_len` characters, marking the cut.
pub fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
