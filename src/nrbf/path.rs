use std::fmt;

use crate::nrbf::{ProtocolError, Result};

/// One parsed operation in a value path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a mapping member by normalized name.
	Field(String),
	/// Select a sequence element by zero-based index.
	Index(usize),
}

/// Parsed value path expression, e.g. `TwoDSlicedata.Origin.X` or `[0].Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl ValuePath {
	/// Parse dotted member syntax with optional `[index]` selectors.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || ProtocolError::InvalidValuePath { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			let start = idx;
			while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
				idx += 1;
			}
			if idx > start {
				steps.push(PathStep::Field(input[start..idx].to_owned()));
			} else if bytes[idx] != b'[' {
				return Err(invalid());
			}

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let n_start = idx;
				while idx < bytes.len() && bytes[idx].is_ascii_digit() {
					idx += 1;
				}
				if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
					return Err(invalid());
				}

				let number = input[n_start..idx].parse::<usize>().map_err(|_| invalid())?;
				steps.push(PathStep::Index(number));
				idx += 1;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid());
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid());
				}
			}
		}

		Ok(Self { steps })
	}

	/// Render the first `len` steps back to path syntax.
	pub fn render_prefix(&self, len: usize) -> String {
		let mut out = String::new();
		for step in self.steps.iter().take(len) {
			match step {
				PathStep::Field(name) => {
					if !out.is_empty() {
						out.push('.');
					}
					out.push_str(name);
				}
				PathStep::Index(index) => out.push_str(&format!("[{index}]")),
			}
		}
		out
	}
}

impl fmt::Display for ValuePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render_prefix(self.steps.len()))
	}
}
