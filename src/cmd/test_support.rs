use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use nrbfdoc_testkit::sample_cine_message;

const BIN_NAME: &str = if cfg!(windows) { "nrbfdoc.exe" } else { "nrbfdoc" };

static BIN: OnceLock<PathBuf> = OnceLock::new();

/// Finished `nrbfdoc` run.
pub(crate) struct Invocation {
	args: String,
	output: Output,
}

impl Invocation {
	pub(crate) fn stdout(&self) -> String {
		String::from_utf8_lossy(&self.output.stdout).into_owned()
	}

	pub(crate) fn stderr(&self) -> String {
		String::from_utf8_lossy(&self.output.stderr).into_owned()
	}

	/// Stdout parsed as JSON; the run must have succeeded.
	pub(crate) fn json(&self) -> serde_json::Value {
		let stdout = self.success();
		serde_json::from_str(&stdout).unwrap_or_else(|err| panic!("`nrbfdoc {}` printed invalid json ({err}): {stdout}", self.args))
	}

	/// Stdout of a run that must have succeeded.
	pub(crate) fn success(&self) -> String {
		assert!(
			self.output.status.success(),
			"`nrbfdoc {}` failed with {}: {}",
			self.args,
			self.output.status,
			self.stderr()
		);
		self.stdout()
	}

	/// Stderr of a run that must have failed through the `error:` path.
	pub(crate) fn failure(&self) -> String {
		let stderr = self.stderr();
		assert_eq!(self.output.status.code(), Some(1), "`nrbfdoc {}` should exit 1, stderr: {stderr}", self.args);
		assert!(stderr.starts_with("error: "), "stderr: {stderr}");
		stderr
	}
}

pub(crate) fn nrbfdoc(args: &[&str]) -> Invocation {
	let output = Command::new(bin()).args(args).output().expect("nrbfdoc command executes");
	Invocation {
		args: args.join(" "),
		output,
	}
}

/// Write `bytes` under the fixture dir and return the path as a CLI argument.
pub(crate) fn fixture_arg(name: &str, bytes: &[u8]) -> String {
	nrbfdoc_testkit::write_fixture(name, bytes).to_string_lossy().into_owned()
}

/// Sample cine frame written under `name`.
pub(crate) fn sample_fixture(name: &str) -> String {
	fixture_arg(name, &sample_cine_message())
}

fn bin() -> &'static PathBuf {
	BIN.get_or_init(|| option_env!("CARGO_BIN_EXE_nrbfdoc").map(PathBuf::from).unwrap_or_else(build_bin))
}

// Unit tests get no CARGO_BIN_EXE_*; the binary lands one level above the test executable's deps dir.
fn build_bin() -> PathBuf {
	let status = Command::new(env!("CARGO"))
		.current_dir(env!("CARGO_MANIFEST_DIR"))
		.args(["build", "--quiet", "--bin", "nrbfdoc"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "building nrbfdoc failed with {status}");

	let exe = std::env::current_exe().expect("test executable path");
	let profile_dir = exe
		.parent()
		.and_then(|deps| deps.parent())
		.map(PathBuf::from)
		.unwrap_or_else(|| nrbfdoc_testkit::target_dir().join("debug"));
	profile_dir.join(BIN_NAME)
}
