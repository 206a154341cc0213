use nrbfdoc_testkit::sample_cine;

use crate::cmd::test_support::{nrbfdoc, sample_fixture};

#[test]
fn show_json_output_is_valid_and_structured() {
	let fixture = sample_fixture("show_cine.bin");
	let json = nrbfdoc(&["show", &fixture, "--json"]).json();

	assert_eq!(json["root_id"], 1);
	let value = &json["value"];
	assert!(value.is_object(), "expected top-level mapping");
	assert_eq!(value["label"], "frame 1");
	assert_eq!(value["alias"], "frame 1");
	assert!(value["Previous"].is_null());
	assert_eq!(value["TwoDSlicedata"]["Dimension"]["Columns"], sample_cine::COLUMNS as u64);
	assert_eq!(value["TwoDSlicedata"]["Elapsed100NanosecondInterval"], sample_cine::TICKS);
}

#[test]
fn show_path_selects_nested_value() {
	let fixture = sample_fixture("show_cine_path.bin");
	let json = nrbfdoc(&["show", &fixture, "--path", "TwoDSlicedata.Orientation.ColumnDirectionCosines", "--json"]).json();

	assert_eq!(json["path_expr"], "TwoDSlicedata.Orientation.ColumnDirectionCosines");
	assert_eq!(json["value"]["X"], 0.0);
	assert_eq!(json["value"]["Y"], 1.0);
}

#[test]
fn show_text_prints_class_names() {
	let fixture = sample_fixture("show_cine_text.bin");
	let stdout = nrbfdoc(&["show", &fixture, "--path", "TwoDSlicedata.Origin"]).success();

	assert!(stdout.contains("Geometry.Point3D {"), "stdout: {stdout}");
	assert!(stdout.contains("X = -120"), "stdout: {stdout}");
}

#[test]
fn show_reports_missing_path() {
	let fixture = sample_fixture("show_cine_missing.bin");
	let stderr = nrbfdoc(&["show", &fixture, "--path", "TwoDSlicedata.Nope.X"]).failure();
	assert!(stderr.contains("value path not found: TwoDSlicedata.Nope"), "stderr: {stderr}");
}
