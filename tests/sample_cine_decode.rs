#![allow(missing_docs)]

use nrbfdoc::nrbf::{
	CineSlice, DecodeOptions, DistilledValue, NrbfFile, Record, RecordKind, SliceDirection, ValuePath, distill, parse_reader,
};
use nrbfdoc_testkit::{sample_cine, sample_cine_message, write_fixture};

#[test]
fn sample_cine_parses_with_expected_shape() {
	let file = NrbfFile::from_bytes(&sample_cine_message(), &DecodeOptions::strict()).expect("fixture parses");
	let stats = file.stats();

	assert_eq!(stats.header.root_id, 1);
	assert_eq!(stats.trailing_bytes, 0);
	assert_eq!(stats.kinds.get(&RecordKind::ClassWithId), Some(&2));
	assert_eq!(stats.kinds.get(&RecordKind::ArraySinglePrimitive), Some(&1));

	let stream = file.stream();
	assert!(matches!(stream.records().first(), Some(Record::SerializationHeader(_))));
	assert!(matches!(stream.records().last(), Some(Record::MessageEnd)));
}

#[test]
fn file_and_reader_sources_agree() {
	let bytes = sample_cine_message();
	let path = write_fixture("decode_sample.bin", &bytes);

	let opened = NrbfFile::open(&path).expect("file opens");
	let read = parse_reader(std::fs::File::open(&path).expect("fixture readable"), &DecodeOptions::default()).expect("reader parses");

	assert_eq!(opened.byte_len, bytes.len());
	assert_eq!(opened.stream().records(), read.records());
	assert_eq!(opened.distill().expect("distills"), distill(&read).expect("distills"));
}

#[test]
fn reference_member_matches_its_target() {
	let file = NrbfFile::from_bytes(&sample_cine_message(), &DecodeOptions::default()).expect("fixture parses");
	let root = file.distill().expect("fixture distills");

	assert_eq!(root.get("label"), root.get("alias"));
	assert_eq!(root.get("Previous"), Some(&DistilledValue::Null));
}

#[test]
fn shared_metadata_distills_to_same_class() {
	let file = NrbfFile::from_bytes(&sample_cine_message(), &DecodeOptions::default()).expect("fixture parses");
	let root = file.distill().expect("fixture distills");

	for expr in ["TwoDSlicedata.Origin", "TwoDSlicedata.Orientation.RowDirectionCosines"] {
		let path = ValuePath::parse(expr).expect("path parses");
		let item = root.lookup(&path).expect("path resolves");
		assert_eq!(item.as_mapping().map(|mapping| mapping.class_name.as_ref()), Some("Geometry.Point3D"), "{expr}");
	}
}

#[test]
fn cine_slice_extracts_from_sample() {
	let file = NrbfFile::from_bytes(&sample_cine_message(), &DecodeOptions::default()).expect("fixture parses");
	let slice = CineSlice::from_value(&file.distill().expect("fixture distills")).expect("slice extracts");

	assert_eq!(slice.direction, SliceDirection::Transversal);
	assert_eq!(slice.origin, [-120.0, 35.5, 12.0]);
	assert_eq!(slice.elapsed_ticks, sample_cine::TICKS);
	assert_eq!(slice.unix_seconds(), sample_cine::UNIX_SECONDS);
	for column in 0..sample_cine::COLUMNS {
		for row in 0..sample_cine::ROWS {
			assert_eq!(slice.pixel(column, row), Some(sample_cine::intensity(column, row)), "pixel ({column}, {row})");
		}
	}
}
