use crate::nrbf::{ParsedStream, Record, RecordIdx};

fn record(stream: &ParsedStream, idx: RecordIdx) -> &Record {
	stream.get(idx).expect("index from this stream")
}

mod record_order {
	use super::record;
	use nrbfdoc_testkit::{MessageBuilder, TypeSpec, prim};

	use crate::nrbf::{DecodeOptions, Member, PrimitiveValue, Record, RecordIdx, RecordKind, parse_bytes, parse_reader};

	fn sample() -> Vec<u8> {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Sample.Lib")
			.class(
				1,
				"Sample.Holder",
				&[("count", TypeSpec::Primitive(prim::INT32)), ("label", TypeSpec::String), ("next", TypeSpec::Object)],
				2,
			)
			.i32(42)
			.string_record(3, "hi")
			.null()
			.end();
		msg.build()
	}

	#[test]
	fn header_first_terminator_last_members_before_container() {
		let stream = parse_bytes(&sample(), &DecodeOptions::default()).expect("stream parses");

		let kinds: Vec<_> = stream.records().iter().map(Record::kind).collect();
		assert_eq!(
			kinds,
			vec![
				RecordKind::SerializationHeader,
				RecordKind::BinaryLibrary,
				RecordKind::BinaryObjectString,
				RecordKind::ObjectNull,
				RecordKind::ClassWithMembersAndTypes,
				RecordKind::MessageEnd,
			]
		);
		assert_eq!(stream.root_id(), 1);
		assert_eq!(stream.header().major_version, 1);
		assert_eq!(stream.trailing_bytes(), 0);
	}

	#[test]
	fn class_members_point_at_stored_records() {
		let stream = parse_bytes(&sample(), &DecodeOptions::default()).expect("stream parses");

		let holder = stream.find_unique(1).expect("holder is unique");
		assert_eq!(holder, RecordIdx(4));
		let class = record(&stream, holder).class().expect("class record");
		assert_eq!(class.library_id, Some(2));
		assert_eq!(class.metadata.name, "Sample.Holder");
		assert_eq!(class.metadata.member_names, vec!["count", "label", "next"]);
		assert_eq!(
			class.members,
			vec![Member::Primitive(PrimitiveValue::Int32(42)), Member::Record(RecordIdx(2)), Member::Record(RecordIdx(3))]
		);
		assert_eq!(stream.find_unique(3), Ok(RecordIdx(2)));
		assert_eq!(stream.find_unique(99), Err(0));
	}

	#[test]
	fn trailing_bytes_are_counted_not_parsed() {
		let mut bytes = sample();
		bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

		let stream = parse_bytes(&bytes, &DecodeOptions::default()).expect("stream parses");
		assert_eq!(stream.trailing_bytes(), 3);
		assert_eq!(stream.records().last().map(Record::kind), Some(RecordKind::MessageEnd));
	}

	#[test]
	fn parse_reader_matches_parse_bytes() {
		let bytes = sample();
		let from_reader = parse_reader(std::io::Cursor::new(bytes.clone()), &DecodeOptions::default()).expect("reader parses");
		let from_bytes = parse_bytes(&bytes, &DecodeOptions::default()).expect("bytes parse");
		assert_eq!(from_reader.records(), from_bytes.records());
	}

	#[test]
	fn kind_counts_cover_every_record() {
		let stream = parse_bytes(&sample(), &DecodeOptions::default()).expect("stream parses");
		let counts = stream.kind_counts();

		assert_eq!(counts.values().sum::<usize>(), stream.len());
		assert_eq!(counts.get(&RecordKind::ObjectNull), Some(&1));
	}

	#[test]
	fn second_header_is_stored_but_does_not_replace_root() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).header(9, 0).string_record(1, "root").end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		assert_eq!(stream.root_id(), 1);
		assert_eq!(stream.kind_counts().get(&RecordKind::SerializationHeader), Some(&2));
	}
}

mod framing_errors {
	use nrbfdoc_testkit::{MessageBuilder, tag};

	use crate::nrbf::{BinaryType, DecodeOptions, ProtocolError, RecordKind, RecordReader, parse_bytes};

	#[test]
	fn stream_must_start_with_header() {
		let mut msg = MessageBuilder::new();
		msg.library(2, "Lib").end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("headerless stream rejected");
		assert!(matches!(err, ProtocolError::HeaderNotFirst { found: RecordKind::BinaryLibrary }));
	}

	#[test]
	fn unknown_tag_consumes_only_the_tag_byte() {
		let opt = DecodeOptions::default();
		let bytes = [0xFF, 0x00, 0x00];
		let mut reader = RecordReader::new(&bytes, &opt);

		let err = reader.next_record().expect_err("unknown tag rejected");
		assert!(matches!(err, ProtocolError::UnknownRecordKind(0xFF)));
		assert_eq!(reader.pos(), 1);

		let mut msg = MessageBuilder::new();
		msg.header(1, 0).raw(&[0x03]);
		let bytes = msg.build();
		let mut reader = RecordReader::new(&bytes, &opt);
		reader.next_record().expect("header reads");
		let err = reader.next_record().expect_err("tag 3 is outside the supported set");
		assert!(matches!(err, ProtocolError::UnknownRecordKind(0x03)));
		assert_eq!(reader.pos(), 18);
	}

	#[test]
	fn eof_before_terminator_is_an_error() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).string_record(1, "root");

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("missing terminator rejected");
		assert!(matches!(err, ProtocolError::UnexpectedEof { need: 1, rem: 0, .. }));
	}

	#[test]
	fn empty_input_is_an_eof() {
		let err = parse_bytes(&[], &DecodeOptions::default()).expect_err("empty input rejected");
		assert!(matches!(err, ProtocolError::UnexpectedEof { at: 0, need: 1, rem: 0 }));
	}

	#[test]
	fn reader_stops_at_terminator() {
		let opt = DecodeOptions::default();
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).end();
		let bytes = msg.build();

		let mut reader = RecordReader::new(&bytes, &opt);
		reader.next_record().expect("header reads");
		assert!(!reader.is_finished());
		reader.next_record().expect("terminator reads");
		assert!(reader.is_finished());
		assert_eq!(reader.records().len(), 2);
	}

	#[test]
	fn top_level_null_run_is_rejected() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).null_run(3).end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("free-standing null run rejected");
		assert!(matches!(
			err,
			ProtocolError::UnexpectedMemberKind {
				category: BinaryType::Object,
				found: RecordKind::ObjectNullMultiple256,
				..
			}
		));
	}

	#[test]
	fn negative_array_length_is_rejected() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).object_array(1, -1).end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("negative length rejected");
		assert!(matches!(err, ProtocolError::NegativeLength { value: -1, .. }));
	}

	#[test]
	fn unknown_member_category_reports_offset() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.raw(&[tag::SYSTEM_CLASS_WITH_MEMBERS_AND_TYPES])
			.u32(1)
			.string("Bad")
			.u32(1)
			.string("m")
			.raw(&[9]);
		let bytes = msg.build();

		let err = parse_bytes(&bytes, &DecodeOptions::default()).expect_err("category 9 rejected");
		assert!(matches!(err, ProtocolError::UnknownMemberTypeKind { tag: 9, at } if at == bytes.len() - 1));
	}
}

mod arrays {
	use super::record;
	use nrbfdoc_testkit::{MessageBuilder, TypeSpec, prim};

	use crate::nrbf::{BinaryArrayType, BinaryType, DecodeOptions, ProtocolError, Record, RecordKind, parse_bytes};

	#[test]
	fn null_run_fills_every_slot() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).object_array(1, 5).null_run(5).end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		let idx = stream.find_unique(1).expect("array is unique");
		let Record::ArraySingleObject(array) = record(&stream, idx) else {
			panic!("expected object array");
		};
		assert_eq!(array.elements.len(), 5);
		assert!(array.elements.iter().all(|slot| matches!(record(&stream, *slot), Record::ObjectNull)));
		assert_eq!(stream.kind_counts().get(&RecordKind::ObjectNullMultiple256), None);
	}

	#[test]
	fn null_run_mixes_with_other_slots() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).object_array(1, 4).string_record(2, "a").null_run(2).reference(2).end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		let Record::ArraySingleObject(array) = record(&stream, stream.find_unique(1).expect("array")) else {
			panic!("expected object array");
		};
		let kinds: Vec<_> = array.elements.iter().map(|slot| record(&stream, *slot).kind()).collect();
		assert_eq!(
			kinds,
			vec![RecordKind::BinaryObjectString, RecordKind::ObjectNull, RecordKind::ObjectNull, RecordKind::MemberReference]
		);
	}

	#[test]
	fn null_run_past_array_end_is_rejected() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).object_array(1, 2).null_run(3).end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("overflow rejected");
		assert!(matches!(err, ProtocolError::NullRunOverflow { count: 3, remaining: 2 }));
	}

	#[test]
	fn binary_array_with_lower_bounds() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Lib")
			.binary_array(1, 5, &[2, 2], Some(&[1, 1]), TypeSpec::Class("Lib.Point", 2))
			.null_run(4)
			.end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		let Record::BinaryArray(array) = record(&stream, stream.find_unique(1).expect("array")) else {
			panic!("expected binary array");
		};
		assert_eq!(array.array_type, BinaryArrayType::RectangularOffset);
		assert_eq!(array.rank(), 2);
		assert_eq!(array.lengths, vec![2, 2]);
		assert_eq!(array.lower_bounds, Some(vec![1, 1]));
		assert_eq!(array.elements.len(), 4);
	}

	#[test]
	fn binary_array_of_primitives_is_unsupported() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).binary_array(1, 0, &[2], None, TypeSpec::Primitive(prim::INT32)).end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("primitive element type rejected");
		assert!(matches!(
			err,
			ProtocolError::UnsupportedArrayElementKind {
				object_id: 1,
				category: BinaryType::Primitive
			}
		));
	}

	#[test]
	fn primitive_array_must_hold_bytes() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).primitive_array(1, 2, prim::INT32).i32(1).i32(2).end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("int32 array rejected");
		assert!(matches!(err, ProtocolError::UnsupportedPrimitiveArrayKind { object_id: 1, tag: 8 }));
	}

	#[test]
	fn byte_array_keeps_raw_values() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).byte_array(1, &[0, 1, 254, 255]).end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		let Record::ArraySinglePrimitive(array) = record(&stream, stream.find_unique(1).expect("array")) else {
			panic!("expected primitive array");
		};
		assert_eq!(array.values, vec![0, 1, 254, 255]);
	}

	#[test]
	fn array_length_is_bounded_by_options() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0).object_array(1, 2_000_000).end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::strict()).expect_err("oversized array rejected");
		assert!(matches!(err, ProtocolError::ArrayTooLarge { count: 2_000_000, max: 1_048_576 }));
	}
}

mod class_metadata {
	use super::record;
	use std::sync::Arc;

	use nrbfdoc_testkit::{MessageBuilder, TypeSpec, prim};

	use crate::nrbf::{BinaryType, DecodeOptions, Member, PrimitiveValue, ProtocolError, Record, RecordKind, parse_bytes};

	fn point_members() -> [(&'static str, TypeSpec<'static>); 1] {
		[("x", TypeSpec::Primitive(prim::INT32))]
	}

	#[test]
	fn class_with_id_reuses_earlier_metadata() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Lib")
			.object_array(1, 2)
			.class(3, "Lib.Point", &point_members(), 2)
			.i32(1)
			.class_with_id(4, 3)
			.i32(2)
			.end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		let first = record(&stream, stream.find_unique(3).expect("first point")).class().expect("class");
		let Record::ClassWithId(second) = record(&stream, stream.find_unique(4).expect("second point")) else {
			panic!("expected ClassWithId");
		};

		assert_eq!(second.metadata_id, 3);
		assert_eq!(second.library_id, None);
		assert!(Arc::ptr_eq(&first.metadata, &second.metadata));
		assert_eq!(second.members, vec![Member::Primitive(PrimitiveValue::Int32(2))]);
	}

	#[test]
	fn class_with_id_needs_declared_metadata() {
		for metadata_id in [9, 0] {
			let mut msg = MessageBuilder::new();
			msg.header(1, 0).object_array(1, 1).class_with_id(4, metadata_id).end();

			let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("unknown metadata rejected");
			assert!(
				matches!(err, ProtocolError::AmbiguousOrMissingMetadata { metadata_id: id, found: 0 } if id == metadata_id),
				"unexpected error for metadata id {metadata_id}: {err}"
			);
		}
	}

	#[test]
	fn class_with_id_rejects_ambiguous_metadata() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Lib")
			.object_array(1, 3)
			.class(3, "Lib.Point", &point_members(), 2)
			.i32(1)
			.class(3, "Lib.Point", &point_members(), 2)
			.i32(1)
			.class_with_id(4, 3)
			.i32(2)
			.end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("duplicate metadata id rejected");
		assert!(matches!(err, ProtocolError::AmbiguousOrMissingMetadata { metadata_id: 3, found: 2 }));
	}

	#[test]
	fn member_kind_must_fit_its_category() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Lib")
			.class(1, "Lib.Holder", &[("name", TypeSpec::String)], 2)
			.object_array(5, 0)
			.end();

		let err = parse_bytes(&msg.build(), &DecodeOptions::default()).expect_err("array in string slot rejected");
		let ProtocolError::UnexpectedMemberKind { owner, category, found } = err else {
			panic!("expected UnexpectedMemberKind, got {err}");
		};
		assert_eq!(owner, "Lib.Holder.name");
		assert_eq!(category, BinaryType::String);
		assert_eq!(found, RecordKind::ArraySingleObject);
	}

	#[test]
	fn inline_library_precedes_member_record() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Outer")
			.class(1, "Outer.Holder", &[("inner", TypeSpec::Class("Other.Inner", 3))], 2)
			.library(3, "Other")
			.class(4, "Other.Inner", &[("v", TypeSpec::Primitive(prim::INT32))], 3)
			.i32(7)
			.end();

		let stream = parse_bytes(&msg.build(), &DecodeOptions::default()).expect("stream parses");
		let kinds: Vec<_> = stream.records().iter().map(Record::kind).collect();
		assert_eq!(
			kinds,
			vec![
				RecordKind::SerializationHeader,
				RecordKind::BinaryLibrary,
				RecordKind::BinaryLibrary,
				RecordKind::ClassWithMembersAndTypes,
				RecordKind::ClassWithMembersAndTypes,
				RecordKind::MessageEnd,
			]
		);

		let holder = record(&stream, stream.find_unique(1).expect("holder")).class().expect("class");
		let [Member::Record(inner)] = holder.members.as_slice() else {
			panic!("expected one nested member");
		};
		assert_eq!(record(&stream, *inner).object_id(), Some(4));
	}

	#[test]
	fn nesting_depth_is_bounded() {
		let mut msg = MessageBuilder::new();
		msg.header(1, 0)
			.library(2, "Lib")
			.class(1, "Lib.A", &[("child", TypeSpec::Object)], 2)
			.class(3, "Lib.B", &[("child", TypeSpec::Object)], 2)
			.class(4, "Lib.C", &[], 2)
			.end();
		let bytes = msg.build();

		parse_bytes(&bytes, &DecodeOptions::default()).expect("default depth accepts three levels");

		let shallow = DecodeOptions {
			max_depth: 1,
			..DecodeOptions::default()
		};
		let err = parse_bytes(&bytes, &shallow).expect_err("third level rejected");
		assert!(matches!(err, ProtocolError::DecodeDepthExceeded { max_depth: 1 }));

		let exact = DecodeOptions {
			max_depth: 2,
			..DecodeOptions::default()
		};
		parse_bytes(&bytes, &exact).expect("limit equal to deepest nesting is allowed");
	}
}
