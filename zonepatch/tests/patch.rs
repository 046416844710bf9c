#![allow(missing_docs)]

use zonepatch::config::{ApplyOptions, ApplyStrategy};
use zonepatch::error::ErrorKind;
use zonepatch::layout::{Endianness, FieldWidth, FileLayout, LengthTarget};
use zonepatch::patch::ZoneEdit;

use std::io::{Cursor, Read, Seek, Write};

fn pattern(len: usize, mut state: u32) -> Vec<u8> {
	let mut out = vec![0_u8; len];
	for byte in &mut out {
		state ^= state << 13;
		state ^= state >> 17;
		state ^= state << 5;
		*byte = state as u8;
	}
	out
}

fn u32_le_at(data: &[u8], offset: usize) -> u32 {
	u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}

#[test_log::test]
fn zero_delta_edit_is_surgical() {
	let original = pattern(256, 0x1234_5678);

	let mut layout = FileLayout::new();
	layout.add_zone("z", 64, 32, true).unwrap();
	// References exist, but nothing moved or resized, so they must not be consulted
	layout.add_position(0, "z", FieldWidth::U32, Endianness::Little);
	layout.add_size(8, "z", 0, FieldWidth::U32, Endianness::Little);

	let mut file = Cursor::new(original.clone());
	layout
		.apply_edit(&mut file, ZoneEdit::edit("z", vec![0x5A; 32]), ApplyOptions::new())
		.unwrap();

	let data = file.into_inner();
	assert_eq!(data.len(), original.len());
	assert_eq!(&data[..64], &original[..64]);
	assert_eq!(&data[64..96], &[0x5A; 32]);
	assert_eq!(&data[96..], &original[96..]);
}

#[test_log::test]
fn growth_relocates_and_rewrites_references() {
	// Pointer at 10 targets "t" (before the boundary), pointer at 80 targets "after",
	// length field at 90 describes "t"; "after" sits at 100..110
	let mut data = pattern(200, 0xABCD_EF01);
	data[10..14].copy_from_slice(&50_u32.to_le_bytes());
	data[80..84].copy_from_slice(&100_u32.to_le_bytes());
	data[90..94].copy_from_slice(&20_u32.to_le_bytes());

	let mut layout = FileLayout::new();
	layout.add_zone("t", 50, 20, true).unwrap();
	layout.add_zone("after", 100, 10, true).unwrap();
	layout.add_position(10, "t", FieldWidth::U32, Endianness::Little);
	layout.add_position(80, "after", FieldWidth::U32, Endianness::Little);
	layout.add_size(90, "t", 0, FieldWidth::U32, Endianness::Little);

	let after_content = data[100..110].to_vec();

	let mut file = Cursor::new(data);
	layout
		.apply_edit(&mut file, ZoneEdit::edit("t", vec![0x11; 30]), ApplyOptions::new())
		.unwrap();

	// Everything at or after the old zone end (70) moved by +10
	assert_eq!(layout.zone("after").unwrap().offset(), 110);
	assert_eq!(layout.positions()[0].location(), 10);
	assert_eq!(layout.positions()[1].location(), 90);
	assert_eq!(layout.lengths()[0].location(), 100);

	let data = file.into_inner();
	assert_eq!(data.len(), 210);

	// Values reflect the post-shift structure, at the post-shift locations
	assert_eq!(u32_le_at(&data, 10), 50);
	assert_eq!(u32_le_at(&data, 90), 110);
	assert_eq!(u32_le_at(&data, 100), 30);

	// The relocated zone's content is byte-identical
	assert_eq!(&data[110..120], &after_content[..]);
}

#[test_log::test]
fn shrink_is_symmetric() {
	let mut data = pattern(200, 0x0BAD_F00D);
	data[80..84].copy_from_slice(&100_u32.to_le_bytes());

	let mut layout = FileLayout::new();
	layout.add_zone("t", 50, 30, true).unwrap();
	layout.add_zone("after", 100, 10, true).unwrap();
	layout.add_position(80, "after", FieldWidth::U32, Endianness::Little);

	let after_content = data[100..110].to_vec();
	let tail = data[110..].to_vec();

	let mut file = Cursor::new(data);
	layout
		.apply_edit(&mut file, ZoneEdit::edit("t", vec![0x22; 12]), ApplyOptions::new())
		.unwrap();

	let data = file.into_inner();
	// Total length decreased by exactly |delta|
	assert_eq!(data.len(), 182);

	assert_eq!(layout.zone("after").unwrap().offset(), 82);
	assert_eq!(u32_le_at(&data, 62), 82);
	assert_eq!(&data[82..92], &after_content[..]);
	assert_eq!(&data[92..], &tail[..]);
}

#[test_log::test]
fn round_trip() {
	// Zones A (offset 10, size 20) and B (offset 30, size 5), pointer at 0 targeting B
	let mut data = vec![0_u8; 40];
	data[..4].copy_from_slice(&30_u32.to_le_bytes());
	data[4..10].copy_from_slice(b"header");
	data[30..35].copy_from_slice(b"BBBBB");

	let mut layout = FileLayout::new();
	layout.add_zone("a", 10, 20, true).unwrap();
	layout.add_zone("b", 30, 5, true).unwrap();
	layout.add_position(0, "b", FieldWidth::U32, Endianness::Little);

	let mut file = Cursor::new(data.clone());
	layout
		.apply_edit(&mut file, ZoneEdit::edit("a", vec![0xAA; 25]), ApplyOptions::new())
		.unwrap();

	assert_eq!(layout.zone("b").unwrap().offset(), 35);

	let patched = file.into_inner();
	assert_eq!(u32_le_at(&patched, 0), 35);
	// Bytes before A are untouched (apart from the rewritten pointer, which moved 30 -> 35)
	assert_eq!(&patched[4..10], &data[4..10]);
	// B's content is byte-identical at its new home
	assert_eq!(&patched[35..40], b"BBBBB");
}

#[test_log::test]
fn non_deletable_zone_rejects_removal() {
	let original = pattern(128, 0x600D_CAFE);

	let mut layout = FileLayout::new();
	layout.add_zone("core", 16, 32, false).unwrap();

	let mut file = Cursor::new(original.clone());
	let err = layout
		.remove_zone_rewrite(&mut file, "core", ApplyOptions::new())
		.unwrap_err();

	match err.kind() {
		ErrorKind::ZoneNotDeletable(name) => assert_eq!(name, "core"),
		other => panic!("unexpected error: {other:?}"),
	}

	// Not silently downgraded to a no-op edit either; the file is untouched
	assert_eq!(file.into_inner(), original);
	assert_eq!(layout.zone("core").unwrap().size(), 32);
}

fn removal_fixture() -> (Vec<u8>, FileLayout) {
	let mut data = pattern(300, 0x7777_AAAA);
	data[0..4].copy_from_slice(&200_u32.to_le_bytes());
	data[4..8].copy_from_slice(&292_u32.to_le_bytes());

	let mut layout = FileLayout::new();
	layout.add_zone("tag1", 50, 40, true).unwrap();
	layout.add_zone("tag2", 120, 60, true).unwrap();
	layout.add_zone("index", 200, 30, true).unwrap();
	layout.add_position(0, "index", FieldWidth::U32, Endianness::Little);
	layout.add_size(4, LengthTarget::FileSize, -8, FieldWidth::U32, Endianness::Little);

	(data, layout)
}

#[test_log::test]
fn batched_removal_matches_sequential() {
	let (data, layout) = removal_fixture();
	let options = ApplyOptions::new();

	let mut batched_layout = layout.clone();
	let mut batched_file = Cursor::new(data.clone());
	batched_layout
		.apply_edits(
			&mut batched_file,
			vec![ZoneEdit::remove("tag2"), ZoneEdit::remove("tag1")],
			options,
		)
		.unwrap();

	let mut sequential_layout = layout;
	let mut sequential_file = Cursor::new(data);
	// Offset-ascending, one at a time
	sequential_layout
		.remove_zone_rewrite(&mut sequential_file, "tag1", options)
		.unwrap();
	sequential_layout
		.remove_zone_rewrite(&mut sequential_file, "tag2", options)
		.unwrap();

	let batched = batched_file.into_inner();
	let sequential = sequential_file.into_inner();
	assert_eq!(batched, sequential);
	assert_eq!(batched.len(), 200);

	assert_eq!(
		batched_layout.zone("index").unwrap().offset(),
		sequential_layout.zone("index").unwrap().offset()
	);
	assert_eq!(u32_le_at(&batched, 0), 100);
	assert_eq!(u32_le_at(&batched, 4), 192);
}

#[test_log::test]
fn buffered_strategy_matches_in_place() {
	let (data, layout) = removal_fixture();

	let mut in_place_layout = layout.clone();
	let mut in_place_file = Cursor::new(data.clone());
	in_place_layout
		.apply_edits(
			&mut in_place_file,
			vec![
				ZoneEdit::remove("tag1"),
				ZoneEdit::edit("tag2", vec![0x42; 90]),
			],
			ApplyOptions::new(),
		)
		.unwrap();

	let mut buffered_layout = layout;
	let mut buffered_file = Cursor::new(data);
	buffered_layout
		.apply_edits(
			&mut buffered_file,
			vec![
				ZoneEdit::remove("tag1"),
				ZoneEdit::edit("tag2", vec![0x42; 90]),
			],
			ApplyOptions::new().strategy(ApplyStrategy::Buffered),
		)
		.unwrap();

	assert_eq!(in_place_file.into_inner(), buffered_file.into_inner());
	assert_eq!(
		in_place_layout.zone("index").unwrap().offset(),
		buffered_layout.zone("index").unwrap().offset()
	);
}

#[test_log::test]
fn remove_then_add_refills_a_zone() {
	let mut data = pattern(100, 0x1111_2222);
	data[0..4].copy_from_slice(&30_u32.to_le_bytes());

	let mut layout = FileLayout::new();
	layout.add_zone("tag", 20, 10, true).unwrap();
	layout.add_size(0, "tag", 0, FieldWidth::U32, Endianness::Little);

	// Wrong initial value on purpose; removal recomputes it
	data[0..4].copy_from_slice(&10_u32.to_le_bytes());

	let mut file = Cursor::new(data);
	layout
		.remove_zone_rewrite(&mut file, "tag", ApplyOptions::new())
		.unwrap();

	assert_eq!(layout.zone("tag").unwrap().size(), 0);
	assert_eq!(file.get_ref().len(), 90);
	assert_eq!(u32_le_at(file.get_ref(), 0), 0);

	// The registry entry survived; refill the zone at the same spot
	layout
		.apply_edit(&mut file, ZoneEdit::add("tag", vec![0x99; 25]), ApplyOptions::new())
		.unwrap();

	assert_eq!(layout.zone("tag").unwrap().size(), 25);
	let data = file.into_inner();
	assert_eq!(data.len(), 115);
	assert_eq!(u32_le_at(&data, 0), 25);
	assert_eq!(&data[20..45], &[0x99; 25]);
}

#[test_log::test]
fn small_shift_buffer_survives_overlap() {
	// |delta| far smaller than the shifted range, forced through a 7 byte buffer
	let data = pattern(4096, 0x1357_9BDF);
	let tail = data[512..].to_vec();

	let mut layout = FileLayout::new();
	layout.add_zone("z", 500, 12, true).unwrap();

	let mut file = Cursor::new(data);
	layout
		.apply_edit(
			&mut file,
			ZoneEdit::edit("z", vec![0xEE; 15]),
			ApplyOptions::new().shift_buffer_size(7),
		)
		.unwrap();

	let data = file.into_inner();
	assert_eq!(data.len(), 4099);
	assert_eq!(&data[515..], &tail[..]);
}

#[test_log::test]
fn relative_references_follow_their_base() {
	// Index entry at 40 stores "entry" relative to a table header at 60; both the field's
	// base and its target sit after the edited zone, so both move together and the stored
	// value must come out unchanged
	let mut data = pattern(200, 0x2468_ACE0);
	data[40..42].copy_from_slice(&60_u16.to_le_bytes());

	let mut layout = FileLayout::new();
	layout.add_zone("z", 10, 10, true).unwrap();
	layout.add_zone("entry", 120, 8, true).unwrap();
	layout.add_index(40, "entry", 60, FieldWidth::U16, Endianness::Little);

	let mut file = Cursor::new(data);
	layout
		.apply_edit(&mut file, ZoneEdit::edit("z", vec![0x01; 26]), ApplyOptions::new())
		.unwrap();

	// Location, base and target all moved by +16
	assert_eq!(layout.positions()[0].location(), 56);
	assert_eq!(layout.positions()[0].base(), Some(76));
	assert_eq!(layout.zone("entry").unwrap().offset(), 136);

	let data = file.into_inner();
	assert_eq!(
		u16::from_le_bytes(data[56..58].try_into().unwrap()),
		60
	);
}

#[test_log::test]
fn field_overflow_is_reported() {
	// A one byte pointer field cannot encode an offset past 255
	let mut layout = FileLayout::new();
	layout.add_zone("z", 10, 10, true).unwrap();
	layout.add_zone("far", 250, 8, true).unwrap();
	layout.add_position(0, "far", FieldWidth::U8, Endianness::Little);

	let mut file = Cursor::new(pattern(300, 0x9999_1111));
	let err = layout
		.apply_edit(&mut file, ZoneEdit::edit("z", vec![0; 30]), ApplyOptions::new())
		.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::FieldOverflow { .. }));
}

#[test_log::test]
fn file_backed_edit() {
	let original = pattern(2048, 0xFEED_FACE);
	let tail = original[1024..].to_vec();

	let mut file = tempfile::tempfile().unwrap();
	file.write_all(&original).unwrap();
	file.rewind().unwrap();

	let mut layout = FileLayout::new();
	layout.add_zone("tag", 1000, 24, true).unwrap();

	layout
		.apply_edit(&mut file, ZoneEdit::edit("tag", vec![0x33; 8]), ApplyOptions::new())
		.unwrap();

	file.rewind().unwrap();
	let mut data = Vec::new();
	file.read_to_end(&mut data).unwrap();

	assert_eq!(data.len(), 2032);
	assert_eq!(&data[..1000], &original[..1000]);
	assert_eq!(&data[1000..1008], &[0x33; 8]);
	assert_eq!(&data[1008..], &tail[..]);
}
