//! Section framing and body round-trip tests

use super::*;
use crate::cursor::{ReadCursor, WriteCursor};
use crate::endian::Endianness;
use crate::variant::FormatVariant;
use crate::ROOT_NODE_OFFSET;

/// Writer positioned past a blank 32-byte header region, the way sections
/// sit in a real container
fn section_writer(variant: FormatVariant) -> WriteCursor {
    let mut cursor = WriteCursor::new(variant.endianness());
    cursor.write_zeros(ROOT_NODE_OFFSET as usize);
    cursor.set_root_node_address(ROOT_NODE_OFFSET).unwrap();
    cursor
}

/// Reader over `bytes` rooted and positioned at the first section tag
fn section_reader(bytes: Vec<u8>, variant: FormatVariant, expected_tag: [u8; 4]) -> ReadCursor {
    let mut cursor = ReadCursor::from_bytes(bytes, variant.endianness());
    cursor.set_root_node_address(ROOT_NODE_OFFSET).unwrap();
    cursor.seek(ROOT_NODE_OFFSET);
    assert_eq!(cursor.read_tag().unwrap(), expected_tag);
    cursor
}

#[test]
fn test_framing_size_identity() {
    let mut cursor = section_writer(FormatVariant::Xno);
    let written = write_framed(&mut cursor, *b"TSTS", |c, _| {
        c.write::<u32>(7);
        Ok(())
    })
    .unwrap();

    // Body of 4 bytes padded to the next 16-byte boundary
    assert_eq!(written.head, 32);
    assert_eq!(written.size, cursor.position() - written.head - SECTION_HEADER_SIZE);
    assert_eq!(written.size, 8);

    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Xno, *b"TSTS");
    let header = SectionHeader::read(&mut reader).unwrap();
    assert_eq!(header.size, written.size + 4);
    header.goto_end(&mut reader);
    assert_eq!(reader.position(), header.end());
    assert_eq!(reader.position(), 48);
}

#[test]
fn test_goto_end_discards_unread_body() {
    let mut cursor = section_writer(FormatVariant::Gno);
    write_framed(&mut cursor, *b"TSTS", |c, _| {
        c.write::<u32>(1);
        c.write::<u32>(2);
        c.write::<u32>(3);
        Ok(())
    })
    .unwrap();

    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Gno, *b"TSTS");
    let header = SectionHeader::read(&mut reader).unwrap();
    // Read only the first body word; the rest is reserved as far as this
    // reader cares
    assert_eq!(reader.read::<u32>().unwrap(), 1);
    header.goto_end(&mut reader);
    assert_eq!(reader.position(), header.end());
}

#[test]
fn test_end_marker_pads_to_sixteen() {
    let mut cursor = section_writer(FormatVariant::Xno);
    let mut end = EndSection::default();
    end.write(&mut cursor).unwrap();

    assert_eq!(end.header.size, 8);
    assert_eq!(cursor.len(), 48);
    assert_eq!(&cursor.as_bytes()[32..36], b"NEND");
}

#[test]
fn test_info_layout_and_patch() {
    let mut cursor = WriteCursor::new(Endianness::Big);
    cursor.set_root_node_address(ROOT_NODE_OFFSET).unwrap();

    let mut info = InfoSection::new();
    info.section_count = 3;
    info.write(&mut cursor, FormatVariant::Gno).unwrap();

    let word = |bytes: &[u8], at: usize| u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap());

    assert_eq!(cursor.len(), 32);
    assert_eq!(&cursor.as_bytes()[0..4], b"NGIF");
    assert_eq!(word(cursor.as_bytes(), 4), 24);
    assert_eq!(word(cursor.as_bytes(), 8), 3);
    assert_eq!(word(cursor.as_bytes(), 12), ROOT_NODE_OFFSET);
    assert_eq!(word(cursor.as_bytes(), 28), 1);

    info.patch(&mut cursor, 0x120, 0x30);
    assert_eq!(word(cursor.as_bytes(), 16), 0x120 - ROOT_NODE_OFFSET);
    assert_eq!(word(cursor.as_bytes(), 20), 0x120);
    assert_eq!(word(cursor.as_bytes(), 24), 0x30);
    assert_eq!(info.offset_table_address, 0x120);
    assert_eq!(info.offset_table_size, 0x30);
}

#[test]
fn test_texture_round_trip_little_endian() {
    let mut texture = TextureSection::new();
    texture.add_texture("sonic_body.dds");
    texture.add_texture("sonic_eye.dds");
    assert_eq!(texture.add_texture("sonic_body.dds"), 0);

    let mut cursor = section_writer(FormatVariant::Xno);
    texture.write(&mut cursor, FormatVariant::Xno).unwrap();
    // Little-endian variants never pend relocations
    assert!(cursor.pending_relocations().is_empty());

    let magic = FormatVariant::Xno.magic();
    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Xno, magic.texture);
    let parsed = TextureSection::read(&mut reader, FormatVariant::Xno).unwrap();

    assert_eq!(parsed.names, texture.names);
    assert_eq!(parsed.flags, vec![0x010004, 0x010004]);
}

#[test]
fn test_texture_write_pends_relocations_big_endian() {
    let mut texture = TextureSection::new();
    texture.add_texture("grass.dds");
    texture.add_texture("rock.dds");

    let mut cursor = section_writer(FormatVariant::Gno);
    texture.write(&mut cursor, FormatVariant::Gno).unwrap();
    // One slot per name pointer, plus the table pointer and the body's
    // table-info pointer
    assert_eq!(cursor.pending_relocations().len(), 4);

    let magic = FormatVariant::Gno.magic();
    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Gno, magic.texture);
    let parsed = TextureSection::read(&mut reader, FormatVariant::Gno).unwrap();
    assert_eq!(parsed.names, texture.names);
}

#[test]
fn test_texture_yno_entry_width() {
    let mut texture = TextureSection::new();
    texture.add_texture("a.dds");
    texture.add_texture("b.dds");
    texture.add_texture("c.dds");

    let mut wide = section_writer(FormatVariant::Gno);
    texture.clone().write(&mut wide, FormatVariant::Gno).unwrap();
    let mut narrow = section_writer(FormatVariant::Yno);
    texture.write(&mut narrow, FormatVariant::Yno).unwrap();

    // 8-byte entries instead of 20-byte entries
    assert!(narrow.len() < wide.len());

    let magic = FormatVariant::Yno.magic();
    let mut reader = section_reader(narrow.into_bytes(), FormatVariant::Yno, magic.texture);
    let parsed = TextureSection::read(&mut reader, FormatVariant::Yno).unwrap();
    assert_eq!(parsed.names, vec!["a.dds", "b.dds", "c.dds"]);
}

#[test]
fn test_effect_round_trip() {
    let mut effect = EffectSection::new();
    effect.add_shader("BillboardY.fx");
    effect.add_shader("Common.fx");
    effect.add_material("mat_body", 1);
    effect.add_material("mat_eye", 0);
    effect.extras = vec![3, 9];

    let mut cursor = section_writer(FormatVariant::Gno);
    effect.write(&mut cursor, FormatVariant::Gno).unwrap();

    let magic = FormatVariant::Gno.magic();
    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Gno, magic.effect);
    let parsed = EffectSection::read(&mut reader).unwrap();

    assert_eq!(parsed.shaders, effect.shaders);
    assert_eq!(parsed.material_names, effect.material_names);
    assert_eq!(parsed.material_indices, vec![1, 0]);
    assert_eq!(parsed.extras, vec![3, 9]);
}

#[test]
fn test_bones_round_trip() {
    let mut bones = BonesSection::new();
    bones.add_bone("Root", 0);
    bones.add_bone("Spine", 1);
    bones.add_bone("Head", 4);

    let mut cursor = section_writer(FormatVariant::Zno);
    bones.write(&mut cursor, FormatVariant::Zno).unwrap();

    let magic = FormatVariant::Zno.magic();
    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Zno, magic.bones);
    let parsed = BonesSection::read(&mut reader).unwrap();

    assert_eq!(parsed.names, vec!["Root", "Spine", "Head"]);
    assert_eq!(parsed.indices, vec![0, 1, 4]);
    assert_eq!(parsed.name(2), Some("Head"));
}

#[test]
fn test_footer_round_trip() {
    let mut footer = FooterSection::new("chr_sonic.max");
    let mut cursor = section_writer(FormatVariant::Xno);
    footer.write(&mut cursor).unwrap();

    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Xno, crate::TAG_FOOTER);
    let parsed = FooterSection::read(&mut reader).unwrap();
    assert_eq!(parsed.name, "chr_sonic.max");
}

#[test]
fn test_offset_table_round_trip() {
    let mut table = OffsetTableSection::new();
    table.entries = vec![0x08, 0x0C, 0x200];

    let mut cursor = section_writer(FormatVariant::Gno);
    table.write(&mut cursor).unwrap();

    let mut reader = section_reader(cursor.into_bytes(), FormatVariant::Gno, crate::TAG_OFFSET_TABLE);
    let parsed = OffsetTableSection::read(&mut reader).unwrap();
    assert_eq!(parsed.entries, vec![0x08, 0x0C, 0x200]);
}

#[test]
fn test_empty_offset_table_stream_is_zero_bytes() {
    let mut table = OffsetTableSection::new();
    let mut cursor = section_writer(FormatVariant::Gno);
    table.write(&mut cursor).unwrap();

    // Body is just the two preamble words: a zero stream size and the
    // reserved word
    assert_eq!(table.header.size, 8);
    let bytes = cursor.into_bytes();
    let stream_size = u32::from_be_bytes(bytes[40..44].try_into().unwrap());
    assert_eq!(stream_size, 0);
}

#[test]
fn test_raw_section_round_trip_is_byte_exact() {
    let payload: Vec<u8> = (0u8..24).collect();
    let mut raw = RawSection::from_payload(payload.clone());

    let mut cursor = section_writer(FormatVariant::Gno);
    let tag = FormatVariant::Gno.magic().object;
    raw.write(&mut cursor, tag).unwrap();
    let bytes = cursor.into_bytes();

    let mut reader = section_reader(bytes.clone(), FormatVariant::Gno, tag);
    let parsed = RawSection::read(&mut reader).unwrap();
    assert_eq!(parsed.payload(), payload.as_slice());

    let mut rewrite = section_writer(FormatVariant::Gno);
    let mut parsed = parsed;
    parsed.write(&mut rewrite, tag).unwrap();
    assert_eq!(rewrite.into_bytes(), bytes);
}
