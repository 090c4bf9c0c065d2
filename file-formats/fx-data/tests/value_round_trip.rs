//! Integration tests for the binary value reader and writer

use fx_data::prelude::*;
use fx_data::{DataError, Rgba};
use glam::Vec2;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    First,
    Second,
}

impl PersistEnum for Mode {
    const TYPE_NAME: &'static str = "Mode";

    fn to_u32(self) -> u32 {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            _ => None,
        }
    }
}

fn encode(write: impl FnOnce(&mut BinaryValueWriter<Vec<u8>>)) -> Vec<u8> {
    let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
    write(&mut writer);
    writer.finish().unwrap()
}

#[test_case(Mode::First ; "first variant")]
#[test_case(Mode::Second ; "second variant")]
fn test_enum_entries(mode: Mode) {
    let bytes = encode(|w| write_enum(w, "Mode", mode).unwrap());
    let mut reader = BinaryValueReader::new(bytes.as_slice()).unwrap();
    let read: Mode = read_enum(&mut reader, "Mode").unwrap();
    assert_eq!(read, mode);
}

#[test]
fn test_unknown_enum_discriminant() {
    let bytes = encode(|w| w.write_u32("Mode", 7).unwrap());
    let mut reader = BinaryValueReader::new(bytes.as_slice()).unwrap();
    let result: Result<Mode, _> = read_enum(&mut reader, "Mode");
    match result {
        Err(DataError::UnknownVariant {
            key,
            type_name,
            value,
        }) => {
            assert_eq!(key, "Mode");
            assert_eq!(type_name, "Mode");
            assert_eq!(value, 7);
        }
        other => panic!("expected unknown variant, got {:?}", other),
    }
}

#[test]
fn test_colors_and_extremes() {
    let color = Rgba::new(12, 34, 56, 78);
    let bytes = encode(|w| {
        color.write(w, "Color").unwrap();
        w.write_i32("Life", i32::MIN).unwrap();
        w.write_u32("Rate", u32::MAX).unwrap();
        w.write_f32("Angle", -0.0).unwrap();
        w.write_string("Empty", "").unwrap();
        w.write_string("Unicode", "étincelle ✨").unwrap();
        w.write_vec2("Origin", Vec2::new(f32::MAX, f32::MIN_POSITIVE))
            .unwrap();
    });

    let mut reader = BinaryValueReader::new(bytes.as_slice()).unwrap();
    assert_eq!(Rgba::read(&mut reader, "Color").unwrap(), color);
    assert_eq!(reader.read_i32("Life").unwrap(), i32::MIN);
    assert_eq!(reader.read_u32("Rate").unwrap(), u32::MAX);
    assert!(reader.read_f32("Angle").unwrap().is_sign_negative());
    assert_eq!(reader.read_string("Empty").unwrap(), "");
    assert_eq!(reader.read_string("Unicode").unwrap(), "étincelle ✨");
    assert_eq!(
        reader.read_vec2("Origin").unwrap(),
        Vec2::new(f32::MAX, f32::MIN_POSITIVE)
    );
}

#[test]
fn test_dyn_writer_and_reader() {
    let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
    {
        let dyn_writer: &mut dyn ValueWriter = &mut writer;
        dyn_writer.begin_list("Items", 3).unwrap();
        for i in 0..3 {
            dyn_writer.write_i32("Item", i).unwrap();
        }
        dyn_writer.end_list().unwrap();
    }
    let bytes = writer.finish().unwrap();

    let mut reader = BinaryValueReader::new(bytes.as_slice()).unwrap();
    let dyn_reader: &mut dyn ValueReader = &mut reader;
    let len = dyn_reader.begin_list("Items").unwrap();
    let items: Vec<i32> = (0..len)
        .map(|_| dyn_reader.read_i32("Item").unwrap())
        .collect();
    dyn_reader.end_list().unwrap();
    assert_eq!(items, vec![0, 1, 2]);
}

#[test]
fn test_block_terminator_required() {
    let bytes = encode(|w| {
        w.begin_block("Outer").unwrap();
        w.write_bool("Flag", false).unwrap();
        w.end_block().unwrap();
    });

    let mut reader = BinaryValueReader::new(bytes.as_slice()).unwrap();
    reader.begin_block("Outer").unwrap();
    // Skipping the flag means the terminator is not where the reader expects it
    assert!(matches!(
        reader.end_block(),
        Err(DataError::UnexpectedKey { .. })
    ));
}
