//! Binary implementation of the value contract
//!
//! Layout: `FXKV` magic and a `u16` format version, then one record per
//! entry: `u16` key length, UTF-8 key bytes, `u8` [`ValueTag`], payload.
//! All numbers are little-endian. Block and list terminators carry an empty
//! key.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::Vec2;
use std::io::{Read, Write};

use crate::error::{DataError, Result};
use crate::value::{ValueReader, ValueTag, ValueWriter};

/// Magic bytes at the start of every binary value stream
pub const FORMAT_MAGIC: [u8; 4] = *b"FXKV";

/// Current binary format version
pub const FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Block,
    List,
}

fn close_frame(stack: &mut Vec<Frame>, expected: Frame) -> Result<()> {
    match stack.pop() {
        Some(frame) if frame == expected => Ok(()),
        Some(frame) => Err(DataError::UnbalancedNesting(format!(
            "closing {:?} while {:?} is open",
            expected, frame
        ))),
        None => Err(DataError::UnbalancedNesting(format!(
            "closing {:?} with nothing open",
            expected
        ))),
    }
}

/// Writes values to any [`Write`] in the binary layout
#[derive(Debug)]
pub struct BinaryValueWriter<W: Write> {
    inner: W,
    stack: Vec<Frame>,
}

impl<W: Write> BinaryValueWriter<W> {
    /// Create a writer and emit the stream header
    pub fn new(mut inner: W) -> Result<Self> {
        inner.write_all(&FORMAT_MAGIC)?;
        inner.write_u16::<LittleEndian>(FORMAT_VERSION)?;
        Ok(Self {
            inner,
            stack: Vec::new(),
        })
    }

    /// Finish writing and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        if !self.stack.is_empty() {
            return Err(DataError::UnbalancedNesting(format!(
                "{} unclosed block(s) or list(s)",
                self.stack.len()
            )));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_header(&mut self, key: &str, tag: ValueTag) -> Result<()> {
        let len = u16::try_from(key.len()).map_err(|_| DataError::KeyTooLong(key.len()))?;
        self.inner.write_u16::<LittleEndian>(len)?;
        self.inner.write_all(key.as_bytes())?;
        self.inner.write_u8(tag as u8)?;
        Ok(())
    }
}

impl<W: Write> ValueWriter for BinaryValueWriter<W> {
    fn write_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.write_header(key, ValueTag::Bool)?;
        self.inner.write_u8(u8::from(value))?;
        Ok(())
    }

    fn write_i32(&mut self, key: &str, value: i32) -> Result<()> {
        self.write_header(key, ValueTag::I32)?;
        self.inner.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_u32(&mut self, key: &str, value: u32) -> Result<()> {
        self.write_header(key, ValueTag::U32)?;
        self.inner.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_f32(&mut self, key: &str, value: f32) -> Result<()> {
        self.write_header(key, ValueTag::F32)?;
        self.inner.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.write_header(key, ValueTag::String)?;
        self.inner.write_u32::<LittleEndian>(value.len() as u32)?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    fn write_vec2(&mut self, key: &str, value: Vec2) -> Result<()> {
        self.write_header(key, ValueTag::Vec2)?;
        self.inner.write_f32::<LittleEndian>(value.x)?;
        self.inner.write_f32::<LittleEndian>(value.y)?;
        Ok(())
    }

    fn begin_block(&mut self, key: &str) -> Result<()> {
        self.write_header(key, ValueTag::BlockStart)?;
        self.stack.push(Frame::Block);
        Ok(())
    }

    fn end_block(&mut self) -> Result<()> {
        close_frame(&mut self.stack, Frame::Block)?;
        self.write_header("", ValueTag::BlockEnd)
    }

    fn begin_list(&mut self, key: &str, len: usize) -> Result<()> {
        self.write_header(key, ValueTag::ListStart)?;
        self.inner.write_u32::<LittleEndian>(len as u32)?;
        self.stack.push(Frame::List);
        Ok(())
    }

    fn end_list(&mut self) -> Result<()> {
        close_frame(&mut self.stack, Frame::List)?;
        self.write_header("", ValueTag::ListEnd)
    }
}

/// Reads values written by [`BinaryValueWriter`]
#[derive(Debug)]
pub struct BinaryValueReader<R: Read> {
    inner: R,
    stack: Vec<Frame>,
    version: u16,
}

impl<R: Read> BinaryValueReader<R> {
    /// Create a reader, validating the stream header
    pub fn new(mut inner: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        inner.read_exact(&mut magic)?;
        if magic != FORMAT_MAGIC {
            return Err(DataError::InvalidMagic {
                expected: FORMAT_MAGIC,
                actual: magic,
            });
        }

        let version = inner.read_u16::<LittleEndian>()?;
        if version == 0 || version > FORMAT_VERSION {
            return Err(DataError::UnsupportedVersion(version));
        }

        Ok(Self {
            inner,
            stack: Vec::new(),
            version,
        })
    }

    /// Format version declared by the stream header
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Return the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_raw_string(&mut self, len: usize) -> Result<String> {
        // Grow with the bytes actually present, not the declared length
        let mut bytes = Vec::new();
        (&mut self.inner).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() < len {
            return Err(DataError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("string of {} bytes truncated after {}", len, bytes.len()),
            )));
        }
        Ok(String::from_utf8(bytes)?)
    }

    /// Consume the next entry header and check it matches `key` and `tag`
    fn expect_entry(&mut self, key: &str, tag: ValueTag) -> Result<()> {
        let key_len = self.inner.read_u16::<LittleEndian>()? as usize;
        let found_key = self.read_raw_string(key_len)?;
        if found_key != key {
            return Err(DataError::UnexpectedKey {
                expected: key.to_string(),
                found: found_key,
            });
        }

        let raw = self.inner.read_u8()?;
        let found = ValueTag::from_u8(raw).ok_or(DataError::InvalidTag(raw))?;
        if found != tag {
            return Err(DataError::UnexpectedType {
                key: key.to_string(),
                expected: tag,
                found,
            });
        }

        Ok(())
    }
}

impl<R: Read> ValueReader for BinaryValueReader<R> {
    fn read_bool(&mut self, key: &str) -> Result<bool> {
        self.expect_entry(key, ValueTag::Bool)?;
        Ok(self.inner.read_u8()? != 0)
    }

    fn read_i32(&mut self, key: &str) -> Result<i32> {
        self.expect_entry(key, ValueTag::I32)?;
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    fn read_u32(&mut self, key: &str) -> Result<u32> {
        self.expect_entry(key, ValueTag::U32)?;
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    fn read_f32(&mut self, key: &str) -> Result<f32> {
        self.expect_entry(key, ValueTag::F32)?;
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    fn read_string(&mut self, key: &str) -> Result<String> {
        self.expect_entry(key, ValueTag::String)?;
        let len = self.inner.read_u32::<LittleEndian>()? as usize;
        self.read_raw_string(len)
    }

    fn read_vec2(&mut self, key: &str) -> Result<Vec2> {
        self.expect_entry(key, ValueTag::Vec2)?;
        let x = self.inner.read_f32::<LittleEndian>()?;
        let y = self.inner.read_f32::<LittleEndian>()?;
        Ok(Vec2::new(x, y))
    }

    fn begin_block(&mut self, key: &str) -> Result<()> {
        self.expect_entry(key, ValueTag::BlockStart)?;
        self.stack.push(Frame::Block);
        Ok(())
    }

    fn end_block(&mut self) -> Result<()> {
        self.expect_entry("", ValueTag::BlockEnd)?;
        close_frame(&mut self.stack, Frame::Block)
    }

    fn begin_list(&mut self, key: &str) -> Result<usize> {
        self.expect_entry(key, ValueTag::ListStart)?;
        let len = self.inner.read_u32::<LittleEndian>()? as usize;
        self.stack.push(Frame::List);
        Ok(len)
    }

    fn end_list(&mut self) -> Result<()> {
        self.expect_entry("", ValueTag::ListEnd)?;
        close_frame(&mut self.stack, Frame::List)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn reader_for(bytes: Vec<u8>) -> BinaryValueReader<Cursor<Vec<u8>>> {
        BinaryValueReader::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_header_layout() {
        let bytes = BinaryValueWriter::new(Vec::new())
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(bytes, vec![b'F', b'X', b'K', b'V', 1, 0]);
    }

    #[test]
    fn test_truncated_string_with_huge_length() {
        let mut bytes = vec![b'F', b'X', b'K', b'V', 1, 0];
        bytes.extend(&4u16.to_le_bytes());
        bytes.extend(b"Name");
        bytes.push(ValueTag::String as u8);
        bytes.extend(&u32::MAX.to_le_bytes());
        bytes.extend(b"abc");

        let mut reader = reader_for(bytes);
        match reader.read_string("Name") {
            Err(DataError::Io(err)) => {
                assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
            }
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_layout() {
        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        writer.write_i32("Budget", 300).unwrap();
        let bytes = writer.finish().unwrap();

        let mut expected = vec![b'F', b'X', b'K', b'V', 1, 0];
        expected.extend(&6u16.to_le_bytes());
        expected.extend(b"Budget");
        expected.push(ValueTag::I32 as u8);
        expected.extend(&300i32.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_nested_values() {
        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        writer.write_string("Name", "Sparks").unwrap();
        writer.begin_block("ReleaseSpeed").unwrap();
        writer.write_f32("Min", 1.5).unwrap();
        writer.write_f32("Max", 3.0).unwrap();
        writer.end_block().unwrap();
        writer.begin_list("Points", 2).unwrap();
        writer.write_vec2("Point", Vec2::new(1.0, 2.0)).unwrap();
        writer.write_vec2("Point", Vec2::new(-3.0, 4.5)).unwrap();
        writer.end_list().unwrap();
        writer.write_bool("Closed", true).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = reader_for(bytes);
        assert_eq!(reader.read_string("Name").unwrap(), "Sparks");
        reader.begin_block("ReleaseSpeed").unwrap();
        assert_eq!(reader.read_f32("Min").unwrap(), 1.5);
        assert_eq!(reader.read_f32("Max").unwrap(), 3.0);
        reader.end_block().unwrap();
        assert_eq!(reader.begin_list("Points").unwrap(), 2);
        assert_eq!(reader.read_vec2("Point").unwrap(), Vec2::new(1.0, 2.0));
        assert_eq!(reader.read_vec2("Point").unwrap(), Vec2::new(-3.0, 4.5));
        reader.end_list().unwrap();
        assert!(reader.read_bool("Closed").unwrap());
    }

    #[test]
    fn test_key_mismatch() {
        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        writer.write_i32("Height", 10).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = reader_for(bytes);
        match reader.read_f32("ConeAngle") {
            Err(DataError::UnexpectedKey { expected, found }) => {
                assert_eq!(expected, "ConeAngle");
                assert_eq!(found, "Height");
            }
            other => panic!("expected key mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch() {
        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        writer.write_f32("Budget", 1.0).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = reader_for(bytes);
        assert!(matches!(
            reader.read_i32("Budget"),
            Err(DataError::UnexpectedType {
                expected: ValueTag::I32,
                found: ValueTag::F32,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_magic() {
        let result = BinaryValueReader::new(Cursor::new(b"NOPE\x01\x00".to_vec()));
        assert!(matches!(result, Err(DataError::InvalidMagic { .. })));
    }

    #[test]
    fn test_unsupported_version() {
        let result = BinaryValueReader::new(Cursor::new(b"FXKV\x09\x00".to_vec()));
        assert!(matches!(result, Err(DataError::UnsupportedVersion(9))));
    }

    #[test]
    fn test_truncated_stream() {
        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        writer.write_u32("Color", 0xFFFF_FFFF).unwrap();
        let mut bytes = writer.finish().unwrap();
        bytes.truncate(bytes.len() - 2);

        let mut reader = reader_for(bytes);
        assert!(matches!(reader.read_u32("Color"), Err(DataError::Io(_))));
    }

    #[test]
    fn test_unbalanced_nesting() {
        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        assert!(matches!(
            writer.end_block(),
            Err(DataError::UnbalancedNesting(_))
        ));

        writer.begin_list("Items", 0).unwrap();
        assert!(matches!(
            writer.end_block(),
            Err(DataError::UnbalancedNesting(_))
        ));

        let mut writer = BinaryValueWriter::new(Vec::new()).unwrap();
        writer.begin_block("Open").unwrap();
        assert!(matches!(
            writer.finish(),
            Err(DataError::UnbalancedNesting(_))
        ));
    }
}
