//! The key/value reader and writer contract
//!
//! Persisted definitions are a flat, order-significant sequence of named
//! entries. Readers do not search for keys: each `read_*` call consumes the
//! next entry and fails if its key or type differs from what the caller asked
//! for. Nested structure is expressed with blocks and counted lists.

use glam::Vec2;

use crate::error::{DataError, Result};

/// Type tag stored with every entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueTag {
    Bool = 1,
    I32 = 2,
    U32 = 3,
    F32 = 4,
    String = 5,
    Vec2 = 6,
    BlockStart = 7,
    BlockEnd = 8,
    ListStart = 9,
    ListEnd = 10,
}

impl ValueTag {
    /// Parse from the tag byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Bool),
            2 => Some(Self::I32),
            3 => Some(Self::U32),
            4 => Some(Self::F32),
            5 => Some(Self::String),
            6 => Some(Self::Vec2),
            7 => Some(Self::BlockStart),
            8 => Some(Self::BlockEnd),
            9 => Some(Self::ListStart),
            10 => Some(Self::ListEnd),
            _ => None,
        }
    }
}

/// Sink for persisted values.
///
/// Entries are written in call order and must be read back in the same
/// order. Every `begin_block` needs a matching `end_block`, every
/// `begin_list` a matching `end_list`.
pub trait ValueWriter {
    fn write_bool(&mut self, key: &str, value: bool) -> Result<()>;
    fn write_i32(&mut self, key: &str, value: i32) -> Result<()>;
    fn write_u32(&mut self, key: &str, value: u32) -> Result<()>;
    fn write_f32(&mut self, key: &str, value: f32) -> Result<()>;
    fn write_string(&mut self, key: &str, value: &str) -> Result<()>;
    fn write_vec2(&mut self, key: &str, value: Vec2) -> Result<()>;

    /// Open a named nested block
    fn begin_block(&mut self, key: &str) -> Result<()>;
    /// Close the innermost open block
    fn end_block(&mut self) -> Result<()>;

    /// Open a named list that will contain `len` items
    fn begin_list(&mut self, key: &str, len: usize) -> Result<()>;
    /// Close the innermost open list
    fn end_list(&mut self) -> Result<()>;
}

/// Source of persisted values, mirroring [`ValueWriter`]
pub trait ValueReader {
    fn read_bool(&mut self, key: &str) -> Result<bool>;
    fn read_i32(&mut self, key: &str) -> Result<i32>;
    fn read_u32(&mut self, key: &str) -> Result<u32>;
    fn read_f32(&mut self, key: &str) -> Result<f32>;
    fn read_string(&mut self, key: &str) -> Result<String>;
    fn read_vec2(&mut self, key: &str) -> Result<Vec2>;

    fn begin_block(&mut self, key: &str) -> Result<()>;
    fn end_block(&mut self) -> Result<()>;

    /// Open a named list and return its item count
    fn begin_list(&mut self, key: &str) -> Result<usize>;
    fn end_list(&mut self) -> Result<()>;
}

/// Enums persisted as their `u32` discriminant
pub trait PersistEnum: Copy {
    /// Name used in error messages
    const TYPE_NAME: &'static str;

    fn to_u32(self) -> u32;
    fn from_u32(value: u32) -> Option<Self>;
}

/// Write an enum-valued entry
pub fn write_enum<W, E>(writer: &mut W, key: &str, value: E) -> Result<()>
where
    W: ValueWriter + ?Sized,
    E: PersistEnum,
{
    writer.write_u32(key, value.to_u32())
}

/// Read an enum-valued entry, rejecting unknown discriminants
pub fn read_enum<R, E>(reader: &mut R, key: &str) -> Result<E>
where
    R: ValueReader + ?Sized,
    E: PersistEnum,
{
    let raw = reader.read_u32(key)?;
    E::from_u32(raw).ok_or_else(|| DataError::UnknownVariant {
        key: key.to_string(),
        type_name: E::TYPE_NAME,
        value: raw,
    })
}
