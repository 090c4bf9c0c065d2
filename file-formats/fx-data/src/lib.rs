//! Persisted value contract for particle effect definitions.
//!
//! Effect and emitter definitions are stored as an order-significant sequence
//! of named values. Consumers only see the [`ValueReader`] and
//! [`ValueWriter`] traits; this crate also ships a compact binary
//! implementation of both.
//!
//! # Examples
//!
//! ```
//! use fx_data::prelude::*;
//!
//! let mut writer = BinaryValueWriter::new(Vec::new())?;
//! writer.write_i32("Budget", 500)?;
//! writer.begin_block("ReleaseSpeed")?;
//! writer.write_f32("Min", 40.0)?;
//! writer.write_f32("Max", 60.0)?;
//! writer.end_block()?;
//! let bytes = writer.finish()?;
//!
//! let mut reader = BinaryValueReader::new(bytes.as_slice())?;
//! assert_eq!(reader.read_i32("Budget")?, 500);
//! reader.begin_block("ReleaseSpeed")?;
//! assert_eq!(reader.read_f32("Min")?, 40.0);
//! # Ok::<(), fx_data::DataError>(())
//! ```

pub mod binary;
pub mod error;
pub mod types;
pub mod value;

pub use binary::{BinaryValueReader, BinaryValueWriter, FORMAT_MAGIC, FORMAT_VERSION};
pub use error::{DataError, Result};
pub use types::Rgba;
pub use value::{PersistEnum, ValueReader, ValueTag, ValueWriter, read_enum, write_enum};

pub mod prelude {
    pub use crate::binary::{BinaryValueReader, BinaryValueWriter};
    pub use crate::types::Rgba;
    pub use crate::value::{PersistEnum, ValueReader, ValueWriter, read_enum, write_enum};
}
