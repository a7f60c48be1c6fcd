//! Symphony flat user record writer
//!
//! This module turns labelled customer records into the flat user format read
//! by SirsiDynix Symphony's `loadflatuser`. Every record is written
//! best-effort: a field that cannot be written is counted and logged, and the
//! rest of the record is still emitted.
//!
//! # Architecture
//!
//! - [`schema`] - System fields, their flat tags, date fields and block membership
//! - [`merge`] - Multi-source field merges
//! - [`writer`] - The `FlatWriter` itself
//! - [`stats`] - Run-wide error accounting
//!
//! # Output Format
//!
//! ```text
//! *** DOCUMENT BOUNDARY ***
//! FORM=LDUSER
//! .USER_ID.   |a21221012345678
//! .USER_FIRST_NAME.   |aLewis
//! .USER_ADDR1_BEGIN.
//! .STREET.   |a1234-567 Ave
//! .USER_ADDR1_END.
//! ```
//!
//! Fields belonging to a block are held back until the inline fields are
//! written. A block with no fields emits no markers.
//!
//! # Usage
//!
//! ```rust
//! use text2flat::app::models::CustomerRecord;
//! use text2flat::app::services::flat_writer::FlatWriter;
//!
//! # fn example() -> text2flat::Result<()> {
//! let mut writer = FlatWriter::symphony()?;
//! let record: CustomerRecord = [("userId", "21221012345678"), ("firstName", "Lewis")]
//!     .into_iter()
//!     .collect();
//!
//! let serialized = writer.serialize(record);
//! assert!(serialized.text.contains(".USER_FIRST_NAME.   |aLewis"));
//! println!("{}", writer.stats().summary());
//! # Ok(())
//! # }
//! ```

pub mod merge;
pub mod schema;
pub mod stats;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use merge::MergeRule;
pub use schema::FlatSchema;
pub use stats::WriteStats;
pub use writer::{FlatWriter, SerializedRecord};
