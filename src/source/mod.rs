//! Reading the delimited sales file into a raw, string-typed table.

pub mod read;
pub mod row;

pub use read::read_table;
pub use row::{RawRow, RawTable};
