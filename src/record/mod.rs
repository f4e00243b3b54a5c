//! Binding caller record types to rows by property name, through serde.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Face {
//!     intensity: u8,
//!     vertex_indices: Vec<i32>,
//! }
//!
//! let face = Face { intensity: 4, vertex_indices: vec![7, 6, 5, 4] };
//! let row = plyfile::record::to_row(&face).unwrap();
//! assert_eq!(row.list("vertex_indices").unwrap().len(), 4);
//! let back: Face = plyfile::record::from_row(&row).unwrap();
//! assert_eq!(back, face);
//! ```

use serde::{de::DeserializeOwned, Serialize};

use crate::{PlyError, Row};

mod de;
mod ser;

/// Turn a struct into a row, one property per field.
pub fn to_row<T: Serialize + ?Sized>(record: &T) -> Result<Row, PlyError> {
    record.serialize(ser::RowSerializer)
}

/// Build a struct from a row, matching fields to property names.
pub fn from_row<T: DeserializeOwned>(row: &Row) -> Result<T, PlyError> {
    T::deserialize(de::row_deserializer(row))
}
