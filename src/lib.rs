//! A streaming PLY (Polygon File Format) reader and writer.
//!
//! A PLY file is a text header that declares elements and their properties,
//! followed by element data in ASCII, binary little endian or binary big
//! endian. [`PlyWriter`] and [`PlyReader`] walk that layout as an explicit
//! lifecycle: declare or parse the header, then move through the elements in
//! order, one row at a time. Rows are plain [`Row`] values keyed by property
//! name, or any serde struct through [`record`].
//!
//! # Example
//!
//! ```rust
//! use serde::Deserialize;
//! use plyfile::{PlyReader, PlyFormat};
//!
//! #[derive(Deserialize, Debug)]
//! struct Vertex {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//!
//! let ply_data = r#"ply
//! format ascii 1.0
//! comment made by hand
//! element vertex 2
//! property float x
//! property float y
//! property float z
//! end_header
//! 1.0 2.0 3.0
//! 4.0 5.0 6.0
//! "#;
//!
//! let mut reader = PlyReader::open(ply_data.as_bytes()).unwrap();
//! assert_eq!(reader.format(), Some(PlyFormat::Ascii));
//! assert_eq!(reader.element("vertex").unwrap().count, 2);
//!
//! reader.begin_element("vertex").unwrap();
//! let first: Vertex = reader.read_record().unwrap();
//! let second: Vertex = reader.read_record().unwrap();
//! assert_eq!(first.z, 3.0);
//! assert_eq!(second.x, 4.0);
//! reader.close().unwrap();
//! ```

pub mod codec;
mod error;
mod header;
pub mod record;
mod row;
mod scalar;
mod schema;
pub mod stream;

pub use codec::ElementCodec;
pub use error::PlyError;
pub use header::{MetaLine, Metadata, PlyFormat, PlyHeader};
pub use record::{from_row, to_row};
pub use row::{PropertyValue, Row};
pub use scalar::{ScalarType, ScalarValue};
pub use schema::{ElementSchema, ListCount, PropertyDescriptor};
pub use stream::{PlyReader, PlyWriter, StreamState};
