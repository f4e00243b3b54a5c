//! Per-row encoding and decoding of element data.

use std::io::{BufRead, Write};

use byteorder::{BigEndian, LittleEndian};

use crate::{
    ElementSchema, PlyError, PlyFormat, PropertyDescriptor, PropertyValue, Row, ScalarValue,
};

pub mod val_reader;
pub mod val_writer;

use val_reader::{AsciiValReader, BinValReader, ScalarReader};
use val_writer::{AsciiValWriter, BinValWriter, ScalarWriter};

/// Encodes and decodes the rows of one element.
///
/// Values are coerced between each property's internal and external types.
/// Rows are written and read property by property in schema order.
#[derive(Debug, Clone, Copy)]
pub struct ElementCodec<'a> {
    schema: &'a ElementSchema,
    format: PlyFormat,
}

impl<'a> ElementCodec<'a> {
    pub fn new(schema: &'a ElementSchema, format: PlyFormat) -> Self {
        Self { schema, format }
    }

    pub fn schema(&self) -> &'a ElementSchema {
        self.schema
    }

    /// Encode one row. Nothing is written if the row is rejected before any
    /// value is encoded (unknown, missing or mistyped properties and
    /// oversized lists).
    pub fn encode<W: Write>(&self, row: &Row, writer: W) -> Result<(), PlyError> {
        self.check_row(row)?;
        match self.format {
            PlyFormat::Ascii => self.encode_with(row, &mut AsciiValWriter::new(writer)),
            PlyFormat::BinaryLittleEndian => {
                self.encode_with(row, &mut BinValWriter::<_, LittleEndian>::new(writer))
            }
            PlyFormat::BinaryBigEndian => {
                self.encode_with(row, &mut BinValWriter::<_, BigEndian>::new(writer))
            }
        }
    }

    /// Decode one row, values coerced to each property's internal type.
    pub fn decode<R: BufRead>(&self, reader: R) -> Result<Row, PlyError> {
        match self.format {
            PlyFormat::Ascii => self.decode_with(&mut AsciiValReader::new(reader)),
            PlyFormat::BinaryLittleEndian => {
                self.decode_with(&mut BinValReader::<_, LittleEndian>::new(reader))
            }
            PlyFormat::BinaryBigEndian => {
                self.decode_with(&mut BinValReader::<_, BigEndian>::new(reader))
            }
        }
    }

    fn check_row(&self, row: &Row) -> Result<(), PlyError> {
        if let Some((name, _)) = row.iter().find(|(name, _)| self.schema.property(name).is_none())
        {
            return Err(PlyError::UnknownProperty {
                element: self.schema.name.clone(),
                property: name.to_string(),
            });
        }

        for prop in &self.schema.properties {
            let value = row.get(&prop.name).ok_or_else(|| PlyError::MissingProperty {
                element: self.schema.name.clone(),
                property: prop.name.clone(),
            })?;
            match (prop.is_list(), value) {
                (false, PropertyValue::Scalar(_)) => {}
                (true, PropertyValue::List(values)) => check_list_len(prop, values.len() as u64)?,
                (expect_list, _) => return Err(kind_mismatch(prop, expect_list)),
            }
        }
        Ok(())
    }

    fn encode_with<W: ScalarWriter>(&self, row: &Row, writer: &mut W) -> Result<(), PlyError> {
        for prop in &self.schema.properties {
            match (row.get(&prop.name), &prop.list) {
                (Some(PropertyValue::Scalar(v)), None) => {
                    writer.write_scalar(to_external(*v, prop))?;
                }
                (Some(PropertyValue::List(values)), Some(count)) => {
                    let len = ScalarValue::from_i64(count.external, values.len() as i64);
                    writer.write_scalar(len)?;
                    for v in values {
                        writer.write_scalar(to_external(*v, prop))?;
                    }
                }
                (None, _) => {
                    return Err(PlyError::MissingProperty {
                        element: self.schema.name.clone(),
                        property: prop.name.clone(),
                    })
                }
                (Some(_), list) => return Err(kind_mismatch(prop, list.is_some())),
            }
        }
        writer.write_row_end()
    }

    fn decode_with<R: ScalarReader>(&self, reader: &mut R) -> Result<Row, PlyError> {
        reader.read_row_start()?;
        let mut row = Row::new();

        for prop in &self.schema.properties {
            let value = match &prop.list {
                None => {
                    let v = reader.read_scalar(prop.external)?.ok_or_else(|| {
                        PlyError::MalformedData(format!(
                            "missing value for property '{}' of element '{}'",
                            prop.name, self.schema.name
                        ))
                    })?;
                    PropertyValue::Scalar(v.convert(prop.internal))
                }
                Some(count) => {
                    let len = reader
                        .read_count(count.external)?
                        .ok_or_else(|| truncated_list(prop))?;
                    if len < 0 {
                        return Err(PlyError::CorruptList {
                            property: prop.name.clone(),
                            reason: format!("negative count {len}"),
                        });
                    }
                    check_list_len(prop, len as u64)?;

                    // The count came from the file, don't trust it for the allocation.
                    let mut values = Vec::with_capacity((len as usize).min(1024));
                    for _ in 0..len {
                        let v = reader
                            .read_scalar(prop.external)?
                            .ok_or_else(|| truncated_list(prop))?;
                        values.push(v.convert(prop.internal));
                    }
                    PropertyValue::List(values)
                }
            };
            row.push(prop.name.clone(), value);
        }

        reader.read_row_end()?;
        Ok(row)
    }
}

fn to_external(v: ScalarValue, prop: &PropertyDescriptor) -> ScalarValue {
    v.convert(prop.internal).convert(prop.external)
}

fn check_list_len(prop: &PropertyDescriptor, len: u64) -> Result<(), PlyError> {
    match prop.max_list_len() {
        Some(max) if len <= max => Ok(()),
        Some(max) => Err(PlyError::CorruptList {
            property: prop.name.clone(),
            reason: format!("length {len} exceeds the count type maximum of {max}"),
        }),
        None => Err(PlyError::UnsupportedType(format!(
            "property '{}' has a non-integer count type",
            prop.name
        ))),
    }
}

fn truncated_list(prop: &PropertyDescriptor) -> PlyError {
    PlyError::CorruptList {
        property: prop.name.clone(),
        reason: "list data ends before its count".to_string(),
    }
}

fn kind_mismatch(prop: &PropertyDescriptor, expect_list: bool) -> PlyError {
    let (expected, found) = if expect_list {
        ("list", "scalar")
    } else {
        ("scalar", "list")
    };
    PlyError::TypeMismatch {
        expected: format!("{expected} for property '{}'", prop.name),
        found: found.to_string(),
    }
}
