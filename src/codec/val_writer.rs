use std::io::Write;
use std::marker::PhantomData;

use byteorder::ByteOrder;
use byteorder::WriteBytesExt;

use crate::{PlyError, ScalarValue};

pub struct BinValWriter<W: Write, E: ByteOrder> {
    writer: W,
    _endian: PhantomData<E>,
}

impl<W: Write, E: ByteOrder> BinValWriter<W, E> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            writer,
            _endian: PhantomData,
        }
    }
}

pub struct AsciiValWriter<W: Write> {
    writer: W,
}

impl<W: Write> AsciiValWriter<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }
}

pub trait ScalarWriter {
    /// Write a value in its own type.
    fn write_scalar(&mut self, val: ScalarValue) -> Result<(), PlyError>;

    fn write_row_end(&mut self) -> Result<(), PlyError>;
}

impl<W: Write, E: ByteOrder> ScalarWriter for BinValWriter<W, E> {
    fn write_scalar(&mut self, val: ScalarValue) -> Result<(), PlyError> {
        match val {
            ScalarValue::I8(v) => self.writer.write_i8(v)?,
            ScalarValue::U8(v) => self.writer.write_u8(v)?,
            ScalarValue::I16(v) => self.writer.write_i16::<E>(v)?,
            ScalarValue::U16(v) => self.writer.write_u16::<E>(v)?,
            ScalarValue::I32(v) => self.writer.write_i32::<E>(v)?,
            ScalarValue::U32(v) => self.writer.write_u32::<E>(v)?,
            ScalarValue::F32(v) => self.writer.write_f32::<E>(v)?,
            ScalarValue::F64(v) => self.writer.write_f64::<E>(v)?,
        }
        Ok(())
    }

    fn write_row_end(&mut self) -> Result<(), PlyError> {
        Ok(())
    }
}

impl<W: Write> ScalarWriter for AsciiValWriter<W> {
    fn write_scalar(&mut self, val: ScalarValue) -> Result<(), PlyError> {
        write!(self.writer, "{val} ")?;
        Ok(())
    }

    fn write_row_end(&mut self) -> Result<(), PlyError> {
        writeln!(self.writer)?;
        Ok(())
    }
}
