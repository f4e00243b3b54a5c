use std::io::{self, BufRead, Read};
use std::marker::PhantomData;

use byteorder::ByteOrder;
use byteorder::ReadBytesExt;

use crate::{PlyError, ScalarType, ScalarValue};

pub struct BinValReader<R: Read, E: ByteOrder> {
    reader: R,
    _endian: PhantomData<E>,
}

impl<R: Read, E: ByteOrder> BinValReader<R, E> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            _endian: PhantomData,
        }
    }
}

/// Reads one row per line, one whitespace separated token per value.
pub struct AsciiValReader<R: BufRead> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> AsciiValReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }
}

/// Source of scalar values for the element decoder.
///
/// `Ok(None)` means the row (ASCII) or the input (binary) ran out before the
/// value; the decoder decides which error that is.
pub trait ScalarReader {
    fn read_row_start(&mut self) -> Result<(), PlyError>;

    fn read_scalar(&mut self, ty: ScalarType) -> Result<Option<ScalarValue>, PlyError>;

    /// Read a list count of type `ty` without range checks.
    fn read_count(&mut self, ty: ScalarType) -> Result<Option<i64>, PlyError>;

    fn read_row_end(&mut self) -> Result<(), PlyError>;
}

fn eof_as_none<T>(res: io::Result<T>) -> Result<Option<T>, PlyError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(PlyError::Io(e)),
    }
}

impl<R: Read, E: ByteOrder> ScalarReader for BinValReader<R, E> {
    fn read_row_start(&mut self) -> Result<(), PlyError> {
        Ok(())
    }

    fn read_scalar(&mut self, ty: ScalarType) -> Result<Option<ScalarValue>, PlyError> {
        let r = &mut self.reader;
        match ty {
            ScalarType::I8 => eof_as_none(r.read_i8().map(ScalarValue::I8)),
            ScalarType::U8 => eof_as_none(r.read_u8().map(ScalarValue::U8)),
            ScalarType::I16 => eof_as_none(r.read_i16::<E>().map(ScalarValue::I16)),
            ScalarType::U16 => eof_as_none(r.read_u16::<E>().map(ScalarValue::U16)),
            ScalarType::I32 => eof_as_none(r.read_i32::<E>().map(ScalarValue::I32)),
            ScalarType::U32 => eof_as_none(r.read_u32::<E>().map(ScalarValue::U32)),
            ScalarType::F32 => eof_as_none(r.read_f32::<E>().map(ScalarValue::F32)),
            ScalarType::F64 => eof_as_none(r.read_f64::<E>().map(ScalarValue::F64)),
        }
    }

    fn read_count(&mut self, ty: ScalarType) -> Result<Option<i64>, PlyError> {
        Ok(self.read_scalar(ty)?.map(|v| v.as_i64()))
    }

    fn read_row_end(&mut self) -> Result<(), PlyError> {
        Ok(())
    }
}

impl<R: BufRead> ScalarReader for AsciiValReader<R> {
    fn read_row_start(&mut self) -> Result<(), PlyError> {
        // Blank lines between rows are tolerated.
        loop {
            let mut bytes = std::mem::take(&mut self.line).into_bytes();
            bytes.clear();
            self.pos = 0;
            if self.reader.read_until(b'\n', &mut bytes)? == 0 {
                return Err(PlyError::MalformedData("unexpected end of data".to_string()));
            }
            self.line = String::from_utf8(bytes).map_err(|e| {
                PlyError::MalformedData(format!("row is not valid UTF-8: {}", e.utf8_error()))
            })?;
            if !self.line.trim().is_empty() {
                return Ok(());
            }
        }
    }

    fn read_scalar(&mut self, ty: ScalarType) -> Result<Option<ScalarValue>, PlyError> {
        let Some(token) = self.next_token() else {
            return Ok(None);
        };
        let parsed = match ty {
            ScalarType::I8 => token.parse().map(ScalarValue::I8).ok(),
            ScalarType::U8 => token.parse().map(ScalarValue::U8).ok(),
            ScalarType::I16 => token.parse().map(ScalarValue::I16).ok(),
            ScalarType::U16 => token.parse().map(ScalarValue::U16).ok(),
            ScalarType::I32 => token.parse().map(ScalarValue::I32).ok(),
            ScalarType::U32 => token.parse().map(ScalarValue::U32).ok(),
            ScalarType::F32 => token.parse().map(ScalarValue::F32).ok(),
            ScalarType::F64 => token.parse().map(ScalarValue::F64).ok(),
        };
        match parsed {
            Some(v) => Ok(Some(v)),
            None => Err(PlyError::MalformedData(format!("'{token}' is not a valid {ty}"))),
        }
    }

    fn read_count(&mut self, ty: ScalarType) -> Result<Option<i64>, PlyError> {
        let Some(token) = self.next_token() else {
            return Ok(None);
        };
        match token.parse::<i64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(PlyError::MalformedData(format!(
                "'{token}' is not a valid {ty} list count"
            ))),
        }
    }

    fn read_row_end(&mut self) -> Result<(), PlyError> {
        match self.next_token() {
            None => Ok(()),
            Some(token) => Err(PlyError::MalformedData(format!(
                "unexpected trailing value '{token}'"
            ))),
        }
    }
}

impl<R: BufRead> AsciiValReader<R> {
    fn next_token(&mut self) -> Option<&str> {
        let rest = &self.line[self.pos..];
        let start = rest.len() - rest.trim_start().len();
        let rest = &rest[start..];
        if rest.is_empty() {
            self.pos = self.line.len();
            return None;
        }
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token_start = self.pos + start;
        self.pos = token_start + len;
        Some(&self.line[token_start..token_start + len])
    }
}
