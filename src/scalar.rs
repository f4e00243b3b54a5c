//! The fixed set of PLY scalar types and the coercions between them.

use std::fmt;
use std::str::FromStr;

use crate::PlyError;

/// PLY scalar data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    /// Parse a header type token. Both the classic (`uchar`) and the sized
    /// (`uint8`) spellings are accepted.
    pub fn parse(s: &str) -> Result<Self, PlyError> {
        match s {
            "char" | "int8" => Ok(ScalarType::I8),
            "uchar" | "uint8" => Ok(ScalarType::U8),
            "short" | "int16" => Ok(ScalarType::I16),
            "ushort" | "uint16" => Ok(ScalarType::U16),
            "int" | "int32" => Ok(ScalarType::I32),
            "uint" | "uint32" => Ok(ScalarType::U32),
            "float" | "float32" => Ok(ScalarType::F32),
            "double" | "float64" => Ok(ScalarType::F64),
            _ => Err(PlyError::UnsupportedType(s.to_string())),
        }
    }

    /// Look up a type by the numeric code used by the C plyfile API.
    pub fn from_code(code: i32) -> Result<Self, PlyError> {
        match code {
            1 => Ok(ScalarType::I8),
            2 => Ok(ScalarType::I16),
            3 => Ok(ScalarType::I32),
            4 => Ok(ScalarType::U8),
            5 => Ok(ScalarType::U16),
            6 => Ok(ScalarType::U32),
            7 => Ok(ScalarType::F32),
            8 => Ok(ScalarType::F64),
            _ => Err(PlyError::UnsupportedType(format!("type code {code}"))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ScalarType::I8 => 1,
            ScalarType::I16 => 2,
            ScalarType::I32 => 3,
            ScalarType::U8 => 4,
            ScalarType::U16 => 5,
            ScalarType::U32 => 6,
            ScalarType::F32 => 7,
            ScalarType::F64 => 8,
        }
    }

    /// The token written into headers for this type.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::I8 => "char",
            ScalarType::U8 => "uchar",
            ScalarType::I16 => "short",
            ScalarType::U16 => "ushort",
            ScalarType::I32 => "int",
            ScalarType::U32 => "uint",
            ScalarType::F32 => "float",
            ScalarType::F64 => "double",
        }
    }

    pub fn size_bytes(self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    /// Largest list length a count of this type can hold. `None` for float
    /// types, which can't be used as list counts.
    pub fn max_count(self) -> Option<u64> {
        match self {
            ScalarType::I8 => Some(i8::MAX as u64),
            ScalarType::U8 => Some(u8::MAX as u64),
            ScalarType::I16 => Some(i16::MAX as u64),
            ScalarType::U16 => Some(u16::MAX as u64),
            ScalarType::I32 => Some(i32::MAX as u64),
            ScalarType::U32 => Some(u32::MAX as u64),
            ScalarType::F32 | ScalarType::F64 => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = PlyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A single value of one of the PLY scalar types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::I8(_) => ScalarType::I8,
            ScalarValue::U8(_) => ScalarType::U8,
            ScalarValue::I16(_) => ScalarType::I16,
            ScalarValue::U16(_) => ScalarType::U16,
            ScalarValue::I32(_) => ScalarType::I32,
            ScalarValue::U32(_) => ScalarType::U32,
            ScalarValue::F32(_) => ScalarType::F32,
            ScalarValue::F64(_) => ScalarType::F64,
        }
    }

    /// Integer view of the value. Floats truncate toward zero, saturating at
    /// the `i64` range (NaN becomes 0).
    pub fn as_i64(&self) -> i64 {
        match *self {
            ScalarValue::I8(v) => v as i64,
            ScalarValue::U8(v) => v as i64,
            ScalarValue::I16(v) => v as i64,
            ScalarValue::U16(v) => v as i64,
            ScalarValue::I32(v) => v as i64,
            ScalarValue::U32(v) => v as i64,
            ScalarValue::F32(v) => v.trunc() as i64,
            ScalarValue::F64(v) => v.trunc() as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ScalarValue::I8(v) => v as f64,
            ScalarValue::U8(v) => v as f64,
            ScalarValue::I16(v) => v as f64,
            ScalarValue::U16(v) => v as f64,
            ScalarValue::I32(v) => v as f64,
            ScalarValue::U32(v) => v as f64,
            ScalarValue::F32(v) => v as f64,
            ScalarValue::F64(v) => v,
        }
    }

    /// Build a value of type `ty` from an integer, wrapping to the target
    /// width.
    pub fn from_i64(ty: ScalarType, v: i64) -> Self {
        match ty {
            ScalarType::I8 => ScalarValue::I8(v as i8),
            ScalarType::U8 => ScalarValue::U8(v as u8),
            ScalarType::I16 => ScalarValue::I16(v as i16),
            ScalarType::U16 => ScalarValue::U16(v as u16),
            ScalarType::I32 => ScalarValue::I32(v as i32),
            ScalarType::U32 => ScalarValue::U32(v as u32),
            ScalarType::F32 => ScalarValue::F32(v as f32),
            ScalarType::F64 => ScalarValue::F64(v as f64),
        }
    }

    /// Build a value of type `ty` from a float. Integer targets truncate
    /// toward zero and then wrap.
    pub fn from_f64(ty: ScalarType, v: f64) -> Self {
        match ty {
            ScalarType::F32 => ScalarValue::F32(v as f32),
            ScalarType::F64 => ScalarValue::F64(v),
            _ => Self::from_i64(ty, v.trunc() as i64),
        }
    }

    /// Coerce into another scalar type.
    pub fn convert(self, to: ScalarType) -> Self {
        if self.scalar_type() == to {
            return self;
        }
        match self {
            ScalarValue::F32(_) | ScalarValue::F64(_) => Self::from_f64(to, self.as_f64()),
            _ => Self::from_i64(to, self.as_i64()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::I8(v) => write!(f, "{v}"),
            ScalarValue::U8(v) => write!(f, "{v}"),
            ScalarValue::I16(v) => write!(f, "{v}"),
            ScalarValue::U16(v) => write!(f, "{v}"),
            ScalarValue::I32(v) => write!(f, "{v}"),
            ScalarValue::U32(v) => write!(f, "{v}"),
            ScalarValue::F32(v) => write!(f, "{v}"),
            ScalarValue::F64(v) => write!(f, "{v}"),
        }
    }
}

impl From<i8> for ScalarValue {
    fn from(v: i8) -> Self {
        ScalarValue::I8(v)
    }
}

impl From<u8> for ScalarValue {
    fn from(v: u8) -> Self {
        ScalarValue::U8(v)
    }
}

impl From<i16> for ScalarValue {
    fn from(v: i16) -> Self {
        ScalarValue::I16(v)
    }
}

impl From<u16> for ScalarValue {
    fn from(v: u16) -> Self {
        ScalarValue::U16(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::I32(v)
    }
}

impl From<u32> for ScalarValue {
    fn from(v: u32) -> Self {
        ScalarValue::U32(v)
    }
}

impl From<f32> for ScalarValue {
    fn from(v: f32) -> Self {
        ScalarValue::F32(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::F64(v)
    }
}
