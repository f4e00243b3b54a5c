use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{IntoDeserializer, Visitor};
use serde::Deserializer;

use crate::{PlyError, PropertyValue, Row, ScalarValue};

pub(crate) fn row_deserializer<'a>(
    row: &'a Row,
) -> MapDeserializer<'a, impl Iterator<Item = (&'a str, &'a PropertyValue)>, PlyError> {
    MapDeserializer::new(row.iter())
}

pub struct ValueDeserializer<'a> {
    value: &'a PropertyValue,
}

impl<'de, 'a> IntoDeserializer<'de, PlyError> for &'a PropertyValue {
    type Deserializer = ValueDeserializer<'a>;

    fn into_deserializer(self) -> Self::Deserializer {
        ValueDeserializer { value: self }
    }
}

impl<'de, 'a> Deserializer<'de> for ValueDeserializer<'a> {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            PropertyValue::Scalar(v) => ScalarDeserializer(*v).deserialize_any(visitor),
            PropertyValue::List(values) => {
                let seq = SeqDeserializer::<_, PlyError>::new(values.iter().copied());
                seq.deserialize_any(visitor)
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Properties present in a row are never null.
        visitor.visit_some(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 f32 f64 i128 i64 u128 u64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

pub struct ScalarDeserializer(ScalarValue);

impl<'de> IntoDeserializer<'de, PlyError> for ScalarValue {
    type Deserializer = ScalarDeserializer;

    fn into_deserializer(self) -> Self::Deserializer {
        ScalarDeserializer(self)
    }
}

impl<'de> Deserializer<'de> for ScalarDeserializer {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            ScalarValue::I8(v) => visitor.visit_i8(v),
            ScalarValue::U8(v) => visitor.visit_u8(v),
            ScalarValue::I16(v) => visitor.visit_i16(v),
            ScalarValue::U16(v) => visitor.visit_u16(v),
            ScalarValue::I32(v) => visitor.visit_i32(v),
            ScalarValue::U32(v) => visitor.visit_u32(v),
            ScalarValue::F32(v) => visitor.visit_f32(v),
            ScalarValue::F64(v) => visitor.visit_f64(v),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 f32 f64 i128 i64 u128 u64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}
