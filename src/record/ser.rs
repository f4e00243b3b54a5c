use serde::ser::{Impossible, SerializeSeq, SerializeStruct, SerializeTuple, SerializeTupleStruct};
use serde::{Serialize, Serializer};

use crate::{PlyError, PropertyValue, Row, ScalarValue};

fn not_a_struct() -> PlyError {
    PlyError::Serde("records must serialize as structs".to_string())
}

fn no_ply_type(kind: &str) -> PlyError {
    PlyError::UnsupportedType(format!("{kind} has no PLY scalar type"))
}

pub(crate) struct RowSerializer;

impl Serializer for RowSerializer {
    type Ok = Row;
    type Error = PlyError;

    type SerializeSeq = Impossible<Row, PlyError>;
    type SerializeTuple = Impossible<Row, PlyError>;
    type SerializeTupleStruct = Impossible<Row, PlyError>;
    type SerializeTupleVariant = Impossible<Row, PlyError>;
    type SerializeMap = Impossible<Row, PlyError>;
    type SerializeStruct = RowStructSerializer;
    type SerializeStructVariant = Impossible<Row, PlyError>;

    fn serialize_bool(self, _v: bool) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_i8(self, _v: i8) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_i16(self, _v: i16) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_i32(self, _v: i32) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_i64(self, _v: i64) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_u8(self, _v: u8) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_u16(self, _v: u16) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_u32(self, _v: u32) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_u64(self, _v: u64) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_f32(self, _v: f32) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_f64(self, _v: f64) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_char(self, _v: char) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_str(self, _v: &str) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_none(self) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Row, PlyError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    // A unit struct is a record with no properties.
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Row, PlyError> {
        Ok(Row::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Row, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Row, PlyError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Row, PlyError>
    where
        T: Serialize + ?Sized,
    {
        Err(not_a_struct())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, PlyError> {
        Err(not_a_struct())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, PlyError> {
        Ok(RowStructSerializer { row: Row::new() })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, PlyError> {
        Err(not_a_struct())
    }
}

pub(crate) struct RowStructSerializer {
    row: Row,
}

impl SerializeStruct for RowStructSerializer {
    type Ok = Row;
    type Error = PlyError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), PlyError>
    where
        T: Serialize + ?Sized,
    {
        // `None` fields are left out of the row.
        if let Some(value) = value.serialize(ValueSerializer)? {
            self.row.set(key, value);
        }
        Ok(())
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<(), PlyError> {
        Ok(())
    }

    fn end(self) -> Result<Row, PlyError> {
        Ok(self.row)
    }
}

/// Serializes one field into a property value.
struct ValueSerializer;

type ValueResult = Result<Option<PropertyValue>, PlyError>;

fn scalar(v: impl Into<ScalarValue>) -> ValueResult {
    Ok(Some(PropertyValue::Scalar(v.into())))
}

impl Serializer for ValueSerializer {
    type Ok = Option<PropertyValue>;
    type Error = PlyError;

    type SerializeSeq = ListSerializer;
    type SerializeTuple = ListSerializer;
    type SerializeTupleStruct = ListSerializer;
    type SerializeTupleVariant = Impossible<Option<PropertyValue>, PlyError>;
    type SerializeMap = Impossible<Option<PropertyValue>, PlyError>;
    type SerializeStruct = Impossible<Option<PropertyValue>, PlyError>;
    type SerializeStructVariant = Impossible<Option<PropertyValue>, PlyError>;

    fn serialize_bool(self, _v: bool) -> ValueResult {
        Err(no_ply_type("bool"))
    }

    fn serialize_i8(self, v: i8) -> ValueResult {
        scalar(v)
    }

    fn serialize_i16(self, v: i16) -> ValueResult {
        scalar(v)
    }

    fn serialize_i32(self, v: i32) -> ValueResult {
        scalar(v)
    }

    fn serialize_i64(self, _v: i64) -> ValueResult {
        Err(no_ply_type("i64"))
    }

    fn serialize_u8(self, v: u8) -> ValueResult {
        scalar(v)
    }

    fn serialize_u16(self, v: u16) -> ValueResult {
        scalar(v)
    }

    fn serialize_u32(self, v: u32) -> ValueResult {
        scalar(v)
    }

    fn serialize_u64(self, _v: u64) -> ValueResult {
        Err(no_ply_type("u64"))
    }

    fn serialize_f32(self, v: f32) -> ValueResult {
        scalar(v)
    }

    fn serialize_f64(self, v: f64) -> ValueResult {
        scalar(v)
    }

    fn serialize_char(self, _v: char) -> ValueResult {
        Err(no_ply_type("char"))
    }

    fn serialize_str(self, _v: &str) -> ValueResult {
        Err(no_ply_type("string"))
    }

    fn serialize_bytes(self, v: &[u8]) -> ValueResult {
        Ok(Some(PropertyValue::List(
            v.iter().map(|&b| ScalarValue::U8(b)).collect(),
        )))
    }

    fn serialize_none(self) -> ValueResult {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> ValueResult
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> ValueResult {
        Err(no_ply_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> ValueResult {
        Err(no_ply_type(name))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> ValueResult {
        Err(no_ply_type(name))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> ValueResult
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> ValueResult
    where
        T: Serialize + ?Sized,
    {
        Err(no_ply_type(name))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ListSerializer, PlyError> {
        Ok(ListSerializer::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<ListSerializer, PlyError> {
        Ok(ListSerializer::with_capacity(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<ListSerializer, PlyError> {
        Ok(ListSerializer::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, PlyError> {
        Err(no_ply_type(name))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, PlyError> {
        Err(no_ply_type("map"))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, PlyError> {
        Err(no_ply_type(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, PlyError> {
        Err(no_ply_type(name))
    }
}

/// Collects the elements of a list property. Elements must be scalars.
struct ListSerializer {
    values: Vec<ScalarValue>,
}

impl ListSerializer {
    fn with_capacity(len: usize) -> Self {
        Self {
            values: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PlyError> {
        match value.serialize(ValueSerializer)? {
            Some(PropertyValue::Scalar(v)) => {
                self.values.push(v);
                Ok(())
            }
            Some(PropertyValue::List(_)) => Err(PlyError::TypeMismatch {
                expected: "scalar list element".to_string(),
                found: "nested list".to_string(),
            }),
            None => Err(PlyError::Serde("list elements cannot be None".to_string())),
        }
    }

    fn finish(self) -> ValueResult {
        Ok(Some(PropertyValue::List(self.values)))
    }
}

impl SerializeSeq for ListSerializer {
    type Ok = Option<PropertyValue>;
    type Error = PlyError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), PlyError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> ValueResult {
        self.finish()
    }
}

impl SerializeTuple for ListSerializer {
    type Ok = Option<PropertyValue>;
    type Error = PlyError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), PlyError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> ValueResult {
        self.finish()
    }
}

impl SerializeTupleStruct for ListSerializer {
    type Ok = Option<PropertyValue>;
    type Error = PlyError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), PlyError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> ValueResult {
        self.finish()
    }
}
