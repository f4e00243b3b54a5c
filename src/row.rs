use crate::ScalarValue;

/// The value of one property in a row.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(ScalarValue),
    /// A decoded list. Always owned, never tied to the stream buffer.
    List(Vec<ScalarValue>),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<ScalarValue> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            PropertyValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScalarValue]> {
        match self {
            PropertyValue::Scalar(_) => None,
            PropertyValue::List(values) => Some(values),
        }
    }
}

impl From<ScalarValue> for PropertyValue {
    fn from(v: ScalarValue) -> Self {
        PropertyValue::Scalar(v)
    }
}

macro_rules! scalar_property_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PropertyValue {
                fn from(v: $t) -> Self {
                    PropertyValue::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_property_from!(i8, u8, i16, u16, i32, u32, f32, f64);

impl<T: Into<ScalarValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        PropertyValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One element instance: property values keyed by property name.
///
/// Rows decoded from a file list their properties in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<(String, PropertyValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Row::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property, replacing any previous value of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn scalar(&self, name: &str) -> Option<ScalarValue> {
        self.get(name).and_then(PropertyValue::as_scalar)
    }

    pub fn list(&self, name: &str) -> Option<&[ScalarValue]> {
        self.get(name).and_then(PropertyValue::as_list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn push(&mut self, name: String, value: PropertyValue) {
        self.values.push((name, value));
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.values.retain(|(n, _)| keep(n));
    }
}
