use crate::{PlyError, ScalarType};

/// Count types of a list property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCount {
    /// Type of the count in the file.
    pub external: ScalarType,
    /// Type the count is checked against in memory.
    pub internal: ScalarType,
}

/// PLY property definition.
///
/// `external` is the on-disk type of the property (of each list entry for
/// list properties), `internal` the type values are coerced to and from in
/// memory. `list` is `None` for scalar properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub external: ScalarType,
    pub internal: ScalarType,
    pub list: Option<ListCount>,
}

impl PropertyDescriptor {
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            external: ty,
            internal: ty,
            list: None,
        }
    }

    pub fn list(name: impl Into<String>, count_type: ScalarType, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            external: ty,
            internal: ty,
            list: Some(ListCount {
                external: count_type,
                internal: count_type,
            }),
        }
    }

    /// Coerce values to `internal` in memory instead of the file type.
    pub fn with_internal(mut self, internal: ScalarType) -> Self {
        self.internal = internal;
        self
    }

    /// Check list lengths against `internal` instead of the file count type.
    /// No effect on scalar properties.
    pub fn with_count_internal(mut self, internal: ScalarType) -> Self {
        if let Some(count) = &mut self.list {
            count.internal = internal;
        }
        self
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), PlyError> {
        if let Some(count) = &self.list {
            for ty in [count.external, count.internal] {
                if ty.is_float() {
                    return Err(PlyError::UnsupportedType(format!(
                        "{ty} can't be used as the count type of list '{}'",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Largest list length both count types can represent.
    pub(crate) fn max_list_len(&self) -> Option<u64> {
        let count = self.list.as_ref()?;
        let external = count.external.max_count()?;
        let internal = count.internal.max_count()?;
        Some(external.min(internal))
    }
}

/// PLY element definition (e.g., vertex, face)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSchema {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDescriptor>,
}

impl ElementSchema {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            properties: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub(crate) fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Append a property, keeping declaration order.
    pub fn add_property(&mut self, property: PropertyDescriptor) -> Result<(), PlyError> {
        if self.property(&property.name).is_some() {
            return Err(PlyError::DuplicateProperty {
                element: self.name.clone(),
                property: property.name,
            });
        }
        property.validate()?;
        self.properties.push(property);
        Ok(())
    }

    /// Size of one binary row in bytes, or `None` if the element has list
    /// properties and rows vary in size.
    pub fn fixed_size(&self) -> Option<usize> {
        self.properties
            .iter()
            .map(|p| (!p.is_list()).then(|| p.external.size_bytes()))
            .sum()
    }
}
