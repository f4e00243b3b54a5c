use std::io::BufRead;

use serde::de::DeserializeOwned;

use crate::{
    stream::StreamState, ElementCodec, ElementSchema, PlyError, PlyFormat, PlyHeader,
    PropertyDescriptor, Row,
};

/// How rows of one element are handed out: the file schema with the
/// caller's internal types applied, and the properties the caller asked for.
#[derive(Debug, Clone)]
struct ReadBinding {
    schema: ElementSchema,
    selected: Option<Vec<String>>,
}

impl ReadBinding {
    fn decode<R: BufRead>(&self, format: PlyFormat, source: &mut R) -> Result<Row, PlyError> {
        let mut row = ElementCodec::new(&self.schema, format).decode(source)?;
        if let Some(selected) = &self.selected {
            row.retain(|name| selected.iter().any(|s| s == name));
        }
        Ok(row)
    }
}

/// Reads a PLY file from a buffered byte source.
///
/// ```rust
/// use plyfile::{PlyReader, ScalarValue};
///
/// let ply = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n0.5\n";
/// let mut reader = PlyReader::open(ply.as_bytes()).unwrap();
/// let rows = reader.read_element("vertex").unwrap();
/// assert_eq!(rows[0].scalar("x"), Some(ScalarValue::F32(0.5)));
/// reader.close().unwrap();
/// ```
pub struct PlyReader<R: BufRead> {
    source: Option<R>,
    header: Option<PlyHeader>,
    bindings: Vec<ReadBinding>,
    state: StreamState,
    next_element: usize,
}

impl<R: BufRead> PlyReader<R> {
    /// Wrap a source without reading from it yet.
    pub fn new(source: R) -> Self {
        Self {
            source: Some(source),
            header: None,
            bindings: Vec::new(),
            state: StreamState::Opened,
            next_element: 0,
        }
    }

    /// Wrap a source and parse its header.
    pub fn open(source: R) -> Result<Self, PlyError> {
        let mut reader = Self::new(source);
        reader.read_header()?;
        Ok(reader)
    }

    pub fn read_header(&mut self) -> Result<(), PlyError> {
        if self.state != StreamState::Opened {
            return Err(PlyError::invalid_state("read the header", &self.state));
        }
        let Some(source) = self.source.as_mut() else {
            return Err(PlyError::invalid_state("read the header", &self.state));
        };

        match PlyHeader::parse(source) {
            Ok(header) => {
                self.bindings = header
                    .elements
                    .iter()
                    .map(|schema| ReadBinding {
                        schema: schema.clone(),
                        selected: None,
                    })
                    .collect();
                self.header = Some(header);
                self.state = StreamState::HeaderParsed;
                Ok(())
            }
            Err(e) => {
                self.state = self.state.failed();
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// The parsed header, once it has been read.
    pub fn header(&self) -> Option<&PlyHeader> {
        self.header.as_ref()
    }

    pub fn format(&self) -> Option<PlyFormat> {
        self.header.as_ref().map(|h| h.format)
    }

    pub fn version(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.version.as_str())
    }

    /// Element schemas in file order. Empty until the header is read.
    pub fn elements(&self) -> &[ElementSchema] {
        self.header
            .as_ref()
            .map(|h| h.elements.as_slice())
            .unwrap_or_default()
    }

    /// Describe one element of the file.
    pub fn element(&self, name: &str) -> Result<&ElementSchema, PlyError> {
        let Some(header) = &self.header else {
            return Err(PlyError::invalid_state("describe an element", &self.state));
        };
        header
            .get_element(name)
            .ok_or_else(|| PlyError::UnknownElement(name.to_string()))
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.header.iter().flat_map(|h| h.metadata.comments())
    }

    pub fn obj_info(&self) -> impl Iterator<Item = &str> {
        self.header.iter().flat_map(|h| h.metadata.obj_info())
    }

    /// Ask for a property in rows of `element`, coerced to the internal
    /// types of `property`. The external types always come from the file.
    ///
    /// Until a property of an element is selected, its rows carry every
    /// property in its file type. Afterwards they carry only the selected
    /// ones.
    pub fn select_property(
        &mut self,
        element: &str,
        property: PropertyDescriptor,
    ) -> Result<(), PlyError> {
        match self.state {
            StreamState::HeaderParsed | StreamState::ReadingElement { .. } => {}
            _ => return Err(PlyError::invalid_state("select a property", &self.state)),
        }
        let Some(header) = &self.header else {
            return Err(PlyError::invalid_state("select a property", &self.state));
        };
        let index = header.element_index(element)?;
        if index < self.next_element {
            return Err(PlyError::invalid_state(
                "select a property of an element already read",
                &self.state,
            ));
        }

        let binding = &mut self.bindings[index];
        let Some(prop_index) = binding.schema.property_index(&property.name) else {
            return Err(PlyError::UnknownProperty {
                element: element.to_string(),
                property: property.name,
            });
        };
        property.validate()?;

        let prop = &mut binding.schema.properties[prop_index];
        match (&mut prop.list, property.list) {
            (None, None) => {}
            (Some(count), Some(wanted)) => count.internal = wanted.internal,
            (Some(_), None) => {
                return Err(PlyError::TypeMismatch {
                    expected: format!("list for property '{}'", prop.name),
                    found: "scalar".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(PlyError::TypeMismatch {
                    expected: format!("scalar for property '{}'", prop.name),
                    found: "list".to_string(),
                })
            }
        }
        prop.internal = property.internal;

        let selected = binding.selected.get_or_insert_with(Vec::new);
        if !selected.contains(&property.name) {
            selected.push(property.name);
        }
        Ok(())
    }

    /// Start reading the rows of `name`. Elements before it that haven't been
    /// read yet are skipped.
    pub fn begin_element(&mut self, name: &str) -> Result<(), PlyError> {
        match self.state {
            StreamState::HeaderParsed => {}
            StreamState::ReadingElement { .. } if self.state.pending_rows() == 0 => {}
            StreamState::ReadingElement { .. } => {
                return Err(PlyError::invalid_state("begin a new element", &self.state))
            }
            _ => return Err(PlyError::invalid_state("begin an element", &self.state)),
        }
        let (Some(header), Some(source)) = (&self.header, self.source.as_mut()) else {
            return Err(PlyError::invalid_state("begin an element", &self.state));
        };

        let index = header.element_index(name)?;
        if index < self.next_element {
            return Err(PlyError::invalid_state(
                "begin an element that was already read",
                &self.state,
            ));
        }

        for binding in &self.bindings[self.next_element..index] {
            tracing::debug!(
                element = %binding.schema.name,
                rows = binding.schema.count,
                "skipping element"
            );
            for done in 0..binding.schema.count {
                if let Err(e) = binding.decode(header.format, source) {
                    self.state = StreamState::Failed {
                        pending: binding.schema.count - done,
                    };
                    return Err(e);
                }
            }
        }

        let count = header.elements[index].count;
        tracing::debug!(element = name, count, "reading element");
        self.next_element = index + 1;
        self.state = StreamState::ReadingElement {
            element: name.to_string(),
            rows: 0,
            count,
        };
        Ok(())
    }

    /// Decode the next row of the current element.
    pub fn read_row(&mut self) -> Result<Row, PlyError> {
        let StreamState::ReadingElement { rows, count, .. } = self.state else {
            return Err(PlyError::invalid_state("read a row", &self.state));
        };
        if rows == count {
            return Err(PlyError::invalid_state("read another row", &self.state));
        }
        let (Some(header), Some(source)) = (&self.header, self.source.as_mut()) else {
            return Err(PlyError::invalid_state("read a row", &self.state));
        };

        match self.bindings[self.next_element - 1].decode(header.format, source) {
            Ok(row) => {
                if let StreamState::ReadingElement { rows, .. } = &mut self.state {
                    *rows += 1;
                }
                Ok(row)
            }
            Err(e) => {
                self.state = self.state.failed();
                Err(e)
            }
        }
    }

    /// Decode the next row of the current element into a record.
    pub fn read_record<T: DeserializeOwned>(&mut self) -> Result<T, PlyError> {
        let row = self.read_row()?;
        crate::record::from_row(&row)
    }

    /// Begin `name` and read all of its rows.
    pub fn read_element(&mut self, name: &str) -> Result<Vec<Row>, PlyError> {
        self.begin_element(name)?;
        let mut rows = Vec::with_capacity(self.state.pending_rows().min(1 << 16));
        while self.state.pending_rows() > 0 {
            rows.push(self.read_row()?);
        }
        Ok(rows)
    }

    /// Release the source.
    ///
    /// The source is released even when this returns an error. Closing in
    /// the middle of an element fails with `InvalidStateTransition`, also
    /// when a failed row cut the element short.
    pub fn close(&mut self) -> Result<(), PlyError> {
        let Some(source) = self.source.take() else {
            return Err(PlyError::invalid_state("close", &self.state));
        };
        drop(source);
        let state = std::mem::replace(&mut self.state, StreamState::Closed);
        tracing::debug!(state = %state, "closed PLY reader");

        if state.pending_rows() > 0 {
            return Err(PlyError::invalid_state("close", &state));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScalarType, ScalarValue};

    const CUBE: &str = r#"ply
format ascii 1.0
comment made by Greg Turk
comment this file is a cube
obj_info random information
element vertex 8
property float x
property float y
property float z
element face 6
property list uchar int vertex_index
end_header
0 0 0
0 0 1
0 1 1
0 1 0
1 0 0
1 0 1
1 1 1
1 1 0
4 0 1 2 3
4 7 6 5 4
4 0 4 5 1
4 1 5 6 2
4 2 6 7 3
4 3 7 4 0
"#;

    #[test]
    fn test_greg_turk_cube() {
        let mut reader = PlyReader::open(CUBE.as_bytes()).unwrap();
        assert_eq!(reader.format(), Some(PlyFormat::Ascii));
        assert_eq!(reader.version(), Some("1.0"));
        assert_eq!(
            reader.comments().collect::<Vec<_>>(),
            ["made by Greg Turk", "this file is a cube"]
        );
        assert_eq!(reader.obj_info().collect::<Vec<_>>(), ["random information"]);

        let vertices = reader.read_element("vertex").unwrap();
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[6].scalar("y"), Some(ScalarValue::F32(1.0)));

        let faces = reader.read_element("face").unwrap();
        assert_eq!(faces.len(), 6);
        for face in &faces {
            assert_eq!(face.list("vertex_index").unwrap().len(), 4);
        }
        reader.close().unwrap();
    }

    #[test]
    fn test_opened_state() {
        let mut reader = PlyReader::new(CUBE.as_bytes());
        assert_eq!(reader.state(), &StreamState::Opened);
        assert!(reader.elements().is_empty());
        assert!(matches!(
            reader.begin_element("vertex"),
            Err(PlyError::InvalidStateTransition { .. })
        ));
        reader.read_header().unwrap();
        assert_eq!(reader.state(), &StreamState::HeaderParsed);
        assert_eq!(reader.elements().len(), 2);
        assert!(matches!(
            reader.read_header(),
            Err(PlyError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_skip_to_element() {
        let mut reader = PlyReader::open(CUBE.as_bytes()).unwrap();
        reader.begin_element("face").unwrap();
        let face = reader.read_row().unwrap();
        assert_eq!(
            face.list("vertex_index"),
            Some(&[0, 1, 2, 3].map(ScalarValue::I32)[..])
        );
        assert!(matches!(
            reader.begin_element("vertex"),
            Err(PlyError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            reader.close(),
            Err(PlyError::InvalidStateTransition { .. })
        ));
        assert_eq!(reader.state(), &StreamState::Closed);
    }

    #[test]
    fn test_select_property() {
        let mut reader = PlyReader::open(CUBE.as_bytes()).unwrap();
        reader
            .select_property(
                "vertex",
                PropertyDescriptor::scalar("z", ScalarType::F32).with_internal(ScalarType::U8),
            )
            .unwrap();
        reader
            .select_property(
                "face",
                PropertyDescriptor::list("vertex_index", ScalarType::U8, ScalarType::I32)
                    .with_internal(ScalarType::U32),
            )
            .unwrap();

        assert!(matches!(
            reader.select_property("vertex", PropertyDescriptor::scalar("w", ScalarType::F32)),
            Err(PlyError::UnknownProperty { .. })
        ));
        assert!(matches!(
            reader.select_property(
                "vertex",
                PropertyDescriptor::list("x", ScalarType::U8, ScalarType::F32)
            ),
            Err(PlyError::TypeMismatch { .. })
        ));

        let vertices = reader.read_element("vertex").unwrap();
        assert_eq!(vertices[1].len(), 1);
        assert_eq!(vertices[1].scalar("z"), Some(ScalarValue::U8(1)));

        // The file schema itself is untouched.
        assert_eq!(
            reader.element("vertex").unwrap().properties[2].internal,
            ScalarType::F32
        );

        let faces = reader.read_element("face").unwrap();
        assert_eq!(
            faces[5].list("vertex_index"),
            Some(&[3, 7, 4, 0].map(ScalarValue::U32)[..])
        );
        assert!(matches!(
            reader.select_property("vertex", PropertyDescriptor::scalar("x", ScalarType::F32)),
            Err(PlyError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_unknown_element() {
        let mut reader = PlyReader::open(CUBE.as_bytes()).unwrap();
        assert!(matches!(
            reader.element("edge"),
            Err(PlyError::UnknownElement(_))
        ));
        assert!(matches!(
            reader.begin_element("edge"),
            Err(PlyError::UnknownElement(_))
        ));
        reader.close().unwrap();
    }

    #[test]
    fn test_truncated_data_fails_stream() {
        let truncated = &CUBE[..CUBE.len() - 20];
        let mut reader = PlyReader::open(truncated.as_bytes()).unwrap();
        reader.read_element("vertex").unwrap();
        assert!(reader.read_element("face").is_err());
        assert_eq!(reader.state(), &StreamState::Failed { pending: 2 });
        assert!(matches!(
            reader.read_row(),
            Err(PlyError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            reader.close(),
            Err(PlyError::InvalidStateTransition { .. })
        ));
        assert_eq!(reader.state(), &StreamState::Closed);
    }

    #[test]
    fn test_truncated_skipped_element_fails_close() {
        let cut = CUBE.find("0 1 0\n").unwrap();
        let mut reader = PlyReader::open(CUBE[..cut].as_bytes()).unwrap();
        assert!(matches!(
            reader.begin_element("face"),
            Err(PlyError::MalformedData(_))
        ));
        assert_eq!(reader.state(), &StreamState::Failed { pending: 5 });
        assert!(matches!(
            reader.close(),
            Err(PlyError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_failed_header_closes_cleanly() {
        let mut reader = PlyReader::new("ply\nformat ascii 1.0\n".as_bytes());
        assert!(matches!(
            reader.read_header(),
            Err(PlyError::MalformedHeader(_))
        ));
        assert_eq!(reader.state(), &StreamState::Failed { pending: 0 });
        reader.close().unwrap();
    }
}
