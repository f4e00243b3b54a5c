use std::io::Write;

use serde::Serialize;

use crate::{
    stream::StreamState, ElementCodec, MetaLine, PlyError, PlyFormat, PlyHeader,
    PropertyDescriptor, Row,
};

/// Writes a PLY file to a byte sink.
///
/// The header is declared first, then written by
/// [`finalize_header`](Self::finalize_header). Element rows follow, element
/// by element in declaration order, and [`close`](Self::close) flushes and
/// releases the sink.
///
/// ```rust
/// use plyfile::{PlyFormat, PlyWriter, PropertyDescriptor, Row, ScalarType};
///
/// let mut out = Vec::new();
/// let mut writer = PlyWriter::new(&mut out, PlyFormat::Ascii);
/// writer.declare_element("vertex", 1).unwrap();
/// for name in ["x", "y", "z"] {
///     writer
///         .declare_property("vertex", PropertyDescriptor::scalar(name, ScalarType::F32))
///         .unwrap();
/// }
/// writer.finalize_header().unwrap();
/// writer.begin_element("vertex").unwrap();
/// writer
///     .write_row(&Row::new().with("x", 1.0f32).with("y", 2.0f32).with("z", 3.0f32))
///     .unwrap();
/// writer.close().unwrap();
///
/// assert!(String::from_utf8(out).unwrap().ends_with("end_header\n1 2 3 \n"));
/// ```
pub struct PlyWriter<W: Write> {
    sink: Option<W>,
    header: PlyHeader,
    state: StreamState,
    next_element: usize,
    row_buf: Vec<u8>,
}

impl<W: Write> PlyWriter<W> {
    pub fn new(sink: W, format: PlyFormat) -> Self {
        Self {
            sink: Some(sink),
            header: PlyHeader::new(format),
            state: StreamState::Created,
            next_element: 0,
            row_buf: Vec::new(),
        }
    }

    /// Set the version written on the format line (default `1.0`).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.header.version = version.into();
        self
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    fn check_declaring(&self, operation: &'static str) -> Result<(), PlyError> {
        match self.state {
            StreamState::Created | StreamState::DeclaringHeader => Ok(()),
            _ => Err(PlyError::invalid_state(operation, &self.state)),
        }
    }

    pub fn declare_element(&mut self, name: &str, count: usize) -> Result<(), PlyError> {
        self.check_declaring("declare an element")?;
        self.header.add_element(name, count)?;
        self.state = StreamState::DeclaringHeader;
        Ok(())
    }

    pub fn declare_property(
        &mut self,
        element: &str,
        property: PropertyDescriptor,
    ) -> Result<(), PlyError> {
        self.check_declaring("declare a property")?;
        self.header.add_property(element, property)?;
        self.state = StreamState::DeclaringHeader;
        Ok(())
    }

    pub fn put_comment(&mut self, comment: impl Into<String>) -> Result<(), PlyError> {
        self.check_declaring("add a comment")?;
        self.header.metadata.push(MetaLine::Comment(comment.into()))?;
        self.state = StreamState::DeclaringHeader;
        Ok(())
    }

    pub fn put_obj_info(&mut self, obj_info: impl Into<String>) -> Result<(), PlyError> {
        self.check_declaring("add object info")?;
        self.header.metadata.push(MetaLine::ObjInfo(obj_info.into()))?;
        self.state = StreamState::DeclaringHeader;
        Ok(())
    }

    /// Write the header. Schemas and metadata are frozen from here on.
    pub fn finalize_header(&mut self) -> Result<(), PlyError> {
        self.check_declaring("finalize the header")?;
        let Some(sink) = self.sink.as_mut() else {
            return Err(PlyError::invalid_state("finalize the header", &self.state));
        };

        self.row_buf.clear();
        self.header.write(&mut self.row_buf)?;
        if let Err(e) = sink.write_all(&self.row_buf) {
            self.state = self.state.failed();
            return Err(e.into());
        }
        self.state = StreamState::HeaderFinalized;
        Ok(())
    }

    /// Start writing the rows of `name`. Elements are written in declaration
    /// order; elements with a count of zero may be left out.
    pub fn begin_element(&mut self, name: &str) -> Result<(), PlyError> {
        match self.state {
            StreamState::HeaderFinalized => {}
            StreamState::WritingElement { .. } if self.state.pending_rows() == 0 => {}
            StreamState::WritingElement { .. } => {
                return Err(PlyError::invalid_state("begin a new element", &self.state))
            }
            _ => return Err(PlyError::invalid_state("begin an element", &self.state)),
        }

        let index = self.header.element_index(name)?;
        if index < self.next_element {
            return Err(PlyError::invalid_state(
                "begin an element that was already written",
                &self.state,
            ));
        }
        if let Some(skipped) = self.header.elements[self.next_element..index]
            .iter()
            .find(|e| e.count > 0)
        {
            return Err(PlyError::invalid_state(
                "begin an element out of order",
                format!("element '{}' has not been written", skipped.name),
            ));
        }

        let count = self.header.elements[index].count;
        tracing::debug!(element = name, count, "writing element");
        self.next_element = index + 1;
        self.state = StreamState::WritingElement {
            element: name.to_string(),
            rows: 0,
            count,
        };
        Ok(())
    }

    /// Encode one row of the current element.
    pub fn write_row(&mut self, row: &Row) -> Result<(), PlyError> {
        let StreamState::WritingElement { rows, count, .. } = self.state else {
            return Err(PlyError::invalid_state("write a row", &self.state));
        };
        if rows == count {
            return Err(PlyError::invalid_state("write another row", &self.state));
        }
        let Some(sink) = self.sink.as_mut() else {
            return Err(PlyError::invalid_state("write a row", &self.state));
        };

        // Encode the whole row before it touches the sink.
        self.row_buf.clear();
        let schema = &self.header.elements[self.next_element - 1];
        let res = ElementCodec::new(schema, self.header.format)
            .encode(row, &mut self.row_buf)
            .and_then(|()| sink.write_all(&self.row_buf).map_err(PlyError::from));

        match res {
            Ok(()) => {
                if let StreamState::WritingElement { rows, .. } = &mut self.state {
                    *rows += 1;
                }
                Ok(())
            }
            Err(e) => {
                self.state = self.state.failed();
                Err(e)
            }
        }
    }

    /// Encode a serializable record as one row of the current element.
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), PlyError> {
        let row = crate::record::to_row(record)?;
        self.write_row(&row)
    }

    /// Flush and release the sink.
    ///
    /// The sink is released even when this returns an error. Closing with
    /// rows or elements still owed fails with `InvalidStateTransition`, also
    /// after a failed row or header write.
    pub fn close(&mut self) -> Result<(), PlyError> {
        let Some(mut sink) = self.sink.take() else {
            return Err(PlyError::invalid_state("close", &self.state));
        };
        let state = std::mem::replace(&mut self.state, StreamState::Closed);
        let flushed = sink.flush();
        drop(sink);
        tracing::debug!(state = %state, "closed PLY writer");
        flushed?;

        match state {
            StreamState::HeaderFinalized
            | StreamState::WritingElement { .. }
            | StreamState::Failed { .. } => {
                if state.pending_rows() > 0 {
                    return Err(PlyError::invalid_state("close", &state));
                }
                if let Some(unwritten) = self.header.elements[self.next_element..]
                    .iter()
                    .find(|e| e.count > 0)
                {
                    return Err(PlyError::invalid_state(
                        "close",
                        format!("element '{}' has not been written", unwritten.name),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
