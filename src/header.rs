//! The ASCII header section: grammar, parsing and emission.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::{ElementSchema, PlyError, PropertyDescriptor, ScalarType};

/// PLY file format (ascii or binary)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl fmt::Display for PlyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyFormat::Ascii => write!(f, "ascii"),
            PlyFormat::BinaryLittleEndian => write!(f, "binary_little_endian"),
            PlyFormat::BinaryBigEndian => write!(f, "binary_big_endian"),
        }
    }
}

impl FromStr for PlyFormat {
    type Err = PlyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(PlyFormat::Ascii),
            "binary_little_endian" => Ok(PlyFormat::BinaryLittleEndian),
            "binary_big_endian" => Ok(PlyFormat::BinaryBigEndian),
            _ => Err(PlyError::MalformedHeader(format!("unknown format '{s}'"))),
        }
    }
}

/// A free-text header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaLine {
    Comment(String),
    ObjInfo(String),
}

/// Comments and object info, in the order they were added or read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    lines: Vec<MetaLine>,
}

impl Metadata {
    pub fn push(&mut self, line: MetaLine) -> Result<(), PlyError> {
        let text = match &line {
            MetaLine::Comment(text) | MetaLine::ObjInfo(text) => text,
        };
        if text.contains(['\n', '\r']) {
            return Err(PlyError::MalformedHeader(format!(
                "header text must be a single line: {text:?}"
            )));
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            MetaLine::Comment(text) => Some(text.as_str()),
            MetaLine::ObjInfo(_) => None,
        })
    }

    pub fn obj_info(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            MetaLine::ObjInfo(text) => Some(text.as_str()),
            MetaLine::Comment(_) => None,
        })
    }

    pub fn lines(&self) -> &[MetaLine] {
        &self.lines
    }
}

/// PLY header containing format information and element definitions
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub version: String,
    pub elements: Vec<ElementSchema>,
    pub metadata: Metadata,
}

impl PlyHeader {
    pub fn new(format: PlyFormat) -> Self {
        Self {
            format,
            version: "1.0".to_string(),
            elements: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    /// Parse a PLY header from a reader. On success the reader is positioned
    /// at the first byte of the data section.
    pub fn parse<R: BufRead>(mut reader: R) -> Result<Self, PlyError> {
        let mut line = Vec::new();

        if read_header_line(&mut reader, &mut line)?.trim() != "ply" {
            return Err(PlyError::MalformedHeader("File must start with 'ply'".to_string()));
        }

        let mut format = None;
        let mut version = String::new();
        let mut elements: Vec<ElementSchema> = Vec::new();
        let mut metadata = Metadata::default();

        loop {
            let text = read_header_line(&mut reader, &mut line)?;
            let parts: Vec<&str> = text.split_whitespace().collect();
            let Some(&keyword) = parts.first() else {
                continue;
            };

            match keyword {
                "end_header" => break,
                "format" => {
                    if parts.len() < 3 {
                        return Err(PlyError::MalformedHeader(format!(
                            "invalid format line '{text}'"
                        )));
                    }
                    format = Some(parts[1].parse::<PlyFormat>()?);
                    version = parts[2].to_string();
                }
                "comment" => metadata.push(MetaLine::Comment(line_text(text, keyword)))?,
                "obj_info" => metadata.push(MetaLine::ObjInfo(line_text(text, keyword)))?,
                "element" => {
                    if parts.len() < 3 {
                        return Err(PlyError::MalformedHeader(format!(
                            "invalid element line '{text}'"
                        )));
                    }
                    let count = parts[2].parse::<usize>().map_err(|_| {
                        PlyError::MalformedHeader(format!("invalid element count '{}'", parts[2]))
                    })?;
                    if elements.iter().any(|e| e.name == parts[1]) {
                        return Err(PlyError::DuplicateElement(parts[1].to_string()));
                    }
                    elements.push(ElementSchema::new(parts[1], count));
                }
                "property" => {
                    let element = elements.last_mut().ok_or_else(|| {
                        PlyError::MalformedHeader("property without element".to_string())
                    })?;
                    element.add_property(parse_property(text, &parts)?)?;
                }
                _ => {
                    tracing::trace!(keyword, "skipping unknown header keyword");
                }
            }
        }

        let format =
            format.ok_or_else(|| PlyError::MalformedHeader("missing format line".to_string()))?;

        tracing::debug!(%format, elements = elements.len(), "parsed PLY header");

        Ok(PlyHeader {
            format,
            version,
            elements,
            metadata,
        })
    }

    /// Write the header, `end_header` line included.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), PlyError> {
        writeln!(writer, "ply")?;
        writeln!(writer, "format {} {}", self.format, self.version)?;
        for line in self.metadata.lines() {
            match line {
                MetaLine::Comment(text) => writeln!(writer, "comment {text}")?,
                MetaLine::ObjInfo(text) => writeln!(writer, "obj_info {text}")?,
            }
        }
        for element in &self.elements {
            writeln!(writer, "element {} {}", element.name, element.count)?;
            for prop in &element.properties {
                match &prop.list {
                    None => writeln!(writer, "property {} {}", prop.external, prop.name)?,
                    Some(count) => writeln!(
                        writer,
                        "property list {} {} {}",
                        count.external, prop.external, prop.name
                    )?,
                }
            }
        }
        writeln!(writer, "end_header")?;

        tracing::debug!(
            format = %self.format,
            elements = self.elements.len(),
            "wrote PLY header"
        );
        Ok(())
    }

    /// Get element definition by name
    pub fn get_element(&self, name: &str) -> Option<&ElementSchema> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub(crate) fn element_index(&self, name: &str) -> Result<usize, PlyError> {
        self.elements
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| PlyError::UnknownElement(name.to_string()))
    }

    pub fn add_element(&mut self, name: &str, count: usize) -> Result<(), PlyError> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(PlyError::MalformedHeader(format!(
                "invalid element name {name:?}"
            )));
        }
        if self.get_element(name).is_some() {
            return Err(PlyError::DuplicateElement(name.to_string()));
        }
        self.elements.push(ElementSchema::new(name, count));
        Ok(())
    }

    pub fn add_property(
        &mut self,
        element: &str,
        property: PropertyDescriptor,
    ) -> Result<(), PlyError> {
        if property.name.is_empty() || property.name.contains(char::is_whitespace) {
            return Err(PlyError::MalformedHeader(format!(
                "invalid property name {:?}",
                property.name
            )));
        }
        let index = self.element_index(element)?;
        self.elements[index].add_property(property)
    }
}

fn read_header_line<'a, R: BufRead>(
    reader: &mut R,
    line: &'a mut Vec<u8>,
) -> Result<&'a str, PlyError> {
    line.clear();
    if reader.read_until(b'\n', line)? == 0 {
        return Err(PlyError::MalformedHeader(
            "unexpected end of file before end_header".to_string(),
        ));
    }
    let text = std::str::from_utf8(line)
        .map_err(|e| PlyError::MalformedHeader(format!("header is not valid UTF-8: {e}")))?;
    Ok(text.trim_end_matches(['\n', '\r']))
}

/// Text following a `comment`/`obj_info` keyword and its separator.
fn line_text(line: &str, keyword: &str) -> String {
    let rest = line.trim_start()[keyword.len()..].to_string();
    match rest.strip_prefix([' ', '\t']) {
        Some(text) => text.to_string(),
        None => rest,
    }
}

fn parse_property(line: &str, parts: &[&str]) -> Result<PropertyDescriptor, PlyError> {
    let malformed = || PlyError::MalformedHeader(format!("invalid property line '{line}'"));
    let scalar_type = |token: &str| {
        ScalarType::parse(token)
            .map_err(|_| PlyError::MalformedHeader(format!("unknown property type '{token}'")))
    };

    if parts.get(1) == Some(&"list") {
        // property list <count_type> <data_type> <name>
        if parts.len() < 5 {
            return Err(malformed());
        }
        let count_type = scalar_type(parts[2])?;
        if count_type.is_float() {
            return Err(PlyError::MalformedHeader(format!(
                "list count type must be an integer type, found '{}'",
                parts[2]
            )));
        }
        Ok(PropertyDescriptor::list(
            parts[4],
            count_type,
            scalar_type(parts[3])?,
        ))
    } else {
        // property <type> <name>
        if parts.len() < 3 {
            return Err(malformed());
        }
        Ok(PropertyDescriptor::scalar(parts[2], scalar_type(parts[1])?))
    }
}
