//! Header fidelity, coercion and record binding through the public API.

use plyfile::{
    MetaLine, PlyError, PlyFormat, PlyReader, PlyWriter, PropertyDescriptor, Row, ScalarType,
    ScalarValue, StreamState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct Vertex {
    x: f32,
    y: f32,
    z: f32,
    red: u8,
    green: u8,
    blue: u8,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct Face {
    vertex_indices: Vec<u32>,
}

fn colored_mesh_writer(out: &mut Vec<u8>, format: PlyFormat) -> PlyWriter<&mut Vec<u8>> {
    let mut writer = PlyWriter::new(out, format);
    writer.put_comment("generated by plyfile").unwrap();
    writer.declare_element("vertex", 3).unwrap();
    for name in ["x", "y", "z"] {
        writer
            .declare_property("vertex", PropertyDescriptor::scalar(name, ScalarType::F32))
            .unwrap();
    }
    writer.put_obj_info("units meters").unwrap();
    for name in ["red", "green", "blue"] {
        writer
            .declare_property("vertex", PropertyDescriptor::scalar(name, ScalarType::U8))
            .unwrap();
    }
    writer.declare_element("face", 1).unwrap();
    writer
        .declare_property(
            "face",
            PropertyDescriptor::list("vertex_indices", ScalarType::U8, ScalarType::U32),
        )
        .unwrap();
    writer.put_comment("second comment").unwrap();
    writer
}

fn triangle() -> [Vertex; 3] {
    [
        Vertex {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            red: 255,
            green: 0,
            blue: 0,
        },
        Vertex {
            x: 1.0,
            y: 0.0,
            z: 0.0,
            red: 0,
            green: 255,
            blue: 0,
        },
        Vertex {
            x: 0.0,
            y: 1.0,
            z: 0.5,
            red: 0,
            green: 0,
            blue: 255,
        },
    ]
}

#[test]
fn header_keeps_declaration_order() {
    let mut out = Vec::new();
    let mut writer = colored_mesh_writer(&mut out, PlyFormat::Ascii).with_version("1.1");
    writer.finalize_header().unwrap();
    writer.begin_element("vertex").unwrap();
    for v in triangle() {
        writer.write_record(&v).unwrap();
    }
    writer.begin_element("face").unwrap();
    writer
        .write_record(&Face {
            vertex_indices: vec![0, 1, 2],
        })
        .unwrap();
    writer.close().unwrap();

    let text = String::from_utf8(out.clone()).unwrap();
    let header_text = &text[..text.find("end_header").unwrap()];
    assert_eq!(
        header_text,
        "ply\n\
         format ascii 1.1\n\
         comment generated by plyfile\n\
         obj_info units meters\n\
         comment second comment\n\
         element vertex 3\n\
         property float x\n\
         property float y\n\
         property float z\n\
         property uchar red\n\
         property uchar green\n\
         property uchar blue\n\
         element face 1\n\
         property list uchar uint vertex_indices\n"
    );

    let reader = PlyReader::open(&out[..]).unwrap();
    assert_eq!(reader.version(), Some("1.1"));
    let header = reader.header().unwrap();
    assert_eq!(
        header.metadata.lines(),
        [
            MetaLine::Comment("generated by plyfile".into()),
            MetaLine::ObjInfo("units meters".into()),
            MetaLine::Comment("second comment".into()),
        ]
    );
    let names: Vec<_> = reader.elements().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["vertex", "face"]);
}

#[test]
fn records_round_trip_big_endian() {
    let mut out = Vec::new();
    let mut writer = colored_mesh_writer(&mut out, PlyFormat::BinaryBigEndian);
    writer.finalize_header().unwrap();
    writer.begin_element("vertex").unwrap();
    for v in triangle() {
        writer.write_record(&v).unwrap();
    }
    writer.begin_element("face").unwrap();
    let face = Face {
        vertex_indices: vec![2, 1, 0],
    };
    writer.write_record(&face).unwrap();
    writer.close().unwrap();

    let mut reader = PlyReader::open(&out[..]).unwrap();
    reader.begin_element("vertex").unwrap();
    let mut vertices = Vec::new();
    for _ in 0..3 {
        vertices.push(reader.read_record::<Vertex>().unwrap());
    }
    assert_eq!(vertices, triangle());

    reader.begin_element("face").unwrap();
    assert_eq!(reader.read_record::<Face>().unwrap(), face);
    assert!(matches!(
        reader.read_row(),
        Err(PlyError::InvalidStateTransition { .. })
    ));
    reader.close().unwrap();
}

#[test]
fn internal_types_coerce_on_write_and_read() {
    let mut out = Vec::new();
    let mut writer = PlyWriter::new(&mut out, PlyFormat::BinaryLittleEndian);
    writer.declare_element("sample", 2).unwrap();
    writer
        .declare_property(
            "sample",
            PropertyDescriptor::scalar("level", ScalarType::U8).with_internal(ScalarType::F32),
        )
        .unwrap();
    writer.finalize_header().unwrap();
    writer.begin_element("sample").unwrap();
    writer.write_row(&Row::new().with("level", 300.7f32)).unwrap();
    writer.write_row(&Row::new().with("level", -1.5f32)).unwrap();
    writer.close().unwrap();

    assert_eq!(&out[out.len() - 2..], [44, 255]);

    let mut reader = PlyReader::open(&out[..]).unwrap();
    reader
        .select_property(
            "sample",
            PropertyDescriptor::scalar("level", ScalarType::U8).with_internal(ScalarType::F64),
        )
        .unwrap();
    let rows = reader.read_element("sample").unwrap();
    assert_eq!(rows[0].scalar("level"), Some(ScalarValue::F64(44.0)));
    assert_eq!(rows[1].scalar("level"), Some(ScalarValue::F64(255.0)));
}

#[test]
fn record_with_unknown_field_fails_the_stream() {
    #[derive(Serialize)]
    struct Extra {
        x: f32,
        y: f32,
        z: f32,
        red: u8,
        green: u8,
        blue: u8,
        alpha: u8,
    }

    let mut out = Vec::new();
    let mut writer = colored_mesh_writer(&mut out, PlyFormat::Ascii);
    writer.finalize_header().unwrap();
    writer.begin_element("vertex").unwrap();
    let err = writer
        .write_record(&Extra {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            red: 0,
            green: 0,
            blue: 0,
            alpha: 0,
        })
        .unwrap_err();
    assert!(matches!(err, PlyError::UnknownProperty { property, .. } if property == "alpha"));
    assert_eq!(writer.state(), &StreamState::Failed { pending: 3 });
    assert!(matches!(
        writer.close(),
        Err(PlyError::InvalidStateTransition { .. })
    ));
    assert_eq!(writer.state(), &StreamState::Closed);
}

#[test]
fn header_errors_leave_reader_failed() {
    let mut reader = PlyReader::new("ply\nformat ascii 1.0\nelement vertex\n".as_bytes());
    assert!(matches!(
        reader.read_header(),
        Err(PlyError::MalformedHeader(_))
    ));
    assert_eq!(reader.state(), &StreamState::Failed { pending: 0 });
    assert!(matches!(
        reader.element("vertex"),
        Err(PlyError::InvalidStateTransition { .. })
    ));
    reader.close().unwrap();

    let bad_type = "ply\nformat ascii 1.0\nelement v 1\nproperty int128 x\nend_header\n";
    assert!(matches!(
        PlyReader::open(bad_type.as_bytes()),
        Err(PlyError::MalformedHeader(_))
    ));
}

#[test]
fn invalid_utf8_row_is_malformed_data() {
    let mut data = b"ply\nformat ascii 1.0\nelement v 2\nproperty uchar a\nend_header\n".to_vec();
    data.extend_from_slice(b"7\n");
    data.extend_from_slice(&[0xff, 0xfe, b'\n']);

    let mut reader = PlyReader::open(&data[..]).unwrap();
    reader.begin_element("v").unwrap();
    assert_eq!(reader.read_row().unwrap().scalar("a"), Some(ScalarValue::U8(7)));
    assert!(matches!(reader.read_row(), Err(PlyError::MalformedData(_))));
    assert_eq!(reader.state(), &StreamState::Failed { pending: 1 });
    assert!(matches!(
        reader.close(),
        Err(PlyError::InvalidStateTransition { .. })
    ));
}

#[test]
fn format_and_types_parse_from_strings() {
    for format in [
        PlyFormat::Ascii,
        PlyFormat::BinaryLittleEndian,
        PlyFormat::BinaryBigEndian,
    ] {
        assert_eq!(format.to_string().parse::<PlyFormat>().unwrap(), format);
    }
    assert!(matches!(
        "binary".parse::<PlyFormat>(),
        Err(PlyError::MalformedHeader(_))
    ));
    assert_eq!("float64".parse::<ScalarType>().unwrap(), ScalarType::F64);
    assert_eq!(ScalarType::from_code(4).unwrap(), ScalarType::U8);
}
