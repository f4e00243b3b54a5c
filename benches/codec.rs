//! Row encode/decode throughput for each data format.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use plyfile::{PlyFormat, PlyReader, PlyWriter, PropertyDescriptor, Row, ScalarType};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct VertexWithColor {
    x: f32,
    y: f32,
    z: f32,
    red: u8,
    green: u8,
    blue: u8,
}

const FORMATS: [PlyFormat; 3] = [
    PlyFormat::Ascii,
    PlyFormat::BinaryLittleEndian,
    PlyFormat::BinaryBigEndian,
];

fn vertex(i: usize) -> VertexWithColor {
    let base = i as f32 * 0.01;
    VertexWithColor {
        x: base,
        y: base + 1.0,
        z: base + 2.0,
        red: (i % 256) as u8,
        green: ((i * 2) % 256) as u8,
        blue: ((i * 3) % 256) as u8,
    }
}

fn face(i: usize) -> Row {
    let i = i as i32;
    Row::new().with("vertex_indices", vec![i, i + 1, i + 2, i + 3])
}

fn write_mesh(format: PlyFormat, vertex_count: usize, face_count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut writer = PlyWriter::new(&mut out, format);
    writer.declare_element("vertex", vertex_count).unwrap();
    for name in ["x", "y", "z"] {
        writer
            .declare_property("vertex", PropertyDescriptor::scalar(name, ScalarType::F32))
            .unwrap();
    }
    for name in ["red", "green", "blue"] {
        writer
            .declare_property("vertex", PropertyDescriptor::scalar(name, ScalarType::U8))
            .unwrap();
    }
    writer.declare_element("face", face_count).unwrap();
    writer
        .declare_property(
            "face",
            PropertyDescriptor::list("vertex_indices", ScalarType::U8, ScalarType::I32),
        )
        .unwrap();
    writer.finalize_header().unwrap();

    writer.begin_element("vertex").unwrap();
    for i in 0..vertex_count {
        writer.write_record(&vertex(i)).unwrap();
    }
    writer.begin_element("face").unwrap();
    for i in 0..face_count {
        writer.write_row(&face(i)).unwrap();
    }
    writer.close().unwrap();
    out
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let count = 1000;

    for format in FORMATS {
        let size = write_mesh(format, count, count).len();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format.to_string(), |b| {
            b.iter(|| write_mesh(black_box(format), count, count));
        });
    }

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let count = 1000;

    for format in FORMATS {
        let data = write_mesh(format, count, count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format.to_string(), |b| {
            b.iter(|| {
                let mut reader = PlyReader::open(black_box(&data[..])).unwrap();
                reader.begin_element("vertex").unwrap();
                for _ in 0..count {
                    let _vertex: VertexWithColor = reader.read_record().unwrap();
                }
                let faces = reader.read_element("face").unwrap();
                reader.close().unwrap();
                faces
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);
