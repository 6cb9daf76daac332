use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mzbin::cipher::transform;
use mzbin::entry::FileEntry;
use mzbin::io_stream::{MzReader, MzWriter};
use std::io::Cursor;

fn bench_cipher(c: &mut Criterion) {
    let name = *b"Sprite One                      ";
    c.bench_function("name_transform", |b| b.iter(|| transform(black_box(&name), 0x5A)));
}

fn bench_pack_single_file(c: &mut Criterion) {
    let data = vec![42u8; 1024 * 1024];

    c.bench_function("pack_1mb", |b| {
        b.iter(|| {
            let mut writer = MzWriter::new(Cursor::new(Vec::new()), 1).unwrap();
            let entry = FileEntry::named(b"bench", 7).0;
            writer.push_file(entry, &mut black_box(&data[..])).unwrap();
            writer.finalize().unwrap();
        })
    });
}

fn bench_unpack_many(c: &mut Criterion) {
    let data = vec![0x89u8; 64 * 1024];
    let mut writer = MzWriter::new(Cursor::new(Vec::new()), 16).unwrap();
    for i in 0..16u8 {
        let name = format!("file_{i}");
        writer.push_file(FileEntry::named(name.as_bytes(), i).0, &mut &data[..]).unwrap();
    }
    writer.finalize().unwrap();
    let archive = writer.into_inner().into_inner();

    c.bench_function("unpack_16x64k", |b| {
        b.iter(|| {
            let mut reader = MzReader::open(Cursor::new(black_box(&archive[..]))).unwrap();
            for slot in 0..16 {
                black_box(reader.read_entry(slot).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_cipher, bench_pack_single_file, bench_unpack_many);
criterion_main!(benches);
