//! Benchmarks for the OSC codec

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tuio_osc::OscPacket;
use tuio_test::Burst;

fn object_frame(sessions: i32) -> OscPacket {
    (0..sessions)
        .fold(Burst::objects().source("bench"), |burst, id| burst.place(id, id, 0.5, 0.5))
        .alive(&(0..sessions).collect::<Vec<_>>())
        .fseq(1)
}

fn bench_decode_bundle(c: &mut Criterion) {
    let bytes = object_frame(16).encode();

    c.bench_function("osc_decode_16_object_bundle", |b| {
        b.iter(|| OscPacket::decode(black_box(&bytes)))
    });
}

fn bench_encode_bundle(c: &mut Criterion) {
    let packet = object_frame(16);

    c.bench_function("osc_encode_16_object_bundle", |b| b.iter(|| black_box(&packet).encode()));
}

fn bench_flatten_bundle(c: &mut Criterion) {
    let packet = object_frame(16);

    c.bench_function("osc_into_messages", |b| {
        b.iter(|| black_box(packet.clone()).into_messages())
    });
}

criterion_group!(benches, bench_decode_bundle, bench_encode_bundle, bench_flatten_bundle);
criterion_main!(benches);
