//! Benchmarks for the VarNumber codec and `Block` encode/decode path.

use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndn_core::block::Block;
use ndn_core::name::Name;
use ndn_core::tlv::{decode_var_number, encode_var_number};

fn bench_var_number_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("var_number");

    group.bench_function("encode_small", |b| {
        b.iter(|| {
            let mut buf = BytesMut::new();
            encode_var_number(&mut buf, black_box(200));
            black_box(buf);
        });
    });

    group.bench_function("encode_large", |b| {
        b.iter(|| {
            let mut buf = BytesMut::new();
            encode_var_number(&mut buf, black_box(u64::MAX));
            black_box(buf);
        });
    });

    group.bench_function("decode", |b| {
        let mut buf = BytesMut::new();
        encode_var_number(&mut buf, 1_000_000);
        let encoded = buf.freeze();
        b.iter(|| {
            let mut cursor = encoded.clone();
            black_box(decode_var_number(&mut cursor).unwrap());
        });
    });

    group.finish();
}

fn bench_name_wire_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("name");
    let name = Name::from_uri("/example/segment/of/components/0123456789").unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(name.to_wire().unwrap()));
    });

    let wire: Bytes = name.to_wire().unwrap();
    group.bench_function("decode", |b| {
        b.iter(|| {
            let block = Block::decode_from(black_box(&wire)).unwrap();
            black_box(Name::from_block(&block).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_var_number_round_trip, bench_name_wire_round_trip);
criterion_main!(benches);
