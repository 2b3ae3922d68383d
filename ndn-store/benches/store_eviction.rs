//! Benchmarks for insert/lookup throughput under each eviction policy.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndn_core::{ContentType, Data, Name};
use ndn_store::{Fifo, InMemoryStorage, Lru};

fn make_data(index: u64) -> Data {
    let mut data = Data::new(Name::from_uri(&format!("/bench/item/{index}")).unwrap());
    data.set_content(Bytes::from(format!("payload {index}")));
    data.set_content_type(ContentType::Blob);
    data.sign_digest_sha256().unwrap();
    data.encode().unwrap();
    data
}

fn bench_insert_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_insert");

    group.bench_function("fifo_steady_state", |b| {
        b.iter(|| {
            let mut store = InMemoryStorage::new(64, Fifo::default());
            for i in 0..256u64 {
                store.insert(make_data(i)).unwrap();
            }
            black_box(store.len());
        });
    });

    group.bench_function("lru_steady_state", |b| {
        b.iter(|| {
            let mut store = InMemoryStorage::new(64, Lru::default());
            for i in 0..256u64 {
                store.insert(make_data(i)).unwrap();
            }
            black_box(store.len());
        });
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_lookup");

    let mut store = InMemoryStorage::new(256, Fifo::default());
    for i in 0..256u64 {
        store.insert(make_data(i)).unwrap();
    }
    let target = Name::from_uri("/bench/item/128").unwrap();

    group.bench_function("find_by_prefix", |b| {
        b.iter(|| black_box(store.find(black_box(&target))));
    });

    group.finish();
}

criterion_group!(benches, bench_insert_with_eviction, bench_lookup);
criterion_main!(benches);
