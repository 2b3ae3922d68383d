//! `ndn-cli store`: insert a handful of synthetic Data packets and show
//! how capacity and freshness affect lookup, as a smoke test for
//! `ndn-store`.

use anyhow::Result;
use bytes::Bytes;

use ndn_core::{ContentType, Data, Name};
use ndn_store::{Fifo, InMemoryStorage};

use crate::utils::{print_header, Timer};

pub fn run(capacity: usize, count: usize) -> Result<()> {
    let mut store = InMemoryStorage::new(capacity, Fifo::default());

    print_header("Content store smoke test");
    println!("capacity: {capacity}");
    let timer = Timer::new("store insert/lookup smoke test");

    for i in 0..count {
        let uri = format!("/demo/item/{i}");
        let mut data = Data::new(Name::from_uri(&uri)?);
        data.set_content(Bytes::from(format!("payload {i}")));
        data.set_content_type(ContentType::Blob);
        data.sign_digest_sha256()?;
        data.encode()?;
        store.insert(data)?;
        println!("inserted {uri} (store now holds {})", store.len());
    }

    let first = Name::from_uri("/demo/item/0")?;
    match store.find(&first) {
        Some(data) => println!("lookup /demo/item/0 -> hit, name={}", data.name()),
        None => println!("lookup /demo/item/0 -> miss (evicted under FIFO)"),
    }
    drop(timer);
    Ok(())
}
