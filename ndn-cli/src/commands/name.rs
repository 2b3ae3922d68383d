//! `ndn-cli name`: parse a URI and print its canonical form and wire encoding.

use anyhow::{Context, Result};

use ndn_core::Name;

use crate::utils::print_header;

pub fn run(uri: &str) -> Result<()> {
    let name = Name::from_uri(uri).with_context(|| format!("failed to parse '{uri}' as an NDN name"))?;

    print_header("Name");
    println!("uri:        {name}");
    println!("components: {}", name.len());
    for (index, component) in name.components().iter().enumerate() {
        println!("  [{index}] type={} len={} value={}", component.tlv_type(), component.value().len(), hex::encode(component.value()));
    }

    let wire = name.to_wire()?;
    println!("wire ({} bytes): {}", wire.len(), hex::encode(&wire));
    Ok(())
}
