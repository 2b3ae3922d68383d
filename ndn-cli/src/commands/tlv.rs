//! `ndn-cli tlv-dump`: decode a hex-encoded TLV block and print its tree.

use anyhow::{Context, Result};
use bytes::Bytes;

use ndn_core::Block;

use crate::utils::print_header;

pub fn run(hex_input: &str) -> Result<()> {
    let bytes = hex::decode(hex_input.trim()).context("input is not valid hex")?;
    let mut block = Block::decode_from(&Bytes::from(bytes)).context("input is not a well-formed TLV block")?;
    block.parse().context("failed to parse nested TLV elements")?;

    print_header("TLV block");
    print_block(&block, 0);
    Ok(())
}

fn print_block(block: &Block, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}type={} length={}", block.tlv_type(), block.value().len());
    if block.elements().is_empty() {
        if !block.value().is_empty() {
            println!("{indent}  value: {}", hex::encode(block.value()));
        }
        return;
    }
    for child in block.elements() {
        print_block(child, depth + 1);
    }
}
