//! Example: Read a data block document from stdin and write it back out.
//!
//! Run with: cargo run --example stdin_roundtrip [-- --compact] < settings.blk

use std::io::Read;

use datablock_core::{Block, WriteOptions};

fn main() {
    let compact = std::env::args().any(|arg| arg == "--compact");

    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input).unwrap();

    match Block::parse(&input) {
        Ok(root) => {
            let options = if compact { WriteOptions::compact() } else { WriteOptions::default() };
            root.write_text(std::io::stdout().lock(), options).unwrap();
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}
