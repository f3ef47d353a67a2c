#![no_main]
use libfuzzer_sys::fuzz_target;

use fastcsv::{Record, ReaderBuilder};

fn read(data: &[u8], buffer_size: usize) -> Vec<Record> {
    ReaderBuilder::new()
        .buffer_size(buffer_size)
        .quoted_limit(Some(16))
        .from_reader(data)
        .unwrap()
        .read_all()
        .unwrap()
}

fuzz_target!(|data: &[u8]| {
    let whole = read(data, data.len().max(1));
    assert_eq!(whole, read(data, 1));
    assert_eq!(whole, read(data, 3));
});
