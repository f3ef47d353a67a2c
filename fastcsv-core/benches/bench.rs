#![feature(test)]

extern crate test;

use test::Bencher;

use fastcsv_core::{Parser, ParserBuilder, ReadRecordResult};

// Builds `rows` records of a mix of plain and quoted fields.
fn data(rows: usize, quoted: bool) -> String {
    let mut s = String::new();
    for i in 0..rows {
        if quoted {
            s.push_str(&format!(
                "{},\"name {}\",\"multi\nline, with \"\"quotes\"\"\",{}.5\r\n",
                i, i, i
            ));
        } else {
            s.push_str(&format!("{},name {},plain text,{}.5\n", i, i, i));
        }
    }
    s
}

macro_rules! bench {
    ($name:ident, $rows:expr, $quoted:expr, $chunk:expr) => {
        #[bench]
        fn $name(b: &mut Bencher) {
            let data = data($rows, $quoted);
            b.bytes = data.len() as u64;
            let mut parser = ParserBuilder::new().build();
            b.iter(|| {
                parser.reset();
                assert_eq!(count_records(&mut parser, &data, $chunk), $rows);
            })
        }
    };
}

bench!(count_plain_whole, 10000, false, usize::MAX);
bench!(count_plain_1k_windows, 10000, false, 1024);
bench!(count_plain_tiny_windows, 10000, false, 7);
bench!(count_quoted_whole, 10000, true, usize::MAX);
bench!(count_quoted_1k_windows, 10000, true, 1024);
bench!(count_quoted_tiny_windows, 10000, true, 7);

fn count_records(parser: &mut Parser, data: &str, chunk: usize) -> usize {
    let mut count = 0;
    let mut start = 0;
    while start < data.len() {
        let mut end = start.saturating_add(chunk).min(data.len());
        while !data.is_char_boundary(end) {
            end += 1;
        }
        let mut window = &data[start..end];
        while !window.is_empty() {
            let (res, nin) = parser.read_record(window);
            window = &window[nin..];
            if res.is_record() {
                count += 1;
            }
        }
        start = end;
    }
    loop {
        match parser.read_record("").0 {
            ReadRecordResult::Record(_) => count += 1,
            _ => break,
        }
    }
    count
}
