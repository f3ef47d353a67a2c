use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use fastcsv::convert::{Schema, TypeRegistry, Value};
use fastcsv::queue::QueueBuilder;
use fastcsv::{
    Reader, ReaderBuilder, Record, State, Terminator, Writer, WriterBuilder,
};

fn data(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data", name].iter().collect()
}

fn scratch(name: &str) -> PathBuf {
    env::temp_dir().join(format!("fastcsv-{}-{}", std::process::id(), name))
}

fn fields(records: &[Record]) -> Vec<Vec<&str>> {
    records.iter().map(|r| r.iter().collect()).collect()
}

fn errors(records: &[Record]) -> Vec<bool> {
    records.iter().map(|r| r.is_error()).collect()
}

#[test_log::test]
fn good_file() {
    let mut rdr = Reader::from_path(data("good.csv")).unwrap();
    let recs = rdr.read_all().unwrap();
    assert_eq!(
        fields(&recs),
        vec![
            vec!["1", "2", "3", "4", "5"],
            vec![""],
            vec!["1", "2\n", "3", "4"],
            vec!["1", "2", "4", "5", "6"],
        ]
    );
    assert_eq!(errors(&recs), vec![false; 4]);
    assert_eq!(rdr.ended_in(), Some(State::RecordComplete));
    assert_eq!(rdr.records_read(), 4);
    assert_eq!(rdr.bytes_read(), 34);
}

#[test_log::test]
fn bad_file_with_quoted_limit() {
    let mut rdr = ReaderBuilder::new()
        .quoted_limit(Some(3))
        .from_path(data("bad.csv"))
        .unwrap();
    let recs = rdr.read_all().unwrap();
    assert_eq!(
        fields(&recs),
        vec![
            vec!["1", "2", "3", "4", "5"],
            vec!["1", "2\n1,2,4,5,6"],
            vec!["9", "8", "7\""],
            vec![""],
        ]
    );
    assert_eq!(errors(&recs), vec![false, true, true, false]);
    assert_eq!(recs[1].raw(), "1,\"2\n1,2,4,5,6");
}

#[test_log::test]
fn bad_file_without_quoted_limit() {
    let recs = Reader::from_path(data("bad.csv")).unwrap().read_all().unwrap();
    assert_eq!(
        fields(&recs),
        vec![
            vec!["1", "2", "3", "4", "5"],
            vec!["1", "2\n1,2,4,5,6\n9,8,7"],
            vec![""],
        ]
    );
    assert_eq!(errors(&recs), vec![false; 3]);
}

#[test_log::test]
fn quoted_delimiter_in_file() {
    let mut rdr = Reader::from_path(data("cities.csv")).unwrap();
    let recs = rdr.read_all().unwrap();
    assert_eq!(recs.len(), 4);
    assert_eq!(&recs[0][2], "pop");
    assert_eq!(&recs[3][0], "Washington, D.C.");
    assert_eq!(
        recs[3].raw(),
        "\"Washington, D.C.\",\"United States\",6385162"
    );
}

#[test_log::test]
fn tab_delimited_file() {
    let recs = ReaderBuilder::new()
        .delimiter('\t')
        .from_path(data("scores.tsv"))
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(
        fields(&recs),
        vec![
            vec!["id", "name", "score"],
            vec!["1", "Ada\tL.", "9.5"],
            vec!["2", "Grace", ""],
        ]
    );
    assert!(recs.iter().all(|r| r.delimiter() == '\t'));
}

#[test_log::test]
fn missing_file() {
    let err = Reader::from_path(data("does-not-exist.csv")).unwrap_err();
    assert!(err.is_io_error());
}

#[test_log::test]
fn line_endings_agree() {
    let lf = "a,\"b\nc\"\nd,e\n\nf\n";
    let cr = lf.replace('\n', "\r");
    let crlf = lf.replace('\n', "\r\n");
    let expect = fastcsv::parse_str(lf).unwrap();
    assert_eq!(
        fields(&expect),
        vec![vec!["a", "b\nc"], vec!["d", "e"], vec!["f"]]
    );
    let from_cr = fastcsv::parse_str(&cr).unwrap();
    let from_crlf = fastcsv::parse_str(&crlf).unwrap();
    assert_eq!(from_cr.len(), 3);
    assert_eq!(from_crlf.len(), 3);
    // Terminators inside quotes are kept as they were written.
    assert_eq!(&from_cr[0][1], "b\rc");
    assert_eq!(&from_crlf[0][1], "b\r\nc");
    assert_eq!(&fields(&from_cr)[1..], &fields(&expect)[1..]);
    assert_eq!(&fields(&from_crlf)[1..], &fields(&expect)[1..]);
}

#[test_log::test]
fn many_lines_through_a_file() {
    let path = scratch("many.csv");
    let mut text = String::new();
    for i in 0..2050 {
        text.push_str(&format!("{},\"line {}\",{}\n", i, i, i * 2));
    }
    fs::write(&path, &text).unwrap();

    for &size in &[1, 7, 64, fastcsv::DEFAULT_BUFFER_SIZE, 1 << 16] {
        let mut rdr =
            ReaderBuilder::new().buffer_size(size).from_path(&path).unwrap();
        let mut n = 0u64;
        let count = rdr
            .for_each_record(|r| {
                assert_eq!(&r[0], n.to_string());
                assert_eq!(&r[1], format!("line {}", n));
                n += 1;
            })
            .unwrap();
        assert_eq!(count, 2050);
        assert_eq!(rdr.line(), 2051);
        assert_eq!(rdr.bytes_read(), text.len() as u64);
    }
    fs::remove_file(&path).unwrap();
}

#[test_log::test]
fn read_error_discards_partial_record() {
    struct FailsAfter {
        data: &'static [u8],
    }

    impl Read for FailsAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                let err = io::Error::new(io::ErrorKind::Other, "disk on fire");
                return Err(err);
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    let src = FailsAfter { data: b"a,b\nc,\"d" };
    let mut rdr =
        ReaderBuilder::new().buffer_size(3).from_reader(src).unwrap();
    assert_eq!(rdr.read_record().unwrap().unwrap().fields(), &["a", "b"]);
    let err = rdr.read_record().unwrap_err();
    assert!(err.is_io_error());
    assert!(err.to_string().contains("disk on fire"));
    assert!(rdr.is_done());
    assert!(rdr.read_record().unwrap().is_none());
    assert_eq!(rdr.records_read(), 1);
}

#[test_log::test]
fn unterminated_quote_at_end_of_file() {
    let mut rdr = Reader::from_text("a,b\nc,\"d\ne");
    let recs = rdr.read_all().unwrap();
    assert_eq!(errors(&recs), vec![false, true]);
    assert_eq!(recs[1].fields(), &["c", "d\ne"]);
    assert_eq!(rdr.ended_in(), Some(State::QuotedField));
}

#[test_log::test]
fn owned_iterator_keeps_reader() {
    let mut it = Reader::from_text("a\nb\n").into_records();
    assert_eq!(it.next().unwrap().unwrap().fields(), &["a"]);
    assert_eq!(it.reader().records_read(), 1);
    let mut rdr = it.into_reader();
    assert_eq!(rdr.read_record().unwrap().unwrap().fields(), &["b"]);
    assert!(rdr.read_record().unwrap().is_none());
}

#[cfg(feature = "serde")]
#[test_log::test]
fn records_serialize() {
    let rec = fastcsv::parse_str("x,\"y,z\"").unwrap().remove(0);
    let json = serde_json::to_value(&rec).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "delimiter": ",",
            "error": false,
            "raw": "x,\"y,z\"",
            "fields": ["x", "y,z"],
        })
    );
    let back: Record = serde_json::from_value(json).unwrap();
    assert_eq!(back, rec);
}

#[test_log::test]
fn parse_line_takes_first_record() {
    assert_eq!(fastcsv::parse_line("a,b\nc,d"), vec!["a", "b"]);
    assert_eq!(fastcsv::parse_line("\"x\"\"y\""), vec!["x\"y"]);
    assert_eq!(fastcsv::parse_line("\n\n1"), vec!["1"]);
}

#[test_log::test]
fn queue_over_file() {
    let rdr = ReaderBuilder::new()
        .buffer_size(5)
        .from_path(data("cities.csv"))
        .unwrap();
    let queue = QueueBuilder::new().spawn(rdr).unwrap();
    let cities: Vec<String> =
        queue.clone().map(|r| r.unwrap()[0].to_string()).collect();
    assert_eq!(cities, vec!["city", "Boston", "Concord", "Washington, D.C."]);
    assert_eq!(queue.join().unwrap(), 4);
}

#[test_log::test]
fn typed_values_round_trip() {
    let registry = TypeRegistry::with_primitives();
    let schema = Schema::new(&registry)
        .columns(&["string", "i64", "f64?", "bool"]);
    let rows = vec![
        vec![
            Value::Str("plain".to_string()),
            Value::I64(-7),
            Value::F64(0.25),
            Value::Bool(true),
        ],
        vec![
            Value::Str(" padded, with \"quotes\"".to_string()),
            Value::I64(i64::MAX),
            Value::Null,
            Value::Bool(false),
        ],
    ];

    let mut wtr = Writer::from_writer(vec![]);
    for row in &rows {
        wtr.write_values(row).unwrap();
    }
    let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();

    let mut rdr = Reader::from_text(out);
    let mut got = vec![];
    while let Some(rec) = rdr.read_record().unwrap() {
        got.push(schema.convert(&rec).unwrap());
    }
    assert_eq!(got, rows);
}

#[test_log::test]
fn conversion_error_names_column() {
    let registry = TypeRegistry::with_primitives();
    let schema = Schema::new(&registry).column("string").column("i32");
    let rec = fastcsv::parse_str("a,b").unwrap().remove(0);
    let err = schema.convert(&rec).unwrap_err();
    assert_eq!(err.column(), Some(1));
    assert_eq!(err.text(), "b");
    let err: fastcsv::Error = err.into();
    assert!(!err.is_io_error());
}

#[test_log::test]
fn writer_file_reads_back() {
    let path = scratch("written.csv");
    let rows = vec![
        vec!["a;b", "", "line\nbreak"],
        vec![""],
        vec![" x ", "\"", "ok"],
    ];
    {
        let mut wtr = WriterBuilder::new()
            .delimiter(';')
            .terminator(Terminator::CRLF)
            .from_path(&path)
            .unwrap();
        for row in &rows {
            wtr.write_record(row).unwrap();
        }
        wtr.flush().unwrap();
    }
    let recs = ReaderBuilder::new()
        .delimiter(';')
        .from_path(&path)
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(fields(&recs), rows);
    assert!(recs.iter().all(|r| !r.is_error()));
    fs::remove_file(&path).unwrap();
}
