// End-to-end runs of the batch decoder over log files on disk.

use std::fs::File;
use std::io::Write;

use arena_log_cli::{run, Config};
use clap::Parser;
use tempfile::NamedTempFile;

fn write_log(lines: &[&str]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    for line in lines {
        f.write_all(line.as_bytes()).unwrap();
    }
    f.flush().unwrap();
    f
}

fn decode_file(f: &NamedTempFile, extra: &[&str]) -> (arena_log_cli::RunSummary, String) {
    let path = f.path().to_str().unwrap().to_string();
    let mut argv = vec!["arena-log", path.as_str()];
    argv.extend_from_slice(extra);
    let config = Config::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let summary = run(&config, File::open(f.path()).unwrap(), &mut out).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn decodes_file_with_utf8_labels_and_payloads() {
    let f = write_log(&[
        "[UnityCrossThreadLogger]==> Deck.UpsertDeck {\"name\":\"R\u{e9}animation \u{1f0cf}\"}\r\n",
        "[UnityCrossThreadLogger]1:00 PM: Match to P1: Inventory.Updated\r\n",
        "{\"gold\":100}\r\n",
    ]);
    let (summary, out) = decode_file(&f, &["--chunk-size", "3", "--payload"]);
    assert_eq!(summary.entries, 2);
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[0]["payload"]["name"], "R\u{e9}animation \u{1f0cf}");
    assert_eq!(lines[1]["payload"]["gold"], 100);
}

#[test]
fn empty_file_writes_nothing() {
    let f = write_log(&[]);
    let (summary, out) = decode_file(&f, &[]);
    assert_eq!(summary.entries, 0);
    assert_eq!(summary.bytes_read, 0);
    assert!(out.is_empty());
}

#[test]
fn file_without_entries_is_drained_with_small_cap() {
    let noise: Vec<String> = (0..200).map(|i| format!("Loading asset bundle {i}")).collect();
    let refs: Vec<&str> = noise.iter().map(String::as_str).collect();
    let f = write_log(&refs);
    let (summary, out) = decode_file(&f, &["--max-retained", "64", "--chunk-size", "50"]);
    assert_eq!(summary.entries, 0);
    assert!(out.is_empty());
    assert!(summary.bytes_read > 64);
}
