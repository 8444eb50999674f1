#![allow(dead_code)]

use dmetl::{read_partitioned, NormalizedRecord, RunStamp};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Write a raw export document (pretty-printed, multi-line) to
/// `<source>/<platform>/dt=<dt>/<name>`.
pub fn write_export(source: &Path, platform: &str, dt: &str, name: &str, doc: &Value) -> PathBuf {
    let text = serde_json::to_string_pretty(doc).unwrap();
    write_raw(source, platform, dt, name, &text)
}

/// Write arbitrary file contents under `<source>/<platform>/dt=<dt>/<name>`.
pub fn write_raw(source: &Path, platform: &str, dt: &str, name: &str, contents: &str) -> PathBuf {
    let dir = source.join(platform).join(format!("dt={}", dt));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// The export shape produced by the platform fetchers: one message per document.
pub fn single_message_export(id: &str, text: &str, ts: &str) -> Value {
    serde_json::json!({
        "platform": "instagram",
        "fetched_at": ts,
        "messages": [
            {
                "id": id,
                "from": "insta_user_42",
                "to": "brand_account",
                "text": text,
                "ts": ts,
                "meta": { "thread_id": "t_001", "followers": 1280 }
            }
        ]
    })
}

/// Every data file under `target`, relative to it, sorted.
pub fn output_files(target: &Path) -> Vec<String> {
    let mut v: Vec<String> = WalkDir::new(target)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(target).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    v.sort();
    v
}

/// Read the written dataset back.
pub fn read_output(target: &Path) -> Vec<NormalizedRecord> {
    read_partitioned(target).unwrap()
}

/// Same rows with the per-run field blanked, for run-to-run comparisons.
pub fn without_ingested_at(rows: &[NormalizedRecord]) -> Vec<NormalizedRecord> {
    rows.iter()
        .cloned()
        .map(|mut r| {
            r.ingested_at.clear();
            r
        })
        .collect()
}

pub fn stamp_a() -> RunStamp {
    RunStamp::at(time::macros::datetime!(2024-03-01 12:00:00 UTC))
}

pub fn stamp_b() -> RunStamp {
    RunStamp::at(time::macros::datetime!(2024-03-02 08:30:15.250 UTC))
}
