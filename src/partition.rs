use ahash::AHashMap;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::model::NormalizedRecord;
use crate::ndjson::{NdjsonReader, NdjsonWriter};
use crate::util::{create_with_backoff, remove_dir_with_backoff, replace_dir_backoff};

/// Directory value used for rows whose `dt` is null.
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";
pub const STAGING_DIR: &str = "_temporary";
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Physical partition of an output row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    pub platform_part: String,
    pub dt: Option<String>,
}

impl PartitionKey {
    pub fn of(rec: &NormalizedRecord) -> Self {
        Self { platform_part: rec.platform_part.clone(), dt: rec.dt.clone() }
    }

    /// `platform_part=<p>/dt=<d>`
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(format!("platform_part={}", self.platform_part))
            .join(format!("dt={}", self.dt.as_deref().unwrap_or(NULL_PARTITION)))
    }
}

/// Row payload as stored: partition columns live in the path, not in the line.
pub fn partition_payload(rec: &NormalizedRecord) -> Result<Value> {
    let mut v = serde_json::to_value(rec)?;
    if let Some(obj) = v.as_object_mut() {
        obj.remove("platform_part");
        obj.remove("dt");
    }
    Ok(v)
}

/// Partition writers that stage each `(platform_part, dt)` group under
/// `<target>/_temporary/<run_id>/` and promote them on `finalize()`.
///
/// File layout:
///   <target>/_temporary/<run_id>/platform_part=P/dt=D/part-00000-<run_id>.json  (staged)
///   <target>/platform_part=P/dt=D/part-00000-<run_id>.json                      (final)
///
/// Promotion replaces the whole partition directory, so stale files from earlier
/// runs disappear. Partitions this run has no rows for are never touched.
/// `write_partition()` is safe to call from several threads.
pub struct PartitionWriters {
    target: PathBuf,
    staging: PathBuf,
    run_id: String,
    write_buf: usize,
    staged: Mutex<Vec<PartitionKey>>,
}

impl PartitionWriters {
    pub fn new(target: &Path, run_id: &str, write_buf: usize) -> Result<Self> {
        let staging = target.join(STAGING_DIR).join(run_id);
        fs::create_dir_all(&staging).with_context(|| format!("create {}", staging.display()))?;
        Ok(Self {
            target: target.to_path_buf(),
            staging,
            run_id: run_id.to_string(),
            write_buf,
            staged: Mutex::new(Vec::new()),
        })
    }

    pub fn part_file_name(&self) -> String {
        format!("part-00000-{}.json", self.run_id)
    }

    /// Write one partition's rows into staging. Returns the number of lines written.
    pub fn write_partition(&self, key: &PartitionKey, rows: &[&NormalizedRecord]) -> Result<u64> {
        let dir = self.staging.join(key.relative_dir());
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(self.part_file_name());
        let mut w = NdjsonWriter::create(&path, self.write_buf)
            .with_context(|| format!("create {}", path.display()))?;
        for rec in rows {
            w.write_value(&partition_payload(rec)?)?;
        }
        let n = w.finish()?;
        self.staged.lock().push(key.clone());
        tracing::debug!(partition=%key.relative_dir().display(), rows = n, "staged partition");
        Ok(n)
    }

    /// Promote every staged partition over its final location, drop the staging
    /// area and write the `_SUCCESS` marker. Returns final partition dirs in key order.
    pub fn finalize(self) -> Result<Vec<PathBuf>> {
        let mut keys = self.staged.into_inner();
        keys.sort();
        keys.dedup();

        let mut finals = Vec::with_capacity(keys.len());
        for key in &keys {
            let rel = key.relative_dir();
            let dest = self.target.join(&rel);
            replace_dir_backoff(&self.staging.join(&rel), &dest)?;
            finals.push(dest);
        }

        remove_dir_with_backoff(&self.staging, 20, 50)?;
        // Other runs may still be staging next to us.
        let _ = fs::remove_dir(self.target.join(STAGING_DIR));

        let marker = self.target.join(SUCCESS_MARKER);
        create_with_backoff(&marker, 16, 50).with_context(|| format!("create {}", marker.display()))?;
        Ok(finals)
    }
}

/// Outcome of a partitioned write.
#[derive(Clone, Debug, Default)]
pub struct WriteReport {
    pub partitions: Vec<PathBuf>,
    pub rows: u64,
}

/// Group records by `(platform_part, dt)` and write each group, replacing the
/// existing contents of every partition the records touch.
pub fn write_partitioned(
    target: &Path,
    records: &[NormalizedRecord],
    run_id: &str,
    write_buf: usize,
) -> Result<WriteReport> {
    let mut groups: AHashMap<PartitionKey, Vec<&NormalizedRecord>> = AHashMap::new();
    for rec in records {
        groups.entry(PartitionKey::of(rec)).or_default().push(rec);
    }
    let mut groups: Vec<_> = groups.into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let writers = PartitionWriters::new(target, run_id, write_buf)?;
    let counts = groups
        .par_iter()
        .map(|(key, rows)| writers.write_partition(key, rows))
        .collect::<Result<Vec<u64>>>()?;
    let partitions = writers.finalize()?;
    for p in &partitions {
        tracing::info!(partition=%p.display(), "wrote partition");
    }
    Ok(WriteReport { partitions, rows: counts.iter().sum() })
}

fn platform_dir_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^platform_part=(.+)$").expect("valid platform_part regex"))
}

fn dt_dir_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^dt=(.+)$").expect("valid dt regex"))
}

fn dir_value<'a>(path: &'a Path, re: &Regex) -> Option<&'a str> {
    let name = path.file_name()?.to_str()?;
    re.captures(name).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Read a partitioned dataset back, restoring `platform_part` and `dt` from the
/// directory names. Files are visited in path order.
pub fn read_partitioned(target: &Path) -> Result<Vec<NormalizedRecord>> {
    let mut out = Vec::new();
    if !target.is_dir() {
        return Ok(out);
    }
    for entry in WalkDir::new(target).min_depth(3).max_depth(3).sort_by_file_name() {
        let ent = entry.with_context(|| format!("walk {}", target.display()))?;
        let path = ent.path();
        if !ent.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(dt_dir) = path.parent() else { continue };
        let Some(platform_dir) = dt_dir.parent() else { continue };
        let (Some(dt), Some(platform_part)) =
            (dir_value(dt_dir, dt_dir_re()), dir_value(platform_dir, platform_dir_re()))
        else {
            continue;
        };

        let values = NdjsonReader::open(path, 64 * 1024)
            .with_context(|| format!("open {}", path.display()))?
            .read_values()
            .with_context(|| format!("read {}", path.display()))?;
        for mut v in values {
            if let Some(obj) = v.as_object_mut() {
                obj.insert("platform_part".into(), Value::String(platform_part.to_string()));
                if dt != NULL_PARTITION {
                    obj.insert("dt".into(), Value::String(dt.to_string()));
                }
            }
            let rec: NormalizedRecord = serde_json::from_value(v)
                .with_context(|| format!("decode row in {}", path.display()))?;
            out.push(rec);
        }
    }
    Ok(out)
}
