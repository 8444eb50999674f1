//! Per-platform flattening of raw exports into message rows, branch union, and
//! the enrichment step that produces output records.

use crate::concurrency::map_files_limited;
use crate::config::Platform;
use crate::date::{format_dt, partition_date, RunStamp};
use crate::intent::classify;
use crate::model::{MessageRow, NormalizedRecord, RawExportRecord, RawMessage, Sentiment};
use crate::ndjson::read_json_documents;
use crate::paths::InputFile;
use crate::progress::file_size;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde_json::Value;

/// Partition date of a raw record: the first message's `ts` when non-null, else
/// `fetched_at`. An unparseable chosen value gives `None`.
pub fn derive_dt(rec: &RawExportRecord) -> Option<String> {
    rec.first_message_ts()
        .or(rec.fetched_at.as_ref())
        .and_then(partition_date)
        .map(format_dt)
}

/// Outer-explode one raw document: one row per message, or a single row with
/// null message fields when `messages` is empty or absent.
pub fn normalize_record(platform: Platform, doc: &Value) -> Vec<MessageRow> {
    let rec = RawExportRecord::from_value(doc);
    let dt = derive_dt(&rec);
    match rec.messages.as_deref() {
        Some(msgs) if !msgs.is_empty() => msgs
            .iter()
            .map(|m| MessageRow::new(platform, dt.clone(), RawMessage::from_value(m)))
            .collect(),
        _ => vec![MessageRow::new(platform, dt, RawMessage::default())],
    }
}

/// Everything one platform branch contributed.
#[derive(Clone, Debug)]
pub struct PlatformBatch {
    pub platform: Platform,
    pub files: usize,
    pub raw_records: u64,
    pub rows: Vec<MessageRow>,
}

impl PlatformBatch {
    pub fn empty(platform: Platform) -> Self {
        Self { platform, files: 0, raw_records: 0, rows: Vec::new() }
    }
}

/// Read and normalize every file of one platform. Rows keep file then document order.
pub fn normalize_platform(
    platform: Platform,
    files: &[InputFile],
    file_concurrency: usize,
    read_buf_bytes: usize,
    pb: Option<&ProgressBar>,
) -> Result<PlatformBatch> {
    if files.is_empty() {
        tracing::info!(%platform, "no input files");
        return Ok(PlatformBatch::empty(platform));
    }

    let per_file = map_files_limited(files, file_concurrency, |file| -> Result<(u64, Vec<MessageRow>)> {
        let docs = read_json_documents(&file.path, read_buf_bytes)
            .with_context(|| format!("reading {} export {}", platform, file.path.display()))?;
        let rows = docs.iter().flat_map(|d| normalize_record(platform, d)).collect();
        if let Some(pb) = pb {
            pb.inc(file_size(file));
        }
        Ok((docs.len() as u64, rows))
    })?;

    let mut batch = PlatformBatch::empty(platform);
    batch.files = files.len();
    for (n, rows) in per_file {
        batch.raw_records += n;
        batch.rows.extend(rows);
    }
    tracing::info!(%platform, files = batch.files, raw_records = batch.raw_records, rows = batch.rows.len(), "normalized");
    Ok(batch)
}

/// Merge branches by field name over the `MessageRow` schema; fields a branch
/// never populated stay `None`.
pub fn union_by_name(batches: Vec<PlatformBatch>) -> Vec<MessageRow> {
    let total = batches.iter().map(|b| b.rows.len()).sum();
    let mut out = Vec::with_capacity(total);
    for b in batches {
        out.extend(b.rows);
    }
    out
}

/// Attach intent, sentiment, the run timestamp and the partition mirror.
pub fn enrich(rows: Vec<MessageRow>, stamp: &RunStamp) -> Vec<NormalizedRecord> {
    let ingested_at = stamp.iso();
    rows.into_iter()
        .map(|r| NormalizedRecord {
            intent: classify(r.text.as_deref()),
            sentiment: Sentiment::Neutral,
            ingested_at: ingested_at.clone(),
            platform_part: r.platform.as_str().to_string(),
            platform: r.platform,
            dt: r.dt,
            message_id: r.message_id,
            sender: r.sender,
            recipient: r.recipient,
            text: r.text,
            message_ts: r.message_ts,
            meta: r.meta,
        })
        .collect()
}
