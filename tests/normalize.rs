#[path = "common/mod.rs"]
mod common;

use common::*;
use dmetl::{
    derive_dt, enrich, normalize_record, union_by_name, Intent, Platform, PlatformBatch, RawExportRecord,
    Sentiment,
};
use serde_json::json;

#[test]
fn empty_or_absent_messages_yield_one_null_row() {
    for doc in [
        json!({ "fetched_at": "2024-02-03T04:05:06Z", "messages": [] }),
        json!({ "fetched_at": "2024-02-03T04:05:06Z" }),
        json!({ "fetched_at": "2024-02-03T04:05:06Z", "messages": null }),
    ] {
        let rows = normalize_record(Platform::Tiktok, &doc);
        assert_eq!(rows.len(), 1, "{doc}");
        let r = &rows[0];
        assert_eq!(r.platform, Platform::Tiktok);
        assert_eq!(r.dt.as_deref(), Some("2024-02-03"));
        assert!(r.message_id.is_none() && r.sender.is_none() && r.recipient.is_none());
        assert!(r.text.is_none() && r.message_ts.is_none() && r.meta.is_none());
    }
}

/// dt comes from the first message only and is shared by every row of the record.
#[test]
fn n_messages_give_n_rows_sharing_dt() {
    let doc = json!({
        "fetched_at": "2024-05-05T00:00:00Z",
        "messages": [
            { "id": "a", "text": "hello", "ts": "2024-01-01T10:00:00Z" },
            { "id": "b", "text": "refund please", "ts": "2024-01-03T10:00:00Z" },
            { "id": "c", "text": "promo", "ts": "2024-01-09T10:00:00Z" }
        ]
    });
    let rows = normalize_record(Platform::Instagram, &doc);
    assert_eq!(rows.len(), 3);
    let ids: Vec<_> = rows.iter().map(|r| r.message_id.clone().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(rows.iter().all(|r| r.dt.as_deref() == Some("2024-01-01")));
    assert!(rows.iter().all(|r| r.platform == Platform::Instagram));
    assert_eq!(rows[1].message_ts.as_deref(), Some("2024-01-03T10:00:00Z"));
}

#[test]
fn first_message_without_ts_falls_back_to_fetched_at() {
    let doc = json!({
        "fetched_at": "2024-06-30T23:59:59Z",
        "messages": [ { "id": "a" }, { "id": "b", "ts": "2024-01-01T00:00:00Z" } ]
    });
    let rec = RawExportRecord::from_value(&doc);
    assert_eq!(derive_dt(&rec).as_deref(), Some("2024-06-30"));
}

/// The chosen timestamp is not re-tried against `fetched_at` when it fails to parse.
#[test]
fn unparseable_timestamp_gives_null_dt() {
    let doc = json!({ "fetched_at": "2024-06-30T00:00:00Z", "messages": [ { "ts": "yesterday" } ] });
    let rows = normalize_record(Platform::Instagram, &doc);
    assert_eq!(rows[0].dt, None);

    let none = json!({ "messages": [] });
    assert_eq!(normalize_record(Platform::Instagram, &none)[0].dt, None);
}

#[test]
fn timestamp_forms() {
    let dt = |ts: serde_json::Value| derive_dt(&RawExportRecord::from_value(&json!({ "fetched_at": ts })));
    assert_eq!(dt(json!("2024-01-01T23:30:00-02:00")).as_deref(), Some("2024-01-02"));
    assert_eq!(dt(json!("2024-01-01 10:00:00")).as_deref(), Some("2024-01-01"));
    assert_eq!(dt(json!("2024-01-01T10:00:00.123456")).as_deref(), Some("2024-01-01"));
    assert_eq!(dt(json!("2024-01-01T10:00:00.5Z")).as_deref(), Some("2024-01-01"));
    assert_eq!(dt(json!("2024-02-29")).as_deref(), Some("2024-02-29"));
    assert_eq!(dt(json!(1704103200)).as_deref(), Some("2024-01-01"));
    assert_eq!(dt(json!(true)), None);
}

#[test]
fn message_fields_are_coerced_and_meta_passes_through() {
    let doc = json!({
        "fetched_at": "2024-01-01T00:00:00Z",
        "messages": [
            { "id": 42, "from": "u1", "to": null, "text": "hi", "meta": { "thread_id": "t_9", "n": [1, 2] } },
            null,
            "not an object"
        ]
    });
    let rows = normalize_record(Platform::Tiktok, &doc);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].message_id.as_deref(), Some("42"));
    assert_eq!(rows[0].sender.as_deref(), Some("u1"));
    assert_eq!(rows[0].recipient, None);
    assert_eq!(rows[0].meta, Some(json!({ "thread_id": "t_9", "n": [1, 2] })));
    for r in &rows[1..] {
        assert!(r.message_id.is_none() && r.text.is_none());
        assert_eq!(r.dt.as_deref(), Some("2024-01-01"));
    }
}

#[test]
fn union_keeps_every_row_and_enrich_stamps_once() {
    let ig = normalize_record(
        Platform::Instagram,
        &json!({ "fetched_at": "2024-01-01T00:00:00Z",
                 "messages": [ { "id": "i1", "text": "how much?", "meta": { "k": 1 } },
                               { "id": "i2", "text": "my order is broken" } ] }),
    );
    let tt = normalize_record(
        Platform::Tiktok,
        &json!({ "fetched_at": "2024-01-02T00:00:00Z", "messages": [ { "id": "t1", "text": "can you dm me" } ] }),
    );
    let batches = vec![
        PlatformBatch { platform: Platform::Instagram, files: 1, raw_records: 1, rows: ig },
        PlatformBatch { platform: Platform::Tiktok, files: 1, raw_records: 1, rows: tt },
    ];
    let rows = union_by_name(batches);
    assert_eq!(rows.len(), 3);

    let stamp = stamp_b();
    let out = enrich(rows, &stamp);
    let intents: Vec<_> = out.iter().map(|r| r.intent).collect();
    assert_eq!(intents, vec![Intent::Lead, Intent::Support, Intent::Question]);
    assert!(out.iter().all(|r| r.sentiment == Sentiment::Neutral));
    assert!(out.iter().all(|r| r.ingested_at == "2024-03-02T08:30:15.250000Z"));
    assert!(out.iter().all(|r| r.platform_part == r.platform.as_str()));
    assert_eq!(out[2].meta, None);
}

#[test]
fn run_stamp_formats_like_iso_utc() {
    assert_eq!(stamp_a().iso(), "2024-03-01T12:00:00Z");
    assert_eq!(stamp_b().to_string(), "2024-03-02T08:30:15.250000Z");
    assert_ne!(stamp_a().run_id(), stamp_b().run_id());
}
