mod args;
mod config;
mod date;
mod error;
mod paths;

mod concurrency;
mod progress;
mod util;

mod intent;
mod json_utils;
mod model;
mod ndjson;
mod normalize;

mod partition;
mod pipeline;

pub use crate::args::{resolved_options, strip_trailing_slashes, JobArgs, DEFAULT_ENV, ORCHESTRATION_OPTIONS};
pub use crate::config::{JobOptions, Platform, Platforms};
pub use crate::date::{format_dt, parse_timestamp_str, parse_timestamp_utc, partition_date, RunStamp};
pub use crate::error::ConfigError;
pub use crate::pipeline::{BranchStats, JobOutcome, JobState, NormalizeJob, Transformed, NO_INPUT_NOTICE};

// Discovery of `<source>/<platform>/dt=*/*.json`.
pub use crate::paths::{discover_all, discover_platform, Discovered, InputFile};

// Classifier and row model.
pub use crate::intent::{classify, Intent, INTENT_RULES};
pub use crate::model::{JobSummary, MessageRow, NormalizedRecord, RawExportRecord, RawMessage, Sentiment};

// Normalization steps, usable without running a whole job.
pub use crate::normalize::{derive_dt, enrich, normalize_platform, normalize_record, union_by_name, PlatformBatch};

// JSON readers/writers.
pub use crate::ndjson::{read_json_documents, NdjsonReader, NdjsonWriter};

// Partitioned output.
pub use crate::partition::{
    partition_payload, read_partitioned, write_partitioned, PartitionKey, PartitionWriters, WriteReport,
    NULL_PARTITION, STAGING_DIR, SUCCESS_MARKER,
};

pub use crate::util::init_tracing_once;
