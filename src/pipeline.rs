use crate::args::JobArgs;
use crate::config::{JobOptions, Platform, Platforms};
use crate::date::RunStamp;
use crate::model::{JobSummary, NormalizedRecord};
use crate::normalize::{enrich, normalize_platform, union_by_name, PlatformBatch};
use crate::partition::{write_partitioned, WriteReport};
use crate::paths::{discover_all, Discovered};
use crate::progress::{make_progress_bar_labeled, total_input_size};
use crate::util::{configure_parallelism, init_tracing_once};
use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;

/// Printed to stdout when no platform produced any raw record.
pub const NO_INPUT_NOTICE: &str = "No input found; exiting gracefully.";

/// Job lifecycle. Argument failures end the run before `ArgsResolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    ArgsResolved,
    Transformed,
    Written,
    NoInput,
}

/// Terminal result of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    NoInput,
    Written(JobSummary),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::NoInput => JobState::NoInput,
            JobOutcome::Written(_) => JobState::Written,
        }
    }

    /// The line the binary prints on stdout.
    pub fn stdout_line(&self) -> Result<String> {
        Ok(match self {
            JobOutcome::NoInput => NO_INPUT_NOTICE.to_string(),
            JobOutcome::Written(summary) => serde_json::to_string(summary)?,
        })
    }
}

/// Per-branch counters of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchStats {
    pub platform: Platform,
    pub files: usize,
    pub raw_records: u64,
    pub rows: usize,
}

/// Rows produced by the read/normalize/enrich half of a run.
#[derive(Clone, Debug)]
pub struct Transformed {
    pub branches: Vec<BranchStats>,
    pub records: Vec<NormalizedRecord>,
    pub raw_records: u64,
}

#[derive(Clone)]
pub struct NormalizeJob {
    pub(crate) opts: JobOptions,
}

impl Default for NormalizeJob {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizeJob {
    pub fn new() -> Self {
        Self { opts: JobOptions::default() }
    }

    /// Job configured from resolved arguments plus `DMETL_*` environment overrides.
    pub fn from_args(args: &JobArgs) -> Self {
        let mut job = Self::new().source(&args.source).target(&args.target).env(&args.env);
        if let Some(name) = &args.job_name {
            job = job.job_name(name);
        }
        job.opts = job.opts.with_env_overrides();
        job
    }

    // -------- Builder methods --------
    pub fn source(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_source_dir(dir); self }
    pub fn target(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_target_dir(dir); self }
    pub fn env(mut self, env: impl Into<String>) -> Self { self.opts = self.opts.with_env(env); self }
    pub fn job_name(mut self, name: impl Into<String>) -> Self { self.opts = self.opts.with_job_name(name); self }
    pub fn platforms(mut self, platforms: Platforms) -> Self { self.opts = self.opts.with_platforms(platforms); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }

    fn app_name(&self) -> String {
        format!("dmetl_normalise_{}", self.opts.env)
    }

    /// Discover, read and normalize both platform branches, then union and enrich
    /// with `stamp`. Nothing is written.
    pub fn transform(&self, stamp: &RunStamp) -> Result<Transformed> {
        self.opts.check_locations()?;
        let discovered = discover_all(&self.opts.source_dir, self.opts.platforms);
        tracing::info!(
            source=%self.opts.source_dir.display(),
            files = discovered.total_files(),
            "discovered input"
        );

        let pb = if self.opts.progress && discovered.total_files() > 0 {
            let label = self.opts.progress_label.clone().unwrap_or_else(|| self.app_name());
            Some(make_progress_bar_labeled(total_input_size(discovered.all()), Some(&label)))
        } else {
            None
        };

        let (ig, tt) = rayon::join(
            || self.branch(&discovered, Platform::Instagram, pb.as_ref()),
            || self.branch(&discovered, Platform::Tiktok, pb.as_ref()),
        );
        if let Some(pb) = &pb {
            pb.finish_with_message("read");
        }
        let batches = vec![ig?, tt?];

        let branches: Vec<BranchStats> = batches
            .iter()
            .map(|b| BranchStats { platform: b.platform, files: b.files, raw_records: b.raw_records, rows: b.rows.len() })
            .collect();
        let raw_records: u64 = batches.iter().map(|b| b.raw_records).sum();
        let records = enrich(union_by_name(batches), stamp);
        tracing::info!(raw_records, rows = records.len(), state = ?JobState::Transformed, "transformed");
        Ok(Transformed { branches, records, raw_records })
    }

    fn branch(&self, discovered: &Discovered, platform: Platform, pb: Option<&ProgressBar>) -> Result<PlatformBatch> {
        if !self.opts.platforms.includes(platform) {
            return Ok(PlatformBatch::empty(platform));
        }
        normalize_platform(
            platform,
            discovered.for_platform(platform),
            self.opts.file_concurrency,
            self.opts.read_buffer_bytes,
            pb,
        )
    }

    /// Run the whole job with a fresh run timestamp.
    pub fn run(self) -> Result<JobOutcome> {
        self.run_at(RunStamp::now())
    }

    /// Run the whole job stamping rows with `stamp`.
    pub fn run_at(self, stamp: RunStamp) -> Result<JobOutcome> {
        init_tracing_once();
        self.opts.check_locations()?;
        configure_parallelism(self.opts.parallelism);
        tracing::info!(
            app = %self.app_name(),
            job = self.opts.job_name.as_deref().unwrap_or("-"),
            source=%self.opts.source_location,
            target=%self.opts.target_location,
            ingested_at = %stamp,
            state = ?JobState::ArgsResolved,
            "starting"
        );

        let transformed = self.transform(&stamp)?;
        if transformed.raw_records == 0 {
            tracing::warn!(state = ?JobState::NoInput, "no input records under {}", self.opts.source_dir.display());
            return Ok(JobOutcome::NoInput);
        }

        let WriteReport { partitions, rows } = write_partitioned(
            &self.opts.target_dir,
            &transformed.records,
            &stamp.run_id(),
            self.opts.write_buffer_bytes,
        )?;
        tracing::info!(partitions = partitions.len(), rows, state = ?JobState::Written, "written");

        Ok(JobOutcome::Written(JobSummary {
            ok: true,
            source: self.opts.source_location.clone(),
            target: self.opts.target_location.clone(),
            count: rows,
        }))
    }
}
