use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Messaging platform a raw export comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Instagram, Platform::Tiktok];

    /// Branch name; also the sub-directory under the source root.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform branch toggle (instagram, tiktok, both).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platforms {
    Instagram,
    Tiktok,
    Both,
}

impl Platforms {
    pub fn selected(self) -> Vec<Platform> {
        match self {
            Platforms::Instagram => vec![Platform::Instagram],
            Platforms::Tiktok => vec![Platform::Tiktok],
            Platforms::Both => Platform::ALL.to_vec(),
        }
    }

    pub fn includes(self, p: Platform) -> bool {
        self.selected().contains(&p)
    }
}

/// Job options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct JobOptions {
    pub source_location: String, // as given, echoed in the run summary
    pub target_location: String,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub env: String,
    pub job_name: Option<String>,
    pub platforms: Platforms,
    pub parallelism: Option<usize>,    // Some(N) to set rayon threads, None to use default
    pub file_concurrency: usize,       // input files parsed concurrently per platform branch
    pub progress: bool,
    pub progress_label: Option<String>,

    // IO tuning
    pub read_buffer_bytes: usize,
    pub write_buffer_bytes: usize,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            source_location: String::new(),
            target_location: String::new(),
            source_dir: PathBuf::new(),
            target_dir: PathBuf::new(),
            env: crate::args::DEFAULT_ENV.to_string(),
            job_name: None,
            platforms: Platforms::Both,
            parallelism: None,
            file_concurrency: 4,
            progress: true,
            progress_label: None,

            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl JobOptions {
    pub fn with_source_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.source_location = dir.as_ref().to_string_lossy().into_owned();
        self.source_dir = local_path(&self.source_location);
        self
    }
    pub fn with_target_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.target_location = dir.as_ref().to_string_lossy().into_owned();
        self.target_dir = local_path(&self.target_location);
        self
    }
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = env.into();
        self
    }
    pub fn with_job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = Some(name.into());
        self
    }
    pub fn with_platforms(mut self, platforms: Platforms) -> Self {
        self.platforms = platforms;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }

    /// Overlay tuning knobs from the environment:
    /// - DMETL_PARALLELISM: rayon worker threads
    /// - DMETL_FILE_CONCURRENCY: files parsed concurrently per platform
    /// - DMETL_PROGRESS: `0`/`false`/`off` disables the progress bar
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_usize("DMETL_PARALLELISM") {
            self = self.with_parallelism(n);
        }
        if let Some(n) = env_usize("DMETL_FILE_CONCURRENCY") {
            self = self.with_file_concurrency(n);
        }
        if let Ok(v) = std::env::var("DMETL_PROGRESS") {
            let v = v.trim().to_lowercase();
            self.progress = !matches!(v.as_str(), "0" | "false" | "off" | "no");
        }
        self
    }

    /// Reject source/target locations that are not on the local file system.
    pub fn check_locations(&self) -> Result<(), ConfigError> {
        check_location(&self.source_location)?;
        check_location(&self.target_location)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("{} is set but is not a positive integer: {:?}", key, raw);
            None
        }
    }
}

/// URL scheme of a location such as `s3://bucket/key`, if it has one.
pub fn location_scheme(location: &str) -> Option<&str> {
    let (scheme, _) = location.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Only plain paths and `file://` locations are reachable.
pub fn check_location(location: &str) -> Result<(), ConfigError> {
    match location_scheme(location) {
        Some(scheme) if !scheme.eq_ignore_ascii_case("file") => Err(ConfigError::unsupported_scheme(location)),
        _ => Ok(()),
    }
}

/// Local file system path for a job location; `file://` is stripped.
pub fn local_path(location: &str) -> PathBuf {
    match location_scheme(location) {
        Some(scheme) if scheme.eq_ignore_ascii_case("file") => PathBuf::from(&location[scheme.len() + 3..]),
        _ => PathBuf::from(location),
    }
}
