//! Job argument resolution: orchestration-style named options first, then a
//! lenient `--key value` scan of the raw command line.

use crate::config::check_location;
use crate::error::ConfigError;
use std::collections::HashMap;

/// Named options an orchestrator passes to the job (`--NAME value`).
pub const ORCHESTRATION_OPTIONS: [&str; 4] = ["JOB_NAME", "SOURCE", "TARGET", "ENV"];

pub const DEFAULT_ENV: &str = "dev";

/// Resolved job arguments. Paths never carry a trailing `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobArgs {
    pub job_name: Option<String>,
    pub source: String,
    pub target: String,
    pub env: String,
}

impl JobArgs {
    /// Resolve from the full process argv (program name included or not).
    pub fn resolve<S: AsRef<str>>(argv: &[S]) -> Result<Self, ConfigError> {
        Self::resolve_with(None, argv)
    }

    /// Resolve with an optional orchestration-provided options map.
    /// When `options` is `None`, the named options are looked up strictly in `argv`.
    pub fn resolve_with<S: AsRef<str>>(
        options: Option<&HashMap<String, String>>,
        argv: &[S],
    ) -> Result<Self, ConfigError> {
        let named = match options {
            Some(map) => from_named_options(map),
            None => resolved_options(argv, &ORCHESTRATION_OPTIONS)
                .and_then(|m| from_named_options(&m)),
        };
        let args = match named {
            Some(a) => a,
            None => {
                tracing::debug!("named options incomplete; falling back to flag scan");
                from_flag_scan(argv)
            }
        };
        args.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.source.is_empty() || self.target.is_empty() {
            return Err(ConfigError::missing_paths(self.source, self.target));
        }
        check_location(&self.source)?;
        check_location(&self.target)?;
        Ok(self)
    }
}

#[inline]
pub fn strip_trailing_slashes(p: &str) -> String {
    p.trim_end_matches('/').to_string()
}

fn from_named_options(map: &HashMap<String, String>) -> Option<JobArgs> {
    let source = map.get("SOURCE")?;
    let target = map.get("TARGET")?;
    let env = map.get("ENV")?;
    Some(JobArgs {
        job_name: map.get("JOB_NAME").cloned(),
        source: strip_trailing_slashes(source),
        target: strip_trailing_slashes(target),
        env: env.clone(),
    })
}

/// Strict lookup of `names` in `argv`. Accepts `--NAME value` and `--NAME=value`;
/// returns `None` unless every name is present with a value.
pub fn resolved_options<S: AsRef<str>>(argv: &[S], names: &[&str]) -> Option<HashMap<String, String>> {
    let mut found = HashMap::new();
    let mut i = 0;
    while i < argv.len() {
        let arg = argv[i].as_ref();
        i += 1;
        let Some(flag) = arg.strip_prefix("--") else { continue };
        let (key, inline) = match flag.split_once('=') {
            Some((k, v)) => (k, Some(v.to_string())),
            None => (flag, None),
        };
        if !names.contains(&key) {
            continue;
        }
        let value = match inline {
            Some(v) => v,
            None => {
                let next = argv.get(i)?.as_ref();
                if next.starts_with("--") {
                    return None;
                }
                i += 1;
                next.to_string()
            }
        };
        found.insert(key.to_string(), value);
    }
    names.iter().all(|n| found.contains_key(*n)).then_some(found)
}

/// Every `--key` followed by another argument maps `key -> next`; later keys win.
fn scan_flags<S: AsRef<str>>(argv: &[S]) -> HashMap<String, String> {
    let mut kv = HashMap::new();
    for (i, a) in argv.iter().enumerate() {
        let a = a.as_ref();
        if a.starts_with("--") {
            if let Some(next) = argv.get(i + 1) {
                kv.insert(a.trim_start_matches('-').to_string(), next.as_ref().to_string());
            }
        }
    }
    kv
}

fn from_flag_scan<S: AsRef<str>>(argv: &[S]) -> JobArgs {
    let kv = scan_flags(argv);
    let pick = |upper: &str, lower: &str| -> Option<String> {
        [upper, lower]
            .iter()
            .filter_map(|k| kv.get(*k))
            .find(|v| !v.is_empty())
            .cloned()
    };
    JobArgs {
        job_name: pick("JOB_NAME", "job_name"),
        source: strip_trailing_slashes(&pick("SOURCE", "source").unwrap_or_default()),
        target: strip_trailing_slashes(&pick("TARGET", "target").unwrap_or_default()),
        env: pick("ENV", "env").unwrap_or_else(|| DEFAULT_ENV.to_string()),
    }
}
