use crate::config::{Platform, Platforms};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// One raw export file: `<source>/<platform>/dt=<dt_dir>/<name>.json`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    pub platform: Platform,
    pub dt_dir: String,
    pub path: PathBuf,
}

fn dt_dir_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^dt=(.*)$").expect("valid dt dir regex"))
}

// Names starting with `.` or `_` are bookkeeping files, not data.
fn json_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^._].*\.json$").expect("valid json file regex"))
}

/// Files matching `<source>/<platform>/dt=*/*.json`, sorted by path.
/// A missing platform directory yields no files.
pub fn discover_platform(source: &Path, platform: Platform) -> Vec<InputFile> {
    let dir = source.join(platform.as_str());
    let mut out = Vec::new();
    if !dir.is_dir() {
        return out;
    }
    for entry in WalkDir::new(&dir).min_depth(2).max_depth(2).sort_by_file_name() {
        let ent = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(error=%e, "skipping unreadable entry under {}", dir.display());
                continue;
            }
        };
        if !ent.file_type().is_file() {
            continue;
        }
        let Some(name) = ent.file_name().to_str() else { continue };
        if !json_file_re().is_match(name) {
            continue;
        }
        let parent_name = ent
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str());
        if let Some(caps) = parent_name.and_then(|n| dt_dir_re().captures(n)) {
            out.push(InputFile {
                platform,
                dt_dir: caps[1].to_string(),
                path: ent.path().to_path_buf(),
            });
        }
    }
    out
}

/// Discovered input per selected platform (every selected platform has an entry).
#[derive(Clone, Debug, Default)]
pub struct Discovered {
    pub files: BTreeMap<Platform, Vec<InputFile>>,
}

impl Discovered {
    pub fn for_platform(&self, p: Platform) -> &[InputFile] {
        self.files.get(&p).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn total_files(&self) -> usize {
        self.files.values().map(|v| v.len()).sum()
    }

    pub fn all(&self) -> impl Iterator<Item = &InputFile> {
        self.files.values().flatten()
    }
}

pub fn discover_all(source: &Path, platforms: Platforms) -> Discovered {
    let files = platforms
        .selected()
        .into_iter()
        .map(|p| (p, discover_platform(source, p)))
        .collect();
    Discovered { files }
}
