use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the fmt subscriber once. Logs go to stderr; stdout is reserved for the job summary.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Size rayon's global pool once; later calls are ignored by rayon.
pub fn configure_parallelism(threads: Option<usize>) {
    if let Some(n) = threads {
        if n > 0 {
            rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
        }
    }
}

// -------- robust open/create with backoff (Windows-friendly) --------

/// Return true for transient/retriable I/O errors often seen on Windows when
/// filter drivers (AV/backup), USB/NAS volumes, or sharing violations occur.
/// Elsewhere these raw codes mean EIO/EPIPE/EDOM/EISDIR, so nothing is retried.
#[cfg(windows)]
fn is_retriable_io_error(e: &io::Error) -> bool {
    match e.raw_os_error() {
        // Common Windows transient codes:
        //   5   = Access is denied (often AV/share)
        //   32  = Sharing violation
        //   33  = Lock violation
        //   21  = Device not ready
        //   1224= User-mapped section open
        Some(5) | Some(32) | Some(33) | Some(21) | Some(1224) => true,
        _ => false,
    }
}

#[cfg(not(windows))]
fn is_retriable_io_error(_e: &io::Error) -> bool {
    false
}

/// Run `op` until it succeeds, fails with a non-retriable error, or `tries` run out.
fn with_backoff<T>(tries: usize, delay_ms: u64, what: &str, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, format!("{what} failed"))))
}

/// Open a file with retries/backoff for transient errors.
pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff(tries, delay_ms, "open", || File::open(path))
}

/// Create a file with retries/backoff for transient errors.
pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff(tries, delay_ms, "create", || File::create(path))
}

/// Recursively remove a directory with retries. Succeeds if it doesn't exist.
pub fn remove_dir_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> Result<()> {
    with_backoff(tries, delay_ms, "remove dir", || match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
    .with_context(|| format!("remove {}", path.display()))
}

fn rename_with_backoff(src: &Path, dest: &Path, tries: usize, delay_ms: u64) -> Result<()> {
    with_backoff(tries, delay_ms, "rename", || fs::rename(src, dest))
        .with_context(|| format!("rename {} -> {}", src.display(), dest.display()))
}

/// Replace directory `dest` with `staged`: the old contents are removed entirely,
/// then `staged` is renamed into place.
pub fn replace_dir_backoff(staged: &Path, dest: &Path) -> Result<()> {
    let tries = 20usize;
    let delay_ms = 50u64;
    if dest.exists() {
        remove_dir_with_backoff(dest, tries, delay_ms)?;
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    rename_with_backoff(staged, dest, tries, delay_ms)
}
