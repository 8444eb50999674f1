//! Concurrency helper: limit the number of input files parsed in parallel.

use crate::paths::InputFile;
use anyhow::Result;
use rayon::prelude::*;

/// Map over files with at most `limit` in flight; results keep input order.
pub fn map_files_limited<T, F>(files: &[InputFile], limit: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Sync + Fn(&InputFile) -> Result<T>,
{
    if limit <= 1 {
        return files.iter().map(&f).collect();
    }
    let mut out = Vec::with_capacity(files.len());
    for chunk in files.chunks(limit) {
        let part = chunk.par_iter().map(|file| f(file)).collect::<Result<Vec<_>>>()?;
        out.extend(part);
    }
    Ok(out)
}
