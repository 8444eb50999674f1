use crate::util::{create_with_backoff, open_with_backoff};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Read every JSON document in a raw export file.
///
/// A file may hold several concatenated (possibly pretty-printed) documents; a
/// top-level array contributes each of its elements. Every resulting document
/// must be a JSON object. Malformed input is an error naming the file.
pub fn read_json_documents(path: &Path, buf_bytes: usize) -> Result<Vec<Value>> {
    let f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::with_capacity(buf_bytes.max(8 * 1024), f);
    let mut docs = Vec::new();
    for (idx, item) in serde_json::Deserializer::from_reader(rdr).into_iter::<Value>().enumerate() {
        let val = item.with_context(|| format!("parse JSON document #{} in {}", idx + 1, path.display()))?;
        match val {
            Value::Array(items) => docs.extend(items),
            other => docs.push(other),
        }
    }
    if let Some(pos) = docs.iter().position(|d| !d.is_object()) {
        bail!("record #{} in {} is not a JSON object", pos + 1, path.display());
    }
    Ok(docs)
}

/// Minimal NDJSON reader with buffering and empty-line trimming.
/// Uses robust open-with-backoff for Windows-friendliness.
pub struct NdjsonReader {
    rdr: BufReader<File>,
}

impl NdjsonReader {
    pub fn open(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = open_with_backoff(path, 16, 50)?;
        Ok(Self { rdr: BufReader::with_capacity(buf_bytes.max(8 * 1024), f) })
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    /// Strips trailing `\r?\n`.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 { return Ok(0); }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        Ok(n)
    }

    /// Parse every non-blank line as JSON.
    pub fn read_values(mut self) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        let mut line = String::new();
        while self.read_line(&mut line)? > 0 {
            if line.trim().is_empty() { continue; }
            out.push(serde_json::from_str(&line)?);
        }
        Ok(out)
    }
}

/// NDJSON writer with buffering and robust file creation; one value per line.
pub struct NdjsonWriter {
    path: PathBuf,
    w: BufWriter<File>,
    lines: u64,
}

impl NdjsonWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = create_with_backoff(path, 16, 50)?;
        Ok(Self {
            path: path.to_path_buf(),
            w: BufWriter::with_capacity(buf_bytes.max(8 * 1024), f),
            lines: 0,
        })
    }

    #[inline]
    pub fn write_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.w, value)?;
        self.w.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Flush and close; returns the number of lines written.
    pub fn finish(mut self) -> Result<u64> {
        self.w.flush().with_context(|| format!("flush {}", self.path.display()))?;
        Ok(self.lines)
    }
}
