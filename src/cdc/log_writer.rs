//! CDC log writer - appends statements to a checksummed log file.
//!
//! # Record Format
//! One record per line:
//! ```text
//! ┌──────────────┬─────┬──────────────────────────────┬────┐
//! │ CRC32 (hex8) │ TAB │ statement (escaped)          │ LF │
//! └──────────────┴─────┴──────────────────────────────┴────┘
//! ```
//! The checksum covers the escaped statement bytes. Backslashes and line
//! breaks inside a statement are escaped (`\\`, `\n`, `\r`) so one record is
//! always exactly one line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::cdc::event::TableEventListener;
use crate::common::{CdcConfig, Error, Result};

/// Listener that writes every table event's statement to the CDC log.
///
/// With [`crate::common::CdcAdapter::Disabled`] the writer accepts events and
/// drops them, so the storage engine can always install one.
///
/// # Durability
/// Each record is followed by `sync_data()`. A failed append truncates the
/// file back to where the record started, and `open` drops an unterminated
/// last line left by a crash. Either way at most the record being written is
/// lost; the records around it stay readable.
///
/// # Example
/// ```no_run
/// use sawitdb::cdc::{CdcLogWriter, TableEventListener};
/// use sawitdb::common::CdcConfig;
///
/// let writer = CdcLogWriter::open(CdcConfig::cpo("data.cdc")).unwrap();
/// writer.on_table_inserted("users", "TANAM KE users (1, 'Ayu', 17)");
/// ```
pub struct CdcLogWriter {
    /// Open log file, `None` when CDC is disabled.
    file: Option<Mutex<File>>,

    /// Path of the log, kept for diagnostics.
    path: Option<PathBuf>,

    /// Records successfully appended since open.
    records_written: AtomicU64,
}

impl CdcLogWriter {
    /// Open (or create) the log described by `config`.
    ///
    /// # Errors
    /// - `Error::Config` if the adapter is enabled without a log file
    /// - I/O errors from opening the file
    pub fn open(config: CdcConfig) -> Result<Self> {
        config.validate()?;

        let (file, path) = match (config.is_enabled(), config.log_file) {
            (true, Some(path)) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .read(true)
                    .append(true)
                    .open(&path)?;
                let dropped = truncate_torn_tail(&mut file)?;
                if dropped > 0 {
                    warn!(target: "sawitdb::cdc", path = %path.display(), bytes = dropped, "dropped unterminated CDC record");
                }
                debug!(target: "sawitdb::cdc", path = %path.display(), adapter = %config.adapter, "opened CDC log");
                (Some(Mutex::new(file)), Some(path))
            }
            _ => (None, None),
        };

        Ok(Self {
            file,
            path,
            records_written: AtomicU64::new(0),
        })
    }

    /// A writer that discards everything.
    pub fn disabled() -> Self {
        Self {
            file: None,
            path: None,
            records_written: AtomicU64::new(0),
        }
    }

    /// Whether records are actually written.
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the log file, if enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records appended since open.
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    /// Append one statement to the log.
    ///
    /// A no-op when disabled.
    ///
    /// # Errors
    /// I/O errors from writing or syncing the file.
    pub fn append(&self, statement: &str) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };

        let line = encode_record(statement);
        {
            let mut file = file.lock();
            let start = file.metadata()?.len();
            if let Err(err) = file.write_all(line.as_bytes()) {
                file.set_len(start)?;
                return Err(err.into());
            }
            file.sync_data()?;
        }

        self.records_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Append from a listener callback, where errors can only be logged.
    fn record(&self, table: &str, statement: &str) {
        if let Err(err) = self.append(statement) {
            error!(
                target: "sawitdb::cdc",
                table,
                path = ?self.path,
                error = %err,
                "failed to write CDC record"
            );
        }
    }
}

impl TableEventListener for CdcLogWriter {
    fn on_table_selected(&self, table: &str, statement: &str) {
        self.record(table, statement);
    }

    fn on_table_inserted(&self, table: &str, statement: &str) {
        self.record(table, statement);
    }

    fn on_table_updated(&self, table: &str, statement: &str) {
        self.record(table, statement);
    }

    fn on_table_deleted(&self, table: &str, statement: &str) {
        self.record(table, statement);
    }

    fn on_table_created(&self, table: &str, statement: &str) {
        self.record(table, statement);
    }

    fn on_table_dropped(&self, table: &str, statement: &str) {
        self.record(table, statement);
    }
}

/// Cut the file back to just after its last `\n`.
///
/// Returns the number of bytes removed.
fn truncate_torn_tail(file: &mut File) -> Result<u64> {
    let len = file.metadata()?.len();
    let mut buf = [0u8; 4096];
    let mut end = len;

    while end > 0 {
        let start = end.saturating_sub(buf.len() as u64);
        let chunk = &mut buf[..(end - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(chunk)?;

        if let Some(pos) = chunk.iter().rposition(|&b| b == b'\n') {
            let keep = start + pos as u64 + 1;
            if keep < len {
                file.set_len(keep)?;
            }
            return Ok(len - keep);
        }
        end = start;
    }

    if len > 0 {
        file.set_len(0)?;
    }
    Ok(len)
}

/// Read every statement back from a CDC log, verifying checksums.
///
/// # Errors
/// - `Error::ChecksumMismatch` for a malformed or corrupted line (1-based)
/// - I/O errors from reading the file
pub fn read_log<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut statements = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let statement = decode_record(&line).ok_or(Error::ChecksumMismatch { line: i + 1 })?;
        statements.push(statement);
    }

    Ok(statements)
}

fn encode_record(statement: &str) -> String {
    let escaped = escape(statement);
    let checksum = crc32fast::hash(escaped.as_bytes());
    format!("{:08x}\t{}\n", checksum, escaped)
}

fn decode_record(line: &str) -> Option<String> {
    let (checksum, escaped) = line.split_once('\t')?;
    let checksum = u32::from_str_radix(checksum, 16).ok()?;

    if crc32fast::hash(escaped.as_bytes()) != checksum {
        return None;
    }
    unescape(escaped)
}

fn escape(statement: &str) -> String {
    let mut out = String::with_capacity(statement.len());
    for c in statement.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}
