// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::logger::{FileConfig, StdTarget};
use chrono::NaiveDateTime;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;

const ROTATED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.3f";

/// Append-only log file, optionally rotated once it grows past a size limit.
///
/// A rotated file keeps the stem and extension of the active file with the
/// rotation time inserted in between: `measure.log` becomes
/// `measure_2025-01-31_10-00-00.000.log`.
struct RotatingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_size_bytes: u64,
    max_files: u64,
}

impl RotatingFile {
    fn open(config: &FileConfig) -> io::Result<Self> {
        let file = open_append(&config.path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path: config.path.clone(),
            file,
            size,
            max_size_bytes: config.max_size_bytes,
            max_files: config.max_files,
        })
    }

    fn needs_rotation(&self) -> bool {
        self.max_size_bytes > 0 && self.size >= self.max_size_bytes
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let timestamp = chrono::Local::now()
            .format(ROTATED_TIMESTAMP_FORMAT)
            .to_string();
        fs::rename(&self.path, rotated_path(&self.path, &timestamp))?;
        self.file = open_append(&self.path)?;
        self.size = 0;
        if self.max_files > 0 {
            // The active file counts towards the limit.
            prune(&self.path, self.max_files.saturating_sub(1))?;
        }
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.needs_rotation() {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.needs_rotation() {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.size += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn split_name(path: &Path) -> Option<(&OsStr, Option<&OsStr>)> {
    Some((path.file_stem()?, path.extension()))
}

fn rotated_path(path: &Path, timestamp: &str) -> PathBuf {
    let Some((stem, extension)) = split_name(path) else {
        return PathBuf::from(format!("{}_{timestamp}", path.display()));
    };
    let name = match extension {
        Some(ext) => format!(
            "{}_{timestamp}.{}",
            stem.to_string_lossy(),
            ext.to_string_lossy()
        ),
        None => format!("{}_{timestamp}", stem.to_string_lossy()),
    };
    path.with_file_name(name)
}

/// Rotated siblings of `path`, paired with their timestamp, oldest first.
/// Siblings whose middle part is not a rotation timestamp are left alone.
fn rotated_siblings(path: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let Some((stem, extension)) = split_name(path) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}_", stem.to_string_lossy());
    let suffix = extension
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut rotated: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let timestamp = name.strip_prefix(&prefix)?.strip_suffix(suffix.as_str())?;
            NaiveDateTime::parse_from_str(timestamp, ROTATED_TIMESTAMP_FORMAT).ok()?;
            Some((timestamp.to_owned(), entry.path()))
        })
        .collect();
    rotated.sort();
    Ok(rotated)
}

/// Deletes the oldest rotated files until at most `keep` remain.
fn prune(path: &Path, keep: u64) -> io::Result<()> {
    let rotated = rotated_siblings(path)?;
    let excess = rotated.len().saturating_sub(keep as usize);
    let failures: Vec<String> = rotated
        .iter()
        .take(excess)
        .filter_map(|(_, old)| {
            fs::remove_file(old)
                .err()
                .map(|e| format!("{}: {e}", old.display()))
        })
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "failed to remove rotated log files: {}",
            failures.join(", ")
        )))
    }
}

/// Hands log lines to a background thread that owns the file.
pub struct FileWriter {
    non_blocking: NonBlocking,
    /// Dropping the guard flushes pending lines and stops the worker thread,
    /// so it lives exactly as long as the writer.
    _guard: WorkerGuard,
}

impl FileWriter {
    /// Creates missing parent directories and opens the file for appending.
    pub fn new(config: &FileConfig) -> io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let (non_blocking, guard) = tracing_appender::non_blocking(RotatingFile::open(config)?);
        Ok(Self {
            non_blocking,
            _guard: guard,
        })
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = NonBlocking;

    fn make_writer(&'a self) -> Self::Writer {
        self.non_blocking.clone()
    }
}

#[derive(Clone, Copy)]
pub struct StdWriter {
    target: StdTarget,
}

impl StdWriter {
    pub fn new(target: StdTarget) -> Self {
        Self { target }
    }
}

impl Write for StdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.target {
            StdTarget::Out => io::stdout().write(buf),
            StdTarget::Err => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.target {
            StdTarget::Out => io::stdout().flush(),
            StdTarget::Err => io::stderr().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for StdWriter {
    type Writer = StdWriter;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}
