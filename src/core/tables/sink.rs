//! Append-only table sinks
//!
//! One sink per table, each behind its own mutex so concurrent exports never
//! interleave within a line while writes to different tables proceed in
//! parallel.

use super::schema::{Schema, TableKind, TableSpec};
use crate::core::transform::fields::{DELIMITER, LINE_ENDING};
use crate::core::transform::Row;
use crate::domain::{Result, TabulaError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type SinkWriter = Box<dyn Write + Send>;

/// A single table's output stream
pub struct TableSink {
    spec: TableSpec,
    columns: usize,
    writer: Mutex<SinkWriter>,
    rows: AtomicUsize,
}

impl TableSink {
    /// Wraps a writer and emits the header line
    pub fn new(spec: TableSpec, mut writer: SinkWriter) -> Result<Self> {
        writer.write_all(spec.header.as_bytes())?;
        writer.write_all(LINE_ENDING.as_bytes())?;

        Ok(Self {
            spec,
            columns: spec.column_count(),
            writer: Mutex::new(writer),
            rows: AtomicUsize::new(0),
        })
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// Appends one row as a single indivisible write
    ///
    /// The row is rejected unless the line it renders to splits back into
    /// exactly as many fields as the header, so a raw field carrying the
    /// delimiter or a line break cannot shift the columns.
    pub fn write_row(&self, row: &Row) -> Result<()> {
        let line = row.to_line();
        let actual = if row.is_empty() {
            0
        } else {
            line[..line.len() - LINE_ENDING.len()]
                .split([DELIMITER, '\r', '\n'])
                .count()
        };
        if row.len() != self.columns || actual != self.columns {
            return Err(TabulaError::SchemaMismatch {
                table: self.spec.file_name.to_string(),
                expected: self.columns,
                actual,
            });
        }

        self.lock()?.write_all(line.as_bytes())?;
        self.rows.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.lock()?.flush()?;
        Ok(())
    }

    /// Data rows written so far, excluding the header
    pub fn rows_written(&self) -> usize {
        self.rows.load(Ordering::Relaxed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SinkWriter>> {
        self.writer.lock().map_err(|_| {
            TabulaError::Export(format!("{} writer lock poisoned", self.spec.file_name))
        })
    }
}

impl std::fmt::Debug for TableSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSink")
            .field("file_name", &self.spec.file_name)
            .field("columns", &self.columns)
            .field("rows", &self.rows_written())
            .finish()
    }
}

/// Shared in-memory destination standing in for a table file
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryBuffer {
    /// Everything written so far, decoded as UTF-8
    pub fn contents(&self) -> String {
        match self.bytes.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Lines written so far, header included, without separators
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .split(LINE_ENDING)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes
            .lock()
            .map_err(|_| std::io::Error::other("memory buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Every table of one schema, opened once for the life of the run
///
/// Shared by reference (usually `Arc<TableWriterSet>`) between concurrent
/// patient exports; rows from all patients append to the same streams.
#[derive(Debug)]
pub struct TableWriterSet {
    schema: Schema,
    directory: Option<PathBuf>,
    sinks: BTreeMap<TableKind, TableSink>,
}

impl TableWriterSet {
    /// Creates `directory` if needed, then truncates and opens every table file
    ///
    /// Any failure here is an [`TabulaError::Initialization`] error: the run
    /// cannot proceed with a partial table set.
    pub fn create(directory: impl AsRef<Path>, schema: Schema) -> Result<Self> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory).map_err(|e| {
            TabulaError::Initialization(format!(
                "Failed to create output directory {}: {e}",
                directory.display()
            ))
        })?;

        let mut sinks = BTreeMap::new();
        for spec in schema.tables() {
            let path = directory.join(spec.file_name);
            let file = File::create(&path).map_err(|e| {
                TabulaError::Initialization(format!("Failed to open {}: {e}", path.display()))
            })?;
            let sink = TableSink::new(spec, Box::new(BufWriter::new(file))).map_err(|e| {
                TabulaError::Initialization(format!(
                    "Failed to write header to {}: {e}",
                    path.display()
                ))
            })?;
            tracing::debug!(table = %spec.kind, path = %path.display(), "Opened table");
            sinks.insert(spec.kind, sink);
        }

        Ok(Self {
            schema,
            directory: Some(directory.to_path_buf()),
            sinks,
        })
    }

    /// Writer set backed by in-memory buffers, one per table
    pub fn in_memory(schema: Schema) -> Result<(Self, BTreeMap<TableKind, MemoryBuffer>)> {
        let mut sinks = BTreeMap::new();
        let mut buffers = BTreeMap::new();
        for spec in schema.tables() {
            let buffer = MemoryBuffer::default();
            sinks.insert(spec.kind, TableSink::new(spec, Box::new(buffer.clone()))?);
            buffers.insert(spec.kind, buffer);
        }

        Ok((
            Self {
                schema,
                directory: None,
                sinks,
            },
            buffers,
        ))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Output directory, or `None` for in-memory sets
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn sink(&self, kind: TableKind) -> Option<&TableSink> {
        self.sinks.get(&kind)
    }

    /// Appends a row to the table of `kind`
    pub fn write_row(&self, kind: TableKind, row: &Row) -> Result<()> {
        self.sinks
            .get(&kind)
            .ok_or_else(|| {
                TabulaError::Export(format!(
                    "{} layout has no {kind} table",
                    self.schema.variant()
                ))
            })?
            .write_row(row)
    }

    /// Flushes every sink; called once per patient
    pub fn flush_all(&self) -> Result<()> {
        for sink in self.sinks.values() {
            sink.flush()?;
        }
        Ok(())
    }

    /// Data rows written per table
    pub fn row_counts(&self) -> BTreeMap<TableKind, usize> {
        self.sinks
            .iter()
            .map(|(kind, sink)| (*kind, sink.rows_written()))
            .collect()
    }
}
