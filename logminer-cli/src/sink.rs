//! JSONL storage sink.
//!
//! Implements the core `StorageSink` contract by appending one JSON
//! object per record to a per-family `.jsonl` file. This is the CLI's
//! stand-in for a real database backend; anything implementing the
//! contract can replace it.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use logminer_core::error::StorageError;
use logminer_core::pipeline::StorageSink;
use logminer_core::types::{LogFamily, LogRecord};

/// Append-only JSONL writer, one file per log family.
pub struct JsonlSink {
    dir: PathBuf,
    writers: Mutex<HashMap<LogFamily, BufWriter<File>>>,
}

impl JsonlSink {
    /// Create a sink writing into `dir` (created if missing).
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", dir.display())))?;
        Ok(Self {
            dir,
            writers: Mutex::new(HashMap::new()),
        })
    }

    /// Path of the output file for one family.
    pub fn file_path(&self, family: LogFamily) -> PathBuf {
        self.dir.join(format!("{family}.jsonl"))
    }

    fn open_writer(path: &Path) -> Result<BufWriter<File>, StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        Ok(BufWriter::new(file))
    }

    /// Flush all buffered output. Called once at the end of a run.
    pub fn flush(&self) -> Result<(), StorageError> {
        let mut writers = self
            .writers
            .lock()
            .map_err(|_| StorageError::Connection("writer lock poisoned".to_owned()))?;
        for writer in writers.values_mut() {
            writer
                .flush()
                .map_err(|e| StorageError::BatchInsert(e.to_string()))?;
        }
        Ok(())
    }
}

impl StorageSink for JsonlSink {
    fn batch_insert(
        &self,
        family: LogFamily,
        records: &[LogRecord],
    ) -> impl Future<Output = Result<usize, StorageError>> + Send {
        async move {
            let mut writers = self
                .writers
                .lock()
                .map_err(|_| StorageError::Connection("writer lock poisoned".to_owned()))?;
            let writer = match writers.entry(family) {
                std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(Self::open_writer(&self.file_path(family))?)
                }
            };

            for record in records {
                let json = serde_json::to_string(record)
                    .map_err(|e| StorageError::InvalidRecord(e.to_string()))?;
                writeln!(writer, "{json}")
                    .map_err(|e| StorageError::BatchInsert(e.to_string()))?;
            }
            Ok(records.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(n: u32) -> LogRecord {
        LogRecord {
            family: LogFamily::Nginx,
            ip_address: format!("10.0.0.{n}"),
            remote_user: None,
            timestamp: NaiveDate::from_ymd_opt(2025, 5, 29)
                .unwrap()
                .and_hms_opt(0, 0, 9)
                .unwrap(),
            method: "GET".to_owned(),
            path: format!("/item/{n}"),
            http_version: "HTTP/1.1".to_owned(),
            status_code: 200,
            response_size: Some(12),
            request_size: None,
            processing_time_ms: None,
            referer: None,
            user_agent: Some("test".to_owned()),
            thread_info: None,
            raw_log: "raw".to_owned(),
            source: "nginx:access.log".to_owned(),
        }
    }

    #[tokio::test]
    async fn writes_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path()).unwrap();
        let records: Vec<_> = (0..3).map(record).collect();

        let inserted = sink.batch_insert(LogFamily::Nginx, &records).await.unwrap();
        assert_eq!(inserted, 3);
        sink.flush().unwrap();

        let content = std::fs::read_to_string(sink.file_path(LogFamily::Nginx)).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["ip_address"], "10.0.0.0");
        assert_eq!(parsed["status_code"], 200);
    }

    #[tokio::test]
    async fn families_go_to_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path()).unwrap();
        let mut nexus_record = record(1);
        nexus_record.family = LogFamily::Nexus;

        sink.batch_insert(LogFamily::Nginx, &[record(0)]).await.unwrap();
        sink.batch_insert(LogFamily::Nexus, &[nexus_record]).await.unwrap();
        sink.flush().unwrap();

        assert!(sink.file_path(LogFamily::Nginx).exists());
        assert!(sink.file_path(LogFamily::Nexus).exists());
    }

    #[tokio::test]
    async fn empty_batch_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path()).unwrap();
        let inserted = sink.batch_insert(LogFamily::Nginx, &[]).await.unwrap();
        assert_eq!(inserted, 0);
    }
}
