//! JSON-lines file adapter for the survey log.
//!
//! The file is opened once in create+append mode and shared behind a mutex.
//! Each append performs one `write_all` of the record plus its newline while
//! holding the lock, so concurrent requests never interleave partial lines.
//! A failed write truncates the file back to its length before the append.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, File, OpenOptions};
use tracing::{debug, error};

use crate::domain::ports::{SurveyLog, SurveyLogError, ensure_single_line};

/// Append-only survey log stored as newline-delimited JSON.
#[derive(Clone)]
pub struct JsonLinesSurveyLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl std::fmt::Debug for JsonLinesSurveyLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSurveyLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn split_path(path: &Path) -> Result<(PathBuf, PathBuf), SurveyLogError> {
    let file_name = path.file_name().ok_or_else(|| {
        SurveyLogError::unavailable(format!("{} does not name a file", path.display()))
    })?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}

impl JsonLinesSurveyLog {
    /// Open (creating if needed) the log at `path`, including parent
    /// directories.
    ///
    /// # Errors
    /// Returns [`SurveyLogError::Unavailable`] when the directory or file
    /// cannot be opened for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SurveyLogError> {
        let path = path.into();
        let (directory, file_name) = split_path(&path)?;
        let unavailable = |error: std::io::Error| {
            SurveyLogError::unavailable(format!("{}: {error}", path.display()))
        };

        Dir::create_ambient_dir_all(&directory, ambient_authority()).map_err(unavailable)?;
        let dir = Dir::open_ambient_dir(&directory, ambient_authority()).map_err(unavailable)?;
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        let file = dir.open_with(&file_name, &options).map_err(unavailable)?;

        debug!(path = %path.display(), "survey log opened");
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Append target that can undo a torn write.
trait RecordFile: Write {
    /// Current length in bytes.
    fn end_offset(&self) -> io::Result<u64>;
    /// Discard everything past `len`.
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl RecordFile for File {
    fn end_offset(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

fn write_record<F: RecordFile>(file: &Mutex<F>, record: &[u8]) -> Result<(), SurveyLogError> {
    let mut guard = file
        .lock()
        .map_err(|_| SurveyLogError::unavailable("survey log mutex poisoned"))?;
    let start = guard
        .end_offset()
        .map_err(|error| SurveyLogError::unavailable(error.to_string()))?;

    let Err(write_error) = guard.write_all(record).and_then(|()| guard.flush()) else {
        return Ok(());
    };
    if let Err(truncate_error) = guard.truncate_to(start) {
        error!(error = %truncate_error, offset = start, "survey log rollback failed");
        return Err(SurveyLogError::unavailable(format!(
            "{write_error}; rollback to {start} bytes failed: {truncate_error}"
        )));
    }
    Err(SurveyLogError::write(write_error.to_string()))
}

#[async_trait]
impl SurveyLog for JsonLinesSurveyLog {
    async fn append(&self, line: &str) -> Result<(), SurveyLogError> {
        ensure_single_line(line)?;
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || write_record(&*file, &record))
            .await
            .map_err(|error| SurveyLogError::unavailable(format!("writer task failed: {error}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    /// In-memory file that accepts `budget` bytes before failing.
    struct TornFile {
        bytes: Vec<u8>,
        budget: usize,
        truncate_fails: bool,
    }

    impl TornFile {
        fn holding(existing: &[u8], budget: usize) -> Self {
            Self {
                bytes: existing.to_vec(),
                budget,
                truncate_fails: false,
            }
        }
    }

    impl Write for TornFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let accepted = buf.len().min(self.budget);
            self.bytes.extend_from_slice(&buf[..accepted]);
            self.budget -= accepted;
            Ok(accepted)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl RecordFile for TornFile {
        fn end_offset(&self) -> io::Result<u64> {
            Ok(self.bytes.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::other("read-only file system"));
            }
            self.bytes.truncate(usize::try_from(len).expect("length fits usize"));
            Ok(())
        }
    }

    const EXISTING: &[u8] = b"{\"n\":1}\n";

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .expect("read survey log")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[rstest]
    #[tokio::test]
    async fn appends_newline_terminated_records(temp_dir: TempDir) {
        let path = temp_dir.path().join("survey.ndjson");
        let log = JsonLinesSurveyLog::open(&path).expect("open log");

        log.append(r#"{"n":1}"#).await.expect("first append");
        log.append(r#"{"n":2}"#).await.expect("second append");

        let contents = std::fs::read_to_string(&path).expect("read survey log");
        assert_eq!(contents, "{\"n\":1}\n{\"n\":2}\n");
    }

    #[rstest]
    #[tokio::test]
    async fn reopening_preserves_existing_records(temp_dir: TempDir) {
        let path = temp_dir.path().join("survey.ndjson");
        JsonLinesSurveyLog::open(&path)
            .expect("open log")
            .append(r#"{"n":1}"#)
            .await
            .expect("append");
        JsonLinesSurveyLog::open(&path)
            .expect("reopen log")
            .append(r#"{"n":2}"#)
            .await
            .expect("append");

        assert_eq!(read_lines(&path), [r#"{"n":1}"#, r#"{"n":2}"#]);
    }

    #[rstest]
    fn creates_missing_parent_directories(temp_dir: TempDir) {
        let path = temp_dir.path().join("nested").join("data").join("survey.ndjson");
        let log = JsonLinesSurveyLog::open(&path).expect("open log");
        assert!(path.exists());
        assert_eq!(log.path(), path.as_path());
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_multi_line_records(temp_dir: TempDir) {
        let path = temp_dir.path().join("survey.ndjson");
        let log = JsonLinesSurveyLog::open(&path).expect("open log");

        let err = log
            .append("{}\n{}")
            .await
            .expect_err("multi-line record");
        assert_eq!(err, SurveyLogError::MalformedLine);
        assert!(read_lines(&path).is_empty());
    }

    #[rstest]
    fn failed_write_leaves_no_partial_record() {
        let file = Mutex::new(TornFile::holding(EXISTING, 3));

        let err = write_record(&file, b"{\"n\":2}\n").expect_err("write fails");
        assert!(matches!(err, SurveyLogError::Write { .. }));
        let torn = file.into_inner().expect("lock not poisoned");
        assert_eq!(torn.bytes, EXISTING);
    }

    #[rstest]
    fn append_after_a_failed_write_starts_a_clean_line() {
        let file = Mutex::new(TornFile::holding(EXISTING, 3));
        write_record(&file, b"{\"n\":2}\n").expect_err("write fails");

        file.lock().expect("lock not poisoned").budget = usize::MAX;
        write_record(&file, b"{\"n\":3}\n").expect("write succeeds");
        let torn = file.into_inner().expect("lock not poisoned");
        assert_eq!(torn.bytes, b"{\"n\":1}\n{\"n\":3}\n");
    }

    #[rstest]
    fn failed_rollback_reports_the_log_unavailable() {
        let mut torn = TornFile::holding(EXISTING, 3);
        torn.truncate_fails = true;
        let file = Mutex::new(torn);

        let err = write_record(&file, b"{\"n\":2}\n").expect_err("write fails");
        assert!(matches!(err, SurveyLogError::Unavailable { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn rollback_truncates_the_real_file(temp_dir: TempDir) {
        let path = temp_dir.path().join("survey.ndjson");
        let log = JsonLinesSurveyLog::open(&path).expect("open log");
        log.append(r#"{"n":1}"#).await.expect("first append");

        {
            let mut file = log.file.lock().expect("lock not poisoned");
            let start = file.end_offset().expect("file length");
            file.write_all(br#"{"n":"#).expect("write torn prefix");
            file.truncate_to(start).expect("truncate");
        }
        log.append(r#"{"n":2}"#).await.expect("second append");

        assert_eq!(read_lines(&path), [r#"{"n":1}"#, r#"{"n":2}"#]);
    }

    #[rstest]
    fn rejects_paths_without_a_file_name() {
        let err = JsonLinesSurveyLog::open("/").expect_err("no file name");
        assert!(matches!(err, SurveyLogError::Unavailable { .. }));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_interleave(temp_dir: TempDir) {
        let path = temp_dir.path().join("survey.ndjson");
        let log = JsonLinesSurveyLog::open(&path).expect("open log");
        let payload = "x".repeat(4096);

        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let log = log.clone();
                let line = format!(r#"{{"n":{n},"pad":"{payload}"}}"#);
                tokio::spawn(async move { log.append(&line).await })
            })
            .collect();
        for task in tasks {
            task.await.expect("task joins").expect("append succeeds");
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 32);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(&line).expect("intact record");
            assert!(value.get("n").is_some());
        }
    }
}
