//! Serialized multiplexed writer.
//!
//! One mutex guards the rotating file and the optional console mirror, so
//! lines from concurrent emitters never interleave.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::entry::Entry;
use crate::logger::format::format_line;
use crate::rotation::RotatingFile;

/// Console mirror target.
pub type Console = Box<dyn Write + Send>;

struct Outputs {
    file: RotatingFile,
    console: Option<Console>,
}

pub struct LogWriter {
    path: PathBuf,
    outputs: Mutex<Outputs>,
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter").field("path", &self.path).finish()
    }
}

impl LogWriter {
    pub fn new(file: RotatingFile, console: Option<Console>) -> Self {
        Self {
            path: file.path().to_path_buf(),
            outputs: Mutex::new(Outputs { file, console }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_entry(&self, entry: &Entry) -> io::Result<()> {
        self.write_line(&format_line(entry))
    }

    /// Append one line to the file, then mirror it to the console.
    /// Console failures are ignored; file failures are returned.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut outputs = self.outputs.lock().unwrap_or_else(PoisonError::into_inner);
        outputs.file.write_all(line.as_bytes())?;
        outputs.file.flush()?;
        if let Some(console) = outputs.console.as_mut() {
            let _ = console.write_all(line.as_bytes()).and_then(|_| console.flush());
        }
        Ok(())
    }

    /// Wait for background retention of retired segments, without holding
    /// the write lock while waiting.
    pub fn settle(&self) {
        let maintenance = self
            .outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .file
            .maintenance_handle();
        if let Some(maintenance) = maintenance {
            maintenance.settle();
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        let mut outputs = self.outputs.lock().unwrap_or_else(PoisonError::into_inner);
        outputs.file.flush()?;
        if let Some(console) = outputs.console.as_mut() {
            let _ = console.flush();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Level;
    use crate::rotation::RotationPolicy;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer(dir: &Path, console: Option<Console>) -> LogWriter {
        let policy = RotationPolicy {
            path: dir.join("app.log"),
            max_bytes: 1024 * 1024,
            max_age_days: 0,
            max_backups: 0,
            compress: false,
        };
        LogWriter::new(RotatingFile::open(policy).unwrap(), console)
    }

    #[test]
    fn test_mirrors_to_console() {
        let dir = tempfile::tempdir().unwrap();
        let capture = Capture::default();
        let writer = writer(dir.path(), Some(Box::new(capture.clone())));

        writer.write_entry(&Entry::new(Level::Info, "mirrored")).unwrap();

        let file = std::fs::read_to_string(writer.path()).unwrap();
        let console = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(file, console);
        assert!(file.ends_with("[INFO] mirrored\n"));
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Arc::new(writer(dir.path(), None));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let writer = writer.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let msg = format!("thread-{t}-line-{i}-{}", "x".repeat(200));
                        writer.write_entry(&Entry::new(Level::Info, msg)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.contains("[INFO] thread-") && l.ends_with(&"x".repeat(200))));
    }

    #[test]
    fn test_rotating_writes_with_background_compression() {
        let dir = tempfile::tempdir().unwrap();
        let policy = RotationPolicy {
            path: dir.path().join("app.log"),
            max_bytes: 512,
            max_age_days: 0,
            max_backups: 3,
            compress: true,
        };
        let writer = LogWriter::new(RotatingFile::open(policy).unwrap(), None);

        for i in 0..40 {
            let msg = format!("line-{i}-{}", "y".repeat(100));
            writer.write_entry(&Entry::new(Level::Info, msg)).unwrap();
        }
        writer.settle();

        let retired = crate::rotation::backups::list_backups(writer.path()).unwrap();
        assert_eq!(retired.len(), 3);
        assert!(retired.iter().all(|b| b.compressed));
        let active = std::fs::read_to_string(writer.path()).unwrap();
        assert!(active.lines().last().unwrap().contains("line-39-"));
    }
}
