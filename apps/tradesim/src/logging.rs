use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILTER_ENV: &str = "TRADESIM_LOG";

/// Console plus append-only log file, filtered by `TRADESIM_LOG`
/// (default `info`). The file's directory is created if missing.
pub fn init_logging(path: &Path) -> Result<(), String> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|err| format!("failed to create log dir {}: {err}", dir.display()))?;
    }
    let file = LogFileMakeWriter::open(path)?;

    let filter = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file),
        )
        .try_init()
        .map_err(|err| format!("failed to install log subscriber: {err}"))
}

/// Hands out per-event writers that append whole lines to a shared file.
#[derive(Clone)]
pub struct LogFileMakeWriter {
    file: Arc<Mutex<File>>,
}

impl LogFileMakeWriter {
    pub fn open(path: &Path) -> Result<Self, String> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| format!("failed to open log file {}: {err}", path.display()))?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl<'a> MakeWriter<'a> for LogFileMakeWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter {
            file: self.file.clone(),
            pending: Vec::new(),
        }
    }
}

/// Buffers one formatted event and writes it under the file lock so lines
/// from different threads never interleave.
pub struct LogFileWriter {
    file: Arc<Mutex<File>>,
    pending: Vec<u8>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut file = self.file.lock();
        file.write_all(&self.pending)?;
        self.pending.clear();
        file.flush()
    }
}

impl Drop for LogFileWriter {
    fn drop(&mut self) {
        // Nowhere left to report a failed log write.
        let _ = self.flush();
    }
}
