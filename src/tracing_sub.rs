use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::Level;

/// Writer that targets a log file when one was configured and falls back to
/// stderr otherwise. Logging to stderr under the alternate screen would
/// scribble over the UI, so the file is strongly preferred; the fallback
/// exists for headless runs and tests.
pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(File),
    Stderr(io::Stderr),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Debug)]
pub struct SubscriberMakeWriter {
    file: Option<File>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let inner = match &self.file {
            Some(file) => match file.try_clone() {
                Ok(clone) => DelegatingInner::File(clone),
                Err(_) => DelegatingInner::Stderr(io::stderr()),
            },
            None => DelegatingInner::Stderr(io::stderr()),
        };
        DelegatingWriter { inner }
    }
}

/// Initialize the global tracing subscriber, appending to `log_file` when
/// provided. Safe to call multiple times; subsequent calls are no-ops.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(SubscriberMakeWriter { file })
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
    Ok(())
}
