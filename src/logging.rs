//! Subscriber setup for the CLI.
//!
//! One registry carries every layer: a stderr layer always, plus a file layer
//! behind a non-blocking appender when a log file is configured and can be
//! opened. A single `EnvFilter` derived from [`LogLevel::level_filter`] sits
//! on top. Tree operations run inside an `op` span, so events logged from
//! provider code carry the operation name in both formats.

use anyhow::Result;
use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt as tsfmt, Layer, Registry};

use scoped_tree::output as out;
use scoped_tree::LogLevel;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Local wall-clock time with milliseconds.
struct LocalMillis;

impl FormatTime for LocalMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Where a layer sends its events.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Sink {
    Stderr,
    File,
}

fn fmt_layer<W>(writer: W, sink: Sink, json: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let colour = sink == Sink::Stderr && atty::is(atty::Stream::Stderr);
    let base = tsfmt::layer()
        .with_timer(LocalMillis)
        .with_target(false)
        .with_thread_ids(sink == Sink::File)
        .with_ansi(colour)
        .with_writer(writer);
    if json {
        base.json().with_current_span(true).with_span_list(false).boxed()
    } else {
        base.compact().boxed()
    }
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}

/// Install the global subscriber.
///
/// The returned guard flushes the file appender when dropped; it is `None`
/// when only stderr is logged to. A log file that cannot be opened is
/// reported and skipped rather than failing the command.
pub fn init_tracing(level: &LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let mut layers = vec![fmt_layer(io::stderr, Sink::Stderr, json)];
    let mut guard = None;

    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                let (writer, g) = tracing_appender::non_blocking(file);
                layers.push(fmt_layer(writer, Sink::File, json));
                guard = Some(g);
            }
            Err(e) => out::print_warn(&format!(
                "not logging to '{}': {e}; stderr only",
                path.display()
            )),
        }
    }

    let filter = EnvFilter::builder()
        .with_default_directive(level.level_filter().into())
        .parse_lossy("");
    tracing_subscriber::registry().with(layers).with(filter).try_init()?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_file_parents_are_created() {
        let td = tempdir().unwrap();
        let path = td.path().join("nested/dir/scoped_tree.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn log_file_is_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempdir().unwrap();
        let path = td.path().join("private.log");
        open_log_file(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn log_file_under_a_file_cannot_be_opened() {
        let td = tempdir().unwrap();
        let blocker = td.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        assert!(open_log_file(&blocker.join("x.log")).is_err());
    }
}
