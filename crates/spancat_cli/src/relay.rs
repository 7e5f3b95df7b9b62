//! Progress relay between the composed stream and the output sink.
//!
//! Small transfers are copied straight through with no decorator overhead.
//! At or above [`PROGRESS_BAR_MIN_SIZE`] the stream is routed through a
//! byte-counting decorator while a separate thread redraws a progress line
//! on stderr until the copy finishes or errors.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{tick, Receiver};

/// Show a progress bar only for outputs of at least this many bytes.
pub const PROGRESS_BAR_MIN_SIZE: u64 = 8 * 1024 * 1024;

const REDRAW_INTERVAL: Duration = Duration::from_millis(200);
const BAR_WIDTH: usize = 30;

/// Events surfaced by the emit stage.
pub enum RelayEvent {
    /// A composed byte stream to drain into the sink.
    Stream(Box<dyn Read + Send>),
    /// Free-form text forwarded from the emit stage.
    Note(String),
}

impl RelayEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Stream(_) => "stream",
            Self::Note(_) => "note",
        }
    }
}

/// Drains every stream event into `out`, against `total` declared bytes.
///
/// `total` is announced by the caller once, before any bytes flow. Events
/// the relay does not handle are logged and skipped; they never abort the
/// remaining events. Returns the number of bytes copied.
pub fn run(total: u64, events: &Receiver<RelayEvent>, out: &mut impl Write) -> io::Result<u64> {
    let mut copied = 0_u64;
    for event in events {
        match event {
            RelayEvent::Stream(mut body) => {
                copied += if wants_progress(total) {
                    copy_with_progress(&mut body, total, out)?
                } else {
                    io::copy(&mut body, out)?
                };
            }
            other => tracing::warn!("relay: skipping unexpected {} event", other.kind()),
        }
    }
    Ok(copied)
}

fn wants_progress(total: u64) -> bool {
    total >= PROGRESS_BAR_MIN_SIZE
}

/// Counts bytes pulled through it into a shared counter.
///
/// The render loop only ever reads the counter, so relaxed ordering is
/// sufficient.
struct CountingReader<R> {
    inner: R,
    transferred: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.transferred.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

fn copy_with_progress(body: &mut impl Read, total: u64, out: &mut impl Write) -> io::Result<u64> {
    let transferred = Arc::new(AtomicU64::new(0));
    let done = Arc::new(AtomicBool::new(false));

    let render = {
        let transferred = Arc::clone(&transferred);
        let done = Arc::clone(&done);
        thread::Builder::new()
            .name("spancat-progress".to_string())
            .spawn(move || render_loop(&transferred, &done, total))?
    };

    let mut counting = CountingReader {
        inner: body,
        transferred,
    };
    let result = io::copy(&mut counting, out);

    done.store(true, Ordering::Relaxed);
    let _ = render.join();

    result
}

fn render_loop(transferred: &AtomicU64, done: &AtomicBool, total: u64) {
    let ticker = tick(REDRAW_INTERVAL);
    let mut stderr = io::stderr();

    while !done.load(Ordering::Relaxed) {
        let _ = ticker.recv();
        let line = render_line(transferred.load(Ordering::Relaxed), total);
        let _ = write!(stderr, "\r{line}");
        let _ = stderr.flush();
    }
    let line = render_line(transferred.load(Ordering::Relaxed), total);
    let _ = writeln!(stderr, "\r{line}");
}

/// Formats one progress line, e.g. `[=========>           ]  52%  4.2 MiB / 8.0 MiB`.
fn render_line(transferred: u64, total: u64) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        (transferred as f64 / total as f64).min(1.0)
    };
    let filled = (ratio * BAR_WIDTH as f64) as usize;

    let mut bar = String::with_capacity(BAR_WIDTH + 2);
    bar.push('[');
    for i in 0..BAR_WIDTH {
        bar.push(match i.cmp(&filled) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '>',
            std::cmp::Ordering::Greater => ' ',
        });
    }
    bar.push(']');

    format!(
        "{bar} {:>3}%  {} / {}",
        (ratio * 100.0) as u64,
        format_bytes(transferred),
        format_bytes(total)
    )
}

fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crossbeam_channel::unbounded;

    use super::*;

    fn stream(bytes: &[u8]) -> RelayEvent {
        RelayEvent::Stream(Box::new(Cursor::new(bytes.to_vec())))
    }

    #[test]
    fn small_transfer_copies_directly() {
        let (tx, rx) = unbounded();
        tx.send(stream(b"hello")).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let copied = run(5, &rx, &mut out).unwrap();
        assert_eq!(copied, 5);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn unexpected_event_is_skipped_not_fatal() {
        let (tx, rx) = unbounded();
        tx.send(RelayEvent::Note("warmup".to_string())).unwrap();
        tx.send(stream(b"payload")).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let copied = run(7, &rx, &mut out).unwrap();
        assert_eq!(copied, 7);
        assert_eq!(out, b"payload");
    }

    #[test]
    fn progress_decision_depends_on_total() {
        assert!(!wants_progress(0));
        assert!(!wants_progress(1024));
        assert!(!wants_progress(PROGRESS_BAR_MIN_SIZE - 1));
        assert!(wants_progress(PROGRESS_BAR_MIN_SIZE));
        assert!(wants_progress(10 * 1024 * 1024));
    }

    #[test]
    fn counting_reader_tracks_cumulative_bytes() {
        let transferred = Arc::new(AtomicU64::new(0));
        let mut reader = CountingReader {
            inner: Cursor::new(vec![0_u8; 100]),
            transferred: Arc::clone(&transferred),
        };

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(transferred.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn progress_copy_preserves_bytes() {
        let data: Vec<u8> = (0..200_u64).map(|i| (i % 251) as u8).collect();
        let mut body = Cursor::new(data.clone());

        let mut out = Vec::new();
        let copied = copy_with_progress(&mut body, data.len() as u64, &mut out).unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn render_line_reflects_ratio() {
        let start = render_line(0, 100);
        assert!(start.contains("  0%"));
        assert!(start.starts_with("[>"));

        let half = render_line(50, 100);
        assert!(half.contains(" 50%"));

        let full = render_line(100, 100);
        assert!(full.contains("100%"));
        // Counter past the declared total stays pinned at 100%.
        assert_eq!(render_line(150, 100), full.replace("100 B /", "150 B /"));
    }

    #[test]
    fn format_bytes_uses_binary_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(8 * 1024 * 1024), "8.0 MiB");
    }
}
