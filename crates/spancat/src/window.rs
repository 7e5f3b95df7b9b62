use std::io::Read;

use crate::cancel::{CancelReader, CancelToken};
use crate::concat::ConcatReader;
use crate::source::{ResolveError, SourceResolver};

/// Length argument meaning "read to the end of the last source".
pub const UNBOUNDED: i64 = -1;

/// The ordered per-source readers covering a requested byte window, plus
/// the exact number of bytes obtainable from them.
///
/// Computed once, before any streaming begins. `readers` is empty exactly
/// when `total_length` is zero.
pub struct WindowResult {
    readers: Vec<Box<dyn Read + Send>>,
    total_length: u64,
}

impl std::fmt::Debug for WindowResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowResult")
            .field("reader_count", &self.readers.len())
            .field("total_length", &self.total_length)
            .finish()
    }
}

impl WindowResult {
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Consumes the result, yielding the concatenated stream.
    pub fn into_reader(self) -> ConcatReader {
        ConcatReader::new(self.readers)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("cannot specify negative offset")]
    NegativeOffset,

    #[error("cannot specify negative length")]
    NegativeLength,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,
}

/// Computes the per-source readers for the byte window starting at `offset`
/// over the logical concatenation of `specs`, in list order.
///
/// `max_len` bounds the window; [`UNBOUNDED`] reads to the end of the last
/// source and `0` reads nothing without resolving any source. Sources past
/// the one satisfying the bound are never resolved. A resolution or seek
/// failure fails the whole call; no partial result is returned.
///
/// An offset at or past the total size of all sources yields an empty
/// result, not an error.
pub fn window(
    resolver: &impl SourceResolver,
    specs: &[impl AsRef<str>],
    offset: i64,
    max_len: i64,
    cancel: &CancelToken,
) -> Result<WindowResult, WindowError> {
    if offset < 0 {
        return Err(WindowError::NegativeOffset);
    }
    if max_len < UNBOUNDED {
        return Err(WindowError::NegativeLength);
    }
    if max_len == 0 {
        return Ok(WindowResult {
            readers: Vec::new(),
            total_length: 0,
        });
    }

    let bound = u64::try_from(max_len).ok();

    let mut readers: Vec<Box<dyn Read + Send>> = Vec::with_capacity(specs.len());
    let mut remaining_offset = offset as u64;
    let mut accumulated = 0_u64;

    for spec in specs {
        if cancel.is_cancelled() {
            return Err(WindowError::Cancelled);
        }

        let mut handle = resolver.resolve(spec.as_ref())?;
        let size = handle.size();

        // The leading offset swallows whole sources until it lands inside one.
        if remaining_offset >= size {
            remaining_offset -= size;
            continue;
        }

        let pos = handle.seek_to(remaining_offset)?;
        remaining_offset = 0;

        let contribution = size.saturating_sub(pos);
        accumulated += contribution;

        let guarded = CancelReader::new(handle, cancel.clone());

        if let Some(max) = bound {
            if accumulated >= max {
                let overshoot = accumulated - max;
                if overshoot > 0 {
                    readers.push(Box::new(guarded.take(contribution - overshoot)));
                    accumulated = max;
                } else {
                    readers.push(Box::new(guarded));
                }
                break;
            }
        }
        readers.push(Box::new(guarded));
    }

    Ok(WindowResult {
        readers,
        total_length: accumulated,
    })
}
