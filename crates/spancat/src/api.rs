use std::io::{self, Write};

pub use crate::cancel::{CancelReader, CancelToken};
pub use crate::concat::ConcatReader;
pub use crate::fs_source::FsResolver;
pub use crate::source::{ResolveError, SourceHandle, SourceResolver};
pub use crate::window::{window, WindowError, WindowResult, UNBOUNDED};

/// Stable, minimal API for composing byte windows across ordered sources.
#[derive(Clone, Debug)]
pub struct Composer<R> {
    resolver: R,
    cancel: CancelToken,
}

impl<R: SourceResolver> Composer<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the default (never-firing) cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn window(
        &self,
        specs: &[impl AsRef<str>],
        offset: i64,
        max_len: i64,
    ) -> Result<WindowResult, WindowError> {
        crate::window::window(&self.resolver, specs, offset, max_len, &self.cancel)
    }

    /// Windows, concatenates, and drains into `out`.
    ///
    /// Returns the number of bytes copied.
    pub fn cat(
        &self,
        specs: &[impl AsRef<str>],
        offset: i64,
        max_len: i64,
        out: &mut impl Write,
    ) -> Result<u64, WindowError> {
        let result = self.window(specs, offset, max_len)?;
        let mut reader = result.into_reader();
        Ok(io::copy(&mut reader, out)?)
    }
}
