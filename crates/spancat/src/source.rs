use std::io::{self, Read};

/// A resolved content source: a readable byte stream with a known total size.
///
/// Implementations must report `size` without reading the object, and
/// `seek_to` must position the stream at an absolute offset from the start.
pub trait SourceHandle: Read + Send {
    /// Total byte length of the underlying object.
    fn size(&self) -> u64;

    /// Positions the stream `offset` bytes from the start.
    ///
    /// Returns the resulting position.
    fn seek_to(&mut self, offset: u64) -> io::Result<u64>;
}

impl std::fmt::Debug for dyn SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHandle")
            .field("size", &self.size())
            .finish()
    }
}

/// Maps path specs to openable content sources.
pub trait SourceResolver {
    fn resolve(&self, spec: &str) -> Result<Box<dyn SourceHandle>, ResolveError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("source not found: {spec}")]
    NotFound { spec: String },

    #[error("malformed source path: {spec:?}")]
    MalformedPath { spec: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}
