use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::source::{ResolveError, SourceHandle, SourceResolver};

/// Resolves path specs against the local filesystem.
#[derive(Clone, Debug, Default)]
pub struct FsResolver {
    base_dir: Option<PathBuf>,
}

impl FsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative specs under `base_dir` instead of the working directory.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: Some(base_dir.as_ref().to_path_buf()),
        }
    }

    fn path_for_spec(&self, spec: &str) -> Result<PathBuf, ResolveError> {
        if spec.is_empty() {
            return Err(ResolveError::MalformedPath {
                spec: spec.to_string(),
            });
        }
        let path = PathBuf::from(spec);
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        })
    }
}

impl SourceResolver for FsResolver {
    fn resolve(&self, spec: &str) -> Result<Box<dyn SourceHandle>, ResolveError> {
        let path = self.path_for_spec(spec)?;
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ResolveError::NotFound {
                    spec: spec.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata()?.len();
        Ok(Box::new(FileSource { file, size }))
    }
}

struct FileSource {
    file: File,
    size: u64,
}

impl Read for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl SourceHandle for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(offset))
    }
}
