use std::collections::VecDeque;
use std::io::{self, Read};

/// Presents an ordered sequence of readers as one continuous byte stream.
///
/// Bytes are pulled from the front element until it reports end-of-data,
/// then from the next, until all elements are exhausted. A read error on
/// any element aborts the remaining concatenation.
pub struct ConcatReader {
    readers: VecDeque<Box<dyn Read + Send>>,
}

impl ConcatReader {
    pub fn new(readers: Vec<Box<dyn Read + Send>>) -> Self {
        Self {
            readers: readers.into(),
        }
    }
}

impl Read for ConcatReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(r) = self.readers.front_mut() {
            let n = r.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            self.readers.pop_front();
        }
        Ok(0)
    }
}
