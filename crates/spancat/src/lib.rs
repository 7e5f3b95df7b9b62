#![forbid(unsafe_code)]

mod cancel;
mod concat;
mod fs_source;
mod source;
mod window;

pub mod api;

pub use api::{
    window, CancelToken, Composer, ConcatReader, FsResolver, ResolveError, SourceHandle,
    SourceResolver, WindowError, WindowResult, UNBOUNDED,
};
