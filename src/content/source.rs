//! Raw content access.

use std::path::Path;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// Where the loader reads file contents from.
pub trait ContentSource: Send + Sync + 'static {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, std::io::Result<String>>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ContentSource for FsSource {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, std::io::Result<String>> {
        tokio::fs::read_to_string(path).boxed()
    }
}
