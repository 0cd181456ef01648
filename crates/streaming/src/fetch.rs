use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;

pub type FetchFuture = BoxFuture<'static, Result<String, FetchError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Io { url: String, reason: String },
    Http { url: String, status: u16 },
    Transport { url: String, reason: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Io { url, reason } => write!(f, "failed to read {url}: {reason}"),
            FetchError::Http { url, status } => write!(f, "GET {url} returned HTTP {status}"),
            FetchError::Transport { url, reason } => write!(f, "GET {url} failed: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Non-blocking text fetch; the returned future is polled by the caller's
/// tick loop, never awaited on a separate thread by the engine.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> FetchFuture;
}

/// Reads sources relative to a local data root.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = url.strip_prefix("file://").unwrap_or(url);
        self.root.join(path)
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str) -> FetchFuture {
        let path = self.resolve(url);
        let url = url.to_string();
        Box::pin(async move {
            std::fs::read_to_string(&path).map_err(|e| FetchError::Io {
                url,
                reason: e.to_string(),
            })
        })
    }
}
