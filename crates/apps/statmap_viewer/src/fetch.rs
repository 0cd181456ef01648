use std::path::PathBuf;

use reqwest::Client;
use streaming::{FetchError, FetchFuture, Fetcher, FileFetcher};

/// `http(s)://` through reqwest, everything else from the data root.
///
/// Each fetch runs as its own tokio task so it progresses between engine
/// ticks.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    files: FileFetcher,
}

impl HttpFetcher {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            files: FileFetcher::new(data_root),
        }
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

async fn get_text(client: Client, url: String) -> Result<String, FetchError> {
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| FetchError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;
    if !resp.status().is_success() {
        return Err(FetchError::Http {
            url,
            status: resp.status().as_u16(),
        });
    }
    resp.text().await.map_err(|e| FetchError::Transport {
        url,
        reason: e.to_string(),
    })
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> FetchFuture {
        let owned = url.to_string();
        let task = if is_remote(url) {
            tokio::spawn(get_text(self.client.clone(), owned.clone()))
        } else {
            let path = self.files.resolve(url);
            let url = owned.clone();
            tokio::spawn(async move {
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| FetchError::Io {
                        url,
                        reason: e.to_string(),
                    })
            })
        };
        Box::pin(async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(FetchError::Transport {
                    url: owned,
                    reason: e.to_string(),
                }),
            }
        })
    }
}
