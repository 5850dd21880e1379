//! Where a data set comes from.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ipfs fetch of {cid} failed: {source}")]
    Fetch {
        cid: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    File(PathBuf),
    /// Content identifier resolved through an HTTP gateway.
    Ipfs(String),
}

impl ContentSource {
    /// Load the data set as text. No format check is made here.
    pub async fn load(&self, http: &reqwest::Client, gateway: &str) -> Result<String, ContentError> {
        match self {
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ContentError::Read {
                    path: path.clone(),
                    source,
                }),
            Self::Ipfs(cid) => {
                let url = format!("{}/{}", gateway.trim_end_matches('/'), cid.trim());
                tracing::debug!(%url, "fetching from ipfs gateway");
                let fetch = async {
                    http.get(&url)
                        .send()
                        .await?
                        .error_for_status()?
                        .text()
                        .await
                };
                fetch.await.map_err(|source| ContentError::Fetch {
                    cid: cid.clone(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Ipfs(cid) => write!(f, "ipfs://{cid}"),
        }
    }
}
