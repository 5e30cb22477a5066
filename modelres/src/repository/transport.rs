//! Fetching resources from a remote repository.
//!
//! A [`Transport`] streams one resource, addressed by its path relative to
//! the repository root, into a writer. Two implementations exist:
//!
//! - [`HttpTransport`] for `http://` and `https://` repositories
//! - [`FileTransport`] for `file://` repositories on a local or mounted disk

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use super::error::{TransportError, TransportResult};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Source of repository resources.
pub trait Transport: Send + Sync {
    /// Root URL of the repository, for diagnostics.
    fn base_url(&self) -> &str;

    /// Stream the resource at `path` into `sink`, returning the byte count.
    ///
    /// # Errors
    ///
    /// [`TransportError::NotFound`] when the resource does not exist; any
    /// other variant when it could not be retrieved.
    fn get(&self, path: &str, sink: &mut dyn Write) -> TransportResult<u64>;
}

/// Pick a transport for `url` by scheme.
pub fn transport_for_url(
    url: &str,
    timeout: Duration,
    proxy: Option<&str>,
) -> TransportResult<Arc<dyn Transport>> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Arc::new(FileTransport::new(path)));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(Arc::new(HttpTransport::new(url, timeout, proxy)?));
    }
    Err(TransportError::InvalidUrl {
        url: url.to_string(),
        reason: "unsupported scheme, expected http, https or file".to_string(),
    })
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Blocking HTTP transport.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the repository at `base_url`.
    ///
    /// `proxy` routes every request through the given proxy URL.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> TransportResult<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("modelres/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| TransportError::InvalidUrl {
                url: proxy.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, sink: &mut dyn Write) -> TransportResult<u64> {
        let url = join_url(&self.base_url, path);

        let mut response = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.clone(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                TransportError::Connection {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound { url });
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        copy_stream(&mut response, sink, &url)
    }
}

/// Transport over a repository directory, addressed as `file://<path>`.
#[derive(Debug, Clone)]
pub struct FileTransport {
    root: PathBuf,
    base_url: String,
}

impl FileTransport {
    /// Serve resources below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let base_url = format!("file://{}", root.display());
        Self { root, base_url }
    }
}

impl Transport for FileTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, sink: &mut dyn Write) -> TransportResult<u64> {
        let url = join_url(&self.base_url, path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments
            .iter()
            .any(|s| *s == "." || *s == ".." || s.contains('\\'))
        {
            return Err(TransportError::InvalidUrl {
                url,
                reason: "path leaves the repository root".to_string(),
            });
        }
        let mut file_path = self.root.clone();
        file_path.extend(segments);

        let mut file = match File::open(&file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TransportError::NotFound { url })
            }
            Err(e) => {
                return Err(TransportError::Connection {
                    url,
                    reason: e.to_string(),
                })
            }
        };
        if !file_path.is_file() {
            return Err(TransportError::NotFound { url });
        }

        copy_stream(&mut file, sink, &url)
    }
}

fn copy_stream(source: &mut dyn Read, sink: &mut dyn Write, url: &str) -> TransportResult<u64> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut copied = 0u64;

    loop {
        let bytes_read = source
            .read(&mut buffer)
            .map_err(|e| TransportError::Connection {
                url: url.to_string(),
                reason: format!("Read error: {}", e),
            })?;

        if bytes_read == 0 {
            break;
        }

        sink.write_all(&buffer[..bytes_read])
            .map_err(|source| TransportError::Write {
                url: url.to_string(),
                source,
            })?;

        copied += bytes_read as u64;
    }

    sink.flush().map_err(|source| TransportError::Write {
        url: url.to_string(),
        source,
    })?;

    Ok(copied)
}
