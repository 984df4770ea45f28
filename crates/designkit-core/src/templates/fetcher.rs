//! Remote template archive download and extraction
//!
//! The archive is a gzipped tarball. Response chunks are handed to a blocking
//! extractor over a bounded channel as they arrive, so the archive is never
//! held in memory as a whole; the download finishes when the extractor
//! reports completion.

use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

/// Chunks buffered between download and extraction
const CHANNEL_DEPTH: usize = 16;

/// Path of the archive below a release directory
const ARCHIVE_PATH: [&str; 2] = ["createproject", "project.tgz"];

/// Archive source - either remote URL or local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    Remote(Url),
    Local(PathBuf),
}

impl ArchiveSource {
    /// Resolve the archive for `version` from a product config.
    ///
    /// The base URL comes from the product's env var when set. A `file://`
    /// base selects a local archive at the same relative path.
    pub fn from_config<C: ProductConfig>(config: &C, version: &str) -> Result<Self> {
        let base_str = std::env::var(config.archive_base_env())
            .unwrap_or_else(|_| config.default_archive_base().to_string());
        Self::from_base(&base_str, version)
    }

    /// Resolve `{base}/{version}/createproject/project.tgz`
    pub fn from_base(base_str: &str, version: &str) -> Result<Self> {
        let base = Url::parse(base_str).map_err(|e| ScaffoldError::TemplateDownload {
            url: base_str.to_string(),
            reason: format!("invalid template URL: {}", e),
        })?;
        let url = Self::build_url(&base, version)?;

        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| ScaffoldError::TemplateDownload {
                    url: url.to_string(),
                    reason: "not a local file path".to_string(),
                })?;
            return Ok(Self::Local(path));
        }
        Ok(Self::Remote(url))
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &Url, version: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ScaffoldError::TemplateDownload {
                url: base.to_string(),
                reason: "URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .push(version)
            .extend(ARCHIVE_PATH);
        Ok(url)
    }

    /// Human-readable location
    pub fn location(&self) -> String {
        match self {
            ArchiveSource::Remote(url) => url.to_string(),
            ArchiveSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Template fetcher - handles retrieving the project archive
pub struct TemplateFetcher {
    source: ArchiveSource,
    client: reqwest::Client,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: ArchiveSource, user_agent: &str) -> Self {
        Self::with_client(
            source,
            reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        )
    }

    /// Create a fetcher using a preconfigured HTTP client
    pub fn with_client(source: ArchiveSource, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    /// Create a fetcher for the archive matching the product's version
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = ArchiveSource::from_config(config, config.version())?;
        Ok(Self::new(source, &config.user_agent()))
    }

    pub fn source(&self) -> &ArchiveSource {
        &self.source
    }

    /// Download and extract the archive into `dest`.
    ///
    /// Returns the directory holding the template files: `dest` itself, or
    /// the single top-level directory the archive wraps its files in.
    pub async fn fetch_into(&self, dest: &Path) -> Result<PathBuf> {
        info!("Fetching project template from {}", self.source.location());

        match &self.source {
            ArchiveSource::Remote(url) => self.stream_remote(url, dest).await?,
            ArchiveSource::Local(path) => Self::extract_local(path, dest).await?,
        }

        template_root(dest, &self.source.location())
    }

    async fn stream_remote(&self, url: &Url, dest: &Path) -> Result<()> {
        let download_error = |reason: String| ScaffoldError::TemplateDownload {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }

        let first = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        let Some(first) = first.filter(|chunk| !chunk.is_empty()) else {
            return Err(ScaffoldError::EmptyArchive {
                url: url.to_string(),
            });
        };

        let (tx, rx) = mpsc::channel::<Vec<u8>>(CHANNEL_DEPTH);
        let target = dest.to_path_buf();
        let extractor =
            tokio::task::spawn_blocking(move || unpack_tgz(ChannelReader::new(rx), &target));

        let mut received = first.len();
        let mut next = Some(first.to_vec());
        let mut failure = None;
        while let Some(chunk) = next {
            // A closed channel means the extractor stopped early; its own
            // result says why.
            if tx.send(chunk).await.is_err() {
                break;
            }
            next = match response.chunk().await {
                Ok(chunk) => chunk.map(|bytes| {
                    received += bytes.len();
                    bytes.to_vec()
                }),
                Err(e) => {
                    failure = Some(e);
                    None
                }
            };
        }
        drop(tx);

        let extracted = extractor
            .await
            .map_err(|e| ScaffoldError::ArchiveExtraction(io::Error::other(e)))?;
        if let Some(e) = failure {
            return Err(download_error(e.to_string()));
        }
        extracted.map_err(ScaffoldError::ArchiveExtraction)?;

        debug!("Extracted {} bytes from {}", received, url);
        Ok(())
    }

    async fn extract_local(path: &Path, dest: &Path) -> Result<()> {
        let file = File::open(path)
            .map_err(|e| ScaffoldError::io(format!("Failed to open {}", path.display()), e))?;
        let len = file
            .metadata()
            .map_err(|e| ScaffoldError::io(format!("Failed to read {}", path.display()), e))?
            .len();
        if len == 0 {
            return Err(ScaffoldError::EmptyArchive {
                url: path.display().to_string(),
            });
        }

        let target = dest.to_path_buf();
        tokio::task::spawn_blocking(move || unpack_tgz(file, &target))
            .await
            .map_err(|e| ScaffoldError::ArchiveExtraction(io::Error::other(e)))?
            .map_err(ScaffoldError::ArchiveExtraction)
    }
}

/// Unpack a gzipped tarball read from `reader` into `dest`
fn unpack_tgz<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.unpack(dest)
}

/// Directory holding the extracted template files
fn template_root(extract_dir: &Path, location: &str) -> Result<PathBuf> {
    let entries: Vec<_> = std::fs::read_dir(extract_dir)
        .map_err(|e| ScaffoldError::io(format!("Failed to read {}", extract_dir.display()), e))?
        .collect::<io::Result<_>>()
        .map_err(|e| ScaffoldError::io(format!("Failed to read {}", extract_dir.display()), e))?;

    match entries.as_slice() {
        [] => Err(ScaffoldError::EmptyArchive {
            url: location.to_string(),
        }),
        [only] if only.path().is_dir() => Ok(only.path()),
        _ => Ok(extract_dir.to_path_buf()),
    }
}

/// Blocking reader over chunks sent from the download task
struct ChannelReader {
    rx: mpsc::Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
}

impl ChannelReader {
    fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            buf: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.buf.len() {
            match self.rx.blocking_recv() {
                Some(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }

        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::pack_archive;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and return the release base URL
    async fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/gzip\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/releases", addr)
    }

    fn fetcher_for(base: &str) -> TemplateFetcher {
        let source = ArchiveSource::from_base(base, "0.4.2").unwrap();
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        TemplateFetcher::with_client(source, client)
    }

    fn sample_archive() -> Vec<u8> {
        let template = TempDir::new().unwrap();
        std::fs::create_dir_all(template.path().join("src")).unwrap();
        std::fs::write(
            template.path().join("package.json"),
            "{\"name\":\"{% name.kebab %}\"}",
        )
        .unwrap();
        std::fs::write(template.path().join("src/index.ts"), "export {};\n").unwrap();

        let out = TempDir::new().unwrap();
        let archive = out.path().join("project.tgz");
        pack_archive(template.path(), &archive).unwrap();
        std::fs::read(archive).unwrap()
    }

    #[test]
    fn test_archive_url_layout() {
        let source = ArchiveSource::from_base("https://cdn.example.com/releases/", "1.2.3").unwrap();
        assert_eq!(
            source,
            ArchiveSource::Remote(
                Url::parse("https://cdn.example.com/releases/1.2.3/createproject/project.tgz")
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_file_base_is_local() {
        let source = ArchiveSource::from_base("file:///srv/releases", "1.2.3").unwrap();
        assert_eq!(
            source,
            ArchiveSource::Local(PathBuf::from("/srv/releases/1.2.3/createproject/project.tgz"))
        );
    }

    #[tokio::test]
    async fn test_streamed_download_extracts_archive() {
        let base = serve_once("200 OK", sample_archive()).await;
        let dest = TempDir::new().unwrap();

        let root = fetcher_for(&base).fetch_into(dest.path()).await.unwrap();

        assert_eq!(root, dest.path().join("package"));
        assert!(root.join("package.json").exists());
        assert_eq!(
            std::fs::read_to_string(root.join("src/index.ts")).unwrap(),
            "export {};\n"
        );
    }

    #[tokio::test]
    async fn test_empty_response_suggests_bare_mode() {
        let base = serve_once("200 OK", Vec::new()).await;
        let dest = TempDir::new().unwrap();

        let err = fetcher_for(&base).fetch_into(dest.path()).await.unwrap_err();

        assert!(matches!(err, ScaffoldError::EmptyArchive { .. }));
        assert!(err.to_string().contains("--bare"));
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_http_error_is_download_failure() {
        let base = serve_once("404 Not Found", b"missing".to_vec()).await;
        let dest = TempDir::new().unwrap();

        let err = fetcher_for(&base).fetch_into(dest.path()).await.unwrap_err();

        match err {
            ScaffoldError::TemplateDownload { reason, .. } => assert!(reason.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_corrupt_archive_fails_extraction() {
        let base = serve_once("200 OK", b"this is not a tarball".to_vec()).await;
        let dest = TempDir::new().unwrap();

        let err = fetcher_for(&base).fetch_into(dest.path()).await.unwrap_err();

        assert!(matches!(err, ScaffoldError::ArchiveExtraction(_)));
    }

    #[tokio::test]
    async fn test_local_archive() {
        let releases = TempDir::new().unwrap();
        let archive_dir = releases.path().join("0.4.2/createproject");
        std::fs::create_dir_all(&archive_dir).unwrap();
        std::fs::write(archive_dir.join("project.tgz"), sample_archive()).unwrap();

        let base = Url::from_directory_path(releases.path()).unwrap();
        let dest = TempDir::new().unwrap();
        let root = fetcher_for(base.as_str()).fetch_into(dest.path()).await.unwrap();

        assert!(root.join("package.json").exists());
    }

    #[tokio::test]
    async fn test_empty_local_archive() {
        let releases = TempDir::new().unwrap();
        let archive_dir = releases.path().join("0.4.2/createproject");
        std::fs::create_dir_all(&archive_dir).unwrap();
        std::fs::write(archive_dir.join("project.tgz"), b"").unwrap();

        let base = Url::from_directory_path(releases.path()).unwrap();
        let dest = TempDir::new().unwrap();
        let err = fetcher_for(base.as_str())
            .fetch_into(dest.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ScaffoldError::EmptyArchive { .. }));
    }
}
