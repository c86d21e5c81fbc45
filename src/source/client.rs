// src/source/client.rs
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header;

use crate::extractors::tables::sidecar_path;
use crate::utils::error::ResolveError;

const USER_AGENT: &str = concat!("datasheet_extractor/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 60;
const PDF_MAGIC: &[u8] = b"%PDF-";
const PARTIAL_SUFFIX: &str = ".part";

/// Turns a manifest locator into a local document path.
#[allow(async_fn_in_trait)]
pub trait DocumentResolver {
    async fn resolve(&self, locator: &str) -> Result<PathBuf, ResolveError>;
}

/// Resolves local paths directly and URLs through a download cache.
pub struct HttpResolver {
    client: reqwest::Client,
    cache_dir: PathBuf,
    request_delay: Duration,
}

impl HttpResolver {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        request_delay: Duration,
    ) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            request_delay,
        })
    }

    /// Downloads `url` into `target`. The body lands in a `.part` file first
    /// and is renamed into place, so an interrupted write never looks cached.
    async fn download(&self, url: &str, target: &Path) -> Result<(), ResolveError> {
        tracing::info!("Downloading document from: {}", url);

        // Keep a polite pace against the datasheet host
        tokio::time::sleep(self.request_delay).await;

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/pdf,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ResolveError::NotFound(url.to_string()));
            }
            return Err(ResolveError::Http(status, url.to_string()));
        }

        let body = response.bytes().await?;
        tokio::fs::create_dir_all(&self.cache_dir).await?;

        let mut partial = target.as_os_str().to_owned();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);
        if let Err(e) = tokio::fs::write(&partial, &body).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tokio::fs::rename(&partial, target).await?;
        tracing::debug!("Cached {} bytes at {}", body.len(), target.display());
        Ok(())
    }
}

impl DocumentResolver for HttpResolver {
    async fn resolve(&self, locator: &str) -> Result<PathBuf, ResolveError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(ResolveError::InvalidLocator(locator.to_string()));
        }

        let local = Path::new(locator);
        if local.is_file() {
            return Ok(local.to_path_buf());
        }

        let file_name = cache_file_name(locator)
            .ok_or_else(|| ResolveError::InvalidLocator(locator.to_string()))?;
        let cached = self.cache_dir.join(file_name);
        if cached.is_file() {
            if is_usable_cache_entry(&cached) {
                tracing::debug!("Cache hit for {}: {}", locator, cached.display());
                return Ok(cached);
            }
            tracing::warn!(
                "Cached copy {} of {} is not a readable PDF, fetching again",
                cached.display(),
                locator
            );
            tokio::fs::remove_file(&cached).await?;
        }

        if !is_url(locator) {
            return Err(ResolveError::NotFound(locator.to_string()));
        }
        self.download(locator, &cached).await?;
        Ok(cached)
    }
}

fn is_url(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

/// A cached download is reused when it starts like a PDF, or when
/// pre-extracted tables sit next to it.
fn is_usable_cache_entry(path: &Path) -> bool {
    if sidecar_path(path).is_file() {
        return true;
    }
    let mut magic = [0u8; PDF_MAGIC.len()];
    std::fs::File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map(|_| magic == PDF_MAGIC)
        .unwrap_or(false)
}

/// Last path segment of a locator, ignoring any query string or fragment.
/// A locator ending in `/` names a directory and has no file name.
pub fn cache_file_name(locator: &str) -> Option<String> {
    let without_query = locator.split(['?', '#']).next().unwrap_or(locator);
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/')?.1,
        None => without_query,
    };
    if path.ends_with('/') {
        return None;
    }
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
