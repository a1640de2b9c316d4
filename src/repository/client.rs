// src/repository/client.rs

//! HTTP transport for the release feed and package downloads
//!
//! [`Transport`] is the seam between the engine and the network; the engine
//! only ever asks for "the bytes at this URL" or "this URL written to that
//! path". [`RepositoryClient`] implements it over blocking reqwest.

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum attempts for a request that fails before a response arrives
const MAX_RETRIES: u32 = 3;

/// Base retry delay in milliseconds (multiplied by the attempt number)
const RETRY_DELAY_MS: u64 = 1000;

/// Network collaborator used by every engine phase
pub trait Transport: Send + Sync {
    /// Fetch a URL into memory
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Download a URL to a file, creating parent directories as needed
    fn download_file(&self, url: &str, dest_path: &Path) -> Result<()> {
        let bytes = self.fetch_bytes(url)?;
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest_path, bytes)?;
        Ok(())
    }
}

/// HTTP client wrapper with retry support
pub struct RepositoryClient {
    client: Client,
    max_retries: u32,
}

impl RepositoryClient {
    /// Create a client from the tool configuration
    ///
    /// Without `http_timeout_secs` requests have no deadline; a stalled server
    /// blocks the calling thread.
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        builder = match config.http_timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder.timeout(None),
        };
        let client = builder
            .build()
            .map_err(|e| Error::DownloadFailed(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Send a GET, retrying only when no response was received
    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        return Err(Error::DownloadFailed(format!(
                            "HTTP {} from {}",
                            response.status(),
                            url
                        )));
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadFailed(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Request attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}

impl Transport for RepositoryClient {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching {}", url);
        let response = self.get(url)?;
        let bytes = response
            .bytes()
            .map_err(|e| Error::DownloadFailed(format!("Failed to read response from {url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    fn download_file(&self, url: &str, dest_path: &Path) -> Result<()> {
        info!("Downloading {} to {}", url, dest_path.display());

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut response = self.get(url)?;

        // Write to temporary file first
        let temp_path = dest_path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;

        if let Err(e) = io::copy(&mut response, &mut file) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::DownloadFailed(format!(
                "Failed to write downloaded data from {url}: {e}"
            )));
        }
        drop(file);

        fs::rename(&temp_path, dest_path)?;

        debug!("Successfully downloaded to {}", dest_path.display());
        Ok(())
    }
}
