//! HTTP fetching.
//!
//! Transfers are blocking curl GETs executed on the tokio blocking pool;
//! `fetch` reserves a budget slot, runs the transfer off-thread and awaits
//! the result. Success means HTTP 200 exactly: any other status, and any
//! transfer failure past the connect phase (timeout, broken TLS handshake,
//! aborted body), degrades to an unsuccessful empty response. Connect-phase
//! failures are surfaced as `FetchError::Connect` because callers treat
//! them differently for listing and song URLs.

mod budget;

pub use budget::FetchBudget;

use std::time::Duration;

use crate::config::FetchConfig;

/// Options applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub verify_certificates: bool,
    pub follow_redirects: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl From<&FetchConfig> for FetchOptions {
    fn from(cfg: &FetchConfig) -> Self {
        Self {
            verify_certificates: cfg.verify_certificates,
            follow_redirects: cfg.follow_redirects,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

/// Response to a GET: final status code and raw body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// True only for HTTP 200.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Body as text (lossy), for HTML pages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Placeholder for a failed transfer: status 0, empty body.
    fn failed() -> Self {
        Self {
            status: 0,
            body: Vec::new(),
        }
    }
}

/// Fetch failure the caller must classify (as opposed to a bad status,
/// which is an unsuccessful `FetchResponse`).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// DNS resolution or TCP connect failed; the host was never reached.
    #[error("connection failed: {0}")]
    Connect(#[source] curl::Error),
    /// The blocking transfer task died before producing a result.
    #[error("transfer task failed: {0}")]
    Pool(#[source] tokio::task::JoinError),
}

/// Performs one blocking GET. Call from `spawn_blocking` when used from
/// async code.
pub fn fetch_blocking(url: &str, options: &FetchOptions) -> Result<FetchResponse, FetchError> {
    match perform_get(url, options) {
        Ok(response) => Ok(response),
        Err(e) if is_connect_error(&e) => Err(FetchError::Connect(e)),
        Err(e) => {
            tracing::debug!("GET {} failed: {}", url, e);
            Ok(FetchResponse::failed())
        }
    }
}

/// Reserves a budget slot and runs the GET on the blocking pool.
pub async fn fetch(
    url: &str,
    options: FetchOptions,
    budget: &FetchBudget,
) -> Result<FetchResponse, FetchError> {
    let _slot = budget.reserve().await;
    let url = url.to_string();
    tokio::task::spawn_blocking(move || fetch_blocking(&url, &options))
        .await
        .map_err(FetchError::Pool)?
}

fn perform_get(url: &str, options: &FetchOptions) -> Result<FetchResponse, curl::Error> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(options.follow_redirects)?;
    easy.max_redirections(10)?;
    easy.ssl_verify_peer(options.verify_certificates)?;
    easy.ssl_verify_host(options.verify_certificates)?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.timeout(options.request_timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(FetchResponse { status, body })
}

/// Connect-phase failures: the server was never reached.
fn is_connect_error(e: &curl::Error) -> bool {
    e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() || e.is_couldnt_connect()
}
