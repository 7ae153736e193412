//! Default transfer engine backed by a blocking reqwest client

use super::{EngineError, Result, TransferContext, TransferEngine, TransferResult};
use crate::config::Config;
use reqwest::Proxy;
use reqwest::blocking::Client;
use std::io::Read;
use tracing::debug;

const CHUNK_SIZE: usize = 16 * 1024;

/// HTTP transfer engine. One instance is owned by each worker and reused for
/// every transfer that worker performs.
pub struct HttpEngine {
    client: Client,
}

impl HttpEngine {
    /// Build a reusable engine handle from the client configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10));

        // Configure proxy if provided
        if let Some(url) = &config.proxy {
            let proxy = Proxy::all(url)
                .map_err(|e| EngineError::InvalidUrl(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| EngineError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

impl TransferEngine for HttpEngine {
    fn perform(&mut self, url: &str, ctx: &mut TransferContext<'_>) -> TransferResult {
        debug!(url, "starting transfer");

        let mut response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => return TransferResult::failed(None, classify_error(e)),
        };

        let status = response.status().as_u16();
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            if ctx.is_canceled() {
                debug!(url, "transfer aborted by cancellation poll");
                return TransferResult::aborted(Some(status));
            }

            match response.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => ctx.push(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    return TransferResult::failed(Some(status), EngineError::Timeout);
                }
                Err(e) => {
                    return TransferResult::failed(
                        Some(status),
                        EngineError::RequestFailed(format!("Failed to read body: {}", e)),
                    );
                }
            }
        }

        debug!(url, status, size = ctx.bytes_received(), "transfer completed");
        TransferResult::completed(status)
    }
}

fn classify_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_redirect() {
        EngineError::TooManyRedirects
    } else {
        EngineError::RequestFailed(e.to_string())
    }
}
