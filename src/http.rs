// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

/// User-Agent sent with every request issued through [`ReqwestClient`]
pub const USER_AGENT: &str = concat!("podgen/", env!("CARGO_PKG_VERSION"));

/// HTTP client abstraction for testability
///
/// One instance is shared by the show catalog, the episode source and every
/// metadata source, so all of them reuse the same connection pool and session
/// headers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch the entire response body as bytes
    ///
    /// A non-success status code is an error.
    async fn get_bytes(&self, url: &str) -> Result<Bytes, reqwest::Error>;
}

/// A shared reference to the transport handle
pub type SharedHttpClient = Arc<dyn HttpClient>;

/// Default HTTP client implementation using reqwest
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new ReqwestClient with the default session headers
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Create a new ReqwestClient with a custom reqwest::Client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_bytes(&self, url: &str) -> Result<Bytes, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await
    }
}
