//! HTTP connectivity probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::domain::ports::NetworkProbe;

/// Treats any HTTP answer from `url` within the timeout as connectivity.
///
/// The status code is ignored: an error page still proves the backend is
/// reachable. Transport failures and timeouts mean offline.
#[derive(Debug, Clone)]
pub struct HttpNetworkProbe {
    client: Client,
    url: Url,
}

impl HttpNetworkProbe {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NetworkProbe for HttpNetworkProbe {
    async fn is_network_available(&self) -> bool {
        match self.client.head(self.url.clone()).send().await {
            Ok(response) => {
                debug!(url = %self.url, status = response.status().as_u16(), "probe answered");
                true
            }
            Err(error) => {
                debug!(url = %self.url, %error, "probe failed");
                false
            }
        }
    }
}
