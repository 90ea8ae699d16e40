//! Outbound HTTP fetch seam for provider queries

use crate::error::FetchError;
use std::collections::HashMap;
use std::future::Future;

/// Per-request options for an outbound GET
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Named routing policy to pin the request through; `None` uses the
    /// default route
    pub routing_policy: Option<String>,
    /// Extra request headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
}

/// Single asynchronous fetch capability: one suspension point per outbound
/// call, resumed on response or error, no implicit retries.
pub trait HttpFetch {
    /// Issue one HTTP GET and return the raw response body
    fn get(
        &self,
        url: &str,
        opts: &FetchOptions,
    ) -> impl Future<Output = std::result::Result<String, FetchError>> + Send;
}

/// reqwest-backed fetch that resolves routing-policy names to local proxy
/// URLs for routed measurement
pub struct ReqwestFetch {
    /// Shared client for default-route requests; pinned requests get a
    /// per-call client because proxies are builder-only
    client: reqwest::Client,
    routes: HashMap<String, String>,
}

impl ReqwestFetch {
    /// Create a fetch backend with the given policy-name -> proxy-URL map
    pub fn new(routes: HashMap<String, String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            routes,
        }
    }

    fn client_for(&self, policy: Option<&str>) -> std::result::Result<reqwest::Client, FetchError> {
        let Some(name) = policy else {
            return Ok(self.client.clone());
        };

        let route = self
            .routes
            .get(name)
            .ok_or_else(|| FetchError::RouteNotFound(name.to_string()))?;
        let proxy = reqwest::Proxy::all(route).map_err(|e| FetchError::Transport(e.to_string()))?;

        reqwest::Client::builder()
            .proxy(proxy)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

impl HttpFetch for ReqwestFetch {
    async fn get(
        &self,
        url: &str,
        opts: &FetchOptions,
    ) -> std::result::Result<String, FetchError> {
        let client = self.client_for(opts.routing_policy.as_deref())?;

        let mut request = client.get(url);
        for (name, value) in &opts.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
