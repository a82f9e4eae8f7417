/* This file is part of bundlr-contracts (https://bundlr.network)
 *
 * Copyright (C) 2022-2025 Bundlr Network
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! HTTP client used to reach the gateway, the interaction node and the
//! faucet. Idempotent requests go through the [`Backoff`] middleware.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// Exponential backoff retry middleware
pub mod retry;
pub use retry::Backoff;

/// Port to use for a URL protocol that carries no explicit port.
/// Accepts the protocol with or without its trailing colon.
pub fn default_port(protocol: &str) -> Result<u16> {
    match protocol.trim_end_matches(':') {
        "http" => Ok(80),
        "https" => Ok(443),
        _ => Err(Error::UnsupportedProtocol(protocol.to_string())),
    }
}

/// JSON-over-HTTP client bound to a base URL
#[derive(Clone)]
pub struct GatewayClient {
    client: surf::Client,
    base: Url,
}

impl GatewayClient {
    /// Create a client for `url` using the default retry policy.
    pub fn new(url: &Url) -> Result<Self> {
        Self::with_backoff(url, Backoff::default())
    }

    /// Create a client for `url` with a custom retry policy.
    ///
    /// The base URL is normalized to `protocol://host:port/path/`, with the
    /// port derived from the protocol when the URL has none.
    pub fn with_backoff(url: &Url, backoff: Backoff) -> Result<Self> {
        let port = match url.port() {
            Some(p) => p,
            None => default_port(url.scheme())?,
        };

        let Some(host) = url.host_str() else {
            return Err(Error::ParseFailed("Gateway URL has no host"))
        };

        let mut path = url.path().to_string();
        if !path.ends_with('/') {
            path.push('/');
        }

        let base = Url::parse(&format!("{}://{}:{}{}", url.scheme(), host, port, path))?;
        let client = surf::Client::new().with(backoff);

        Ok(Self { client, base })
    }

    /// Normalized base URL of this client
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Perform a GET request and decode the JSON reply.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        debug!(target: "gateway::get", "--> GET {url}");
        let mut rep = self.client.get(url.as_str()).send().await?;
        Self::decode(&mut rep).await
    }

    /// Perform a POST request with a JSON body and decode the JSON reply.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;

        debug!(target: "gateway::post", "--> POST {url}");
        let mut rep = self.client.post(url.as_str()).body_json(body)?.send().await?;
        Self::decode(&mut rep).await
    }

    async fn decode<T: DeserializeOwned>(rep: &mut surf::Response) -> Result<T> {
        let status = rep.status();
        let body = rep.body_string().await?;
        debug!(target: "gateway::decode", "<-- {status} {body}");

        if !status.is_success() {
            return Err(Error::HttpStatus(u16::from(status), body))
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports() {
        assert_eq!(default_port("http:").unwrap(), 80);
        assert_eq!(default_port("https:").unwrap(), 443);
        assert_eq!(default_port("https").unwrap(), 443);
        assert!(matches!(default_port("ftp:"), Err(Error::UnsupportedProtocol(p)) if p == "ftp:"));
    }

    #[test]
    fn base_url_normalization() {
        let url = Url::parse("http://arweave.testnet1.bundlr.network/").unwrap();
        let gw = GatewayClient::new(&url).unwrap();
        assert_eq!(gw.base_url().as_str(), "http://arweave.testnet1.bundlr.network/");
        assert_eq!(gw.base_url().port_or_known_default(), Some(80));

        let url = Url::parse("https://faucet.testnet1.bundlr.network").unwrap();
        let gw = GatewayClient::new(&url).unwrap();
        assert_eq!(
            gw.endpoint("contract/token").unwrap().as_str(),
            "https://faucet.testnet1.bundlr.network/contract/token"
        );

        let url = Url::parse("http://127.0.0.1:1984/api").unwrap();
        let gw = GatewayClient::new(&url).unwrap();
        assert_eq!(gw.endpoint("/contract").unwrap().as_str(), "http://127.0.0.1:1984/api/contract");
    }

    #[test]
    fn unsupported_gateway_protocol() {
        let url = Url::parse("ws://gateway.example/").unwrap();
        assert!(matches!(GatewayClient::new(&url), Err(Error::UnsupportedProtocol(_))));
    }
}
