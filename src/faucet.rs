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

//! The faucet service publishes the ids of the network's token and bundler
//! contracts, and serves cached snapshots of contract state. The snapshots
//! are cheaper than a live evaluation and good enough for read-only queries.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{gateway::GatewayClient, Error, Result};

/// Name under which the faucet serves the token contract snapshot
pub const TOKEN_CONTRACT: &str = "token";

/// Contract ids published by the faucet
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Discovery {
    pub token: String,
    pub bundler: String,
}

/// Source of contract addresses and cached contract state
#[async_trait]
pub trait StateIndex: Send + Sync {
    /// Fetch the well-known contract ids
    async fn discover(&self) -> Result<Discovery>;

    /// Fetch the cached state of a contract, by id or by published name
    async fn contract_state(&self, contract: &str) -> Result<Value>;
}

/// Fetch and decode a cached contract state.
pub async fn cached_state<S: DeserializeOwned>(index: &dyn StateIndex, contract: &str) -> Result<S> {
    let state = index.contract_state(contract).await?;
    serde_json::from_value(state).map_err(|e| Error::StateEvaluationFailed(e.to_string()))
}

#[derive(Deserialize)]
struct StateReply {
    state: Value,
}

/// HTTP faucet client
pub struct Faucet {
    client: GatewayClient,
}

impl Faucet {
    pub fn new(url: &Url) -> Result<Self> {
        Ok(Self { client: GatewayClient::new(url)? })
    }
}

#[async_trait]
impl StateIndex for Faucet {
    async fn discover(&self) -> Result<Discovery> {
        let discovery: Discovery = self.client.get_json("", &[]).await?;
        debug!(
            target: "faucet::discover",
            "token: {}, bundler: {}", discovery.token, discovery.bundler,
        );
        Ok(discovery)
    }

    async fn contract_state(&self, contract: &str) -> Result<Value> {
        if contract.is_empty() || contract.contains('/') {
            return Err(Error::ParseFailed("Invalid contract id"))
        }

        let reply: StateReply = self.client.get_json(&format!("contract/{contract}"), &[]).await?;
        Ok(reply.state)
    }
}
