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

//! [`ContractHandle`] backed by an interaction node reachable over HTTP.
//!
//! | Operation    | Request                                          |
//! |--------------|--------------------------------------------------|
//! | read state   | `GET contract?id=<id>`                           |
//! | view         | `GET contract/view?id=<id>&input=<json>`         |
//! | dry-run      | `GET contract/dry-write?id=<id>&input=<json>`    |
//! | direct write | `POST contract/interactions`                     |
//! | bundled write| `POST gateway/sequencer/register`                |
//!
//! Reads carry the caller address when a wallet is loaded, writes carry
//! the wallet owner so the node can attribute and sign the interaction.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BundleResponse, Connector, ContractHandle, InteractionResult, WriteMode};
use crate::{gateway::GatewayClient, wallet::Wallet, Error, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionRequest<'a> {
    contract_tx_id: &'a str,
    input: &'a Value,
    owner: &'a str,
}

#[derive(Deserialize)]
struct StateReply {
    state: Value,
}

#[derive(Deserialize)]
struct WriteReply {
    #[serde(default)]
    id: Option<String>,
}

/// Contract handle for one contract id on one node
pub struct HttpContract {
    gateway: GatewayClient,
    contract_id: String,
    wallet: Option<Wallet>,
}

impl HttpContract {
    pub fn new(gateway: GatewayClient, contract_id: &str, wallet: Option<Wallet>) -> Self {
        Self { gateway, contract_id: contract_id.to_string(), wallet }
    }

    fn signer(&self) -> Result<&Wallet> {
        self.wallet.as_ref().ok_or(Error::WalletRequired)
    }

    async fn query(&self, path: &str, input: &Value) -> Result<InteractionResult> {
        let input = serde_json::to_string(input)?;
        let mut query = vec![("id", self.contract_id.as_str()), ("input", input.as_str())];
        if let Some(wallet) = &self.wallet {
            query.push(("caller", wallet.address()));
        }

        self.gateway.get_json(path, &query).await
    }
}

#[async_trait]
impl ContractHandle for HttpContract {
    fn contract_id(&self) -> &str {
        &self.contract_id
    }

    async fn read_state(&self) -> Result<Value> {
        let reply: StateReply = self
            .gateway
            .get_json("contract", &[("id", self.contract_id.as_str())])
            .await
            .map_err(|e| Error::StateEvaluationFailed(e.to_string()))?;

        Ok(reply.state)
    }

    async fn view_state(&self, input: &Value) -> Result<InteractionResult> {
        self.query("contract/view", input).await
    }

    async fn dry_write(&self, input: &Value) -> Result<InteractionResult> {
        self.query("contract/dry-write", input).await
    }

    async fn write_interaction(&self, input: &Value) -> Result<Option<String>> {
        let owner = self.signer()?.owner();
        let req = InteractionRequest { contract_tx_id: &self.contract_id, input, owner };
        let reply: WriteReply = self.gateway.post_json("contract/interactions", &req).await?;
        Ok(reply.id)
    }

    async fn bundle_interaction(&self, input: &Value) -> Result<BundleResponse> {
        let owner = self.signer()?.owner();
        let req = InteractionRequest { contract_tx_id: &self.contract_id, input, owner };
        self.gateway.post_json("gateway/sequencer/register", &req).await
    }
}

/// [`Connector`] handing out [`HttpContract`]s that share a gateway and wallet
pub struct HttpConnector {
    gateway: GatewayClient,
    wallet: Option<Wallet>,
    mode: WriteMode,
}

impl HttpConnector {
    pub fn new(gateway: GatewayClient, wallet: Option<Wallet>, mode: WriteMode) -> Self {
        Self { gateway, wallet, mode }
    }
}

impl Connector for HttpConnector {
    fn handle(&self, contract_id: &str) -> Arc<dyn ContractHandle> {
        Arc::new(HttpContract::new(self.gateway.clone(), contract_id, self.wallet.clone()))
    }

    fn write_mode(&self) -> WriteMode {
        self.mode
    }
}
