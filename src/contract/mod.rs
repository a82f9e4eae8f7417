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

//! Contract interaction layer.
//!
//! A [`ContractHandle`] is the boundary to whatever evaluates contracts
//! (state reads, view calls, dry-runs and submissions). On top of it,
//! [`ContractProxy`] gives each contract kind a typed surface: the request
//! payloads are tagged enums serialized as `{"function": ..., ...}` and the
//! replies come back as an [`InteractionResult`] envelope.

use std::{fmt, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// Big integer token amounts
pub mod amount;
pub use amount::Amount;

/// Handle talking to an interaction node over HTTP
pub mod http;

/// Fungible token contract
pub mod token;

/// Validator staking contract
pub mod validator;

/// Bundler staking contract
pub mod bundlers;

/// Host of the Warp gateway. Using it implies mainnet, where writes are bundled.
pub const WARP_GATEWAY_HOST: &str = "gateway.warp.cc";

/// Result envelope returned by view calls and dry-runs
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InteractionResult {
    Ok {
        #[serde(default)]
        result: Value,
    },
    Error {
        #[serde(rename = "errorMessage", default)]
        error_message: String,
    },
    Exception {
        #[serde(rename = "errorMessage", default)]
        error_message: String,
    },
}

impl InteractionResult {
    /// Unwrap the result payload, turning a remote failure into
    /// [`Error::ContractError`] carrying the remote message.
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Ok { result } => Ok(result),
            Self::Error { error_message } | Self::Exception { error_message } => {
                Err(Error::ContractError(error_message))
            }
        }
    }
}

/// Reply to a bundled submission
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    /// Id of the interaction as seen by the contract
    pub original_tx_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundlr_response: Option<Value>,
}

/// Access to a single deployed contract
#[async_trait]
pub trait ContractHandle: Send + Sync {
    /// Id of the contract this handle points at
    fn contract_id(&self) -> &str;

    /// Evaluate and return the current contract state
    async fn read_state(&self) -> Result<Value>;

    /// Run a read-only interaction against the current state
    async fn view_state(&self, input: &Value) -> Result<InteractionResult>;

    /// Simulate a write against the current state without submitting it
    async fn dry_write(&self, input: &Value) -> Result<InteractionResult>;

    /// Submit a write directly. `None` means the interaction was accepted
    /// but not confirmed.
    async fn write_interaction(&self, input: &Value) -> Result<Option<String>>;

    /// Submit a write through the bundling path
    async fn bundle_interaction(&self, input: &Value) -> Result<BundleResponse>;
}

/// How writes reach the network
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Direct interaction transaction
    #[default]
    Direct,
    /// Batched through a bundler (mainnet)
    Bundled,
}

impl WriteMode {
    /// Bundled when forced through `mainnet` or when talking to the Warp gateway.
    pub fn for_gateway(gateway: &Url, mainnet: bool) -> Self {
        if mainnet || gateway.host_str() == Some(WARP_GATEWAY_HOST) {
            return Self::Bundled
        }

        Self::Direct
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Bundled => write!(f, "bundled"),
        }
    }
}

/// Produces contract handles, all sharing the same network and wallet
pub trait Connector: Send + Sync {
    fn handle(&self, contract_id: &str) -> Arc<dyn ContractHandle>;

    fn write_mode(&self) -> WriteMode;
}

/// Types describing one kind of contract: its state and its interactions
pub trait ContractKind: 'static {
    /// Human readable name, used in logs
    const NAME: &'static str;

    type State: DeserializeOwned;
    type View: Serialize + Send + Sync;
    type Write: Serialize + Send + Sync;
}

/// Typed proxy for a contract of kind `K`
pub struct ContractProxy<K: ContractKind> {
    handle: Arc<dyn ContractHandle>,
    mode: WriteMode,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ContractKind> Clone for ContractProxy<K> {
    fn clone(&self) -> Self {
        Self { handle: self.handle.clone(), mode: self.mode, _kind: PhantomData }
    }
}

impl<K: ContractKind> ContractProxy<K> {
    pub fn new(handle: Arc<dyn ContractHandle>, mode: WriteMode) -> Self {
        Self { handle, mode, _kind: PhantomData }
    }

    /// Build a proxy for `contract_id` out of a [`Connector`].
    pub fn connect(connector: &dyn Connector, contract_id: &str) -> Self {
        Self::new(connector.handle(contract_id), connector.write_mode())
    }

    pub fn contract_id(&self) -> &str {
        self.handle.contract_id()
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Fetch the full current state snapshot.
    pub async fn current_state(&self) -> Result<K::State> {
        let state = self.handle.read_state().await?;
        serde_json::from_value(state).map_err(|e| Error::StateEvaluationFailed(e.to_string()))
    }

    /// Issue a view call and decode its payload.
    pub async fn view<T: DeserializeOwned>(&self, input: &K::View) -> Result<T> {
        let input = serde_json::to_value(input)?;
        debug!(target: "contract::view", "[{}] {} view {input}", K::NAME, self.contract_id());

        let result = self.handle.view_state(&input).await?.into_result()?;
        Ok(serde_json::from_value(result)?)
    }

    /// Dry-run `input` and, if the contract accepts it, submit it.
    ///
    /// Returns the interaction id. A direct submission may return `None`
    /// when the node accepted the interaction without confirming it.
    pub async fn write(&self, input: &K::Write) -> Result<Option<String>> {
        let input = serde_json::to_value(input)?;
        debug!(target: "contract::write", "[{}] {} dry-run {input}", K::NAME, self.contract_id());

        match self.handle.dry_write(&input).await? {
            InteractionResult::Ok { .. } => {}
            InteractionResult::Error { error_message } |
            InteractionResult::Exception { error_message } => {
                return Err(Error::SimulationFailed(error_message))
            }
        }

        let id = match self.mode {
            WriteMode::Bundled => {
                let rep = self.handle.bundle_interaction(&input).await?;
                if rep.original_tx_id.is_empty() {
                    return Err(Error::InteractionNotPosted)
                }
                Some(rep.original_tx_id)
            }
            WriteMode::Direct => self.handle.write_interaction(&input).await?,
        };

        info!(
            target: "contract::write",
            "[{}] {} submitted ({}): {}",
            K::NAME, self.contract_id(), self.mode, id.as_deref().unwrap_or("unconfirmed"),
        );
        Ok(id)
    }
}
