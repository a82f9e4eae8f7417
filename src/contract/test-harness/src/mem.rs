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

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use bundlr_contracts::{
    contract::{BundleResponse, Connector, ContractHandle, InteractionResult, WriteMode},
    faucet::{Discovery, StateIndex},
    Error, Result,
};

/// Context of a single handler invocation
pub struct Call<'a> {
    /// Address of the interacting wallet
    pub caller: &'a str,
    pub input: &'a Value,
    /// `false` for views and dry-runs, whose effects are thrown away
    pub commit: bool,
}

/// Contract logic: mutate the state for the given call, or reject it
pub type Handler = Box<dyn Fn(&mut Value, &Call) -> std::result::Result<Value, String> + Send + Sync>;

/// Interaction that reached the submission stage
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub caller: String,
    pub input: Value,
    pub bundled: bool,
    /// Whether the handler accepted the interaction on evaluation
    pub accepted: bool,
}

/// In-memory contract evaluating interactions with a [`Handler`]
pub struct MemContract {
    id: String,
    state: Mutex<Value>,
    handler: Handler,
    submissions: Mutex<Vec<Submission>>,
    dry_runs: AtomicUsize,
    confirm: AtomicBool,
    unavailable: AtomicBool,
}

impl MemContract {
    pub fn new(id: &str, state: Value, handler: Handler) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            state: Mutex::new(state),
            handler,
            submissions: Mutex::new(vec![]),
            dry_runs: AtomicUsize::new(0),
            confirm: AtomicBool::new(true),
            unavailable: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Value {
        self.state.lock().unwrap().clone()
    }

    pub fn set_state(&self, state: Value) {
        *self.state.lock().unwrap() = state;
    }

    /// Apply `f` directly to the committed state
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn dry_runs(&self) -> usize {
        self.dry_runs.load(Ordering::SeqCst)
    }

    /// When unset, direct writes are accepted but reported as unconfirmed
    pub fn set_confirm(&self, confirm: bool) {
        self.confirm.store(confirm, Ordering::SeqCst);
    }

    /// When set, state can no longer be evaluated
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StateEvaluationFailed(format!("contract {} unavailable", self.id)))
        }
        Ok(())
    }

    /// Run the handler against a scratch copy of the state
    fn simulate(&self, caller: &str, input: &Value) -> Result<InteractionResult> {
        self.check_available()?;
        let mut scratch = self.state();
        let call = Call { caller, input, commit: false };

        Ok(match (self.handler)(&mut scratch, &call) {
            Ok(result) => InteractionResult::Ok { result },
            Err(error_message) => InteractionResult::Error { error_message },
        })
    }

    /// Evaluate and record a submitted interaction, returning its id
    fn submit(&self, caller: &str, input: &Value, bundled: bool) -> Result<String> {
        self.check_available()?;

        let accepted = {
            let mut state = self.state.lock().unwrap();
            let mut next = state.clone();
            let call = Call { caller, input, commit: true };
            match (self.handler)(&mut next, &call) {
                Ok(_) => {
                    *state = next;
                    true
                }
                Err(e) => {
                    debug!(target: "test_harness::mem", "[{}] rejected on evaluation: {e}", self.id);
                    false
                }
            }
        };

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(Submission {
            caller: caller.to_string(),
            input: input.clone(),
            bundled,
            accepted,
        });

        Ok(format!("{}-tx-{}", self.id, submissions.len()))
    }
}

/// Per-caller view of a [`MemContract`]
pub struct MemHandle {
    id: String,
    contract: Option<Arc<MemContract>>,
    caller: String,
}

impl MemHandle {
    pub fn new(contract: Arc<MemContract>, caller: &str) -> Self {
        Self { id: contract.id.clone(), contract: Some(contract), caller: caller.to_string() }
    }

    /// Handle for a contract id that does not exist
    pub fn missing(id: &str, caller: &str) -> Self {
        Self { id: id.to_string(), contract: None, caller: caller.to_string() }
    }

    fn contract(&self) -> Result<&MemContract> {
        match &self.contract {
            Some(c) => Ok(c),
            None => Err(Error::StateEvaluationFailed(format!("contract {} not found", self.id))),
        }
    }
}

#[async_trait]
impl ContractHandle for MemHandle {
    fn contract_id(&self) -> &str {
        &self.id
    }

    async fn read_state(&self) -> Result<Value> {
        let contract = self.contract()?;
        contract.check_available()?;
        Ok(contract.state())
    }

    async fn view_state(&self, input: &Value) -> Result<InteractionResult> {
        self.contract()?.simulate(&self.caller, input)
    }

    async fn dry_write(&self, input: &Value) -> Result<InteractionResult> {
        let contract = self.contract()?;
        contract.dry_runs.fetch_add(1, Ordering::SeqCst);
        Ok(match contract.simulate(&self.caller, input)? {
            InteractionResult::Ok { .. } => InteractionResult::Ok { result: Value::Null },
            other => other,
        })
    }

    async fn write_interaction(&self, input: &Value) -> Result<Option<String>> {
        let contract = self.contract()?;
        let id = contract.submit(&self.caller, input, false)?;
        Ok(contract.confirm.load(Ordering::SeqCst).then_some(id))
    }

    async fn bundle_interaction(&self, input: &Value) -> Result<BundleResponse> {
        let original_tx_id = self.contract()?.submit(&self.caller, input, true)?;
        Ok(BundleResponse { original_tx_id, bundlr_response: None })
    }
}

/// [`Connector`] over a set of [`MemContract`]s, acting as one caller
pub struct MemConnector {
    contracts: HashMap<String, Arc<MemContract>>,
    caller: String,
    mode: WriteMode,
}

impl MemConnector {
    pub fn new(contracts: &[Arc<MemContract>], caller: &str, mode: WriteMode) -> Self {
        let contracts = contracts.iter().map(|c| (c.id.clone(), c.clone())).collect();
        Self { contracts, caller: caller.to_string(), mode }
    }
}

impl Connector for MemConnector {
    fn handle(&self, contract_id: &str) -> Arc<dyn ContractHandle> {
        match self.contracts.get(contract_id) {
            Some(c) => Arc::new(MemHandle::new(c.clone(), &self.caller)),
            None => Arc::new(MemHandle::missing(contract_id, &self.caller)),
        }
    }

    fn write_mode(&self) -> WriteMode {
        self.mode
    }
}

/// [`StateIndex`] serving live snapshots of [`MemContract`]s
pub struct MemIndex {
    discovery: Discovery,
    contracts: HashMap<String, Arc<MemContract>>,
    queries: AtomicUsize,
}

impl MemIndex {
    /// `contracts` are reachable by id; the token is also served under
    /// its published name.
    pub fn new(discovery: Discovery, contracts: &[Arc<MemContract>]) -> Self {
        let contracts = contracts.iter().map(|c| (c.id.clone(), c.clone())).collect();
        Self { discovery, contracts, queries: AtomicUsize::new(0) }
    }

    /// Number of state queries served so far
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateIndex for MemIndex {
    async fn discover(&self) -> Result<Discovery> {
        Ok(self.discovery.clone())
    }

    async fn contract_state(&self, contract: &str) -> Result<Value> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let id = match contract {
            bundlr_contracts::faucet::TOKEN_CONTRACT => self.discovery.token.as_str(),
            id => id,
        };

        match self.contracts.get(id) {
            Some(c) => Ok(c.state()),
            None => Err(Error::HttpStatus(404, format!("Contract {contract} not found"))),
        }
    }
}
