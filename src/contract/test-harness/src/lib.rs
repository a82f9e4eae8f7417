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

//! In-memory contract network for exercising the proxies and the CLI
//! workflows without a gateway.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::json;
use tracing::{debug, dispatcher::DefaultGuard};

use bundlr_contracts::{
    contract::{
        bundlers::BundlersContract, token::TokenContract, validator::ValidatorContract,
        ContractProxy, WriteMode,
    },
    faucet::Discovery,
    util::cli::log_dispatch,
    wallet::{Jwk, Wallet},
    Result,
};

/// Shared-state contracts, handles and the cached state index
pub mod mem;
pub use mem::{MemConnector, MemContract, MemIndex, Submission};

/// Token, validator and bundler contract logic
pub mod handlers;

pub const TOKEN_ID: &str = "token-contract-id";
pub const VALIDATOR_ID: &str = "validator-contract-id";
pub const BUNDLERS_ID: &str = "bundlers-contract-id";

pub const TICKER: &str = "TEST";
pub const MINIMUM_STAKE: u64 = 1_000;
pub const BUNDLER_STAKE: u64 = 5_000;

/// Initialize the logging mechanism for the current thread.
/// Logging stops when the returned guard is dropped.
pub fn init_logger() -> Result<DefaultGuard> {
    let dispatch = log_dispatch(1, None)?;
    let guard = tracing::dispatcher::set_default(&dispatch);
    debug!(target: "test_harness", "Logger initialized");
    Ok(guard)
}

/// Enum representing available wallet holders
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Holder {
    /// Token owner, holding most of the supply
    Alice,
    /// Holds a handful of tokens
    Bob,
    /// Holds nothing
    Charlie,
}

impl Holder {
    /// Deterministic public-only wallet for the holder
    pub fn wallet(&self) -> Wallet {
        let seed = match self {
            Self::Alice => 0xa1,
            Self::Bob => 0xb0,
            Self::Charlie => 0xc4,
        };

        let jwk = Jwk {
            kty: "RSA".to_string(),
            n: URL_SAFE_NO_PAD.encode([seed; 64]),
            e: "AQAB".to_string(),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
        };

        // The modulus is valid base64url by construction
        Wallet::from_jwk(jwk).unwrap()
    }

    pub fn address(&self) -> String {
        self.wallet().address().to_string()
    }
}

/// A token, a validator contract staking it, and a bundler contract.
///
/// Genesis: Alice owns the token with 1_000_000 units, Bob holds 10 and
/// Charlie nothing. The validator contract requires [`MINIMUM_STAKE`] and
/// nominates at most two validators per epoch.
pub struct TestHarness {
    pub token: Arc<MemContract>,
    pub validator: Arc<MemContract>,
    pub bundlers: Arc<MemContract>,
    pub index: Arc<MemIndex>,
}

impl TestHarness {
    pub fn new() -> Self {
        let alice = Holder::Alice.address();
        let bob = Holder::Bob.address();

        let token = MemContract::new(
            TOKEN_ID,
            json!({
                "ticker": TICKER,
                "name": "Test Token",
                "decimals": 12,
                "totalSupply": "1000010",
                "owner": alice,
                "balances": { alice.clone(): "1000000", bob: "10" },
                "allowances": {},
            }),
            handlers::token(),
        );

        let validator = MemContract::new(
            VALIDATOR_ID,
            json!({
                "token": TOKEN_ID,
                "bundler": alice,
                "bundlersContract": BUNDLERS_ID,
                "minimumStake": MINIMUM_STAKE.to_string(),
                "epoch": { "seq": 0, "tx": "genesis", "height": 0 },
                "epochDuration": 10,
                "maxNumNominatedValidators": 2,
                "validators": {},
                "nominatedValidators": [],
            }),
            handlers::validator(VALIDATOR_ID, token.clone()),
        );

        let bundlers = MemContract::new(
            BUNDLERS_ID,
            json!({
                "bundlers": {},
                "token": TOKEN_ID,
                "stake": BUNDLER_STAKE.to_string(),
                "withdrawDelay": 10,
                "allowedInteractors": [VALIDATOR_ID],
            }),
            handlers::bundlers(BUNDLERS_ID, &alice, token.clone()),
        );

        let discovery = Discovery { token: TOKEN_ID.to_string(), bundler: BUNDLERS_ID.to_string() };
        let index = Arc::new(MemIndex::new(
            discovery,
            &[token.clone(), validator.clone(), bundlers.clone()],
        ));

        Self { token, validator, bundlers, index }
    }

    /// Connector acting as `holder`
    pub fn connector(&self, holder: Holder, mode: WriteMode) -> Arc<MemConnector> {
        let contracts = [self.token.clone(), self.validator.clone(), self.bundlers.clone()];
        Arc::new(MemConnector::new(&contracts, &holder.address(), mode))
    }

    pub fn token_proxy(&self, holder: Holder, mode: WriteMode) -> TokenContract {
        ContractProxy::connect(self.connector(holder, mode).as_ref(), TOKEN_ID)
    }

    pub fn validator_proxy(&self, holder: Holder, mode: WriteMode) -> ValidatorContract {
        ContractProxy::connect(self.connector(holder, mode).as_ref(), VALIDATOR_ID)
    }

    pub fn bundlers_proxy(&self, holder: Holder, mode: WriteMode) -> BundlersContract {
        ContractProxy::connect(self.connector(holder, mode).as_ref(), BUNDLERS_ID)
    }

    /// Total number of submissions across all contracts
    pub fn submissions(&self) -> usize {
        self.token.submissions().len() +
            self.validator.submissions().len() +
            self.bundlers.submissions().len()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
