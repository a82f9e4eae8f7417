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

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use bundlr_contracts::{
    contract::Amount,
    faucet::{cached_state, TOKEN_CONTRACT},
    Result,
};

use crate::ValidatorCli;

/// The part of the token state needed for balance lookups
#[derive(Deserialize)]
struct Balances {
    #[serde(default)]
    balances: BTreeMap<String, Amount>,
}

impl ValidatorCli {
    /// Transfer `amount` tokens from the loaded wallet to `to`.
    pub async fn transfer(&self, amount: Amount, to: &str) -> Result<Option<String>> {
        let from = self.address()?;
        let token = self.token().await?;

        info!(target: "validator::transfer", "{from} -> {to}: {amount}");
        token.transfer(to, amount).await
    }

    /// Token balance of `address`, from the cached token state.
    /// Addresses holding nothing have a zero balance.
    pub async fn balance(&self, address: &str) -> Result<Amount> {
        let state: Balances = cached_state(self.index.as_ref(), TOKEN_CONTRACT).await?;
        Ok(state.balances.get(address).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bundlr_contracts::{contract::WriteMode, Error};
    use bundlr_contracts_test_harness::{Holder, TestHarness};

    use super::*;

    fn cli(th: &TestHarness, holder: Holder) -> ValidatorCli {
        ValidatorCli::new(
            th.index.clone(),
            th.connector(holder, WriteMode::Direct),
            Some(holder.wallet()),
            Duration::ZERO,
        )
    }

    #[test]
    fn balance_of_unknown_address_is_zero() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Charlie);

        smol::block_on(async {
            assert!(cli.balance("unknown-address").await.unwrap().is_zero());
            assert_eq!(cli.balance(&Holder::Bob.address()).await.unwrap(), Amount::from(10));
        });

        // Served from the cache, without touching the contracts
        assert_eq!(th.index.queries(), 2);
        assert_eq!(th.token.dry_runs(), 0);
    }

    #[test]
    fn transfer_updates_balances() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Alice);
        let charlie = Holder::Charlie.address();

        smol::block_on(async {
            cli.transfer(Amount::from(250), &charlie).await.unwrap();
            assert_eq!(cli.balance(&charlie).await.unwrap(), Amount::from(250));
        });
    }

    #[test]
    fn transfer_beyond_balance_fails_simulation() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Bob);
        let before = th.token.state();

        let res = smol::block_on(cli.transfer(Amount::from(100), &Holder::Alice.address()));
        let err = res.unwrap_err();
        assert!(matches!(err, Error::SimulationFailed(_)));
        assert!(err.to_string().starts_with("Simulated contract interaction failed! - "));

        assert!(th.token.submissions().is_empty());
        assert_eq!(th.token.state(), before);
    }
}
