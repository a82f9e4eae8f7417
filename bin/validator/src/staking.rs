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

use tracing::info;
use url::Url;

use bundlr_contracts::{
    contract::{
        validator::{ValidatorContract, ValidatorState, ValidatorStatus},
        Amount, ContractProxy,
    },
    faucet::cached_state,
    Error, Result,
};

use crate::{cli_util::Progress, ValidatorCli};

impl ValidatorCli {
    fn validator(&self, contract: &str) -> ValidatorContract {
        ContractProxy::connect(self.connector.as_ref(), contract)
    }

    /// Approve `stake` tokens to the validator contract, then join it.
    /// Without a stake, the contract minimum is used.
    ///
    /// An approval is not rolled back if joining fails afterwards.
    pub async fn join(
        &self,
        contract: &str,
        url: Url,
        stake: Option<Amount>,
        progress: &Progress,
    ) -> Result<Option<String>> {
        let address = self.address()?;
        let token = self.token().await?;
        let validator = self.validator(contract);

        let minimum = validator.current_state().await?.minimum_stake;
        let stake = stake.unwrap_or_else(|| minimum.clone());
        if stake < minimum {
            return Err(Error::StakeBelowMinimum(stake.to_string(), minimum.to_string()))
        }

        info!(target: "validator::join", "{address} staking {stake} in {contract}");

        progress.set_text("Approving validator contract...");
        token.approve(contract, stake.clone()).await?;

        progress.set_text("Staking in contract...");
        self.settle().await;

        progress.set_text("Joining validator contract...");
        let id = validator.join(stake, url).await?;
        self.settle().await;

        Ok(id)
    }

    /// Standing of `address` in a validator contract, from the cached state.
    pub async fn check(&self, contract: &str, address: &str) -> Result<ValidatorStatus> {
        let state: ValidatorState = cached_state(self.index.as_ref(), contract).await?;
        Ok(state.status(address))
    }

    /// Leave a validator contract. Refused while the wallet is nominated
    /// for the current epoch.
    pub async fn leave(&self, contract: &str, progress: &Progress) -> Result<Option<String>> {
        let address = self.address()?;
        let validator = self.validator(contract);

        let state = validator.current_state().await?;
        if state.is_nominated(address) {
            return Err(Error::ValidatorNominated(address.to_string()))
        }

        progress.set_text("Leaving validator contract...");
        let id = validator.leave().await?;
        self.settle().await;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bundlr_contracts::contract::{token::TokenState, WriteMode};
    use bundlr_contracts_test_harness::{
        Holder, TestHarness, MINIMUM_STAKE, TOKEN_ID, VALIDATOR_ID,
    };

    use super::*;

    fn cli(th: &TestHarness, holder: Holder) -> ValidatorCli {
        ValidatorCli::new(
            th.index.clone(),
            th.connector(holder, WriteMode::Direct),
            Some(holder.wallet()),
            Duration::ZERO,
        )
    }

    fn url() -> Url {
        Url::parse("https://validator.example.com/").unwrap()
    }

    fn balance(th: &TestHarness, address: &str) -> Amount {
        let state: TokenState = serde_json::from_value(th.token.state()).unwrap();
        state.balance(address)
    }

    #[test]
    fn join_defaults_to_minimum_stake() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Alice);
        let alice = Holder::Alice.address();
        let progress = Progress::hidden();

        smol::block_on(async {
            let id = cli.join(VALIDATOR_ID, url(), None, &progress).await.unwrap();
            assert!(id.is_some());
            assert_eq!(progress.text(), "Joining validator contract...");

            let status = cli.check(VALIDATOR_ID, &alice).await.unwrap();
            assert_eq!(status, ValidatorStatus::Joined);
        });

        assert_eq!(th.token.submissions().len(), 1);
        assert_eq!(th.validator.submissions().len(), 1);
        assert_eq!(balance(&th, VALIDATOR_ID), Amount::from(MINIMUM_STAKE));
        assert_eq!(balance(&th, &alice), Amount::from(1_000_000 - MINIMUM_STAKE));
    }

    #[test]
    fn join_rejects_low_stake_locally() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Alice);
        let progress = Progress::hidden();

        let res = smol::block_on(cli.join(
            VALIDATOR_ID,
            url(),
            Some(Amount::from(MINIMUM_STAKE - 1)),
            &progress,
        ));

        let err = res.unwrap_err();
        assert_eq!(err.to_string(), "Stake 999 is lower than the minimum required: 1000");
        assert_eq!(th.submissions(), 0);
        assert_eq!(th.token.dry_runs(), 0);
    }

    #[test]
    fn failed_join_keeps_approval() {
        let th = TestHarness::new();
        // Bob holds 10 tokens, far below the stake
        let cli = cli(&th, Holder::Bob);
        let progress = Progress::hidden();

        let res = smol::block_on(cli.join(VALIDATOR_ID, url(), None, &progress));
        assert!(matches!(res, Err(Error::SimulationFailed(_))));

        // The approval went through, the join never did
        assert_eq!(th.token.submissions().len(), 1);
        assert!(th.validator.submissions().is_empty());
    }

    #[test]
    fn leave_refused_while_nominated() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Alice);
        let progress = Progress::hidden();
        let alice = Holder::Alice.address();

        smol::block_on(async {
            cli.join(VALIDATOR_ID, url(), None, &progress).await.unwrap();
            th.validator_proxy(Holder::Bob, WriteMode::Direct).update_epoch().await.unwrap();
            assert_eq!(cli.check(VALIDATOR_ID, &alice).await.unwrap(), ValidatorStatus::Nominated);

            let submitted = th.submissions();
            let dry_runs = th.validator.dry_runs();

            let res = cli.leave(VALIDATOR_ID, &progress).await;
            assert!(matches!(res, Err(Error::ValidatorNominated(a)) if a == alice));
            assert_eq!(th.submissions(), submitted);
            assert_eq!(th.validator.dry_runs(), dry_runs);
        });
    }

    #[test]
    fn leave_returns_stake() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Alice);
        let progress = Progress::hidden();
        let alice = Holder::Alice.address();

        smol::block_on(async {
            cli.join(VALIDATOR_ID, url(), None, &progress).await.unwrap();
            cli.leave(VALIDATOR_ID, &progress).await.unwrap();
            assert_eq!(cli.check(VALIDATOR_ID, &alice).await.unwrap(), ValidatorStatus::Unknown);
        });

        assert_eq!(balance(&th, &alice), Amount::from(1_000_000));
    }

    #[test]
    fn writes_need_a_wallet() {
        let th = TestHarness::new();
        let cli = ValidatorCli::new(
            th.index.clone(),
            th.connector(Holder::Alice, WriteMode::Direct),
            None,
            Duration::ZERO,
        );

        let res = smol::block_on(cli.leave(VALIDATOR_ID, &Progress::hidden()));
        assert!(matches!(res, Err(Error::WalletRequired)));
    }

    #[test]
    fn check_unknown_contract() {
        let th = TestHarness::new();
        let cli = cli(&th, Holder::Charlie);

        let res = smol::block_on(cli.check("no-such-contract", &Holder::Charlie.address()));
        assert!(matches!(res, Err(Error::HttpStatus(404, _))));

        // The token state is not a validator state, but every field is optional
        let status = smol::block_on(cli.check(TOKEN_ID, &Holder::Charlie.address())).unwrap();
        assert_eq!(status, ValidatorStatus::Unknown);
    }
}
