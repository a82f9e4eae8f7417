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

use serde_json::json;
use url::Url;

use bundlr_contracts::{
    contract::{
        token::TokenState,
        validator::{ValidatorStatus, ValidatorWrite},
        Amount, ContractHandle, Connector, InteractionResult, WriteMode,
    },
    Error,
};
use bundlr_contracts_test_harness::{
    handlers::LEAVING, init_logger, Holder, TestHarness, BUNDLER_STAKE, MINIMUM_STAKE, TICKER,
    TOKEN_ID, VALIDATOR_ID,
};

fn token_state(th: &TestHarness) -> TokenState {
    serde_json::from_value(th.token.state()).unwrap()
}

#[test]
fn token_views() {
    let _log = init_logger().unwrap();
    let th = TestHarness::new();
    let token = th.token_proxy(Holder::Bob, WriteMode::Direct);

    smol::block_on(async {
        assert_eq!(token.symbol().await.unwrap(), TICKER);
        assert_eq!(token.name().await.unwrap().as_deref(), Some("Test Token"));
        assert_eq!(token.decimals().await.unwrap(), 12);
        assert_eq!(token.total_supply().await.unwrap(), Amount::from(1_000_010));

        let bob = token.balance_of(&Holder::Bob.address()).await.unwrap();
        assert_eq!(bob.balance, Amount::from(10));
        assert_eq!(bob.ticker, TICKER);
        assert_eq!(bob.target, Holder::Bob.address());

        let charlie = token.balance_of(&Holder::Charlie.address()).await.unwrap();
        assert!(charlie.balance.is_zero());

        let state = token.current_state().await.unwrap();
        assert_eq!(state.owner, Holder::Alice.address());
    });

    // Views are never submitted
    assert_eq!(th.submissions(), 0);
}

#[test]
fn view_error_carries_remote_message() {
    let th = TestHarness::new();
    let handle = th.connector(Holder::Alice, WriteMode::Direct).handle(TOKEN_ID);

    smol::block_on(async {
        let res = handle.view_state(&json!({"function": "mint"})).await.unwrap();
        let InteractionResult::Error { error_message } = res.clone() else {
            panic!("expected an error envelope, got {res:?}")
        };

        let err = res.into_result().unwrap_err();
        assert!(matches!(&err, Error::ContractError(_)));
        assert_eq!(err.to_string(), error_message);
    });
}

#[test]
fn transfer_moves_balance() {
    let th = TestHarness::new();
    let token = th.token_proxy(Holder::Alice, WriteMode::Direct);
    let bob = Holder::Bob.address();

    let id = smol::block_on(token.transfer(&bob, Amount::from(100))).unwrap();
    assert!(id.is_some());

    let state = token_state(&th);
    assert_eq!(state.balance(&bob), Amount::from(110));
    assert_eq!(state.balance(&Holder::Alice.address()), Amount::from(999_900));

    assert_eq!(th.token.dry_runs(), 1);
    let subs = th.token.submissions();
    assert_eq!(subs.len(), 1);
    assert!(subs[0].accepted);
    assert!(!subs[0].bundled);
    assert_eq!(subs[0].input, json!({"function": "transfer", "to": bob, "amount": "100"}));
}

#[test]
fn failed_dry_run_submits_nothing() {
    let th = TestHarness::new();
    let token = th.token_proxy(Holder::Bob, WriteMode::Direct);
    let before = th.token.state();

    let res = smol::block_on(token.transfer(&Holder::Charlie.address(), Amount::from(100)));
    match res {
        Err(Error::SimulationFailed(msg)) => assert!(msg.contains("balance not high enough")),
        other => panic!("unexpected result: {other:?}"),
    }

    assert_eq!(th.token.dry_runs(), 1);
    assert!(th.token.submissions().is_empty());
    assert_eq!(th.token.state(), before);

    let err = Error::SimulationFailed("Caller balance not high enough".into());
    assert_eq!(
        err.to_string(),
        "Simulated contract interaction failed! - Caller balance not high enough"
    );
}

#[test]
fn bundled_write_returns_original_tx_id() {
    let th = TestHarness::new();
    let token = th.token_proxy(Holder::Alice, WriteMode::Bundled);
    assert_eq!(token.mode(), WriteMode::Bundled);

    let id = smol::block_on(token.approve(VALIDATOR_ID, Amount::from(1_000))).unwrap();
    assert_eq!(id.as_deref(), Some("token-contract-id-tx-1"));

    let subs = th.token.submissions();
    assert_eq!(subs.len(), 1);
    assert!(subs[0].bundled);
    assert_eq!(
        token_state(&th).allowance(&Holder::Alice.address(), VALIDATOR_ID),
        Amount::from(1_000)
    );
}

#[test]
fn unconfirmed_direct_write() {
    let th = TestHarness::new();
    th.token.set_confirm(false);
    let token = th.token_proxy(Holder::Alice, WriteMode::Direct);

    let id = smol::block_on(token.burn(Amount::from(10))).unwrap();
    assert_eq!(id, None);

    // Accepted regardless
    assert_eq!(token_state(&th).total_supply, Amount::from(1_000_000));
}

#[test]
fn allowance_gates_transfer_from() {
    let th = TestHarness::new();
    let alice = Holder::Alice.address();
    let bob = Holder::Bob.address();
    let charlie = Holder::Charlie.address();

    let by_alice = th.token_proxy(Holder::Alice, WriteMode::Direct);
    let by_bob = th.token_proxy(Holder::Bob, WriteMode::Direct);

    smol::block_on(async {
        let res = by_bob.transfer_from(&alice, &charlie, Amount::from(5)).await;
        assert!(matches!(res, Err(Error::SimulationFailed(_))));

        by_alice.approve(&bob, Amount::from(5)).await.unwrap();
        assert_eq!(by_bob.allowance(&alice, &bob).await.unwrap().allowance, Amount::from(5));

        by_bob.transfer_from(&alice, &charlie, Amount::from(5)).await.unwrap();
        assert_eq!(by_bob.balance_of(&charlie).await.unwrap().balance, Amount::from(5));
        assert!(by_bob.allowance(&alice, &bob).await.unwrap().allowance.is_zero());

        by_alice.approve(&bob, Amount::from(3)).await.unwrap();
        by_bob.burn_from(&alice, Amount::from(3)).await.unwrap();
        assert_eq!(by_bob.total_supply().await.unwrap(), Amount::from(1_000_007));
    });
}

#[test]
fn validator_lifecycle() {
    let th = TestHarness::new();
    let alice = Holder::Alice.address();
    let token = th.token_proxy(Holder::Alice, WriteMode::Direct);
    let validator = th.validator_proxy(Holder::Alice, WriteMode::Direct);
    let url = Url::parse("https://validator.example.com/").unwrap();

    smol::block_on(async {
        assert_eq!(validator.token().await.unwrap(), TOKEN_ID);
        assert_eq!(validator.minimum_stake().await.unwrap(), Amount::from(MINIMUM_STAKE));

        // No allowance yet
        let res = validator.join(Amount::from(MINIMUM_STAKE), url.clone()).await;
        assert!(matches!(res, Err(Error::SimulationFailed(_))));
        assert!(th.validator.submissions().is_empty());

        token.approve(VALIDATOR_ID, Amount::from(MINIMUM_STAKE)).await.unwrap();
        validator.join(Amount::from(MINIMUM_STAKE), url).await.unwrap();

        assert_eq!(validator.stake(&alice).await.unwrap(), Amount::from(MINIMUM_STAKE));
        assert_eq!(token.balance_of(VALIDATOR_ID).await.unwrap().balance, Amount::from(MINIMUM_STAKE));

        let state = validator.current_state().await.unwrap();
        assert_eq!(state.status(&alice), ValidatorStatus::Joined);

        validator.update_epoch().await.unwrap();
        assert_eq!(validator.epoch().await.unwrap().seq, 1);
        assert_eq!(validator.nominated_validators().await.unwrap(), vec![alice.clone()]);

        let res = validator.leave().await;
        assert!(matches!(res, Err(Error::SimulationFailed(_))));
    });

    // Only approve, join and updateEpoch made it through
    assert_eq!(th.submissions(), 3);
    let inputs: Vec<_> = th.validator.submissions().into_iter().map(|s| s.input).collect();
    assert_eq!(inputs[1], serde_json::to_value(ValidatorWrite::UpdateEpoch).unwrap());
}

#[test]
fn bundler_lifecycle() {
    let th = TestHarness::new();
    let alice = Holder::Alice.address();
    let token = th.token_proxy(Holder::Alice, WriteMode::Direct);
    let bundlers = th.bundlers_proxy(Holder::Alice, WriteMode::Direct);
    let bundlers_id = th.bundlers.id().to_string();

    smol::block_on(async {
        assert_eq!(bundlers.stake().await.unwrap(), Amount::from(BUNDLER_STAKE));
        assert_eq!(bundlers.withdraw_delay().await.unwrap(), 10);
        assert!(bundlers.allowed_interactors().await.unwrap().contains(VALIDATOR_ID));

        token.approve(&bundlers_id, Amount::from(BUNDLER_STAKE)).await.unwrap();
        bundlers.join().await.unwrap();
        assert_eq!(bundlers.bundlers().await.unwrap().get(&alice), Some(&None));

        // Must leave before withdrawing
        assert!(matches!(bundlers.withdraw().await, Err(Error::SimulationFailed(_))));

        bundlers.leave().await.unwrap();
        assert_eq!(
            bundlers.bundlers().await.unwrap().get(&alice),
            Some(&Some(LEAVING.to_string()))
        );

        bundlers.withdraw().await.unwrap();
        assert!(bundlers.bundlers().await.unwrap().is_empty());
        assert_eq!(token.balance_of(&alice).await.unwrap().balance, Amount::from(1_000_000));

        bundlers.add_allowed_interactor(&alice).await.unwrap();
        assert!(bundlers.allowed_interactors().await.unwrap().contains(&alice));
        bundlers.remove_allowed_interactor(&alice).await.unwrap();
        assert!(!bundlers.allowed_interactors().await.unwrap().contains(&alice));
    });

    let by_bob = th.bundlers_proxy(Holder::Bob, WriteMode::Direct);
    let res = smol::block_on(by_bob.add_allowed_interactor("anyone"));
    assert!(matches!(res, Err(Error::SimulationFailed(_))));
}

#[test]
fn unavailable_state_fails_evaluation() {
    let th = TestHarness::new();
    th.validator.set_unavailable(true);
    let validator = th.validator_proxy(Holder::Alice, WriteMode::Direct);

    let res = smol::block_on(validator.current_state());
    assert!(matches!(res, Err(Error::StateEvaluationFailed(_))));

    let missing = th.connector(Holder::Alice, WriteMode::Direct).handle("nope");
    assert_eq!(missing.contract_id(), "nope");
    assert!(smol::block_on(missing.read_state()).is_err());
}
