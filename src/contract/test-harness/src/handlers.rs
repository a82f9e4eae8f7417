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

//! Contract logic evaluated by the in-memory contracts. Each handler
//! decodes the state into its typed model, applies the interaction and
//! writes the state back.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use bundlr_contracts::contract::{
    bundlers::{BundlerState, BundlersView, BundlersWrite},
    token::{TokenState, TokenView, TokenWrite},
    validator::{ValidatorInfo, ValidatorState, ValidatorView, ValidatorWrite},
    Amount,
};

use crate::mem::{Call, Handler, MemContract};

type Outcome = Result<Value, String>;

/// Status of a bundler that left and waits to withdraw
pub const LEAVING: &str = "leaving";

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    serde_json::from_value(value.clone()).map_err(|e| format!("Corrupt state: {e}"))
}

fn encode<T: Serialize>(value: &T) -> Outcome {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

enum Request<V, W> {
    View(V),
    Write(W),
}

/// Decode `input` as a view first, then as a write.
fn parse<V: DeserializeOwned, W: DeserializeOwned>(input: &Value) -> Result<Request<V, W>, String> {
    if let Ok(view) = serde_json::from_value(input.clone()) {
        return Ok(Request::View(view))
    }

    match serde_json::from_value(input.clone()) {
        Ok(write) => Ok(Request::Write(write)),
        Err(_) => Err(format!("No function supplied or function not recognised: {input}")),
    }
}

fn debit(state: &mut TokenState, from: &str, amount: &Amount) -> Result<(), String> {
    match state.balance(from).checked_sub(amount) {
        Some(rest) => {
            state.balances.insert(from.to_string(), rest);
            Ok(())
        }
        None => Err(format!("Caller balance not high enough to send {amount} token(s)!")),
    }
}

fn credit(state: &mut TokenState, to: &str, amount: &Amount) {
    let balance = state.balance(to) + amount;
    state.balances.insert(to.to_string(), balance);
}

fn spend_allowance(
    state: &mut TokenState,
    owner: &str,
    spender: &str,
    amount: &Amount,
) -> Result<(), String> {
    let Some(rest) = state.allowance(owner, spender).checked_sub(amount) else {
        return Err(format!("Allowance of {spender} on {owner} not high enough to send {amount}"))
    };

    state.allowances.entry(owner.to_string()).or_default().insert(spender.to_string(), rest);
    Ok(())
}

fn positive(amount: &Amount) -> Result<(), String> {
    if amount.is_zero() {
        return Err("Invalid token amount".to_string())
    }
    Ok(())
}

/// Apply a token write on behalf of `caller`.
pub fn apply_token_write(
    state: &mut TokenState,
    caller: &str,
    write: TokenWrite,
) -> Result<(), String> {
    match write {
        TokenWrite::Transfer { to, amount } => {
            positive(&amount)?;
            debit(state, caller, &amount)?;
            credit(state, &to, &amount);
        }
        TokenWrite::TransferFrom { from, to, amount } => {
            positive(&amount)?;
            spend_allowance(state, &from, caller, &amount)?;
            debit(state, &from, &amount)?;
            credit(state, &to, &amount);
        }
        TokenWrite::Approve { spender, amount } => {
            state.allowances.entry(caller.to_string()).or_default().insert(spender, amount);
        }
        TokenWrite::Burn { amount } => {
            positive(&amount)?;
            debit(state, caller, &amount)?;
            state.total_supply = state.total_supply.checked_sub(&amount).unwrap_or_default();
        }
        TokenWrite::BurnFrom { from, amount } => {
            positive(&amount)?;
            spend_allowance(state, &from, caller, &amount)?;
            debit(state, &from, &amount)?;
            state.total_supply = state.total_supply.checked_sub(&amount).unwrap_or_default();
        }
    }

    Ok(())
}

fn token_view(state: &TokenState, view: TokenView) -> Outcome {
    Ok(match view {
        TokenView::Name => json!(state.name),
        TokenView::Symbol => json!(state.ticker),
        TokenView::Decimals => json!(state.decimals),
        TokenView::TotalSupply => encode(&state.total_supply)?,
        TokenView::BalanceOf { target } => json!({
            "balance": state.balance(&target),
            "ticker": state.ticker,
            "target": target,
        }),
        TokenView::Allowance { owner, spender } => json!({
            "allowance": state.allowance(&owner, &spender),
            "ticker": state.ticker,
            "owner": owner,
            "spender": spender,
        }),
    })
}

/// Fungible token logic
pub fn token() -> Handler {
    Box::new(|value: &mut Value, call: &Call| {
        let mut state: TokenState = decode(value)?;

        match parse::<TokenView, TokenWrite>(call.input)? {
            Request::View(view) => token_view(&state, view),
            Request::Write(write) => {
                apply_token_write(&mut state, call.caller, write)?;
                *value = encode(&state)?;
                Ok(Value::Null)
            }
        }
    })
}

/// Pull `amount` from `from` into `to` through the allowance `from` gave
/// to `spender`. Only touches the token state when `commit` is set.
fn pull_stake(
    token: &MemContract,
    spender: &str,
    from: &str,
    amount: &Amount,
    commit: bool,
) -> Result<(), String> {
    let mut state: TokenState = decode(&token.state())?;
    let write = TokenWrite::TransferFrom {
        from: from.to_string(),
        to: spender.to_string(),
        amount: amount.clone(),
    };
    apply_token_write(&mut state, spender, write)?;

    if commit {
        let next = encode(&state)?;
        token.set_state(next);
    }
    Ok(())
}

/// Return `amount` held by `holder` back to `to`.
fn release_stake(
    token: &MemContract,
    holder: &str,
    to: &str,
    amount: &Amount,
    commit: bool,
) -> Result<(), String> {
    let mut state: TokenState = decode(&token.state())?;
    let write = TokenWrite::Transfer { to: to.to_string(), amount: amount.clone() };
    if !amount.is_zero() {
        apply_token_write(&mut state, holder, write)?;
    }

    if commit {
        let next = encode(&state)?;
        token.set_state(next);
    }
    Ok(())
}

fn validator_view(state: &ValidatorState, view: ValidatorView) -> Outcome {
    Ok(match view {
        ValidatorView::Token => json!(state.token),
        ValidatorView::MinimumStake => encode(&state.minimum_stake)?,
        ValidatorView::Stake { target } => {
            let stake = state.validators.get(&target).map(|v| v.stake.clone()).unwrap_or_default();
            encode(&stake)?
        }
        ValidatorView::Validators => encode(&state.validators)?,
        ValidatorView::NominatedValidators => encode(&state.nominated_validators)?,
        ValidatorView::Epoch => encode(&state.epoch)?,
    })
}

/// Validator staking logic. Stakes are held by `self_id` in `token`.
pub fn validator(self_id: &str, token: Arc<MemContract>) -> Handler {
    let self_id = self_id.to_string();

    Box::new(move |value: &mut Value, call: &Call| {
        let mut state: ValidatorState = decode(value)?;

        let write = match parse::<ValidatorView, ValidatorWrite>(call.input)? {
            Request::View(view) => return validator_view(&state, view),
            Request::Write(write) => write,
        };

        match write {
            ValidatorWrite::Join { stake, url } => {
                if state.validators.contains_key(call.caller) {
                    return Err("Validator already joined".to_string())
                }
                if stake < state.minimum_stake {
                    return Err(format!("Stake must be at least {}", state.minimum_stake))
                }

                pull_stake(&token, &self_id, call.caller, &stake, call.commit)?;
                let info = ValidatorInfo { stake, url: url.to_string() };
                state.validators.insert(call.caller.to_string(), info);
            }
            ValidatorWrite::Leave => {
                if state.is_nominated(call.caller) {
                    return Err("Validator is nominated for the current epoch".to_string())
                }
                let Some(info) = state.validators.remove(call.caller) else {
                    return Err("Caller is not a validator".to_string())
                };

                release_stake(&token, &self_id, call.caller, &info.stake, call.commit)?;
            }
            ValidatorWrite::UpdateEpoch => {
                state.epoch.seq += 1;
                state.epoch.height += state.epoch_duration;
                state.nominated_validators = state
                    .validators
                    .keys()
                    .take(state.max_num_nominated_validators as usize)
                    .cloned()
                    .collect();
            }
        }

        *value = encode(&state)?;
        Ok(Value::Null)
    })
}

fn bundlers_view(state: &BundlerState, view: BundlersView) -> Outcome {
    Ok(match view {
        BundlersView::Token => json!(state.token),
        BundlersView::Stake => encode(&state.stake)?,
        BundlersView::Bundlers => encode(&state.bundlers)?,
        BundlersView::AllowedInteractors => encode(&state.allowed_interactors)?,
        BundlersView::WithdrawDelay => json!(state.withdraw_delay),
    })
}

/// Bundler staking logic. `owner` manages the interactor allow-list.
pub fn bundlers(self_id: &str, owner: &str, token: Arc<MemContract>) -> Handler {
    let self_id = self_id.to_string();
    let owner = owner.to_string();

    Box::new(move |value: &mut Value, call: &Call| {
        let mut state: BundlerState = decode(value)?;

        let write = match parse::<BundlersView, BundlersWrite>(call.input)? {
            Request::View(view) => return bundlers_view(&state, view),
            Request::Write(write) => write,
        };

        match write {
            BundlersWrite::Join => {
                if state.bundlers.contains_key(call.caller) {
                    return Err("Bundler already joined".to_string())
                }
                pull_stake(&token, &self_id, call.caller, &state.stake, call.commit)?;
                state.bundlers.insert(call.caller.to_string(), None);
            }
            BundlersWrite::Leave => {
                let Some(status) = state.bundlers.get_mut(call.caller) else {
                    return Err("Caller is not a bundler".to_string())
                };
                if status.is_some() {
                    return Err("Bundler is already leaving".to_string())
                }
                *status = Some(LEAVING.to_string());
            }
            BundlersWrite::Withdraw => {
                if state.bundlers.get(call.caller).and_then(|s| s.as_deref()) != Some(LEAVING) {
                    return Err("Bundler has not left".to_string())
                }
                state.bundlers.remove(call.caller);
                release_stake(&token, &self_id, call.caller, &state.stake, call.commit)?;
            }
            BundlersWrite::SyncSlash => {}
            BundlersWrite::AddAllowedInteractor { interactor } => {
                if call.caller != owner {
                    return Err("Only the owner can change allowed interactors".to_string())
                }
                state.allowed_interactors.insert(interactor);
            }
            BundlersWrite::RemoveAllowedInteractor { interactor } => {
                if call.caller != owner {
                    return Err("Only the owner can change allowed interactors".to_string())
                }
                state.allowed_interactors.remove(&interactor);
            }
        }

        *value = encode(&state)?;
        Ok(Value::Null)
    })
}
