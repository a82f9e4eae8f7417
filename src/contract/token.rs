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

use serde::{Deserialize, Serialize};

use super::{Amount, ContractKind, ContractProxy};
use crate::Result;

/// Fungible token contract
pub struct Token;

impl ContractKind for Token {
    const NAME: &'static str = "token";

    type State = TokenState;
    type View = TokenView;
    type Write = TokenWrite;
}

pub type TokenContract = ContractProxy<Token>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenState {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    pub decimals: u8,
    pub total_supply: Amount,
    pub owner: String,
    #[serde(default)]
    pub balances: BTreeMap<String, Amount>,
    /// owner -> spender -> allowance
    #[serde(default)]
    pub allowances: BTreeMap<String, BTreeMap<String, Amount>>,
}

impl TokenState {
    /// Balance of `address`, zero if it holds nothing.
    pub fn balance(&self, address: &str) -> Amount {
        self.balances.get(address).cloned().unwrap_or_default()
    }

    /// Amount `spender` may move on behalf of `owner`.
    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.allowances.get(owner).and_then(|s| s.get(spender)).cloned().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Balance {
    pub balance: Amount,
    pub ticker: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Allowance {
    pub allowance: Amount,
    pub ticker: String,
    pub owner: String,
    pub spender: String,
}

/// Read-only token interactions
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum TokenView {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf { target: String },
    Allowance { owner: String, spender: String },
}

/// State-changing token interactions
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum TokenWrite {
    Transfer { to: String, amount: Amount },
    TransferFrom { from: String, to: String, amount: Amount },
    Approve { spender: String, amount: Amount },
    Burn { amount: Amount },
    BurnFrom { from: String, amount: Amount },
}

impl ContractProxy<Token> {
    pub async fn name(&self) -> Result<Option<String>> {
        self.view(&TokenView::Name).await
    }

    pub async fn symbol(&self) -> Result<String> {
        self.view(&TokenView::Symbol).await
    }

    pub async fn decimals(&self) -> Result<u8> {
        self.view(&TokenView::Decimals).await
    }

    pub async fn total_supply(&self) -> Result<Amount> {
        self.view(&TokenView::TotalSupply).await
    }

    pub async fn balance_of(&self, target: &str) -> Result<Balance> {
        self.view(&TokenView::BalanceOf { target: target.to_string() }).await
    }

    pub async fn allowance(&self, owner: &str, spender: &str) -> Result<Allowance> {
        let input = TokenView::Allowance { owner: owner.to_string(), spender: spender.to_string() };
        self.view(&input).await
    }

    pub async fn transfer(&self, to: &str, amount: Amount) -> Result<Option<String>> {
        self.write(&TokenWrite::Transfer { to: to.to_string(), amount }).await
    }

    pub async fn transfer_from(&self, from: &str, to: &str, amount: Amount) -> Result<Option<String>> {
        let input = TokenWrite::TransferFrom { from: from.to_string(), to: to.to_string(), amount };
        self.write(&input).await
    }

    /// Allow `spender` to move up to `amount` of the caller's tokens.
    pub async fn approve(&self, spender: &str, amount: Amount) -> Result<Option<String>> {
        self.write(&TokenWrite::Approve { spender: spender.to_string(), amount }).await
    }

    pub async fn burn(&self, amount: Amount) -> Result<Option<String>> {
        self.write(&TokenWrite::Burn { amount }).await
    }

    pub async fn burn_from(&self, from: &str, amount: Amount) -> Result<Option<String>> {
        self.write(&TokenWrite::BurnFrom { from: from.to_string(), amount }).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_shapes() {
        let v = serde_json::to_value(TokenView::TotalSupply).unwrap();
        assert_eq!(v, json!({"function": "totalSupply"}));

        let v = serde_json::to_value(TokenView::BalanceOf { target: "alice".into() }).unwrap();
        assert_eq!(v, json!({"function": "balanceOf", "target": "alice"}));

        let v = serde_json::to_value(TokenWrite::TransferFrom {
            from: "alice".into(),
            to: "bob".into(),
            amount: Amount::from(7),
        })
        .unwrap();
        assert_eq!(v, json!({"function": "transferFrom", "from": "alice", "to": "bob", "amount": "7"}));

        let v = serde_json::to_value(TokenWrite::BurnFrom { from: "a".into(), amount: Amount::from(1) })
            .unwrap();
        assert_eq!(v, json!({"function": "burnFrom", "from": "a", "amount": "1"}));
    }

    #[test]
    fn state_lookups() {
        let state: TokenState = serde_json::from_value(json!({
            "ticker": "BNDLR",
            "name": null,
            "decimals": 12,
            "totalSupply": "1000000000000000000000000",
            "owner": "alice",
            "balances": {"alice": "999999999999999999999990", "bob": "10"},
            "allowances": {"alice": {"validator": "500"}},
        }))
        .unwrap();

        assert_eq!(state.name, None);
        assert_eq!(state.balance("bob"), Amount::from(10));
        assert_eq!(state.balance("nobody"), Amount::zero());
        assert_eq!(state.allowance("alice", "validator"), Amount::from(500));
        assert_eq!(state.allowance("bob", "validator"), Amount::zero());
    }
}
