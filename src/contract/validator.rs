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

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Amount, ContractKind, ContractProxy};
use crate::Result;

/// Validator staking contract
pub struct Validator;

impl ContractKind for Validator {
    const NAME: &'static str = "validator";

    type State = ValidatorState;
    type View = ValidatorView;
    type Write = ValidatorWrite;
}

pub type ValidatorContract = ContractProxy<Validator>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Epoch {
    pub seq: u64,
    pub tx: String,
    pub height: u64,
}

/// A validator that joined the contract
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorInfo {
    pub stake: Amount,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorState {
    pub token: String,
    pub bundler: String,
    pub bundlers_contract: String,
    pub minimum_stake: Amount,
    pub epoch: Epoch,
    pub epoch_duration: u64,
    pub max_num_nominated_validators: u32,
    pub validators: BTreeMap<String, ValidatorInfo>,
    /// Validators active in the current epoch
    pub nominated_validators: Vec<String>,
}

/// Standing of an address within a validator contract
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidatorStatus {
    /// Active in the current epoch, cannot leave
    Nominated,
    /// Staked but not active
    Joined,
    Unknown,
}

impl fmt::Display for ValidatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nominated => write!(f, "an active (nominated) validator"),
            Self::Joined => write!(f, "a joined validator, not currently nominated"),
            Self::Unknown => write!(f, "not a validator"),
        }
    }
}

impl ValidatorState {
    pub fn is_nominated(&self, address: &str) -> bool {
        self.nominated_validators.iter().any(|v| v == address)
    }

    pub fn status(&self, address: &str) -> ValidatorStatus {
        if self.is_nominated(address) {
            return ValidatorStatus::Nominated
        }

        if self.validators.contains_key(address) {
            return ValidatorStatus::Joined
        }

        ValidatorStatus::Unknown
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum ValidatorView {
    Token,
    MinimumStake,
    Stake { target: String },
    Validators,
    NominatedValidators,
    Epoch,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum ValidatorWrite {
    /// Stake `stake` tokens, which the contract pulls through an allowance
    Join { stake: Amount, url: Url },
    Leave,
    UpdateEpoch,
}

impl ContractProxy<Validator> {
    pub async fn token(&self) -> Result<String> {
        self.view(&ValidatorView::Token).await
    }

    pub async fn minimum_stake(&self) -> Result<Amount> {
        self.view(&ValidatorView::MinimumStake).await
    }

    pub async fn stake(&self, target: &str) -> Result<Amount> {
        self.view(&ValidatorView::Stake { target: target.to_string() }).await
    }

    pub async fn validators(&self) -> Result<BTreeMap<String, ValidatorInfo>> {
        self.view(&ValidatorView::Validators).await
    }

    pub async fn nominated_validators(&self) -> Result<Vec<String>> {
        self.view(&ValidatorView::NominatedValidators).await
    }

    pub async fn epoch(&self) -> Result<Epoch> {
        self.view(&ValidatorView::Epoch).await
    }

    /// Join with `stake` tokens, advertising `url` as the validator endpoint.
    /// The contract must already hold an allowance for the stake.
    pub async fn join(&self, stake: Amount, url: Url) -> Result<Option<String>> {
        self.write(&ValidatorWrite::Join { stake, url }).await
    }

    pub async fn leave(&self) -> Result<Option<String>> {
        self.write(&ValidatorWrite::Leave).await
    }

    pub async fn update_epoch(&self) -> Result<Option<String>> {
        self.write(&ValidatorWrite::UpdateEpoch).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn join_payload() {
        let input = ValidatorWrite::Join {
            stake: Amount::from(1000),
            url: Url::parse("https://validator.example/").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(input).unwrap(),
            json!({"function": "join", "stake": "1000", "url": "https://validator.example/"})
        );
        assert_eq!(
            serde_json::to_value(ValidatorView::NominatedValidators).unwrap(),
            json!({"function": "nominatedValidators"})
        );
    }

    #[test]
    fn status_of_addresses() {
        let state: ValidatorState = serde_json::from_value(json!({
            "token": "tkn",
            "minimumStake": "100",
            "validators": {
                "alice": {"stake": "100", "url": "https://a.example"},
                "bob": {"stake": "250", "url": "https://b.example"},
            },
            "nominatedValidators": ["alice"],
        }))
        .unwrap();

        assert_eq!(state.minimum_stake, Amount::from(100));
        assert_eq!(state.status("alice"), ValidatorStatus::Nominated);
        assert_eq!(state.status("bob"), ValidatorStatus::Joined);
        assert_eq!(state.status("carol"), ValidatorStatus::Unknown);
        assert_eq!(state.epoch, Epoch::default());
    }
}
