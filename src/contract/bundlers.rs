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

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Amount, ContractKind, ContractProxy};
use crate::Result;

/// Bundler staking contract
pub struct Bundlers;

impl ContractKind for Bundlers {
    const NAME: &'static str = "bundlers";

    type State = BundlerState;
    type View = BundlersView;
    type Write = BundlersWrite;
}

pub type BundlersContract = ContractProxy<Bundlers>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerState {
    /// Bundler address -> status, if the contract recorded one
    pub bundlers: BTreeMap<String, Option<String>>,
    /// Token contract the stake is held in
    pub token: String,
    /// Stake required to join
    pub stake: Amount,
    pub withdraw_delay: u64,
    #[serde(default)]
    pub allowed_interactors: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum BundlersView {
    Token,
    Stake,
    Bundlers,
    AllowedInteractors,
    WithdrawDelay,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum BundlersWrite {
    Join,
    Leave,
    Withdraw,
    SyncSlash,
    AddAllowedInteractor { interactor: String },
    RemoveAllowedInteractor { interactor: String },
}

impl ContractProxy<Bundlers> {
    pub async fn token(&self) -> Result<String> {
        self.view(&BundlersView::Token).await
    }

    pub async fn stake(&self) -> Result<Amount> {
        self.view(&BundlersView::Stake).await
    }

    pub async fn bundlers(&self) -> Result<BTreeMap<String, Option<String>>> {
        self.view(&BundlersView::Bundlers).await
    }

    pub async fn allowed_interactors(&self) -> Result<BTreeSet<String>> {
        self.view(&BundlersView::AllowedInteractors).await
    }

    pub async fn withdraw_delay(&self) -> Result<u64> {
        self.view(&BundlersView::WithdrawDelay).await
    }

    pub async fn join(&self) -> Result<Option<String>> {
        self.write(&BundlersWrite::Join).await
    }

    pub async fn leave(&self) -> Result<Option<String>> {
        self.write(&BundlersWrite::Leave).await
    }

    pub async fn withdraw(&self) -> Result<Option<String>> {
        self.write(&BundlersWrite::Withdraw).await
    }

    pub async fn sync_slash(&self) -> Result<Option<String>> {
        self.write(&BundlersWrite::SyncSlash).await
    }

    pub async fn add_allowed_interactor(&self, address: &str) -> Result<Option<String>> {
        self.write(&BundlersWrite::AddAllowedInteractor { interactor: address.to_string() }).await
    }

    pub async fn remove_allowed_interactor(&self, address: &str) -> Result<Option<String>> {
        let input = BundlersWrite::RemoveAllowedInteractor { interactor: address.to_string() };
        self.write(&input).await
    }
}
