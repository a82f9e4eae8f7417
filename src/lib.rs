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

//! Typed proxies for the Bundlr token, validator and bundler contracts.
//!
//! Contract state evaluation, signing and sequencing happen behind the
//! [`contract::ContractHandle`] seam. This crate only shapes the
//! interactions, gates writes behind a dry-run, and unwraps the result
//! envelopes into [`Error`].

pub mod error;
pub use error::{Error, Result};

/// Gateway HTTP client and its retry middleware
pub mod gateway;

/// Arweave JWK wallet handling
pub mod wallet;

/// Faucet discovery and cached contract state queries
pub mod faucet;

/// Contract handles, the generic proxy and the concrete contract models
pub mod contract;

/// Utility functions
pub mod util;

/// Returns the package description with the crate version appended,
/// for use in CLI `about` strings.
#[macro_export]
macro_rules! cli_desc {
    () => {{
        let desc = format!(
            "{} {}\n{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION"),
        );

        Box::leak(desc.into_boxed_str()) as &'static str
    }};
}
