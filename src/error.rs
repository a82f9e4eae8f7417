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

// Hello developer. Please add your error to the according subsection
// that is commented, or make a new subsection. Keep it clean.

/// Main result type used throughout the codebase.
pub type Result<T> = std::result::Result<T, Error>;

/// General library errors used throughout the codebase.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    // ==============
    // Parsing errors
    // ==============
    #[error("Parse failed: {0}")]
    ParseFailed(&'static str),

    #[error(transparent)]
    ParseBigIntError(#[from] num_bigint::ParseBigIntError),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error("serde_json error: {0}")]
    SerdeJsonError(String),

    #[error(transparent)]
    Base64DecodeError(#[from] base64::DecodeError),

    // ====================
    // Configuration errors
    // ====================
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("Unable to load wallet from {0}: {1}")]
    WalletLoadFailed(String, String),

    #[error("A wallet is required to sign interactions")]
    WalletRequired,

    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),

    // ======================
    // Network-related errors
    // ======================
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Gateway replied with status {0}: {1}")]
    HttpStatus(u16, String),

    // =======================
    // Contract-related errors
    // =======================
    #[error("Unable to evaluate contract state: {0}")]
    StateEvaluationFailed(String),

    /// Error message as reported by the remote contract handler
    #[error("{0}")]
    ContractError(String),

    #[error("Simulated contract interaction failed! - {0}")]
    SimulationFailed(String),

    #[error("Unable to post interaction")]
    InteractionNotPosted,

    // ====================
    // Business rule errors
    // ====================
    #[error("Stake {0} is lower than the minimum required: {1}")]
    StakeBelowMinimum(String, String),

    #[error("Address {0} is a nominated validator and cannot leave yet")]
    ValidatorNominated(String),

    // ==============
    // Catch-all
    // ==============
    #[error("{0}")]
    Custom(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.kind())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerdeJsonError(err.to_string())
    }
}

impl From<surf::Error> for Error {
    fn from(err: surf::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}
