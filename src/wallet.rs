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

use std::{fmt, fs};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{util::path::expand_path, Error, Result};

/// RSA JSON Web Key as stored in Arweave wallet files.
/// Private components are optional so a public key can be loaded alone.
#[derive(Clone, Deserialize, Serialize)]
pub struct Jwk {
    pub kty: String,
    /// Public modulus, also known as the wallet owner
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("n", &self.n)
            .field("e", &self.e)
            .field("private", &self.d.is_some())
            .finish()
    }
}

/// Derive the wallet address from its owner: `base64url(sha256(n))`.
pub fn address_from_owner(owner: &str) -> Result<String> {
    let modulus = URL_SAFE_NO_PAD.decode(owner.trim_end_matches('='))?;
    Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(&modulus)))
}

/// A loaded wallet together with its derived address
#[derive(Clone, Debug)]
pub struct Wallet {
    jwk: Jwk,
    address: String,
}

impl Wallet {
    pub fn from_jwk(jwk: Jwk) -> Result<Self> {
        if jwk.kty != "RSA" {
            return Err(Error::Custom(format!("Unsupported key type: {}", jwk.kty)))
        }

        let address = address_from_owner(&jwk.n)?;
        Ok(Self { jwk, address })
    }

    /// Read a JWK file. A leading `~` is expanded, relative paths resolve
    /// against the current directory.
    pub fn load(path: &str) -> Result<Self> {
        let load_err = |e: String| Error::WalletLoadFailed(path.to_string(), e);

        let file = expand_path(path)?;
        let data = fs::read(&file).map_err(|e| load_err(e.to_string()))?;
        let jwk: Jwk = serde_json::from_slice(&data).map_err(|e| load_err(e.to_string()))?;
        let wallet = Self::from_jwk(jwk).map_err(|e| load_err(e.to_string()))?;

        debug!(target: "wallet::load", "Loaded wallet {} from {file:?}", wallet.address);
        Ok(wallet)
    }

    /// Wallet address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Public modulus identifying the wallet owner
    pub fn owner(&self) -> &str {
        &self.jwk.n
    }

    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }
}
