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

use std::{fmt, ops::Add, str::FromStr};

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{Error, Result};

/// Non-negative token amount of arbitrary size.
///
/// Contracts exchange amounts as decimal strings so nothing is lost to
/// floating point on the JSON boundary. Plain JSON integers are accepted
/// on input as well.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// `self - other`, or `None` if that would go negative
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.0 < other.0 {
            return None
        }

        Some(Self(&self.0 - &other.0))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl Add<&Amount> for Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(self.0 + &rhs.0)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::ParseFailed("Amount must be a non-negative integer"))
        }

        Ok(Self(BigUint::from_str(s)?))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or its decimal string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
        Amount::from_str(v).map_err(|e| E::custom(format!("invalid amount {v:?}: {e}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn big_amounts_keep_precision() {
        let amount: Amount = serde_json::from_value(json!("123456789012345678901234")).unwrap();
        assert_eq!(amount.to_string(), "123456789012345678901234");
        assert_eq!(serde_json::to_value(&amount).unwrap(), json!("123456789012345678901234"));

        // 2^53 + 1 is the first integer an f64 cannot represent
        let amount = Amount::from_str("9007199254740993").unwrap();
        assert_eq!(amount.value(), &BigUint::from(9007199254740993_u64));
    }

    #[test]
    fn numbers_and_bad_input() {
        let amount: Amount = serde_json::from_value(json!(1500)).unwrap();
        assert_eq!(amount, Amount::from(1500));

        assert!(serde_json::from_value::<Amount>(json!(-1)).is_err());
        assert!(serde_json::from_value::<Amount>(json!("-1")).is_err());
        assert!(serde_json::from_value::<Amount>(json!("12e3")).is_err());
        assert!(Amount::from_str("").is_err());
        assert!(Amount::from_str("+5").is_err());
    }

    #[test]
    fn arithmetic() {
        let a = Amount::from(100);
        let b = Amount::from(40);
        assert_eq!(a.checked_sub(&b), Some(Amount::from(60)));
        assert_eq!(b.checked_sub(&a), None);
        assert_eq!(a + &b, Amount::from(140));
        assert!(Amount::zero().is_zero());
    }
}
