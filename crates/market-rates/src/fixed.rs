// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-point arithmetic on the `10^18` mantissa scale used by the lending contracts.

use alloy_primitives::{uint, U256, U512};

/// The scale of all on-chain rates and fractions, `1.0 == 10^18`.
pub const MANTISSA: U256 = uint!(1000000000000000000_U256);

/// One percent on the mantissa scale.
pub const PERCENT: U256 = uint!(10000000000000000_U256);

/// Multiplies two mantissas and rescales the product back to `10^18`, rounding down.
///
/// The product is formed in 512 bits, so it cannot overflow. A quotient that does not fit into
/// 256 bits saturates at [U256::MAX].
#[inline]
pub fn mul_mantissa(a: U256, b: U256) -> U256 {
    let product = U512::from(a) * U512::from(b);
    U256::saturating_from(product / U512::from(MANTISSA))
}

/// Returns `percent`% on the mantissa scale.
#[inline]
pub fn from_percent(percent: u8) -> U256 {
    U256::from(percent) * PERCENT
}

/// Converts a mantissa into the plain fraction it represents, i.e. `value / 10^18`.
pub fn to_f64(value: U256) -> f64 {
    const LIMB: f64 = 18446744073709551616.0; // 2^64
    let raw = value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * LIMB + limb as f64);
    raw / 1e18
}

/// Computes the utilization of a market the way the interest rate model contract does:
/// `borrows / (cash + borrows - reserves)`.
///
/// Returns zero when nothing is borrowed and `None` when the reserves exhaust the supplied
/// funds.
pub fn utilization_rate(cash: U256, borrows: U256, reserves: U256) -> Option<U256> {
    if borrows.is_zero() {
        return Some(U256::ZERO);
    }
    let supplied = cash.checked_add(borrows)?.checked_sub(reserves)?;
    if supplied.is_zero() {
        return None;
    }
    let scaled = U512::from(borrows) * U512::from(MANTISSA);
    Some(U256::saturating_from(scaled / U512::from(supplied)))
}
