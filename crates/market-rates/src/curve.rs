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

use crate::fixed::to_f64;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Exponent used when compounding a per-period rate into a yearly yield.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// A single point of an APY chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCurvePoint {
    /// Utilization in whole percent, 0 to 100.
    #[serde(rename = "x")]
    pub utilization_percent: u8,
    /// Annual percentage yield, e.g. `4.5` for 4.5%.
    #[serde(rename = "y")]
    pub apy: f64,
}

/// The borrow and supply APY curves of a market, ordered by ascending utilization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCurves {
    pub borrow: Vec<RateCurvePoint>,
    pub supply: Vec<RateCurvePoint>,
}

impl RateCurves {
    /// Returns the borrow and supply point at the given utilization percent.
    pub fn at(&self, percent: u8) -> Option<(RateCurvePoint, RateCurvePoint)> {
        let index = percent as usize;
        Some((*self.borrow.get(index)?, *self.supply.get(index)?))
    }
}

/// Compounds a per-period rate into an annual percentage yield:
/// `((rate / 10^18 * periods_per_year + 1) ^ 365 - 1) * 100`.
///
/// The exponent is always [DAYS_PER_YEAR], independent of `periods_per_year`. Callers charting
/// block-based markets pass the number of blocks per day as the step, which makes the result a
/// daily compounded APY. The step is a float because block rates are often fractional, e.g.
/// 28.5 blocks per minute.
pub fn annualize(rate: U256, periods_per_year: f64) -> f64 {
    let step = to_f64(rate) * periods_per_year + 1.0;
    (step.powf(DAYS_PER_YEAR) - 1.0) * 100.0
}
