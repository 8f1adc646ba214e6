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

use crate::{
    curve::{annualize, RateCurvePoint, RateCurves},
    fixed::{from_percent, mul_mantissa, MANTISSA},
};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// The terms of a deployed jump rate model, each scaled by `10^18`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpRateTerms {
    pub base_rate_per_period: U256,
    pub multiplier_per_period: U256,
    pub jump_multiplier_per_period: U256,
    /// Utilization at which the jump multiplier takes over.
    pub kink: U256,
}

/// The fee fractions a market withholds from the interest paid by borrowers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponents {
    pub reserve: U256,
    pub admin: U256,
    /// Fee taken by the pool platform (`fuseFeeMantissa`).
    pub platform: U256,
}

impl FeeComponents {
    /// Returns the combined fraction kept from suppliers.
    pub fn total(&self) -> U256 {
        self.reserve
            .saturating_add(self.admin)
            .saturating_add(self.platform)
    }
}

/// Snapshot of everything needed to evaluate the rate curve of a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateModelParameters {
    pub base_rate_per_period: U256,
    pub multiplier_per_period: U256,
    pub jump_multiplier_per_period: U256,
    pub kink: U256,
    /// Sum of the reserve, admin and platform fee fractions.
    pub reserve_factor: U256,
}

impl RateModelParameters {
    /// Combines the model terms with the fees of the market using it.
    pub fn new(terms: JumpRateTerms, fees: FeeComponents) -> Self {
        Self {
            base_rate_per_period: terms.base_rate_per_period,
            multiplier_per_period: terms.multiplier_per_period,
            jump_multiplier_per_period: terms.jump_multiplier_per_period,
            kink: terms.kink,
            reserve_factor: fees.total(),
        }
    }
}

/// The two-segment interest rate curve of a market.
///
/// A model can only be created from a complete [RateModelParameters] snapshot and is immutable
/// afterwards, so it can be shared freely between threads.
///
/// Rates are quoted per period (usually per block) on the `10^18` mantissa scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpRateModel {
    params: RateModelParameters,
}

impl From<RateModelParameters> for JumpRateModel {
    fn from(params: RateModelParameters) -> Self {
        Self::new(params)
    }
}

impl JumpRateModel {
    /// Number of points per curve, one per utilization percent.
    pub const CURVE_POINTS: usize = 101;

    /// Creates the model from a parameter snapshot.
    pub const fn new(params: RateModelParameters) -> Self {
        Self { params }
    }

    /// Returns the parameters the model was created with.
    #[inline]
    pub fn parameters(&self) -> &RateModelParameters {
        &self.params
    }

    /// Returns the borrow rate per period at the given utilization.
    ///
    /// Utilization above `10^18` is not clamped; the jump segment simply continues.
    pub fn borrow_rate(&self, utilization: U256) -> U256 {
        let p = &self.params;
        if utilization <= p.kink {
            return mul_mantissa(utilization, p.multiplier_per_period)
                .saturating_add(p.base_rate_per_period);
        }

        let normal_rate =
            mul_mantissa(p.kink, p.multiplier_per_period).saturating_add(p.base_rate_per_period);
        let excess = utilization - p.kink;
        mul_mantissa(excess, p.jump_multiplier_per_period).saturating_add(normal_rate)
    }

    /// Returns the supply rate per period at the given utilization.
    ///
    /// A reserve factor of 100% or more leaves nothing for suppliers.
    pub fn supply_rate(&self, utilization: U256) -> U256 {
        let retained = MANTISSA.saturating_sub(self.params.reserve_factor);
        let to_suppliers = mul_mantissa(self.borrow_rate(utilization), retained);
        mul_mantissa(utilization, to_suppliers)
    }

    /// Samples the annualized borrow and supply yields at every utilization percent from 0 to
    /// 100.
    ///
    /// Each per-period rate is compounded with [annualize], i.e. `periods_per_year` is the
    /// multiplicative step applied before raising to the 365th power. It is a float so that
    /// fractional block rates (blocks per minute times minutes per day) can be passed unrounded.
    pub fn curves(&self, periods_per_year: f64) -> RateCurves {
        let mut borrow = Vec::with_capacity(Self::CURVE_POINTS);
        let mut supply = Vec::with_capacity(Self::CURVE_POINTS);
        for percent in 0..=100u8 {
            let utilization = from_percent(percent);
            borrow.push(RateCurvePoint {
                utilization_percent: percent,
                apy: annualize(self.borrow_rate(utilization), periods_per_year),
            });
            supply.push(RateCurvePoint {
                utilization_percent: percent,
                apy: annualize(self.supply_rate(utilization), periods_per_year),
            });
        }

        RateCurves { borrow, supply }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::uint;

    fn example() -> JumpRateModel {
        JumpRateModel::new(RateModelParameters {
            base_rate_per_period: U256::ZERO,
            multiplier_per_period: uint!(100000000000000000_U256),
            jump_multiplier_per_period: uint!(5000000000000000000_U256),
            kink: uint!(800000000000000000_U256),
            reserve_factor: uint!(100000000000000000_U256),
        })
    }

    fn with_base() -> JumpRateModel {
        JumpRateModel::new(RateModelParameters {
            base_rate_per_period: uint!(951293759_U256),
            multiplier_per_period: uint!(19025875190_U256),
            jump_multiplier_per_period: uint!(475646879756_U256),
            kink: uint!(850000000000000000_U256),
            reserve_factor: uint!(250000000000000000_U256),
        })
    }

    #[test]
    fn borrow_rate_below_kink() {
        let model = example();
        assert_eq!(
            model.borrow_rate(uint!(400000000000000000_U256)),
            uint!(40000000000000000_U256)
        );
    }

    #[test]
    fn borrow_rate_above_kink() {
        let model = example();
        assert_eq!(
            model.borrow_rate(uint!(900000000000000000_U256)),
            uint!(580000000000000000_U256)
        );
    }

    #[test]
    fn borrow_rate_is_linear_below_kink() {
        let model = with_base();
        let p = *model.parameters();
        for percent in 0..=85u8 {
            let utilization = from_percent(percent);
            let expected =
                utilization * p.multiplier_per_period / MANTISSA + p.base_rate_per_period;
            assert_eq!(model.borrow_rate(utilization), expected, "at {percent}%");
        }
        assert_eq!(model.borrow_rate(U256::ZERO), p.base_rate_per_period);
    }

    #[test]
    fn borrow_rate_is_continuous_at_kink() {
        for model in [example(), with_base()] {
            let p = model.parameters();
            let at_kink = model.borrow_rate(p.kink);
            let normal_rate =
                mul_mantissa(p.kink, p.multiplier_per_period) + p.base_rate_per_period;
            assert_eq!(at_kink, normal_rate);
            // one wei above the kink only adds the rounded-down jump term
            let above = model.borrow_rate(p.kink + U256::from(1));
            assert!(above >= at_kink);
            assert!(above - at_kink <= p.jump_multiplier_per_period / MANTISSA + U256::from(1));
        }
    }

    #[test]
    fn supply_rate_example() {
        let model = example();
        // 4e16 * 0.9 * 0.4
        assert_eq!(
            model.supply_rate(uint!(400000000000000000_U256)),
            uint!(14400000000000000_U256)
        );
        assert_eq!(model.supply_rate(U256::ZERO), U256::ZERO);
    }

    #[test]
    fn supply_rate_never_exceeds_borrow_rate() {
        for model in [example(), with_base()] {
            for percent in 0..=100u8 {
                let utilization = from_percent(percent);
                assert!(
                    model.supply_rate(utilization) <= model.borrow_rate(utilization),
                    "at {percent}%"
                );
            }
        }
    }

    #[test]
    fn reserve_factor_above_one() {
        let mut params = *example().parameters();
        params.reserve_factor = MANTISSA + U256::from(1);
        let model = JumpRateModel::from(params);
        assert_eq!(model.supply_rate(from_percent(50)), U256::ZERO);
        assert!(model.borrow_rate(from_percent(50)) > U256::ZERO);
    }

    #[test]
    fn utilization_above_one() {
        let model = example();
        // 150%: 0.08 + 0.7 * 5
        let utilization = uint!(1500000000000000000_U256);
        assert_eq!(
            model.borrow_rate(utilization),
            uint!(3580000000000000000_U256)
        );
        // with utilization above 100% suppliers receive more than borrowers pay
        let supply = model.supply_rate(utilization);
        assert_eq!(supply, uint!(4833000000000000000_U256));
        assert!(supply > model.borrow_rate(utilization));
    }

    #[test]
    fn extreme_parameters_saturate() {
        let model = JumpRateModel::new(RateModelParameters {
            base_rate_per_period: U256::MAX,
            multiplier_per_period: U256::MAX,
            jump_multiplier_per_period: U256::MAX,
            kink: U256::ZERO,
            reserve_factor: U256::ZERO,
        });
        assert_eq!(model.borrow_rate(MANTISSA), U256::MAX);
        assert_eq!(model.supply_rate(U256::MAX), U256::MAX);
    }

    #[test]
    fn parameters_from_components() {
        let terms = JumpRateTerms {
            base_rate_per_period: U256::from(1),
            multiplier_per_period: U256::from(2),
            jump_multiplier_per_period: U256::from(3),
            kink: U256::from(4),
        };
        let fees = FeeComponents {
            reserve: uint!(100000000000000000_U256),
            admin: uint!(50000000000000000_U256),
            platform: uint!(10000000000000000_U256),
        };
        let params = RateModelParameters::new(terms, fees);
        assert_eq!(params.reserve_factor, uint!(160000000000000000_U256));
        assert_eq!(params.kink, U256::from(4));
        assert_eq!(params.jump_multiplier_per_period, U256::from(3));
    }

    #[test]
    fn curves_have_every_percent() {
        let curves = with_base().curves(30.0 * 60.0 * 24.0);
        for curve in [&curves.borrow, &curves.supply] {
            assert_eq!(curve.len(), JumpRateModel::CURVE_POINTS);
            for (i, point) in curve.iter().enumerate() {
                assert_eq!(point.utilization_percent as usize, i);
            }
        }
    }

    #[test]
    fn curves_use_per_period_rates() {
        let model = with_base();
        let periods = 43_200.0;
        let curves = model.curves(periods);
        for percent in [0u8, 42, 85, 86, 100] {
            let utilization = from_percent(percent);
            let point = curves.borrow[percent as usize];
            assert_eq!(point.apy, annualize(model.borrow_rate(utilization), periods));
            let point = curves.supply[percent as usize];
            assert_eq!(point.apy, annualize(model.supply_rate(utilization), periods));
        }
        // the borrow curve is monotonic and dominates the supply curve
        for pair in curves.borrow.windows(2) {
            assert!(pair[0].apy <= pair[1].apy);
        }
        for (borrow, supply) in curves.borrow.iter().zip(&curves.supply) {
            assert!(supply.apy <= borrow.apy);
        }
    }

    #[test]
    fn curves_accept_fractional_periods() {
        let model = with_base();
        let periods = 28.5 * 60.0 * 24.0;
        let curves = model.curves(periods);
        let utilization = from_percent(50);
        assert_eq!(
            curves.borrow[50].apy,
            annualize(model.borrow_rate(utilization), periods)
        );
        assert!(curves.borrow[50].apy > model.curves(28.0 * 60.0 * 24.0).borrow[50].apy);
    }

    #[test]
    fn zero_rates_yield_zero() {
        let curves = example().curves(43_200.0);
        assert_eq!(curves.borrow[0].apy, 0.0);
        assert_eq!(curves.supply[0].apy, 0.0);
    }
}
