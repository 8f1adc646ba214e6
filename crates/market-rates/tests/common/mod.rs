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

use anyhow::{bail, Result};
use market_rates::{
    host::{MarketBalances, MarketReader},
    FeeComponents, JumpRateTerms,
};
use std::cell::Cell;

/// An in-memory market with fixed state.
#[derive(Debug, Default)]
pub struct StaticMarket {
    pub terms: JumpRateTerms,
    pub fees: FeeComponents,
    pub balances: MarketBalances,
    /// Fails every read of the interest rate model.
    pub broken_model: bool,
    /// Number of reads served.
    pub reads: Cell<usize>,
}

impl MarketReader for StaticMarket {
    async fn jump_rate_terms(&self) -> Result<JumpRateTerms> {
        self.reads.set(self.reads.get() + 1);
        if self.broken_model {
            bail!("execution reverted");
        }
        Ok(self.terms)
    }

    async fn fee_components(&self) -> Result<FeeComponents> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.fees)
    }

    async fn balances(&self) -> Result<MarketBalances> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.balances)
    }
}
