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

//! Loading the model parameters of a deployed market over RPC.

use crate::{fixed::utilization_rate, FeeComponents, JumpRateTerms, RateModelParameters};
use alloy::{
    network::{Ethereum, Network},
    providers::Provider,
    sol,
};
use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use log::debug;
use std::marker::PhantomData;

sol! {
    /// Read-only interface of the jump rate interest model.
    #[sol(rpc)]
    interface IJumpRateModel {
        function baseRatePerBlock() external view returns (uint256);
        function multiplierPerBlock() external view returns (uint256);
        function jumpMultiplierPerBlock() external view returns (uint256);
        function kink() external view returns (uint256);
    }

    /// Read-only interface of a market (cToken) of a lending pool.
    #[sol(rpc)]
    interface ICToken {
        function interestRateModel() external view returns (address);
        function reserveFactorMantissa() external view returns (uint256);
        function adminFeeMantissa() external view returns (uint256);
        function fuseFeeMantissa() external view returns (uint256);
        function getCash() external view returns (uint256);
        function totalBorrows() external view returns (uint256);
        function totalReserves() external view returns (uint256);
    }
}

/// Current balances of a market, in units of the underlying token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketBalances {
    pub cash: U256,
    pub borrows: U256,
    pub reserves: U256,
}

impl MarketBalances {
    /// Returns the utilization of the market, see [utilization_rate].
    pub fn utilization(&self) -> Option<U256> {
        utilization_rate(self.cash, self.borrows, self.reserves)
    }
}

/// A source for the on-chain state of a single market.
#[allow(async_fn_in_trait)]
pub trait MarketReader {
    /// Returns the terms of the interest rate model used by the market.
    async fn jump_rate_terms(&self) -> Result<JumpRateTerms>;
    /// Returns the fee fractions withheld by the market.
    async fn fee_components(&self) -> Result<FeeComponents>;
    /// Returns the current balances of the market.
    async fn balances(&self) -> Result<MarketBalances>;
}

/// A [MarketReader] querying a market contract through an alloy [Provider].
#[derive(Clone, Debug)]
pub struct RpcMarket<P, N = Ethereum> {
    market: Address,
    provider: P,
    phantom: PhantomData<N>,
}

impl<P, N> RpcMarket<P, N>
where
    N: Network,
    P: Provider<N> + Clone,
{
    /// Creates a reader for the market at the given address.
    pub fn new(market: Address, provider: P) -> Self {
        Self {
            market,
            provider,
            phantom: PhantomData,
        }
    }

    /// Returns the address of the market contract.
    pub fn address(&self) -> Address {
        self.market
    }

    /// Returns the address of the interest rate model currently set for the market.
    pub async fn interest_rate_model(&self) -> Result<Address> {
        let market = ICToken::new(self.market, self.provider.clone());
        let model = market
            .interestRateModel()
            .call()
            .await
            .context("interestRateModel failed")?;
        debug!("market {} uses interest rate model {}", self.market, model);

        Ok(model)
    }
}

impl<P, N> MarketReader for RpcMarket<P, N>
where
    N: Network,
    P: Provider<N> + Clone,
{
    async fn jump_rate_terms(&self) -> Result<JumpRateTerms> {
        let address = self.interest_rate_model().await?;
        let model = IJumpRateModel::new(address, self.provider.clone());

        let base_rate_per_period = model
            .baseRatePerBlock()
            .call()
            .await
            .context("baseRatePerBlock failed")?;
        let multiplier_per_period = model
            .multiplierPerBlock()
            .call()
            .await
            .context("multiplierPerBlock failed")?;
        let jump_multiplier_per_period = model
            .jumpMultiplierPerBlock()
            .call()
            .await
            .context("jumpMultiplierPerBlock failed")?;
        let kink = model.kink().call().await.context("kink failed")?;

        Ok(JumpRateTerms {
            base_rate_per_period,
            multiplier_per_period,
            jump_multiplier_per_period,
            kink,
        })
    }

    async fn fee_components(&self) -> Result<FeeComponents> {
        let market = ICToken::new(self.market, self.provider.clone());

        let reserve = market
            .reserveFactorMantissa()
            .call()
            .await
            .context("reserveFactorMantissa failed")?;
        let admin = market
            .adminFeeMantissa()
            .call()
            .await
            .context("adminFeeMantissa failed")?;
        let platform = market
            .fuseFeeMantissa()
            .call()
            .await
            .context("fuseFeeMantissa failed")?;
        debug!(
            "market {}: reserve={}, admin={}, platform={}",
            self.market, reserve, admin, platform
        );

        Ok(FeeComponents {
            reserve,
            admin,
            platform,
        })
    }

    async fn balances(&self) -> Result<MarketBalances> {
        let market = ICToken::new(self.market, self.provider.clone());

        let cash = market.getCash().call().await.context("getCash failed")?;
        let borrows = market
            .totalBorrows()
            .call()
            .await
            .context("totalBorrows failed")?;
        let reserves = market
            .totalReserves()
            .call()
            .await
            .context("totalReserves failed")?;

        Ok(MarketBalances {
            cash,
            borrows,
            reserves,
        })
    }
}

/// Reads the model terms and fees of a market and combines them into a parameter snapshot.
pub async fn load_parameters<R: MarketReader>(reader: &R) -> Result<RateModelParameters> {
    let terms = reader
        .jump_rate_terms()
        .await
        .context("failed to load interest rate model")?;
    let fees = reader
        .fee_components()
        .await
        .context("failed to load market fees")?;
    let params = RateModelParameters::new(terms, fees);
    log::info!(
        "Loaded rate model: base={}, multiplier={}, jump={}, kink={}, reserve_factor={}",
        params.base_rate_per_period,
        params.multiplier_per_period,
        params.jump_multiplier_per_period,
        params.kink,
        params.reserve_factor
    );

    Ok(params)
}
