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

use alloy::providers::ProviderBuilder;
use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use market_rates::{
    fixed::to_f64,
    host::{load_parameters, MarketReader, RpcMarket},
    permit::{permit_domain, PermitRequest},
    JumpRateModel, RateCurvePoint, RateCurves, RateModelParameters,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Print the borrow and supply APY curves of a lending market.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: Format,
}

/// Options of the subcommands printing rate curves.
#[derive(ClapArgs, Debug)]
struct CurveArgs {
    /// Number of blocks produced per minute on the chain of the market
    #[arg(long, default_value_t = 30.0)]
    blocks_per_minute: f64,
    /// Only print the rates at this utilization percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    at: Option<u8>,
}

impl CurveArgs {
    /// The compounding step is the number of blocks per day.
    fn periods(&self) -> f64 {
        self.blocks_per_minute * 60.0 * 24.0
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the model parameters of a deployed market
    Rpc {
        /// URL of the RPC endpoint
        #[arg(long, env = "RPC_URL")]
        rpc_url: Url,
        /// Address of the market (cToken) contract
        #[arg(long)]
        market: Address,
        #[command(flatten)]
        curve: CurveArgs,
    },
    /// Use explicit model parameters, each scaled by 10^18
    Params {
        #[command(flatten)]
        params: ParamsArgs,
        #[command(flatten)]
        curve: CurveArgs,
    },
    /// Print the EIP-712 digest of an unlimited permit for a token
    Permit(PermitArgs),
}

#[derive(ClapArgs, Debug)]
struct ParamsArgs {
    #[arg(long, default_value = "0")]
    base_rate: U256,
    #[arg(long)]
    multiplier: U256,
    #[arg(long)]
    jump_multiplier: U256,
    #[arg(long)]
    kink: U256,
    /// Sum of the reserve, admin and platform fees
    #[arg(long, default_value = "0")]
    reserve_factor: U256,
}

impl From<ParamsArgs> for RateModelParameters {
    fn from(args: ParamsArgs) -> Self {
        RateModelParameters {
            base_rate_per_period: args.base_rate,
            multiplier_per_period: args.multiplier,
            jump_multiplier_per_period: args.jump_multiplier,
            kink: args.kink,
            reserve_factor: args.reserve_factor,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct PermitArgs {
    /// Address of the token contract
    #[arg(long)]
    token: Address,
    /// Name of the token, as returned by `name()`
    #[arg(long)]
    name: String,
    #[arg(long, default_value_t = 137)]
    chain_id: u64,
    #[arg(long)]
    owner: Address,
    #[arg(long)]
    spender: Address,
    /// Current permit nonce of the owner
    #[arg(long, default_value = "0")]
    nonce: U256,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing. In order to view logs, run `RUST_LOG=info cargo run`.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    // Parse the command line arguments.
    let args = Args::parse();

    let (params, curve) = match args.command {
        Command::Rpc {
            rpc_url,
            market,
            curve,
        } => {
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            let market: RpcMarket<_> = RpcMarket::new(market, provider);
            let params = load_parameters(&market).await?;

            let balances = market.balances().await?;
            match balances.utilization() {
                Some(utilization) => log::info!(
                    "Current utilization of {}: {:.2}%",
                    market.address(),
                    to_f64(utilization) * 100.0
                ),
                None => log::warn!("Market {} has no lendable funds", market.address()),
            }
            (params, curve)
        }
        Command::Params { params, curve } => (params.into(), curve),
        Command::Permit(permit) => return print_permit(permit, args.format),
    };

    let curves = JumpRateModel::new(params).curves(curve.periods());

    match curve.at {
        Some(percent) => {
            let (borrow, supply) = curves
                .at(percent)
                .context("utilization out of range")?;
            print_points(&[(borrow, supply)], args.format)
        }
        None => print_curves(&curves, args.format),
    }
}

fn print_curves(curves: &RateCurves, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(curves)?);
            Ok(())
        }
        Format::Table => {
            let rows: Vec<_> = curves
                .borrow
                .iter()
                .copied()
                .zip(curves.supply.iter().copied())
                .collect();
            print_points(&rows, format)
        }
    }
}

fn print_points(rows: &[(RateCurvePoint, RateCurvePoint)], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let rows: Vec<_> = rows
                .iter()
                .map(|(borrow, supply)| {
                    serde_json::json!({
                        "utilization": borrow.utilization_percent,
                        "borrow": borrow.apy,
                        "supply": supply.apy,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Format::Table => {
            println!("{:>11}  {:>12}  {:>12}", "utilization", "borrow APY", "supply APY");
            for (borrow, supply) in rows {
                println!(
                    "{:>10}%  {:>11.2}%  {:>11.2}%",
                    borrow.utilization_percent, borrow.apy, supply.apy
                );
            }
        }
    }
    Ok(())
}

fn print_permit(args: PermitArgs, format: Format) -> Result<()> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_secs();
    let domain = permit_domain(args.name, args.chain_id, args.token);
    let request = PermitRequest::unlimited(args.owner, args.spender, args.nonce, now);
    let digest = request.signing_hash(&domain);

    match format {
        Format::Json => {
            let out = serde_json::json!({ "message": request.permit, "digest": digest });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Table => {
            println!("deadline: {}", request.permit.deadline);
            println!("digest:   {}", digest);
        }
    }
    Ok(())
}
