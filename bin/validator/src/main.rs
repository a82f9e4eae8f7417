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

use std::{process::exit, sync::Arc, time::Duration};

use structopt_toml::{serde::Deserialize, structopt::StructOpt, StructOptToml};
use tracing::{debug, dispatcher};
use url::Url;

use bundlr_contracts::{
    cli_desc,
    contract::{http::HttpConnector, token::TokenContract, Amount, Connector, ContractProxy, WriteMode},
    faucet::{Faucet, StateIndex},
    gateway::GatewayClient,
    util::{
        cli::{load_config, log_dispatch},
        path::get_config_path,
    },
    wallet::Wallet,
    Error, Result,
};

/// CLI utility functions
mod cli_util;
use cli_util::Progress;

/// Validator contract workflows
mod staking;

/// Token workflows
mod token;

const CONFIG_FILE: &str = "validator_config.toml";
const CONFIG_FILE_CONTENTS: &str = include_str!("../validator_config.toml");

#[derive(Clone, Debug, Deserialize, StructOpt, StructOptToml)]
#[serde(default)]
#[structopt(name = "validator", about = cli_desc!())]
struct Args {
    #[structopt(short, long)]
    /// Configuration file to use
    config: Option<String>,

    #[structopt(short, long, global = true, default_value = "http://arweave.testnet1.bundlr.network/")]
    /// URL for the Arweave gateway to use
    gateway: Url,

    #[structopt(long, global = true, default_value = "https://faucet.testnet1.bundlr.network")]
    /// URL of the faucet publishing the network contracts
    faucet: Url,

    #[structopt(short, long, global = true, default_value = "./wallet.json")]
    /// Path to the wallet file to load and use for interactions
    wallet: String,

    #[structopt(long, global = true)]
    /// Bundle interactions, as done on mainnet
    mainnet: bool,

    #[structopt(long, global = true, default_value = "15")]
    /// Seconds to wait for an interaction to settle
    settle_delay: u64,

    #[structopt(subcommand)]
    /// Sub command to execute
    command: Subcmd,

    #[structopt(short, long)]
    /// Set log file to ouput into
    log: Option<String>,

    #[structopt(short, parse(from_occurrences))]
    /// Increase verbosity (-vvv supported)
    verbose: u8,
}

#[derive(Clone, Debug, Deserialize, StructOpt)]
enum Subcmd {
    /// Join a validator contract, staking tokens
    Join {
        /// Address of the validator contract to join
        contract: String,

        #[structopt(short, long)]
        /// URL for the validator you want to add
        url: Url,

        #[structopt(short, long)]
        /// Number of tokens to provide as a stake (defaults to the contract minimum)
        stake: Option<Amount>,
    },

    /// Transfer <amount> tokens to <to>
    Transfer {
        /// Amount to transfer
        amount: Amount,

        /// Address to transfer the tokens to
        to: String,
    },

    /// Get the token balance of an address
    Balance {
        /// Address to query
        address: String,
    },

    /// Check the standing of an address in a validator contract
    Check {
        /// Address of the validator contract
        contract: String,

        /// Address to query
        address: String,
    },

    /// Leave a validator contract
    Leave {
        /// Address of the validator contract to leave
        contract: String,
    },
}

impl Subcmd {
    /// Verb used when reporting a failure
    fn verb(&self) -> &'static str {
        match self {
            Self::Join { .. } => "joining",
            Self::Transfer { .. } => "transferring",
            Self::Balance { .. } => "getting balance",
            Self::Check { .. } => "checking",
            Self::Leave { .. } => "leaving",
        }
    }

    fn needs_wallet(&self) -> bool {
        matches!(self, Self::Join { .. } | Self::Transfer { .. } | Self::Leave { .. })
    }
}

/// CLI-util structure
pub struct ValidatorCli {
    /// Contract addresses and cached state
    pub index: Arc<dyn StateIndex>,
    /// Live contract handles
    pub connector: Arc<dyn Connector>,
    /// Wallet signing the interactions, if one was loaded
    pub wallet: Option<Wallet>,
    /// Wait after each submission, letting it settle
    pub settle_delay: Duration,
}

impl ValidatorCli {
    pub fn new(
        index: Arc<dyn StateIndex>,
        connector: Arc<dyn Connector>,
        wallet: Option<Wallet>,
        settle_delay: Duration,
    ) -> Self {
        Self { index, connector, wallet, settle_delay }
    }

    /// Resolve the wallet and the network endpoints from the arguments.
    fn init(args: &Args) -> Result<Self> {
        let wallet = if args.command.needs_wallet() { Some(Wallet::load(&args.wallet)?) } else { None };

        let mode = WriteMode::for_gateway(&args.gateway, args.mainnet);
        let gateway = GatewayClient::new(&args.gateway)?;
        debug!(target: "validator", "Gateway {} ({mode} writes)", gateway.base_url());

        let connector = HttpConnector::new(gateway, wallet.clone(), mode);
        let index = Faucet::new(&args.faucet)?;

        Ok(Self::new(
            Arc::new(index),
            Arc::new(connector),
            wallet,
            Duration::from_secs(args.settle_delay),
        ))
    }

    /// Address of the loaded wallet
    pub fn address(&self) -> Result<&str> {
        match &self.wallet {
            Some(w) => Ok(w.address()),
            None => Err(Error::WalletRequired),
        }
    }

    /// Proxy for the token contract published by the faucet
    pub async fn token(&self) -> Result<TokenContract> {
        let discovery = self.index.discover().await?;
        Ok(ContractProxy::connect(self.connector.as_ref(), &discovery.token))
    }

    /// Wait for the last submission to settle.
    pub async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            smol::Timer::after(self.settle_delay).await;
        }
    }
}

async fn realmain(args: &Args, progress: &Progress) -> Result<()> {
    let cli = ValidatorCli::init(args)?;

    match &args.command {
        Subcmd::Join { contract, url, stake } => {
            let id = cli.join(contract, url.clone(), stake.clone(), progress).await?;
            progress.succeed("Done!");
            println!("{}", id.as_deref().unwrap_or("unconfirmed"));
        }

        Subcmd::Transfer { amount, to } => {
            cli.transfer(amount.clone(), to).await?;
            progress.succeed("Transfer complete!");
        }

        Subcmd::Balance { address } => {
            let balance = cli.balance(address).await?;
            progress.succeed(&format!("Balance of address {address} - {balance}"));
        }

        Subcmd::Check { contract, address } => {
            let status = cli.check(contract, address).await?;
            progress.succeed(&format!("Address {address} is {status}"));
        }

        Subcmd::Leave { contract } => {
            cli.leave(contract, progress).await?;
            progress.succeed("Left validator contract");
        }
    }

    Ok(())
}

fn first_message(cmd: &Subcmd) -> &'static str {
    match cmd {
        Subcmd::Join { .. } => "Reading validator contract...",
        Subcmd::Transfer { .. } => "Transferring tokens...",
        Subcmd::Balance { .. } => "Checking balance...",
        Subcmd::Check { .. } => "Checking validator...",
        Subcmd::Leave { .. } => "Checking leave status...",
    }
}

fn main() {
    let args = match Args::from_args_with_toml("") {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error parsing arguments: {e}");
            exit(2);
        }
    };

    let args = match get_config_path(args.config.clone(), CONFIG_FILE) {
        Ok(cfg_path) => {
            let contents = match load_config(&cfg_path, CONFIG_FILE_CONTENTS.as_bytes()) {
                Ok(contents) => contents,
                Err(e) => {
                    eprintln!("Error reading config file {cfg_path:?}: {e}");
                    exit(2);
                }
            };

            match Args::from_args_with_toml(&contents) {
                Ok(args) => args,
                Err(e) => {
                    eprintln!("Error parsing the config file: {e}");
                    exit(2);
                }
            }
        }
        Err(_) => args,
    };

    let log = match log_dispatch(args.verbose, args.log.as_deref()) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error setting up logging: {e}");
            exit(2);
        }
    };

    let result = dispatcher::with_default(&log, || {
        let progress = Progress::spinner(first_message(&args.command));
        let result = smol::block_on(realmain(&args, &progress));
        if let Err(e) = &result {
            progress.fail(&format!("Error {} - {e}", args.command.verb()));
        }
        result
    });

    if result.is_err() {
        exit(2);
    }
}
