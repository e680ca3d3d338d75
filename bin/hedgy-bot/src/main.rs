mod check_contracts;
mod collector;
mod command;
mod config;
mod cooldown;
mod executor;
mod guard;
mod keyboards;
mod messages;
mod router;
mod send_input;
mod start_bot;
mod strategy;
#[cfg(test)]
mod testkit;
mod types;
mod wallet;

use clap::Parser;
use eyre::Result;

pub const BUILD_VERSION: &str = version::build_version!();

#[derive(clap::Parser)]
#[command(version = BUILD_VERSION, about = "Telegram bot for the HEDGY token on Hedera")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Run the bot until interrupted.
    StartBot(start_bot::Args),
    /// Check that every configured contract is deployed and print its balance.
    CheckContracts(check_contracts::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::StartBot(args) => start_bot::run(args).await,
        Command::CheckContracts(args) => check_contracts::run(args).await,
    }
}
