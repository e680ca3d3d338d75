use alloy::primitives::{Address, U256};
use clap::Parser;
use eyre::{bail, Result};
use hedgy_contracts::{ContractGateway, RpcGateway};
use tracing::{error, info, warn};
use utils::{
    link::contract_url,
    units::{format_amount, WEIBAR_DECIMALS},
};

use crate::config::{ContractsConfig, NetworkConfig};

#[derive(Clone, Debug, Parser)]
pub struct Args {
    #[command(flatten)]
    pub network: NetworkConfig,

    #[command(flatten)]
    pub contracts: ContractsConfig,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ContractReport {
    pub label: &'static str,
    pub address: Address,
    pub deployed: bool,
    pub balance: Option<U256>,
}

/// Looks up bytecode and native balance of every configured contract.
pub async fn inspect(gateway: &dyn ContractGateway) -> Result<Vec<ContractReport>> {
    let mut reports = Vec::new();
    for (label, address) in gateway.addresses().labelled() {
        let deployed = !gateway.code_at(address).await?.is_empty();
        let balance = match gateway.native_balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!(label, %address, error = %e, "balance lookup failed");
                None
            }
        };
        reports.push(ContractReport {
            label,
            address,
            deployed,
            balance,
        });
    }
    Ok(reports)
}

pub async fn run(args: Args) -> Result<()> {
    hedgy_logger::init_console_logger(None);

    let gateway = RpcGateway::new(&args.network.rpc_url, args.contracts.addresses())?;
    let chain_id = gateway.chain_id().await?;
    if chain_id != args.network.chain_id {
        warn!(expected = args.network.chain_id, actual = chain_id, "unexpected chain id");
    }
    info!(rpc = %args.network.rpc_url, chain_id, "checking contracts");

    let reports = inspect(&gateway).await?;
    for report in &reports {
        let balance = report
            .balance
            .map(|b| format!("{} HBAR", format_amount(b, WEIBAR_DECIMALS, 4)))
            .unwrap_or_else(|| "unknown".to_string());
        let url = contract_url(&args.network.network, &report.address);
        if report.deployed {
            info!(address = %report.address, %balance, %url, "{}: deployed", report.label);
        } else {
            error!(address = %report.address, %url, "{}: NO CODE", report.label);
        }
    }

    match gateway.token_metadata().await {
        Ok(meta) => info!(name = %meta.name, symbol = %meta.symbol, decimals = meta.decimals, "token metadata"),
        Err(e) => warn!(error = %e, "token metadata unavailable"),
    }

    let missing: Vec<_> = reports.iter().filter(|r| !r.deployed).map(|r| r.label).collect();
    if !missing.is_empty() {
        bail!("contracts not deployed: {}", missing.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use hedgy_contracts::ContractAddresses;

    use super::*;
    use crate::testkit::{hbar, MockGateway};

    #[tokio::test]
    async fn reports_every_contract() {
        let gateway = MockGateway::default();
        let ContractAddresses { buy, sell, .. } = *gateway.addresses();
        gateway.fund_native(sell, hbar(3));
        gateway.with(|s| s.undeployed.push(buy));

        let reports = inspect(&gateway).await.unwrap();
        let labels: Vec<_> = reports.iter().map(|r| r.label).collect();
        assert_eq!(labels.len(), 4);

        let buy = reports.iter().find(|r| r.address == buy).unwrap();
        assert!(!buy.deployed);
        let sell = reports.iter().find(|r| r.address == sell).unwrap();
        assert!(sell.deployed);
        assert_eq!(sell.balance, Some(hbar(3)));
    }
}
