use alloy::primitives::{Address, B256};

const SCAN_URL: &str = "https://hashscan.io";

pub const HBAR_FAUCET_URL: &str = "https://portal.hedera.com/faucet";

pub fn tx_url(network: &str, hash: &B256) -> String {
    format!("{SCAN_URL}/{network}/transaction/{hash}")
}

pub fn account_url(network: &str, address: &Address) -> String {
    format!("{SCAN_URL}/{network}/account/{address}")
}

pub fn contract_url(network: &str, address: &Address) -> String {
    format!("{SCAN_URL}/{network}/contract/{address}")
}

/// `0x1234…abcd`, as used in balance messages.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// First 10 and last 8 characters of the hash.
pub fn short_tx_hash(hash: &B256) -> String {
    let full = hash.to_string();
    format!("{}...{}", &full[..10], &full[full.len() - 8..])
}
