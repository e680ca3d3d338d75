use alloy::{
    network::{Ethereum, EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use tracing::{debug, info, warn};

use crate::{
    bindings::{IHedgyBuy, IHedgyFaucet, IHedgySell, IHedgyToken},
    gas, AmountBounds, ContractAddresses, ContractGateway, TxReceiptInfo,
};

/// [`ContractGateway`] over the Hedera JSON-RPC relay.
///
/// Reads share one provider. Every write builds a provider around the user's signer, so
/// nonces are managed per wallet by the relay.
#[derive(Debug, Clone)]
pub struct RpcGateway {
    rpc_url: Url,
    reader: DynProvider,
    addresses: ContractAddresses,
}

#[derive(Debug, Clone)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl RpcGateway {
    pub fn new(rpc_url: &str, addresses: ContractAddresses) -> Result<Self> {
        let rpc_url: Url = rpc_url.parse().wrap_err_with(|| format!("invalid rpc url {rpc_url:?}"))?;
        let reader = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();
        Ok(Self {
            rpc_url,
            reader,
            addresses,
        })
    }

    pub async fn chain_id(&self) -> Result<u64> {
        Ok(self.reader.get_chain_id().await?)
    }

    pub async fn token_metadata(&self) -> Result<TokenMetadata> {
        let token = IHedgyToken::new(self.addresses.token, self.reader.clone());
        Ok(TokenMetadata {
            name: token.name().call().await?,
            symbol: token.symbol().call().await?,
            decimals: token.decimals().call().await?,
        })
    }

    fn signing(&self, signer: &PrivateKeySigner) -> DynProvider {
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(self.rpc_url.clone())
            .erased()
    }
}

async fn settle(what: &str, pending: PendingTransactionBuilder<Ethereum>) -> Result<TxReceiptInfo> {
    let hash = *pending.tx_hash();
    debug!(tx = %hash, "{what} sent, waiting for receipt");
    let receipt = pending
        .get_receipt()
        .await
        .wrap_err_with(|| format!("{what}: receipt for {hash}"))?;

    let info = TxReceiptInfo {
        hash: receipt.transaction_hash,
        success: ReceiptResponse::status(&receipt),
        gas_used: receipt.gas_used,
        block_number: receipt.block_number,
    };
    if info.success {
        info!(tx = %info.hash, gas_used = info.gas_used, "{what} confirmed");
    } else {
        warn!(tx = %info.hash, gas_used = info.gas_used, "{what} reverted");
    }
    Ok(info)
}

fn seconds(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl ContractGateway for RpcGateway {
    fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.reader.get_balance(owner).await?)
    }

    async fn token_balance(&self, owner: Address) -> Result<U256> {
        let token = IHedgyToken::new(self.addresses.token, self.reader.clone());
        Ok(token.balanceOf(owner).call().await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let token = IHedgyToken::new(self.addresses.token, self.reader.clone());
        Ok(token.allowance(owner, spender).call().await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        Ok(self.reader.get_code_at(address).await?)
    }

    async fn faucet_can_request(&self, account: Address) -> Result<bool> {
        let faucet = IHedgyFaucet::new(self.addresses.faucet, self.reader.clone());
        Ok(faucet.canRequestTokens(account).call().await?)
    }

    async fn faucet_time_until_next_drip(&self, account: Address) -> Result<u64> {
        let faucet = IHedgyFaucet::new(self.addresses.faucet, self.reader.clone());
        Ok(seconds(faucet.timeUntilNextDrip(account).call().await?))
    }

    async fn faucet_drip_amount(&self) -> Result<U256> {
        let faucet = IHedgyFaucet::new(self.addresses.faucet, self.reader.clone());
        Ok(faucet.dripAmount().call().await?)
    }

    async fn faucet_cooldown(&self) -> Result<u64> {
        let faucet = IHedgyFaucet::new(self.addresses.faucet, self.reader.clone());
        Ok(seconds(faucet.cooldownTime().call().await?))
    }

    async fn faucet_balance(&self) -> Result<U256> {
        let faucet = IHedgyFaucet::new(self.addresses.faucet, self.reader.clone());
        Ok(faucet.getFaucetBalance().call().await?)
    }

    async fn buy_quote(&self, native: U256) -> Result<U256> {
        let buy = IHedgyBuy::new(self.addresses.buy, self.reader.clone());
        Ok(buy.calculateTokenAmount(native).call().await?)
    }

    async fn buy_cost(&self, tokens: U256) -> Result<U256> {
        let buy = IHedgyBuy::new(self.addresses.buy, self.reader.clone());
        Ok(buy.calculateHBARCost(tokens).call().await?)
    }

    async fn buy_bounds(&self) -> Result<AmountBounds> {
        let buy = IHedgyBuy::new(self.addresses.buy, self.reader.clone());
        let min = buy.minPurchase().call().await?;
        let max = buy.maxPurchase().call().await?;
        Ok(AmountBounds::new(min, max))
    }

    async fn buy_price(&self) -> Result<U256> {
        let buy = IHedgyBuy::new(self.addresses.buy, self.reader.clone());
        Ok(buy.tokenPrice().call().await?)
    }

    async fn buy_liquidity(&self) -> Result<U256> {
        let buy = IHedgyBuy::new(self.addresses.buy, self.reader.clone());
        Ok(buy.getTokenBalance().call().await?)
    }

    async fn sell_quote(&self, tokens: U256) -> Result<U256> {
        let sell = IHedgySell::new(self.addresses.sell, self.reader.clone());
        Ok(sell.calculateHBARAmount(tokens).call().await?)
    }

    async fn sell_bounds(&self) -> Result<AmountBounds> {
        let sell = IHedgySell::new(self.addresses.sell, self.reader.clone());
        let min = sell.minSell().call().await?;
        let max = sell.maxSell().call().await?;
        Ok(AmountBounds::new(min, max))
    }

    async fn sell_price(&self) -> Result<U256> {
        let sell = IHedgySell::new(self.addresses.sell, self.reader.clone());
        Ok(sell.tokenPrice().call().await?)
    }

    async fn sell_liquidity_tinybar(&self) -> Result<U256> {
        let sell = IHedgySell::new(self.addresses.sell, self.reader.clone());
        Ok(sell.getHBARBalance().call().await?)
    }

    async fn request_tokens(&self, signer: &PrivateKeySigner) -> Result<TxReceiptInfo> {
        let faucet = IHedgyFaucet::new(self.addresses.faucet, self.signing(signer));
        let pending = faucet
            .requestTokens()
            .gas(gas::FAUCET_CLAIM)
            .send()
            .await
            .wrap_err("requestTokens")?;
        settle("faucet claim", pending).await
    }

    async fn buy_tokens(&self, signer: &PrivateKeySigner, value: U256) -> Result<TxReceiptInfo> {
        let buy = IHedgyBuy::new(self.addresses.buy, self.signing(signer));
        let pending = buy
            .buyTokens()
            .value(value)
            .gas(gas::BUY)
            .send()
            .await
            .wrap_err("buyTokens")?;
        settle("buy", pending).await
    }

    async fn approve(&self, signer: &PrivateKeySigner, spender: Address, amount: U256) -> Result<TxReceiptInfo> {
        let token = IHedgyToken::new(self.addresses.token, self.signing(signer));
        let pending = token
            .approve(spender, amount)
            .gas(gas::APPROVE)
            .send()
            .await
            .wrap_err("approve")?;
        settle("approve", pending).await
    }

    async fn sell_tokens(&self, signer: &PrivateKeySigner, amount: U256) -> Result<TxReceiptInfo> {
        let sell = IHedgySell::new(self.addresses.sell, self.signing(signer));
        let pending = sell
            .sellTokens(amount)
            .gas(gas::SELL)
            .send()
            .await
            .wrap_err("sellTokens")?;
        settle("sell", pending).await
    }

    async fn transfer_token(&self, signer: &PrivateKeySigner, to: Address, amount: U256) -> Result<TxReceiptInfo> {
        let token = IHedgyToken::new(self.addresses.token, self.signing(signer));
        let pending = token
            .transfer(to, amount)
            .gas(gas::TOKEN_TRANSFER)
            .send()
            .await
            .wrap_err("transfer")?;
        settle("token transfer", pending).await
    }

    async fn transfer_native(&self, signer: &PrivateKeySigner, to: Address, amount: U256) -> Result<TxReceiptInfo> {
        let provider = self.signing(signer);
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(amount)
            .with_gas_limit(gas::NATIVE_TRANSFER);
        let pending = provider.send_transaction(tx).await.wrap_err("native transfer")?;
        settle("native transfer", pending).await
    }
}
