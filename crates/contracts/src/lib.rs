pub mod bindings;
mod fault;
mod gateway;
mod rpc;

pub use fault::{classify, classify_text, ProviderFault};
pub use gateway::{gas, AmountBounds, ContractAddresses, ContractGateway, TxReceiptInfo};
pub use rpc::{RpcGateway, TokenMetadata};
