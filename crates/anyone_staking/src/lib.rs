//! anyone_staking — read-only position adapter for Anyone Protocol staking.
//!
//! Queries the Hodler staking contract for a user's per-operator stakes and
//! turns them into position records backed one-to-one by ANYONE.
//! Read-only; no seeds; no transaction signing.

pub mod adapter;
pub mod chain;
pub mod config;
pub mod staking;

pub use adapter::{AdapterSettings, ProtocolDetails, StakingAdapter};
pub use chain::{
    checksum_address, ChainQuery, ChainQueryError, ChecksummedAddress, ContractCall,
    JsonRpcProvider, MetadataCache, RpcConfig,
};
pub use config::AdapterConfig;
pub use staking::{
    Chain, PipelineObserver, PositionRecord, StakeEntry, StakingError, TokenDescriptor,
    TokenRegistry, UnwrapExchangeRate,
};
