//! Stake pipeline: registry, fetch, normalize, assemble, unwrap.

mod fetch;
mod normalize;
mod observer;
mod positions;
mod registry;
mod types;

pub use fetch::{get_stakes_call, get_stakes_function, StakeFetcher};
pub use normalize::{coerce_amount, normalize, normalize_observed, DropReason};
pub use observer::{NoopObserver, PipelineObserver, TracingObserver};
pub use positions::{assemble, position_id, unwrap_one_to_one, PositionContext, BASE_RATE};
pub use registry::{
    Chain, RegistryError, StakingDeployment, TokenRegistry, TokenSpec, DEPLOYMENTS, PRODUCT_ID,
    PROTOCOL_ID,
};
pub use types::{
    PositionMetadata, PositionRecord, RawStakeTuple, StakeEntry, TokenBalance, TokenDescriptor,
    TokenType, UnderlyingBalance, UnderlyingRate, UnwrapExchangeRate,
};

use crate::chain::{AddressError, ChainQueryError, ChecksummedAddress};
use thiserror::Error;

/// Errors surfaced to callers of the staking pipeline.
///
/// Malformed or zero-amount stake tuples are not errors; they are dropped.
#[derive(Error, Debug)]
pub enum StakingError {
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("upstream query: {0}")]
    UpstreamQuery(#[from] ChainQueryError),
    #[error("not found: {0}")]
    NotFound(#[from] RegistryError),
    #[error("cannot unwrap {token} one-to-one: {count} underlying tokens")]
    UnwrapArity {
        token: ChecksummedAddress,
        count: usize,
    },
}
