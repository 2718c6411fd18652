//! Chain access: address normalization, the contract-query seam, JSON-RPC transport, metadata cache.

mod address;
mod cache;
mod query;
pub(crate) mod rpc;

pub use address::{checksum_address, AddressError, ChecksummedAddress};
pub use cache::{CacheError, MetadataCache};
pub use query::{ChainQuery, ChainQueryError, ContractCall};
pub use rpc::{decode_output, JsonRpcProvider, RpcConfig};
