//! Token registry: the static table of staking deployments.
//!
//! Each deployment names the staking contract, the staked (protocol) token and its
//! underlying tokens. Adding a chain or token is an edit to [`DEPLOYMENTS`].

use crate::chain::ChecksummedAddress;
use crate::staking::types::TokenDescriptor;
use alloy_primitives::{address, Address};
use std::str::FromStr;
use thiserror::Error;

pub const PROTOCOL_ID: &str = "anyone";
pub const PRODUCT_ID: &str = "staking";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no protocol token at address {0}")]
    TokenNotFound(String),
    #[error("no staking deployment on chain {0}")]
    UnsupportedChain(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Chain {
    Ethereum,
}

impl Chain {
    pub const fn id(self) -> u64 {
        match self {
            Chain::Ethereum => 1,
        }
    }

    pub fn from_id(id: u64) -> Result<Self, RegistryError> {
        match id {
            1 => Ok(Chain::Ethereum),
            other => Err(RegistryError::UnsupportedChain(other)),
        }
    }
}

#[derive(Debug)]
pub struct TokenSpec {
    pub address: Address,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

impl TokenSpec {
    fn descriptor(&self, underlying: &[TokenSpec]) -> TokenDescriptor {
        TokenDescriptor {
            address: ChecksummedAddress::new(self.address),
            name: self.name.to_string(),
            symbol: self.symbol.to_string(),
            decimals: self.decimals,
            underlying_tokens: underlying.iter().map(|u| u.descriptor(&[])).collect(),
        }
    }
}

#[derive(Debug)]
pub struct StakingDeployment {
    pub chain: Chain,
    /// Contract answering `getStakes(address)`.
    pub staking_contract: Address,
    pub staked_token: TokenSpec,
    pub underlying_tokens: &'static [TokenSpec],
}

/// Hodler proxy; doubles as the staked token address.
const HODLER_PROXY: Address = address!("0d9a1ca7Bc756AE009672Db626CdE3c9BEF583EF");
const ANYONE_TOKEN: Address = address!("FeAc2Eae96899709a43E252B6B92971D32F9C0F9");

static ETHEREUM_DEPLOYMENT: StakingDeployment = StakingDeployment {
    chain: Chain::Ethereum,
    staking_contract: HODLER_PROXY,
    staked_token: TokenSpec {
        address: HODLER_PROXY,
        name: "Staked ANYONE",
        symbol: "stANYONE",
        decimals: 18,
    },
    underlying_tokens: &[TokenSpec {
        address: ANYONE_TOKEN,
        name: "Anyone",
        symbol: "ANYONE",
        decimals: 18,
    }],
};

pub static DEPLOYMENTS: &[&StakingDeployment] = &[&ETHEREUM_DEPLOYMENT];

/// Read-only view over one deployment. Cheap to copy; never mutated.
#[derive(Clone, Copy, Debug)]
pub struct TokenRegistry {
    deployment: &'static StakingDeployment,
}

impl TokenRegistry {
    pub fn for_chain(chain: Chain) -> Result<Self, RegistryError> {
        DEPLOYMENTS
            .iter()
            .copied()
            .find(|d| d.chain == chain)
            .map(|d| Self { deployment: d })
            .ok_or(RegistryError::UnsupportedChain(chain.id()))
    }

    pub fn mainnet() -> Self {
        Self {
            deployment: &ETHEREUM_DEPLOYMENT,
        }
    }

    pub fn deployment(&self) -> &'static StakingDeployment {
        self.deployment
    }

    pub fn chain(&self) -> Chain {
        self.deployment.chain
    }

    pub fn staking_contract(&self) -> Address {
        self.deployment.staking_contract
    }

    /// The staked token with its underlying tokens nested inside.
    pub fn protocol_token(&self) -> TokenDescriptor {
        self.deployment
            .staked_token
            .descriptor(self.deployment.underlying_tokens)
    }

    /// All protocol tokens of this deployment (currently exactly one).
    pub fn list_protocol_tokens(&self) -> Vec<TokenDescriptor> {
        vec![self.protocol_token()]
    }

    /// Look up a protocol token; comparison ignores case and checksum.
    pub fn resolve_by_address(&self, address: &str) -> Result<TokenDescriptor, RegistryError> {
        let wanted = Address::from_str(address.trim())
            .map_err(|_| RegistryError::TokenNotFound(address.to_string()))?;
        self.protocol_token_by_address(wanted)
    }

    pub fn protocol_token_by_address(
        &self,
        address: Address,
    ) -> Result<TokenDescriptor, RegistryError> {
        self.list_protocol_tokens()
            .into_iter()
            .find(|t| t.address.address() == address)
            .ok_or_else(|| RegistryError::TokenNotFound(address.to_checksum(None)))
    }
}
