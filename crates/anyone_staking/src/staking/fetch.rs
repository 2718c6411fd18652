//! Stake fetcher: one `getStakes(address)` read against the staking contract.

use crate::chain::{checksum_address, ChainQuery, ChecksummedAddress, ContractCall};
use crate::staking::types::RawStakeTuple;
use crate::staking::StakingError;
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::{Function, Param, StateMutability};
use alloy_primitives::Address;
use serde_json::Value;
use tracing::debug;

fn param(ty: &str, name: &str, components: Vec<Param>) -> Param {
    Param {
        ty: ty.to_string(),
        name: name.to_string(),
        components,
        internal_type: None,
    }
}

/// `getStakes(address _address) view returns ((address operator, uint256 amount)[])`
pub fn get_stakes_function() -> Function {
    Function {
        name: "getStakes".to_string(),
        inputs: vec![param("address", "_address", vec![])],
        outputs: vec![param(
            "tuple[]",
            "",
            vec![
                param("address", "operator", vec![]),
                param("uint256", "amount", vec![]),
            ],
        )],
        state_mutability: StateMutability::View,
    }
}

pub fn get_stakes_call(staking_contract: Address, user: &ChecksummedAddress) -> ContractCall {
    ContractCall {
        contract: staking_contract,
        function: get_stakes_function(),
        args: vec![DynSolValue::Address(user.address())],
    }
}

pub struct StakeFetcher<'q, Q> {
    query: &'q Q,
    staking_contract: Address,
}

impl<'q, Q: ChainQuery> StakeFetcher<'q, Q> {
    pub fn new(query: &'q Q, staking_contract: Address) -> Self {
        Self {
            query,
            staking_contract,
        }
    }

    /// Validate and checksum `address`, then fetch its raw stakes.
    pub async fn fetch_stakes(&self, address: &str) -> Result<Vec<RawStakeTuple>, StakingError> {
        let user = checksum_address(address)?;
        self.fetch_for(&user).await
    }

    /// Raw stakes for an already-normalized address. No stakes is an empty vec.
    pub async fn fetch_for(
        &self,
        user: &ChecksummedAddress,
    ) -> Result<Vec<RawStakeTuple>, StakingError> {
        let call = get_stakes_call(self.staking_contract, user);
        let outputs = self.query.call(&call).await?;
        let stakes = match outputs.into_iter().next() {
            Some(Value::Array(items)) => items.into_iter().map(RawStakeTuple::from).collect(),
            _ => Vec::new(),
        };
        debug!(user = %user, count = stakes.len(), "fetched raw stakes");
        Ok(stakes)
    }
}
