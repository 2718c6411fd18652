//! Caller-facing adapter: positions, unwrap rate, protocol tokens.

use crate::chain::{checksum_address, ChainQuery, MetadataCache};
use crate::staking::{
    assemble, normalize_observed, unwrap_one_to_one, Chain, NoopObserver, PipelineObserver,
    PositionContext, PositionRecord, StakeFetcher, StakingError, TokenDescriptor, TokenRegistry,
    UnwrapExchangeRate, PRODUCT_ID, PROTOCOL_ID,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionType {
    Supply,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetails {
    pub protocol_id: String,
    pub name: String,
    pub description: String,
    pub site_url: String,
    pub icon_url: String,
    pub position_type: PositionType,
    pub chain_id: u64,
    pub product_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSettings {
    pub include_in_unwrap: bool,
    pub user_event: bool,
}

/// Staking adapter over an injected [`ChainQuery`].
///
/// Holds no mutable state; concurrent `get_positions` calls need no coordination.
pub struct StakingAdapter<Q> {
    query: Q,
    registry: TokenRegistry,
    cache: Option<MetadataCache>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl<Q: ChainQuery> StakingAdapter<Q> {
    pub fn new(query: Q, chain: Chain) -> Result<Self, StakingError> {
        Ok(Self {
            query,
            registry: TokenRegistry::for_chain(chain)?,
            cache: None,
            observer: None,
        })
    }

    /// Memoize the token list in `cache`. Cache failures are logged, never returned.
    pub fn with_cache(mut self, cache: MetadataCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    fn context(&self) -> PositionContext {
        PositionContext {
            protocol_id: PROTOCOL_ID,
            product_id: PRODUCT_ID,
            chain_id: self.registry.chain().id(),
        }
    }

    fn observer(&self) -> &dyn PipelineObserver {
        self.observer.as_deref().unwrap_or(&NoopObserver)
    }

    pub fn protocol_details(&self) -> ProtocolDetails {
        ProtocolDetails {
            protocol_id: PROTOCOL_ID.to_string(),
            name: "Anyone".to_string(),
            description: "Anyone Protocol staking position (HodlerV5)".to_string(),
            site_url: "https://anyone.io".to_string(),
            icon_url: "https://docs.anyone.io/img/logo.png".to_string(),
            position_type: PositionType::Supply,
            chain_id: self.registry.chain().id(),
            product_id: PRODUCT_ID.to_string(),
        }
    }

    pub fn adapter_settings(&self) -> AdapterSettings {
        AdapterSettings {
            include_in_unwrap: false,
            user_event: false,
        }
    }

    /// Protocol tokens of this deployment, served from the cache when present.
    pub fn list_protocol_tokens(&self) -> Vec<TokenDescriptor> {
        let Some(cache) = &self.cache else {
            return self.registry.list_protocol_tokens();
        };
        let key = MetadataCache::tokens_key(PROTOCOL_ID, PRODUCT_ID, self.registry.chain().id());
        match cache.get_tokens(&key) {
            Ok(Some(tokens)) => {
                debug!(key = %key, "protocol tokens cache hit");
                return tokens;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "protocol tokens cache read failed");
            }
        }
        let tokens = self.registry.list_protocol_tokens();
        if let Err(e) = cache.set_tokens(&key, &tokens) {
            warn!(error = %e, "protocol tokens cache write failed");
        }
        tokens
    }

    /// All nonzero per-operator stakes of `address`, in contract order.
    pub async fn get_positions(&self, address: &str) -> Result<Vec<PositionRecord>, StakingError> {
        let user = checksum_address(address)?;
        let fetcher = StakeFetcher::new(&self.query, self.registry.staking_contract());
        let raw = fetcher.fetch_for(&user).await?;
        let observer = self.observer();
        observer.stakes_fetched(&user, raw.len());
        if raw.is_empty() {
            observer.positions_assembled(&user, 0);
            return Ok(Vec::new());
        }

        let token = self
            .registry
            .protocol_token_by_address(self.registry.staking_contract())?;
        let entries = normalize_observed(&raw, observer);
        let positions = assemble(&entries, &token, &self.context());
        observer.positions_assembled(&user, positions.len());
        info!(
            user = %user,
            raw = raw.len(),
            positions = positions.len(),
            "get_positions"
        );
        Ok(positions)
    }

    /// Fixed 1:1 exchange rate from the staked token to its underlying token.
    pub fn unwrap(&self, token_address: &str) -> Result<UnwrapExchangeRate, StakingError> {
        let token = self.registry.resolve_by_address(token_address)?;
        unwrap_one_to_one(&token)
    }
}
