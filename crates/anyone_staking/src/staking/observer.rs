//! Optional hooks a host can inject to watch the pipeline.

use crate::chain::ChecksummedAddress;
use crate::staking::normalize::DropReason;
use tracing::debug;

/// All methods default to no-ops; implement the ones you need.
pub trait PipelineObserver: Send + Sync {
    fn stakes_fetched(&self, _user: &ChecksummedAddress, _count: usize) {}

    /// A raw tuple at `index` was discarded by the normalizer.
    fn tuple_dropped(&self, _index: usize, _reason: DropReason) {}

    fn positions_assembled(&self, _user: &ChecksummedAddress, _count: usize) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Forwards pipeline events to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn stakes_fetched(&self, user: &ChecksummedAddress, count: usize) {
        debug!(user = %user, count, "stakes fetched");
    }

    fn tuple_dropped(&self, index: usize, reason: DropReason) {
        debug!(index, reason = reason.as_str(), "stake tuple dropped");
    }

    fn positions_assembled(&self, user: &ChecksummedAddress, count: usize) {
        debug!(user = %user, count, "positions assembled");
    }
}
