//! Block height sources
//!
//! Repayment timing is measured in blocks. The engine reads the current
//! height from an injected [`BlockClock`].

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current block height
pub trait BlockClock: Send + Sync {
    fn current_block(&self) -> u64;
}

/// Manually driven clock for simulations and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            height: AtomicU64::new(start),
        }
    }

    /// Advance by `blocks`, returning the new height
    pub fn advance(&self, blocks: u64) -> u64 {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }

    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl BlockClock for ManualClock {
    fn current_block(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

/// Derives block height from wall time at a fixed block interval
#[derive(Debug, Clone)]
pub struct WallClock {
    genesis: DateTime<Utc>,
    block_secs: i64,
}

impl WallClock {
    /// Ten-minute blocks
    pub const DEFAULT_BLOCK_SECS: i64 = 600;

    pub fn new(genesis: DateTime<Utc>, block_secs: i64) -> Self {
        Self {
            genesis,
            block_secs: block_secs.max(1),
        }
    }

    /// Height at an arbitrary instant; instants before genesis are height 0
    pub fn height_at(&self, at: DateTime<Utc>) -> u64 {
        let elapsed = (at - self.genesis).num_seconds();
        u64::try_from(elapsed / self.block_secs).unwrap_or(0)
    }
}

impl BlockClock for WallClock {
    fn current_block(&self) -> u64 {
        self.height_at(Utc::now())
    }
}
