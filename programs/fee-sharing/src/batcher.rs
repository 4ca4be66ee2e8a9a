use anchor_lang::prelude::*;
use crate::{
    error::{FeeSharingError, LedgerResult},
    oracle::WeightOracle,
    state::{Checkpoint, FeePool},
};

/// What a deposit did to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositOutcome {
    /// Pending amount after recording (0 when sealed)
    pub pending: u64,
    pub sealed: Option<Checkpoint>,
}

/// Coalesces deposits so a pool seals at most once per withdrawal interval.
#[derive(Debug, Clone, Copy)]
pub struct IntervalBatcher {
    interval: i64,
}

impl IntervalBatcher {
    pub fn new(interval: i64) -> Self {
        Self { interval }
    }

    pub fn is_due(&self, pool: &FeePool, now: i64) -> bool {
        now.saturating_sub(pool.last_seal_ts) >= self.interval
    }

    pub fn on_deposit<O: WeightOracle>(
        &self,
        pool: &mut FeePool,
        amount: u64,
        clock: &Clock,
        oracle: &O,
    ) -> LedgerResult<DepositOutcome> {
        pool.record_deposit(amount)?;
        if !self.is_due(pool, clock.unix_timestamp) {
            return Ok(DepositOutcome { pending: pool.pending_amount, sealed: None });
        }
        let sealed = self.seal(pool, clock, oracle)?;
        Ok(DepositOutcome { pending: pool.pending_amount, sealed })
    }

    /// Explicit seal of whatever is pending. Only once the interval has passed.
    pub fn trigger<O: WeightOracle>(
        &self,
        pool: &mut FeePool,
        clock: &Clock,
        oracle: &O,
    ) -> LedgerResult<Option<Checkpoint>> {
        if !self.is_due(pool, clock.unix_timestamp) {
            return Err(FeeSharingError::IntervalNotElapsed);
        }
        self.seal(pool, clock, oracle)
    }

    fn seal<O: WeightOracle>(
        &self,
        pool: &mut FeePool,
        clock: &Clock,
        oracle: &O,
    ) -> LedgerResult<Option<Checkpoint>> {
        if pool.pending_amount == 0 {
            return Ok(None);
        }
        let total = oracle.total_weighted_stake_at(clock.slot)?;
        Ok(pool.seal(clock, total))
    }
}
