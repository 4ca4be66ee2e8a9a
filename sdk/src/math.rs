//! Entitlement math.
//!
//! Mirrors the on-chain arithmetic exactly so off-chain estimates match
//! what a claim transaction pays out. Checkpoints are passed as fetched from
//! their pages, sorted by index; entries below `processed_count` are skipped.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::state::{CheckpointState, FeePoolState, StakeWeightsState};

/// Widest batch [`plan_claim`] will build: four pages, within one
/// transaction's account and compute limits.
pub const MAX_CLAIM_CHECKPOINTS: u32 = 256;

// ─── Per-checkpoint share ─────────────────────────────────────────────────────

/// `amount * weight / total`, truncated; weight capped at the denominator.
pub fn pro_rata(amount: u64, weight: u128, total: u128) -> Result<u64> {
    if total == 0 || weight == 0 || amount == 0 {
        return Ok(0);
    }
    let share = (amount as u128)
        .checked_mul(weight.min(total))
        .ok_or(Error::MathOverflow)?
        / total;
    Ok(share as u64)
}

/// Latest weighted stake recorded strictly before `slot`.
pub fn weight_before(holder: &StakeWeightsState, slot: u64) -> u128 {
    let idx = holder.points.partition_point(|(s, _)| *s < slot);
    if idx == 0 { 0 } else { holder.points[idx - 1].1 }
}

pub fn checkpoint_share(cp: &CheckpointState, holder: &StakeWeightsState) -> Result<u64> {
    pro_rata(cp.amount, weight_before(holder, cp.slot), cp.total_weighted_stake)
}

// ─── Entitlement ──────────────────────────────────────────────────────────────

fn unprocessed(checkpoints: &[CheckpointState], processed_count: u64) -> &[CheckpointState] {
    let start = checkpoints.partition_point(|cp| cp.index < processed_count);
    &checkpoints[start..]
}

/// Everything `holder` could still claim given `processed_count`.
pub fn accumulated_entitlement(
    checkpoints:     &[CheckpointState],
    processed_count: u64,
    holder:          &StakeWeightsState,
) -> Result<u64> {
    if holder.is_escrow {
        return Ok(0);
    }
    unprocessed(checkpoints, processed_count)
        .iter()
        .try_fold(0u64, |acc, cp| {
            acc.checked_add(checkpoint_share(cp, holder)?).ok_or(Error::MathOverflow)
        })
}

/// A claim the program will accept: batch size and the amount it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimPlan {
    pub start:           u64,
    pub max_checkpoints: u32,
    pub amount:          u64,
    pub processed_after: u64,
}

impl ClaimPlan {
    /// Checkpoint indices the claim covers.
    pub fn batch(&self) -> Range<u64> {
        self.start..self.processed_after
    }
}

/// Plan the next claim of at most `max` checkpoints.
///
/// A batch whose checkpoints all round to zero would be rejected on-chain,
/// so the batch is widened up to the first paying checkpoint, never past
/// [`MAX_CLAIM_CHECKPOINTS`]. Returns `None` when nothing further can be
/// claimed within that reach.
pub fn plan_claim(
    checkpoints:     &[CheckpointState],
    processed_count: u64,
    holder:          &StakeWeightsState,
    max:             u32,
) -> Result<Option<ClaimPlan>> {
    if max == 0 {
        return Err(Error::InvalidArgument("max_checkpoints must be > 0".into()));
    }
    if holder.is_escrow {
        return Ok(None);
    }
    let max = max.min(MAX_CLAIM_CHECKPOINTS) as usize;
    let pending = unprocessed(checkpoints, processed_count);
    let reach = pending.len().min(MAX_CLAIM_CHECKPOINTS as usize);
    let mut amount = 0u64;
    let mut taken = 0usize;
    while taken < reach && (taken < max || amount == 0) {
        let share = checkpoint_share(&pending[taken], holder)?;
        amount = amount.checked_add(share).ok_or(Error::MathOverflow)?;
        taken += 1;
    }
    if amount == 0 {
        return Ok(None);
    }
    let start = pending[0].index;
    let batch = u32::try_from(taken).map_err(|_| Error::MathOverflow)?;
    Ok(Some(ClaimPlan {
        start,
        max_checkpoints: batch,
        amount,
        processed_after: start + taken as u64,
    }))
}

/// Unix time at which the pool's pending accrual can next be sealed.
pub fn next_seal_time(pool: &FeePoolState, withdrawal_interval: i64) -> i64 {
    pool.last_seal_ts.saturating_add(withdrawal_interval)
}
