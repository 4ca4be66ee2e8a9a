//! Resumable pro-rata claims over sealed checkpoints.
//!
//! An account's share of checkpoint `i` is
//! `amount_i * weight(account, slot_i) / total_i`, truncated per checkpoint.
//! The cursor records how many checkpoints the account has been paid for;
//! each claim walks at most `max_checkpoints` of the remainder in order,
//! reading them through whatever [`CheckpointLog`] the caller supplies.

use anchor_lang::prelude::*;
use crate::{
    error::{FeeSharingError, LedgerResult},
    ledger::CheckpointLog,
    oracle::WeightOracle,
    state::{ClaimCursor, FeePool},
};

/// Share of a single checkpoint. Weight is capped at the denominator.
pub fn pro_rata(amount: u64, weight: u128, total: u128) -> LedgerResult<u64> {
    if total == 0 || weight == 0 || amount == 0 {
        return Ok(0);
    }
    let weight = weight.min(total);
    let share = (amount as u128)
        .checked_mul(weight)
        .ok_or(FeeSharingError::MathOverflow)?
        / total;
    // share <= amount because weight <= total
    Ok(share as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub amount: u64,
    pub processed_count: u64,
}

/// Checkpoints `[start, end)` the next claim of `max_checkpoints` covers.
pub fn claim_range(pool: &FeePool, processed_count: u64, max_checkpoints: u32) -> (u64, u64) {
    let count = pool.checkpoint_count();
    let start = processed_count.min(count);
    (start, start.saturating_add(max_checkpoints as u64).min(count))
}

pub struct ClaimProcessor<'a, O: WeightOracle> {
    oracle: &'a O,
}

impl<'a, O: WeightOracle> ClaimProcessor<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    /// Sum of shares over checkpoints `[start, end)`.
    pub fn entitlement_in_range<L: CheckpointLog + ?Sized>(
        &self,
        account: &Pubkey,
        pool: &FeePool,
        log: &L,
        start: u64,
        end: u64,
    ) -> LedgerResult<u64> {
        let mut total: u64 = 0;
        for index in start..end {
            let cp = pool.checkpoint_at(log, index)?;
            let weight = self.oracle.weighted_stake_at(account, cp.slot)?;
            let share = pro_rata(cp.amount, weight, cp.total_weighted_stake)?;
            total = total.checked_add(share).ok_or(FeeSharingError::MathOverflow)?;
        }
        Ok(total)
    }

    /// Everything `account` could still claim from `pool`.
    pub fn accumulated_entitlement<L: CheckpointLog + ?Sized>(
        &self,
        account: &Pubkey,
        pool: &FeePool,
        log: &L,
        processed_count: u64,
    ) -> LedgerResult<u64> {
        if self.oracle.is_escrow(account) {
            return Ok(0);
        }
        let end = pool.checkpoint_count();
        let start = processed_count.min(end);
        self.entitlement_in_range(account, pool, log, start, end)
    }

    /// Pays out the next batch. The cursor moves only when something is owed.
    pub fn claim<L: CheckpointLog + ?Sized>(
        &self,
        account: &Pubkey,
        pool: &FeePool,
        log: &L,
        cursor: &mut ClaimCursor,
        max_checkpoints: u32,
    ) -> LedgerResult<ClaimOutcome> {
        if max_checkpoints == 0 {
            return Err(FeeSharingError::InvalidBatchSize);
        }
        if self.oracle.is_escrow(account) {
            return Err(FeeSharingError::NothingToClaim);
        }
        let (start, end) = claim_range(pool, cursor.processed_count, max_checkpoints);

        let amount = self.entitlement_in_range(account, pool, log, start, end)?;
        if amount == 0 {
            return Err(FeeSharingError::NothingToClaim);
        }
        cursor.processed_count = end;
        Ok(ClaimOutcome { amount, processed_count: end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHECKPOINTS_PER_PAGE;
    use crate::oracle::{HistoryOracle, StakeWeightHistory, WeightPoint};
    use crate::state::{Checkpoint, CheckpointPage};

    fn ledger(checkpoints: &[(u64, u128, u64)]) -> (FeePool, Vec<CheckpointPage>) {
        let pool_id = Pubkey::new_unique();
        let mut pages: Vec<CheckpointPage> = Vec::new();
        for (i, &(slot, total_weighted_stake, amount)) in checkpoints.iter().enumerate() {
            let index = i as u64;
            if index % CHECKPOINTS_PER_PAGE == 0 {
                pages.push(CheckpointPage {
                    pool_id,
                    page: CheckpointPage::page_of(index),
                    bump: 0,
                    checkpoints: Vec::new(),
                });
            }
            pages.last_mut().unwrap().checkpoints.push(Checkpoint {
                index,
                slot,
                timestamp: slot as i64,
                total_weighted_stake,
                amount,
            });
        }
        let pool = FeePool {
            pool_id,
            vault: Pubkey::new_unique(),
            pending_amount: 0,
            last_seal_ts: 0,
            checkpoint_count: checkpoints.len() as u64,
            bump: 0,
        };
        (pool, pages)
    }

    fn oracle_for(owner: Pubkey, points: &[(u64, u128)], is_escrow: bool) -> HistoryOracle<'static> {
        HistoryOracle::default().with_holder(StakeWeightHistory {
            owner,
            is_escrow,
            points: points
                .iter()
                .map(|&(slot, weighted_stake)| WeightPoint { slot, weighted_stake })
                .collect(),
        })
    }

    fn cursor(owner: Pubkey) -> ClaimCursor {
        ClaimCursor { owner, pool: Pubkey::new_unique(), processed_count: 0, bump: 0 }
    }

    #[test]
    fn pro_rata_truncates() {
        assert_eq!(pro_rata(1_000, 7, 10).unwrap(), 700);
        assert_eq!(pro_rata(1_000, 3, 10).unwrap(), 300);
        assert_eq!(pro_rata(10, 1, 3).unwrap(), 3);
        assert_eq!(pro_rata(10, 2, 3).unwrap(), 6);
    }

    #[test]
    fn pro_rata_edges() {
        assert_eq!(pro_rata(1_000, 5, 0).unwrap(), 0);
        assert_eq!(pro_rata(1_000, 0, 10).unwrap(), 0);
        assert_eq!(pro_rata(1_000, 50, 10).unwrap(), 1_000);
        assert_eq!(pro_rata(u64::MAX, 1 << 60, 1 << 61).unwrap(), u64::MAX / 2);
        assert!(matches!(
            pro_rata(u64::MAX, u128::MAX / 2, u128::MAX),
            Err(FeeSharingError::MathOverflow)
        ));
    }

    #[test]
    fn stake_in_sealing_slot_does_not_count() {
        let owner = Pubkey::new_unique();
        let (p, pages) = ledger(&[(100, 10, 1_000), (200, 10, 1_000)]);
        let oracle = oracle_for(owner, &[(100, 10)], false);
        let processor = ClaimProcessor::new(&oracle);
        assert_eq!(processor.accumulated_entitlement(&owner, &p, pages.as_slice(), 0).unwrap(), 1_000);
    }

    #[test]
    fn batched_claims_equal_single_claim() {
        let owner = Pubkey::new_unique();
        let (p, pages) = ledger(&[(10, 30, 900), (20, 30, 333), (30, 60, 1_000), (40, 60, 7)]);
        let log = pages.as_slice();
        let oracle = oracle_for(owner, &[(1, 10), (25, 20)], false);
        let processor = ClaimProcessor::new(&oracle);

        let expected = processor.accumulated_entitlement(&owner, &p, log, 0).unwrap();
        assert_eq!(expected, 300 + 111 + 333 + 2);

        let mut one_by_one = cursor(owner);
        let mut paid = 0;
        for i in 1..=4 {
            let out = processor.claim(&owner, &p, log, &mut one_by_one, 1).unwrap();
            assert_eq!(out.processed_count, i);
            paid += out.amount;
        }
        assert_eq!(paid, expected);

        let mut all_at_once = cursor(owner);
        let out = processor.claim(&owner, &p, log, &mut all_at_once, 100).unwrap();
        assert_eq!(out, ClaimOutcome { amount: expected, processed_count: 4 });

        assert!(matches!(
            processor.claim(&owner, &p, log, &mut all_at_once, 1),
            Err(FeeSharingError::NothingToClaim)
        ));
        assert_eq!(all_at_once.processed_count, 4);
    }

    #[test]
    fn claims_cross_page_boundaries() {
        let owner = Pubkey::new_unique();
        let n = CHECKPOINTS_PER_PAGE as usize + 10;
        let entries: Vec<(u64, u128, u64)> = (0..n).map(|i| (i as u64 + 10, 4, 100)).collect();
        let (p, pages) = ledger(&entries);
        let oracle = oracle_for(owner, &[(1, 1)], false);
        let processor = ClaimProcessor::new(&oracle);

        let mut c = cursor(owner);
        c.processed_count = CHECKPOINTS_PER_PAGE - 2;
        // only the two pages the batch touches are supplied
        let out = processor.claim(&owner, &p, pages.as_slice(), &mut c, 5).unwrap();
        assert_eq!(out, ClaimOutcome { amount: 5 * 25, processed_count: CHECKPOINTS_PER_PAGE + 3 });

        // a batch reaching a page that was not supplied fails as a whole
        let first_page_only = &pages[..1];
        let mut fresh = cursor(owner);
        fresh.processed_count = CHECKPOINTS_PER_PAGE - 1;
        assert!(matches!(
            processor.claim(&owner, &p, first_page_only, &mut fresh, 2),
            Err(FeeSharingError::OutOfRange)
        ));
        assert_eq!(fresh.processed_count, CHECKPOINTS_PER_PAGE - 1);
    }

    #[test]
    fn batch_is_capped_by_count() {
        let (p, _) = ledger(&[(1, 1, 1), (2, 1, 1), (3, 1, 1)]);
        assert_eq!(claim_range(&p, 0, 2), (0, 2));
        assert_eq!(claim_range(&p, 2, u32::MAX), (2, 3));
        assert_eq!(claim_range(&p, 9, 1), (3, 3));
    }

    #[test]
    fn zero_batch_is_invalid() {
        let owner = Pubkey::new_unique();
        let (p, pages) = ledger(&[(10, 1, 1)]);
        let oracle = oracle_for(owner, &[(1, 1)], false);
        let mut c = cursor(owner);
        assert!(matches!(
            ClaimProcessor::new(&oracle).claim(&owner, &p, pages.as_slice(), &mut c, 0),
            Err(FeeSharingError::InvalidBatchSize)
        ));
    }

    #[test]
    fn empty_batch_keeps_cursor() {
        let owner = Pubkey::new_unique();
        // stake arrives after the first checkpoint
        let (p, pages) = ledger(&[(10, 10, 500), (20, 10, 500)]);
        let log = pages.as_slice();
        let oracle = oracle_for(owner, &[(15, 10)], false);
        let processor = ClaimProcessor::new(&oracle);
        let mut c = cursor(owner);

        assert!(matches!(
            processor.claim(&owner, &p, log, &mut c, 1),
            Err(FeeSharingError::NothingToClaim)
        ));
        assert_eq!(c.processed_count, 0);

        let out = processor.claim(&owner, &p, log, &mut c, 2).unwrap();
        assert_eq!(out, ClaimOutcome { amount: 500, processed_count: 2 });
    }

    #[test]
    fn escrow_is_never_entitled() {
        let owner = Pubkey::new_unique();
        let (p, pages) = ledger(&[(10, 10, 1_000)]);
        let oracle = oracle_for(owner, &[(1, 10)], true);
        let processor = ClaimProcessor::new(&oracle);
        let mut c = cursor(owner);

        assert_eq!(processor.accumulated_entitlement(&owner, &p, pages.as_slice(), 0).unwrap(), 0);
        assert!(matches!(
            processor.claim(&owner, &p, pages.as_slice(), &mut c, 10),
            Err(FeeSharingError::NothingToClaim)
        ));
        assert_eq!(c.processed_count, 0);
    }

    #[test]
    fn no_checkpoints_nothing_to_claim() {
        let owner = Pubkey::new_unique();
        let (p, pages) = ledger(&[]);
        let oracle = oracle_for(owner, &[(1, 10)], false);
        let mut c = cursor(owner);
        assert!(matches!(
            ClaimProcessor::new(&oracle).claim(&owner, &p, pages.as_slice(), &mut c, 5),
            Err(FeeSharingError::NothingToClaim)
        ));
    }
}
