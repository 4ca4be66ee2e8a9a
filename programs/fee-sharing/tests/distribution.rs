//! End-to-end scenarios over the pure distribution core: deposits through the
//! interval batcher into checkpoint pages, then claims through the claim
//! processor, with an in-memory weight oracle.

use std::collections::{HashMap, HashSet};

use anchor_lang::prelude::{Clock, Pubkey};
use fee_sharing::{
    batcher::{DepositOutcome, IntervalBatcher},
    entitlement::ClaimProcessor,
    error::{FeeSharingError, LedgerResult},
    oracle::WeightOracle,
    state::{CheckpointPage, ClaimCursor, FeePool},
    CHECKPOINTS_PER_PAGE, DEFAULT_WITHDRAWAL_INTERVAL,
};

const T0: i64 = 1_700_000_000;
const DAY: i64 = DEFAULT_WITHDRAWAL_INTERVAL;

/// Stake recorded per slot; lookups return the value before the queried slot.
#[derive(Default)]
struct MemoryOracle {
    stakes: HashMap<Pubkey, Vec<(u64, u128)>>,
    escrows: HashSet<Pubkey>,
}

impl MemoryOracle {
    fn stake(&mut self, account: Pubkey, slot: u64, weighted_stake: u128) {
        self.stakes.entry(account).or_default().push((slot, weighted_stake));
    }

    fn escrow(&mut self, account: Pubkey, slot: u64, weighted_stake: u128) {
        self.escrows.insert(account);
        self.stake(account, slot, weighted_stake);
    }

    fn before(points: &[(u64, u128)], slot: u64) -> u128 {
        points
            .iter()
            .filter(|(s, _)| *s < slot)
            .last()
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }
}

impl WeightOracle for MemoryOracle {
    fn weighted_stake_at(&self, account: &Pubkey, slot: u64) -> LedgerResult<u128> {
        Ok(self
            .stakes
            .get(account)
            .map(|p| Self::before(p, slot))
            .unwrap_or(0))
    }

    fn total_weighted_stake_at(&self, slot: u64) -> LedgerResult<u128> {
        Ok(self
            .stakes
            .iter()
            .filter(|(k, _)| !self.escrows.contains(k))
            .map(|(_, p)| Self::before(p, slot))
            .sum())
    }

    fn is_escrow(&self, account: &Pubkey) -> bool {
        self.escrows.contains(account)
    }
}

/// A pool head plus the pages its sealed checkpoints were appended to.
struct Ledger {
    pool: FeePool,
    pages: Vec<CheckpointPage>,
}

impl Ledger {
    fn new() -> Self {
        let mut pool = FeePool {
            pool_id: Pubkey::default(),
            vault: Pubkey::default(),
            pending_amount: 0,
            last_seal_ts: 0,
            checkpoint_count: 0,
            bump: 0,
        };
        pool.init(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        Self { pool, pages: Vec::new() }
    }

    fn deposit<O: WeightOracle>(
        &mut self,
        batcher: &IntervalBatcher,
        amount: u64,
        clock: &Clock,
        oracle: &O,
    ) -> LedgerResult<DepositOutcome> {
        let page = self.pool.open_page();
        let outcome = batcher.on_deposit(&mut self.pool, amount, clock, oracle)?;
        if let Some(cp) = outcome.sealed {
            if self.pages.last().map(|p| p.page) != Some(page) {
                let mut fresh = CheckpointPage {
                    pool_id: Pubkey::default(),
                    page: 0,
                    bump: 0,
                    checkpoints: Vec::new(),
                };
                fresh.open(self.pool.pool_id, page, 254);
                self.pages.push(fresh);
            }
            if let Some(open) = self.pages.last_mut() {
                open.append(cp)?;
            }
        }
        Ok(outcome)
    }

    fn log(&self) -> &[CheckpointPage] {
        self.pages.as_slice()
    }
}

fn cursor(owner: Pubkey, pool: &FeePool) -> ClaimCursor {
    ClaimCursor { owner, pool: pool.pool_id, processed_count: 0, bump: 255 }
}

fn at(slot: u64, unix_timestamp: i64) -> Clock {
    Clock { slot, unix_timestamp, ..Clock::default() }
}

#[test]
fn two_holders_split_seven_to_three() {
    let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
    let mut oracle = MemoryOracle::default();
    oracle.stake(alice, 1, 700);
    oracle.stake(bob, 1, 300);

    let batcher = IntervalBatcher::new(DAY);
    let mut ledger = Ledger::new();
    ledger.deposit(&batcher, 1_001, &at(10, T0), &oracle).unwrap();
    assert_eq!(ledger.pool.checkpoint_at(ledger.log(), 0).unwrap().total_weighted_stake, 1_000);

    let processor = ClaimProcessor::new(&oracle);
    let a = processor.claim(&alice, &ledger.pool, ledger.log(), &mut cursor(alice, &ledger.pool), 10).unwrap();
    let b = processor.claim(&bob, &ledger.pool, ledger.log(), &mut cursor(bob, &ledger.pool), 10).unwrap();
    assert_eq!(a.amount, 700);
    assert_eq!(b.amount, 300);
    // one unit of truncation dust stays in the pool
    assert!(a.amount + b.amount <= 1_001);
}

#[test]
fn interval_batching_then_claims_in_order() {
    let holder = Pubkey::new_unique();
    let mut oracle = MemoryOracle::default();
    oracle.stake(holder, 1, 50);

    let batcher = IntervalBatcher::new(DAY);
    let mut ledger = Ledger::new();
    ledger.deposit(&batcher, 1_000, &at(10, T0), &oracle).unwrap();
    ledger.deposit(&batcher, 2_000, &at(20, T0 + 60), &oracle).unwrap();
    assert_eq!((ledger.pool.checkpoint_count(), ledger.pool.pending_accrual()), (1, 2_000));

    ledger.deposit(&batcher, 4_000, &at(30, T0 + DAY), &oracle).unwrap();
    assert_eq!(ledger.pool.checkpoint_count(), 2);
    assert_eq!(ledger.pool.checkpoint_at(ledger.log(), 1).unwrap().amount, 6_000);
    assert_eq!(ledger.pool.pending_accrual(), 0);

    let processor = ClaimProcessor::new(&oracle);
    let mut c = cursor(holder, &ledger.pool);
    assert_eq!(processor.accumulated_entitlement(&holder, &ledger.pool, ledger.log(), 0).unwrap(), 7_000);

    let first = processor.claim(&holder, &ledger.pool, ledger.log(), &mut c, 1).unwrap();
    assert_eq!((first.amount, c.processed_count), (1_000, 1));
    let second = processor.claim(&holder, &ledger.pool, ledger.log(), &mut c, 1).unwrap();
    assert_eq!((second.amount, c.processed_count), (6_000, 2));
    assert!(matches!(
        processor.claim(&holder, &ledger.pool, ledger.log(), &mut c, 1),
        Err(FeeSharingError::NothingToClaim)
    ));
}

#[test]
fn late_staker_gets_nothing_from_earlier_checkpoints() {
    let (early, late) = (Pubkey::new_unique(), Pubkey::new_unique());
    let mut oracle = MemoryOracle::default();
    oracle.stake(early, 1, 100);
    // staked in the very slot the first checkpoint is sealed
    oracle.stake(late, 10, 100);

    let batcher = IntervalBatcher::new(DAY);
    let mut ledger = Ledger::new();
    ledger.deposit(&batcher, 500, &at(10, T0), &oracle).unwrap();
    ledger.deposit(&batcher, 800, &at(11, T0 + DAY), &oracle).unwrap();

    let processor = ClaimProcessor::new(&oracle);
    assert_eq!(processor.accumulated_entitlement(&early, &ledger.pool, ledger.log(), 0).unwrap(), 500 + 400);
    assert_eq!(processor.accumulated_entitlement(&late, &ledger.pool, ledger.log(), 0).unwrap(), 400);
}

#[test]
fn escrow_is_excluded_from_share_and_denominator() {
    let (holder, escrow) = (Pubkey::new_unique(), Pubkey::new_unique());
    let mut oracle = MemoryOracle::default();
    oracle.stake(holder, 1, 40);
    oracle.escrow(escrow, 1, 960);

    let batcher = IntervalBatcher::new(DAY);
    let mut ledger = Ledger::new();
    ledger.deposit(&batcher, 10_000, &at(5, T0), &oracle).unwrap();

    let processor = ClaimProcessor::new(&oracle);
    let out = processor.claim(&holder, &ledger.pool, ledger.log(), &mut cursor(holder, &ledger.pool), 1).unwrap();
    assert_eq!(out.amount, 10_000);

    let mut escrow_cursor = cursor(escrow, &ledger.pool);
    assert_eq!(processor.accumulated_entitlement(&escrow, &ledger.pool, ledger.log(), 0).unwrap(), 0);
    assert!(matches!(
        processor.claim(&escrow, &ledger.pool, ledger.log(), &mut escrow_cursor, 5),
        Err(FeeSharingError::NothingToClaim)
    ));
    assert_eq!(escrow_cursor.processed_count, 0);
}

#[test]
fn split_claims_match_one_claim() {
    let holder = Pubkey::new_unique();
    let other = Pubkey::new_unique();
    let mut oracle = MemoryOracle::default();
    oracle.stake(holder, 1, 3);
    oracle.stake(other, 1, 7);

    let batcher = IntervalBatcher::new(DAY);
    let mut ledger = Ledger::new();
    for i in 0..7i64 {
        let amount = 1_000 + 137 * i as u64;
        ledger
            .deposit(&batcher, amount, &at(10 + i as u64, T0 + i * DAY), &oracle)
            .unwrap();
    }
    assert_eq!(ledger.pool.checkpoint_count(), 7);

    let processor = ClaimProcessor::new(&oracle);
    let mut whole = cursor(holder, &ledger.pool);
    let all = processor.claim(&holder, &ledger.pool, ledger.log(), &mut whole, u32::MAX).unwrap();
    assert_eq!(all.processed_count, 7);

    let mut pieces = cursor(holder, &ledger.pool);
    let mut paid = 0;
    for batch in [2u32, 1, 3, 5] {
        let out = processor.claim(&holder, &ledger.pool, ledger.log(), &mut pieces, batch).unwrap();
        paid += out.amount;
    }
    assert_eq!(pieces.processed_count, 7);
    assert_eq!(paid, all.amount);
}

#[test]
fn claim_rejects_zero_batch_without_moving_cursor() {
    let holder = Pubkey::new_unique();
    let mut oracle = MemoryOracle::default();
    oracle.stake(holder, 1, 1);
    let mut ledger = Ledger::new();
    ledger
        .deposit(&IntervalBatcher::new(DAY), 10, &at(2, T0), &oracle)
        .unwrap();

    let mut c = cursor(holder, &ledger.pool);
    assert!(matches!(
        ClaimProcessor::new(&oracle).claim(&holder, &ledger.pool, ledger.log(), &mut c, 0),
        Err(FeeSharingError::InvalidBatchSize)
    ));
    assert_eq!(c.processed_count, 0);
}

#[test]
fn pools_are_independent() {
    let holder = Pubkey::new_unique();
    let mut oracle = MemoryOracle::default();
    oracle.stake(holder, 1, 1);

    let batcher = IntervalBatcher::new(DAY);
    let (mut tokens, mut native) = (Ledger::new(), Ledger::new());
    tokens.deposit(&batcher, 100, &at(5, T0), &oracle).unwrap();
    native.deposit(&batcher, 9, &at(6, T0 + 1), &oracle).unwrap();
    native.deposit(&batcher, 1, &at(7, T0 + 2), &oracle).unwrap();

    assert_eq!(tokens.pool.checkpoint_count(), 1);
    assert_eq!((native.pool.checkpoint_count(), native.pool.pending_accrual()), (1, 1));

    let processor = ClaimProcessor::new(&oracle);
    assert_eq!(processor.accumulated_entitlement(&holder, &tokens.pool, tokens.log(), 0).unwrap(), 100);
    assert_eq!(processor.accumulated_entitlement(&holder, &native.pool, native.log(), 0).unwrap(), 9);
}

#[test]
fn long_history_is_claimed_page_by_page() {
    let (early, late) = (Pubkey::new_unique(), Pubkey::new_unique());
    let mut oracle = MemoryOracle::default();
    oracle.stake(early, 1, 1);

    let batcher = IntervalBatcher::new(DAY);
    let mut ledger = Ledger::new();
    let n = 6 * CHECKPOINTS_PER_PAGE;
    for i in 0..n {
        if i == n - 3 {
            oracle.stake(late, 100 + i, 1);
        }
        ledger
            .deposit(&batcher, 10, &at(100 + i + 1, T0 + i as i64 * DAY), &oracle)
            .unwrap();
    }
    assert_eq!(ledger.pool.checkpoint_count(), n);
    assert_eq!(ledger.pages.len(), 6);
    assert!(ledger.pages.iter().all(|p| p.checkpoints.len() as u64 == CHECKPOINTS_PER_PAGE));

    let processor = ClaimProcessor::new(&oracle);
    // the late staker shares the last three checkpoints, the only ones on the last page it needs
    let mut c = cursor(late, &ledger.pool);
    c.processed_count = n - 3;
    let out = processor.claim(&late, &ledger.pool, &ledger.pages[5..], &mut c, 10).unwrap();
    assert_eq!((out.amount, out.processed_count), (3 * 5, n));

    // the early holder walks every page, one claim per page
    let mut c = cursor(early, &ledger.pool);
    let mut paid = 0;
    for page in 0..6usize {
        let out = processor
            .claim(&early, &ledger.pool, &ledger.pages[page..=page], &mut c, CHECKPOINTS_PER_PAGE as u32)
            .unwrap();
        paid += out.amount;
    }
    assert_eq!(c.processed_count, n);
    assert_eq!(paid, 10 * (n - 3) + 3 * 5);
}
