//! Checkpoint ledger operations on a [`FeePool`] and its [`CheckpointPage`]s.
//!
//! Revenue first lands in the pending buffer; sealing folds the whole buffer
//! into the next checkpoint, stamped with the current slot and the weighted
//! stake denominator, and the handler appends it to the open page.
//! Checkpoints are append-only and never rewritten.
//!
//! Claims read pages in place through [`PageView`], so heap use does not grow
//! with the number of checkpoints a pool holds.

use anchor_lang::prelude::*;
use anchor_lang::Discriminator;
use crate::{
    constants::CHECKPOINTS_PER_PAGE,
    error::{FeeSharingError, LedgerResult},
    state::{Checkpoint, CheckpointPage, FeePool},
};

impl FeePool {
    pub fn init(&mut self, pool_id: Pubkey, vault: Pubkey, bump: u8) {
        self.pool_id = pool_id;
        self.vault = vault;
        self.pending_amount = 0;
        self.last_seal_ts = 0;
        self.checkpoint_count = 0;
        self.bump = bump;
    }

    pub fn record_deposit(&mut self, amount: u64) -> LedgerResult<u64> {
        if amount == 0 {
            return Err(FeeSharingError::InvalidAmount);
        }
        self.pending_amount = self
            .pending_amount
            .checked_add(amount)
            .ok_or(FeeSharingError::MathOverflow)?;
        Ok(self.pending_amount)
    }

    /// Seals the pending amount into the next checkpoint. Nothing pending, nothing sealed.
    pub fn seal(&mut self, clock: &Clock, total_weighted_stake: u128) -> Option<Checkpoint> {
        if self.pending_amount == 0 {
            return None;
        }
        let checkpoint = Checkpoint {
            index: self.checkpoint_count,
            slot: clock.slot,
            timestamp: clock.unix_timestamp,
            total_weighted_stake,
            amount: self.pending_amount,
        };
        self.checkpoint_count += 1;
        self.pending_amount = 0;
        self.last_seal_ts = clock.unix_timestamp;
        Some(checkpoint)
    }

    pub fn checkpoint_count(&self) -> u64 {
        self.checkpoint_count
    }

    /// Checkpoint `index` read through `log`; beyond the sealed count is `OutOfRange`.
    pub fn checkpoint_at<L: CheckpointLog + ?Sized>(&self, log: &L, index: u64) -> LedgerResult<Checkpoint> {
        if index >= self.checkpoint_count {
            return Err(FeeSharingError::OutOfRange);
        }
        log.checkpoint_at(index)
    }

    pub fn pending_accrual(&self) -> u64 {
        self.pending_amount
    }

    pub fn last_seal_time(&self) -> i64 {
        self.last_seal_ts
    }
}

impl CheckpointPage {
    /// Binds a freshly created page to its pool and position.
    pub fn open(&mut self, pool_id: Pubkey, page: u64, bump: u8) {
        if self.pool_id == Pubkey::default() {
            self.pool_id = pool_id;
            self.page = page;
            self.bump = bump;
            self.checkpoints = Vec::new();
        }
    }

    /// Appends the next checkpoint of this page. Gaps and foreign indices are rejected.
    pub fn append(&mut self, checkpoint: Checkpoint) -> LedgerResult<()> {
        let next = self.page * CHECKPOINTS_PER_PAGE + self.checkpoints.len() as u64;
        if checkpoint.index != next || CheckpointPage::page_of(checkpoint.index) != self.page {
            return Err(FeeSharingError::CheckpointMismatch);
        }
        self.checkpoints.push(checkpoint);
        Ok(())
    }
}

/// Random access to the sealed checkpoints a caller has at hand.
pub trait CheckpointLog {
    /// Checkpoint `index`, or `OutOfRange` when it is not held.
    fn checkpoint_at(&self, index: u64) -> LedgerResult<Checkpoint>;
}

impl CheckpointLog for [CheckpointPage] {
    fn checkpoint_at(&self, index: u64) -> LedgerResult<Checkpoint> {
        let page = CheckpointPage::page_of(index);
        self.iter()
            .find(|p| p.page == page)
            .and_then(|p| p.checkpoints.get((index % CHECKPOINTS_PER_PAGE) as usize))
            .copied()
            .ok_or(FeeSharingError::OutOfRange)
    }
}

/// A checkpoint page read in place from account data.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    page: u64,
    entries: &'a [u8],
}

impl<'a> PageView<'a> {
    /// Validates the discriminator, the pool binding and the entry count.
    pub fn parse(data: &'a [u8], pool_id: &Pubkey) -> LedgerResult<Self> {
        if data.len() < CheckpointPage::ENTRIES_OFFSET
            || !data.starts_with(CheckpointPage::DISCRIMINATOR)
            || &data[8..40] != pool_id.as_ref()
        {
            return Err(FeeSharingError::CheckpointMismatch);
        }
        let page = read_u64(data, 40)?;
        let len = read_u32(data, 49)? as usize;
        let end = CheckpointPage::ENTRIES_OFFSET + len * Checkpoint::SIZE;
        if len as u64 > CHECKPOINTS_PER_PAGE || data.len() < end {
            return Err(FeeSharingError::CheckpointMismatch);
        }
        Ok(Self { page, entries: &data[CheckpointPage::ENTRIES_OFFSET..end] })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn len(&self) -> usize {
        self.entries.len() / Checkpoint::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u64) -> LedgerResult<Checkpoint> {
        if CheckpointPage::page_of(index) != self.page {
            return Err(FeeSharingError::OutOfRange);
        }
        let base = (index % CHECKPOINTS_PER_PAGE) as usize * Checkpoint::SIZE;
        let mut raw = self
            .entries
            .get(base..base + Checkpoint::SIZE)
            .ok_or(FeeSharingError::OutOfRange)?;
        let checkpoint =
            Checkpoint::deserialize(&mut raw).map_err(|_| FeeSharingError::CheckpointMismatch)?;
        if checkpoint.index != index {
            return Err(FeeSharingError::CheckpointMismatch);
        }
        Ok(checkpoint)
    }
}

impl<'a> CheckpointLog for [PageView<'a>] {
    fn checkpoint_at(&self, index: u64) -> LedgerResult<Checkpoint> {
        let page = CheckpointPage::page_of(index);
        self.iter()
            .find(|v| v.page == page)
            .ok_or(FeeSharingError::OutOfRange)?
            .get(index)
    }
}

fn read_u64(data: &[u8], offset: usize) -> LedgerResult<u64> {
    data.get(offset..offset + 8)
        .and_then(|b| b.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or(FeeSharingError::CheckpointMismatch)
}

fn read_u32(data: &[u8], offset: usize) -> LedgerResult<u32> {
    data.get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(FeeSharingError::CheckpointMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> FeePool {
        let mut p = FeePool {
            pool_id: Pubkey::default(),
            vault: Pubkey::default(),
            pending_amount: 0,
            last_seal_ts: 0,
            checkpoint_count: 0,
            bump: 0,
        };
        p.init(Pubkey::new_unique(), Pubkey::new_unique(), 254);
        p
    }

    fn empty_page() -> CheckpointPage {
        CheckpointPage { pool_id: Pubkey::default(), page: 0, bump: 0, checkpoints: Vec::new() }
    }

    fn clock(slot: u64, unix_timestamp: i64) -> Clock {
        Clock { slot, unix_timestamp, ..Clock::default() }
    }

    /// Seals `n` checkpoints of amount `10 + i` into as many pages as needed.
    fn sealed(n: u64) -> (FeePool, Vec<CheckpointPage>) {
        let mut p = pool();
        let mut pages: Vec<CheckpointPage> = Vec::new();
        for i in 0..n {
            p.record_deposit(10 + i).unwrap();
            let page_no = p.open_page();
            let cp = p.seal(&clock(i + 1, i as i64), 1).unwrap();
            if pages.last().map(|pg| pg.page) != Some(page_no) {
                let mut page = empty_page();
                page.open(p.pool_id, page_no, 1);
                pages.push(page);
            }
            pages.last_mut().unwrap().append(cp).unwrap();
        }
        (p, pages)
    }

    fn account_bytes(page: &CheckpointPage) -> Vec<u8> {
        let mut data = Vec::new();
        page.try_serialize(&mut data).unwrap();
        data
    }

    #[test]
    fn zero_deposit_is_rejected() {
        let mut p = pool();
        assert!(matches!(p.record_deposit(0), Err(FeeSharingError::InvalidAmount)));
        assert_eq!(p.pending_accrual(), 0);
    }

    #[test]
    fn deposits_accumulate_until_sealed() {
        let mut p = pool();
        p.record_deposit(1_000).unwrap();
        assert_eq!(p.record_deposit(2_000).unwrap(), 3_000);

        let cp = p.seal(&clock(40, 1_700_000_000), 500).unwrap();
        assert_eq!(cp, Checkpoint {
            index: 0,
            slot: 40,
            timestamp: 1_700_000_000,
            total_weighted_stake: 500,
            amount: 3_000,
        });
        assert_eq!(p.pending_accrual(), 0);
        assert_eq!(p.last_seal_time(), 1_700_000_000);
        assert_eq!(p.checkpoint_count(), 1);
    }

    #[test]
    fn seal_without_pending_is_a_no_op() {
        let mut p = pool();
        assert!(p.seal(&clock(1, 100), 10).is_none());
        assert_eq!(p.checkpoint_count(), 0);
        assert_eq!(p.last_seal_time(), 0);
    }

    #[test]
    fn indices_are_dense_across_pages() {
        let n = CHECKPOINTS_PER_PAGE + 5;
        let (p, pages) = sealed(n);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].page, 1);
        for i in 0..n {
            let cp = p.checkpoint_at(pages.as_slice(), i).unwrap();
            assert_eq!(cp.index, i);
            assert_eq!(cp.amount, 10 + i);
        }
        assert!(matches!(p.checkpoint_at(pages.as_slice(), n), Err(FeeSharingError::OutOfRange)));
        assert!(matches!(p.checkpoint_at(pages.as_slice(), u64::MAX), Err(FeeSharingError::OutOfRange)));
    }

    #[test]
    fn page_rejects_gaps_and_foreign_indices() {
        let mut page = empty_page();
        page.open(Pubkey::new_unique(), 1, 7);
        let at = |index| Checkpoint { index, ..Checkpoint::default() };
        assert!(matches!(page.append(at(0)), Err(FeeSharingError::CheckpointMismatch)));
        assert!(matches!(page.append(at(CHECKPOINTS_PER_PAGE + 1)), Err(FeeSharingError::CheckpointMismatch)));
        page.append(at(CHECKPOINTS_PER_PAGE)).unwrap();
        // reopening an existing page keeps its contents
        page.open(Pubkey::new_unique(), 9, 0);
        assert_eq!((page.page, page.bump, page.checkpoints.len()), (1, 7, 1));
    }

    #[test]
    fn page_view_reads_entries_in_place() {
        let (p, pages) = sealed(CHECKPOINTS_PER_PAGE + 3);
        let first = account_bytes(&pages[0]);
        let second = account_bytes(&pages[1]);
        let views = [
            PageView::parse(&first, &p.pool_id).unwrap(),
            PageView::parse(&second, &p.pool_id).unwrap(),
        ];
        assert_eq!(views[1].len(), 3);

        let view_log: &[PageView] = &views;
        for i in [0, 17, CHECKPOINTS_PER_PAGE - 1, CHECKPOINTS_PER_PAGE, CHECKPOINTS_PER_PAGE + 2] {
            assert_eq!(view_log.checkpoint_at(i).unwrap(), pages.as_slice().checkpoint_at(i).unwrap());
        }
        assert!(matches!(view_log.checkpoint_at(CHECKPOINTS_PER_PAGE + 3), Err(FeeSharingError::OutOfRange)));
        assert!(matches!(views[0].get(CHECKPOINTS_PER_PAGE), Err(FeeSharingError::OutOfRange)));
    }

    #[test]
    fn page_view_checks_binding() {
        let (p, pages) = sealed(2);
        let data = account_bytes(&pages[0]);
        assert!(matches!(
            PageView::parse(&data, &Pubkey::new_unique()),
            Err(FeeSharingError::CheckpointMismatch)
        ));
        assert!(matches!(
            PageView::parse(&data[..data.len() - 1], &p.pool_id),
            Err(FeeSharingError::CheckpointMismatch)
        ));
        let mut forged = data.clone();
        forged[0] ^= 1;
        assert!(matches!(PageView::parse(&forged, &p.pool_id), Err(FeeSharingError::CheckpointMismatch)));
    }

    #[test]
    fn pending_overflow_is_reported() {
        let mut p = pool();
        p.record_deposit(u64::MAX).unwrap();
        assert!(matches!(p.record_deposit(1), Err(FeeSharingError::MathOverflow)));
    }
}
