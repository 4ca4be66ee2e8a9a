use anchor_lang::prelude::*;
use crate::{
    constants::{CHECKPOINTS_PER_PAGE, MAX_SOURCES},
    error::{FeeSharingError, LedgerResult},
};

// ─── Collector ─────────────────────────────────────────────────────────────
// Singleton config + authority PDA. Owns every pool vault and the wrapped
// reserve, and carries the distribution lock.
#[account]
pub struct Collector {
    pub admin: Pubkey,                  // 32
    /// Program that owns the stake weight history accounts
    pub weight_oracle: Pubkey,          // 32
    /// Account holding the total weighted stake history
    pub total_weight_history: Pubkey,   // 32
    /// Wrapped-native token account swept by the admin
    pub wrapped_reserve: Pubkey,        // 32
    /// Minimum seconds between two seals of a pool
    pub withdrawal_interval: i64,       // 8
    /// Set while a distribution step is in progress
    pub locked: bool,                   // 1
    pub bump: u8,                       // 1
    /// Whitelisted fee sources
    pub sources: Vec<Pubkey>,           // 4 + 32 * MAX_SOURCES
}

impl Collector {
    // 8 + 32*4 + 8 + 1 + 1 + 4 + 32*16 = 662
    pub const LEN: usize = 8 + 32 * 4 + 8 + 1 + 1 + 4 + 32 * MAX_SOURCES;

    pub fn lock(&mut self) -> LedgerResult<()> {
        if self.locked {
            return Err(FeeSharingError::Reentrancy);
        }
        self.locked = true;
        Ok(())
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_whitelisted(&self, source: &Pubkey) -> bool {
        self.sources.contains(source)
    }

    /// Returns `true` when the source was not yet listed.
    pub fn add_source(&mut self, source: Pubkey) -> LedgerResult<bool> {
        if source == Pubkey::default() {
            return Err(FeeSharingError::InvalidSource);
        }
        if self.is_whitelisted(&source) {
            return Ok(false);
        }
        if self.sources.len() >= MAX_SOURCES {
            return Err(FeeSharingError::SourceListFull);
        }
        self.sources.push(source);
        Ok(true)
    }

    /// Returns `true` when the source was listed.
    pub fn remove_source(&mut self, source: &Pubkey) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s != source);
        self.sources.len() != before
    }
}

// ─── Checkpoint ────────────────────────────────────────────────────────────
// One sealed batch of revenue and the denominator it is shared against.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    /// Position in the pool's checkpoint sequence
    pub index: u64,                     // 8
    pub slot: u64,                      // 8
    pub timestamp: i64,                 // 8
    /// Total non-escrow weighted stake before `slot`
    pub total_weighted_stake: u128,     // 16
    /// Amount sealed at this checkpoint, not cumulative
    pub amount: u64,                    // 8
}

impl Checkpoint {
    pub const SIZE: usize = 8 + 8 + 8 + 16 + 8;
}

// ─── CheckpointPage ────────────────────────────────────────────────────────
// Fixed-capacity slice of a pool's checkpoints: page p holds indices
// [p * CHECKPOINTS_PER_PAGE, (p + 1) * CHECKPOINTS_PER_PAGE).
#[account]
pub struct CheckpointPage {
    pub pool_id: Pubkey,                // 32
    pub page: u64,                      // 8
    pub bump: u8,                       // 1
    pub checkpoints: Vec<Checkpoint>,   // 4 + CHECKPOINTS_PER_PAGE * Checkpoint::SIZE
}

impl CheckpointPage {
    // 8 + 32+8+1 + 4 + 64*48 = 3125
    pub const LEN: usize = Self::ENTRIES_OFFSET + CHECKPOINTS_PER_PAGE as usize * Checkpoint::SIZE;
    /// Byte offset of the first entry in account data
    pub const ENTRIES_OFFSET: usize = 8 + 32 + 8 + 1 + 4;

    pub fn page_of(index: u64) -> u64 {
        index / CHECKPOINTS_PER_PAGE
    }
}

// ─── FeePool ───────────────────────────────────────────────────────────────
// Ledger head for one payout asset (mint) or the native reserve. The sealed
// checkpoints live in CheckpointPage accounts.
#[account]
pub struct FeePool {
    /// Mint, or NATIVE_POOL_ID
    pub pool_id: Pubkey,                // 32
    /// Token vault; default for the native pool
    pub vault: Pubkey,                  // 32
    /// Revenue received since the last seal
    pub pending_amount: u64,            // 8
    /// Unix time of the last seal, 0 before the first
    pub last_seal_ts: i64,              // 8
    pub checkpoint_count: u64,          // 8
    pub bump: u8,                       // 1
}

impl FeePool {
    // 8 + 32+32+8+8+8+1 = 97
    pub const LEN: usize = 97;

    pub fn is_initialized(&self) -> bool {
        self.pool_id != Pubkey::default()
    }

    /// Page that receives the next sealed checkpoint.
    pub fn open_page(&self) -> u64 {
        CheckpointPage::page_of(self.checkpoint_count)
    }
}

// ─── ClaimCursor ───────────────────────────────────────────────────────────
// Index of the next unclaimed checkpoint for one (pool, owner) pair.
#[account]
pub struct ClaimCursor {
    pub owner: Pubkey,                  // 32
    pub pool: Pubkey,                   // 32
    pub processed_count: u64,           // 8
    pub bump: u8,                       // 1
}

impl ClaimCursor {
    // 8 + 32+32+8+1 = 81
    pub const LEN: usize = 81;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> Collector {
        Collector {
            admin: Pubkey::new_unique(),
            weight_oracle: Pubkey::new_unique(),
            total_weight_history: Pubkey::new_unique(),
            wrapped_reserve: Pubkey::new_unique(),
            withdrawal_interval: 86_400,
            locked: false,
            bump: 255,
            sources: Vec::new(),
        }
    }

    #[test]
    fn lock_is_exclusive() {
        let mut c = collector();
        c.lock().unwrap();
        assert!(matches!(c.lock(), Err(FeeSharingError::Reentrancy)));
        c.unlock();
        assert!(c.lock().is_ok());
    }

    #[test]
    fn source_membership_is_idempotent() {
        let mut c = collector();
        let source = Pubkey::new_unique();
        assert!(c.add_source(source).unwrap());
        assert!(!c.add_source(source).unwrap());
        assert_eq!(c.sources.len(), 1);
        assert!(c.remove_source(&source));
        assert!(!c.remove_source(&source));
        assert!(!c.is_whitelisted(&source));
    }

    #[test]
    fn default_key_is_not_a_source() {
        let mut c = collector();
        assert!(matches!(c.add_source(Pubkey::default()), Err(FeeSharingError::InvalidSource)));
    }

    #[test]
    fn whitelist_is_bounded() {
        let mut c = collector();
        for _ in 0..MAX_SOURCES {
            c.add_source(Pubkey::new_unique()).unwrap();
        }
        assert!(matches!(c.add_source(Pubkey::new_unique()), Err(FeeSharingError::SourceListFull)));
    }

    #[test]
    fn account_sizes_match_layout() {
        let pool = FeePool {
            pool_id: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            pending_amount: 0,
            last_seal_ts: 0,
            checkpoint_count: 0,
            bump: 1,
        };
        let mut data = Vec::new();
        pool.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), FeePool::LEN);

        let page = CheckpointPage {
            pool_id: Pubkey::new_unique(),
            page: 3,
            bump: 1,
            checkpoints: vec![Checkpoint::default(); CHECKPOINTS_PER_PAGE as usize],
        };
        data.clear();
        page.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), CheckpointPage::LEN);

        let mut c = collector();
        for _ in 0..MAX_SOURCES {
            c.add_source(Pubkey::new_unique()).unwrap();
        }
        data.clear();
        c.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), Collector::LEN);
    }

    #[test]
    fn pages_partition_indices() {
        assert_eq!(CheckpointPage::page_of(0), 0);
        assert_eq!(CheckpointPage::page_of(CHECKPOINTS_PER_PAGE - 1), 0);
        assert_eq!(CheckpointPage::page_of(CHECKPOINTS_PER_PAGE), 1);
    }
}
