//! Read side of the stake weight program.
//!
//! The weight program records, per account, a history of weighted stake
//! points and, globally, a history of total and escrow weighted stake. Every
//! lookup answers with the latest point recorded strictly before the queried
//! slot, so stake added in the slot a checkpoint is sealed never counts
//! toward that checkpoint.

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use crate::{
    constants::STAKE_WEIGHT_SEED,
    error::{FeeSharingError, LedgerResult},
};

/// What the distribution core needs to know about stake.
pub trait WeightOracle {
    /// Weighted stake of `account` as recorded before `slot`.
    fn weighted_stake_at(&self, account: &Pubkey, slot: u64) -> LedgerResult<u128>;

    /// Total non-escrow weighted stake as recorded before `slot`.
    fn total_weighted_stake_at(&self, slot: u64) -> LedgerResult<u128>;

    /// Vesting escrows never receive a share.
    fn is_escrow(&self, account: &Pubkey) -> bool;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightPoint {
    pub slot: u64,
    pub weighted_stake: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotalWeightPoint {
    pub slot: u64,
    pub total_weighted_stake: u128,
    pub escrow_weighted_stake: u128,
}

/// Per-account history, sorted by slot.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StakeWeightHistory {
    pub owner: Pubkey,
    pub is_escrow: bool,
    pub points: Vec<WeightPoint>,
}

/// Global history, sorted by slot.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TotalWeightHistory {
    pub points: Vec<TotalWeightPoint>,
}

impl StakeWeightHistory {
    pub fn value_before(&self, slot: u64) -> u128 {
        let idx = self.points.partition_point(|p| p.slot < slot);
        if idx == 0 { 0 } else { self.points[idx - 1].weighted_stake }
    }
}

/// Total weight history read in place: `8 discriminator | u32 len | len * (slot u64, total u128, escrow u128)`.
/// Only the point a lookup needs is decoded, however long the history grows.
#[derive(Debug, Clone, Copy)]
pub struct TotalWeightView<'a> {
    points: &'a [u8],
}

impl<'a> TotalWeightView<'a> {
    const POINT_SIZE: usize = 8 + 16 + 16;

    pub fn parse(data: &'a [u8]) -> LedgerResult<Self> {
        let len = data
            .get(8..12)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or(FeeSharingError::InvalidOracleAccount)? as usize;
        let end = len
            .checked_mul(Self::POINT_SIZE)
            .and_then(|n| n.checked_add(12))
            .ok_or(FeeSharingError::InvalidOracleAccount)?;
        let points = data.get(12..end).ok_or(FeeSharingError::InvalidOracleAccount)?;
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len() / Self::POINT_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn slot_of(&self, i: usize) -> u64 {
        let base = i * Self::POINT_SIZE;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.points[base..base + 8]);
        u64::from_le_bytes(bytes)
    }

    fn point(&self, i: usize) -> LedgerResult<TotalWeightPoint> {
        let base = i * Self::POINT_SIZE;
        let mut raw = &self.points[base..base + Self::POINT_SIZE];
        TotalWeightPoint::deserialize(&mut raw).map_err(|_| FeeSharingError::InvalidOracleAccount)
    }

    /// Non-escrow total of the last point strictly before `slot`.
    pub fn value_before(&self, slot: u64) -> LedgerResult<u128> {
        let (mut lo, mut hi) = (0usize, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.slot_of(mid) < slot {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == 0 {
            return Ok(0);
        }
        let p = self.point(lo - 1)?;
        Ok(p.total_weighted_stake.saturating_sub(p.escrow_weighted_stake))
    }
}

/// Resolves the stake history of `owner` from the account passed for it.
///
/// The account must be the weight program's `[STAKE_WEIGHT_SEED, owner]`
/// PDA. An account that was never created (empty and system-owned) is an
/// owner without stake.
pub fn holder_history(
    key: &Pubkey,
    account_owner: &Pubkey,
    data: &[u8],
    owner: &Pubkey,
    weight_oracle: &Pubkey,
) -> LedgerResult<StakeWeightHistory> {
    let (expected, _) =
        Pubkey::find_program_address(&[STAKE_WEIGHT_SEED, owner.as_ref()], weight_oracle);
    if *key != expected {
        return Err(FeeSharingError::InvalidOracleAccount);
    }
    if *account_owner == system_program::ID && data.is_empty() {
        return Ok(StakeWeightHistory { owner: *owner, is_escrow: false, points: Vec::new() });
    }
    if account_owner != weight_oracle {
        return Err(FeeSharingError::InvalidOracleAccount);
    }
    let history: StakeWeightHistory = decode_history(data)?;
    if history.owner != *owner {
        return Err(FeeSharingError::InvalidOracleAccount);
    }
    Ok(history)
}

pub fn decode_history<T: AnchorDeserialize>(data: &[u8]) -> LedgerResult<T> {
    if data.len() < 8 {
        return Err(FeeSharingError::InvalidOracleAccount);
    }
    let mut body: &[u8] = &data[8..];
    T::deserialize(&mut body).map_err(|_| FeeSharingError::InvalidOracleAccount)
}

/// Oracle backed by the history accounts a transaction supplies.
/// Deposits need only `total`, claims only `holder`.
#[derive(Default)]
pub struct HistoryOracle<'a> {
    total: Option<TotalWeightView<'a>>,
    holder: Option<StakeWeightHistory>,
}

impl<'a> HistoryOracle<'a> {
    pub fn with_total(mut self, total: TotalWeightView<'a>) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_holder(mut self, holder: StakeWeightHistory) -> Self {
        self.holder = Some(holder);
        self
    }
}

impl<'a> WeightOracle for HistoryOracle<'a> {
    fn weighted_stake_at(&self, account: &Pubkey, slot: u64) -> LedgerResult<u128> {
        match &self.holder {
            Some(h) if h.owner == *account => Ok(h.value_before(slot)),
            _ => Err(FeeSharingError::InvalidOracleAccount),
        }
    }

    fn total_weighted_stake_at(&self, slot: u64) -> LedgerResult<u128> {
        self.total
            .as_ref()
            .ok_or(FeeSharingError::InvalidOracleAccount)?
            .value_before(slot)
    }

    fn is_escrow(&self, account: &Pubkey) -> bool {
        matches!(&self.holder, Some(h) if h.owner == *account && h.is_escrow)
    }
}
