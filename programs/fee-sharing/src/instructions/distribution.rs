use std::cell::Ref;
use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;
use crate::{
    batcher::IntervalBatcher,
    error::FeeSharingError,
    ledger::PageView,
    oracle::{holder_history, HistoryOracle, TotalWeightView},
    state::{CheckpointPage, Collector, FeePool},
};

// ─── Distribution lock ─────────────────────────────────────────────────────
// Written through to account data so a nested invocation sees it.
pub fn enter(collector: &mut Account<Collector>) -> Result<()> {
    collector.lock()?;
    collector.exit(&crate::ID)
}

pub fn leave(collector: &mut Account<Collector>) {
    collector.unlock();
}

// ─── Weight oracle loading ─────────────────────────────────────────────────
/// Oracle over the total weight history in `data`, read in place.
pub fn total_weight_oracle<'a>(
    collector: &Collector,
    account_owner: &Pubkey,
    data: &'a [u8],
) -> Result<HistoryOracle<'a>> {
    require_keys_eq!(*account_owner, collector.weight_oracle, FeeSharingError::InvalidOracleAccount);
    let total = TotalWeightView::parse(data)?;
    Ok(HistoryOracle::default().with_total(total))
}

pub fn holder_oracle(
    collector: &Collector,
    stake_weight: &AccountInfo,
    owner: &Pubkey,
) -> Result<HistoryOracle<'static>> {
    let data = stake_weight.try_borrow_data()?;
    let holder = holder_history(
        stake_weight.key,
        stake_weight.owner,
        &data[..],
        owner,
        &collector.weight_oracle,
    )?;
    Ok(HistoryOracle::default().with_holder(holder))
}

// ─── Checkpoint pages ──────────────────────────────────────────────────────
// Claims and quotes pass the pages covering their range as remaining accounts.
pub fn borrow_pages<'a, 'info>(
    remaining: &'a [AccountInfo<'info>],
) -> Result<Vec<Ref<'a, &'a mut [u8]>>> {
    remaining
        .iter()
        .map(|info| {
            require_keys_eq!(*info.owner, crate::ID, FeeSharingError::CheckpointMismatch);
            Ok(info.try_borrow_data()?)
        })
        .collect()
}

pub fn page_views<'a>(
    pages: &'a [Ref<'_, &mut [u8]>],
    pool_id: &Pubkey,
) -> Result<Vec<PageView<'a>>> {
    pages
        .iter()
        .map(|data| Ok(PageView::parse(&data[..], pool_id)?))
        .collect()
}

/// Binds the open page to its pool the first time it is used.
pub fn open_page(page: &mut Account<CheckpointPage>, fee_pool: &FeePool, bump: u8) {
    page.open(fee_pool.pool_id, fee_pool.open_page(), bump);
}

// ─── Deposit settlement ────────────────────────────────────────────────────
/// Runs a received amount through the interval batcher, appends a sealed
/// checkpoint to the open page and emits the resulting events. Shared by
/// every deposit path.
pub fn settle_deposit<'info>(
    collector: &Collector,
    total_weight: &AccountInfo<'info>,
    fee_pool: &mut Account<'info, FeePool>,
    checkpoint_page: &mut Account<'info, CheckpointPage>,
    depositor: &Signer<'info>,
    amount: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    let data = total_weight.try_borrow_data()?;
    let oracle = total_weight_oracle(collector, total_weight.owner, &data[..])?;
    let outcome = IntervalBatcher::new(collector.withdrawal_interval)
        .on_deposit(fee_pool, amount, &clock, &oracle)?;

    emit!(FeesDeposited {
        pool_id: fee_pool.pool_id,
        depositor: depositor.key(),
        amount,
        pending_after: outcome.pending,
    });

    match outcome.sealed {
        Some(cp) => {
            checkpoint_page.append(cp)?;
            emit!(CheckpointSealed {
                pool_id: fee_pool.pool_id,
                sender: depositor.key(),
                index: cp.index,
                slot: cp.slot,
                timestamp: cp.timestamp,
                total_weighted_stake: cp.total_weighted_stake,
                amount: cp.amount,
            });
            msg!(
                "Deposit {} sealed checkpoint #{}: amount={} total_weighted_stake={}",
                amount,
                cp.index,
                cp.amount,
                cp.total_weighted_stake
            );
        }
        None => msg!("Deposit {} pending={}", amount, outcome.pending),
    }
    Ok(())
}

#[event]
pub struct FeesDeposited {
    pub pool_id: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub pending_after: u64,
}

#[event]
pub struct CheckpointSealed {
    pub pool_id: Pubkey,
    pub sender: Pubkey,
    pub index: u64,
    pub slot: u64,
    pub timestamp: i64,
    pub total_weighted_stake: u128,
    pub amount: u64,
}
