use anchor_lang::prelude::*;
use crate::{
    constants::*,
    entitlement::ClaimProcessor,
    state::{ClaimCursor, Collector, FeePool},
};
use super::distribution::{borrow_pages, holder_oracle, page_views};

/// Read-only: emits what `account` could claim from a pool right now.
/// Meant for simulation; no state changes.
///
/// Remaining accounts: every checkpoint page from the account's cursor on.
pub fn handler(ctx: Context<QuoteEntitlement>) -> Result<()> {
    let account = ctx.accounts.account.key();
    let processed_count = {
        let info = ctx.accounts.cursor.to_account_info();
        if info.owner == &crate::ID && !info.data_is_empty() {
            let data = info.try_borrow_data()?;
            ClaimCursor::try_deserialize(&mut &data[..])?.processed_count
        } else {
            0
        }
    };

    let oracle = holder_oracle(&ctx.accounts.collector, &ctx.accounts.stake_weight, &account)?;
    let pages = borrow_pages(ctx.remaining_accounts)?;
    let log = page_views(&pages, &ctx.accounts.fee_pool.pool_id)?;
    let entitlement = ClaimProcessor::new(&oracle).accumulated_entitlement(
        &account,
        &ctx.accounts.fee_pool,
        log.as_slice(),
        processed_count,
    )?;

    emit!(EntitlementQuote {
        pool_id: ctx.accounts.fee_pool.pool_id,
        account,
        processed_count,
        checkpoint_count: ctx.accounts.fee_pool.checkpoint_count(),
        pending_accrual: ctx.accounts.fee_pool.pending_accrual(),
        entitlement,
    });
    msg!("Entitlement {} ({} unprocessed checkpoints)",
        entitlement,
        ctx.accounts.fee_pool.checkpoint_count().saturating_sub(processed_count));
    Ok(())
}

#[derive(Accounts)]
pub struct QuoteEntitlement<'info> {
    #[account(seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    #[account(
        seeds = [POOL_SEED, fee_pool.pool_id.as_ref()],
        bump = fee_pool.bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    /// CHECK: any account; only its key is used
    pub account: UncheckedAccount<'info>,

    /// CHECK: cursor PDA, possibly not created yet
    #[account(seeds = [CURSOR_SEED, fee_pool.key().as_ref(), account.key().as_ref()], bump)]
    pub cursor: UncheckedAccount<'info>,

    /// CHECK: the account's stake weight PDA under the weight program; checked in the handler
    pub stake_weight: UncheckedAccount<'info>,
}

#[event]
pub struct EntitlementQuote {
    pub pool_id: Pubkey,
    pub account: Pubkey,
    pub processed_count: u64,
    pub checkpoint_count: u64,
    pub pending_accrual: u64,
    pub entitlement: u64,
}
