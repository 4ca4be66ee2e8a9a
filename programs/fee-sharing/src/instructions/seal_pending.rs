use anchor_lang::prelude::*;
use crate::{batcher::IntervalBatcher, constants::*, error::FeeSharingError, state::{CheckpointPage, Collector, FeePool}};
use super::distribution::{enter, leave, open_page, total_weight_oracle, CheckpointSealed};

/// Seal a pool's pending accrual once the withdrawal interval has passed.
/// Anyone may call; the caller pays for the checkpoint page if it is new.
pub fn handler(ctx: Context<SealPending>) -> Result<()> {
    open_page(&mut ctx.accounts.checkpoint_page, &ctx.accounts.fee_pool, ctx.bumps.checkpoint_page);
    enter(&mut ctx.accounts.collector)?;

    let clock = Clock::get()?;
    let sealed = {
        let total_weight = ctx.accounts.total_weight.to_account_info();
        let data = total_weight.try_borrow_data()?;
        let oracle = total_weight_oracle(&ctx.accounts.collector, total_weight.owner, &data[..])?;
        IntervalBatcher::new(ctx.accounts.collector.withdrawal_interval)
            .trigger(&mut ctx.accounts.fee_pool, &clock, &oracle)?
    };

    match sealed {
        Some(cp) => {
            ctx.accounts.checkpoint_page.append(cp)?;
            emit!(CheckpointSealed {
                pool_id: ctx.accounts.fee_pool.pool_id,
                sender: ctx.accounts.caller.key(),
                index: cp.index,
                slot: cp.slot,
                timestamp: cp.timestamp,
                total_weighted_stake: cp.total_weighted_stake,
                amount: cp.amount,
            });
            msg!("Sealed checkpoint #{}: amount={}", cp.index, cp.amount);
        }
        None => msg!("Nothing pending"),
    }

    leave(&mut ctx.accounts.collector);
    Ok(())
}

#[derive(Accounts)]
pub struct SealPending<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(mut, seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    #[account(
        mut,
        seeds = [POOL_SEED, fee_pool.pool_id.as_ref()],
        bump = fee_pool.bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    #[account(
        init_if_needed,
        payer = caller,
        space = CheckpointPage::LEN,
        seeds = [CHECKPOINT_SEED, fee_pool.pool_id.as_ref(), &fee_pool.open_page().to_le_bytes()],
        bump,
    )]
    pub checkpoint_page: Box<Account<'info, CheckpointPage>>,

    /// CHECK: decoded as the total weight history; address pinned by the collector
    #[account(address = collector.total_weight_history @ FeeSharingError::InvalidOracleAccount)]
    pub total_weight: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
