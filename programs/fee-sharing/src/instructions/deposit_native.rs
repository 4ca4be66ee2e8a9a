use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};
use crate::{constants::*, error::FeeSharingError, state::{CheckpointPage, Collector, FeePool}};
use super::distribution::{enter, leave, open_page, settle_deposit};

/// Deposit lamports into the native pool. The pool account holds them directly.
pub fn handler(ctx: Context<DepositNative>, amount: u64) -> Result<()> {
    require!(amount > 0, FeeSharingError::InvalidAmount);

    if !ctx.accounts.fee_pool.is_initialized() {
        ctx.accounts.fee_pool.init(NATIVE_POOL_ID, Pubkey::default(), ctx.bumps.fee_pool);
        msg!("Native pool opened");
    }
    open_page(&mut ctx.accounts.checkpoint_page, &ctx.accounts.fee_pool, ctx.bumps.checkpoint_page);

    enter(&mut ctx.accounts.collector)?;

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.depositor.to_account_info(),
                to: ctx.accounts.fee_pool.to_account_info(),
            },
        ),
        amount,
    )?;

    settle_deposit(
        &ctx.accounts.collector,
        &ctx.accounts.total_weight,
        &mut ctx.accounts.fee_pool,
        &mut ctx.accounts.checkpoint_page,
        &ctx.accounts.depositor,
        amount,
    )?;

    leave(&mut ctx.accounts.collector);
    Ok(())
}

#[derive(Accounts)]
pub struct DepositNative<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(mut, seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = FeePool::LEN,
        seeds = [POOL_SEED, NATIVE_POOL_ID.as_ref()],
        bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = CheckpointPage::LEN,
        seeds = [CHECKPOINT_SEED, NATIVE_POOL_ID.as_ref(), &fee_pool.open_page().to_le_bytes()],
        bump,
    )]
    pub checkpoint_page: Box<Account<'info, CheckpointPage>>,

    /// CHECK: decoded as the total weight history; address pinned by the collector
    #[account(address = collector.total_weight_history @ FeeSharingError::InvalidOracleAccount)]
    pub total_weight: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
