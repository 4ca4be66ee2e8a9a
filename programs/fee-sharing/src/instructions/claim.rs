use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::{
    constants::*,
    entitlement::ClaimProcessor,
    error::FeeSharingError,
    state::{ClaimCursor, Collector, FeePool},
};
use super::distribution::{borrow_pages, enter, holder_oracle, leave, page_views};

/// Claim the claimant's share of up to `max_checkpoints` unclaimed
/// checkpoints of a token pool. `receiver` defaults to the claimant when
/// left as the default key; the receiver token account must belong to it.
///
/// Remaining accounts: the checkpoint pages covering the batch, in any order.
pub fn handler(ctx: Context<Claim>, max_checkpoints: u32, receiver: Pubkey) -> Result<()> {
    require_keys_neq!(ctx.accounts.fee_pool.pool_id, NATIVE_POOL_ID, FeeSharingError::InvalidPool);

    let claimant = ctx.accounts.claimant.key();
    let receiver = resolve_receiver(receiver, claimant);
    require_keys_eq!(ctx.accounts.receiver_token.owner, receiver, FeeSharingError::InvalidReceiver);

    init_cursor(&mut ctx.accounts.cursor, claimant, ctx.accounts.fee_pool.key(), ctx.bumps.cursor);

    let oracle = holder_oracle(&ctx.accounts.collector, &ctx.accounts.stake_weight, &claimant)?;

    enter(&mut ctx.accounts.collector)?;

    let outcome = {
        let pages = borrow_pages(ctx.remaining_accounts)?;
        let log = page_views(&pages, &ctx.accounts.fee_pool.pool_id)?;
        ClaimProcessor::new(&oracle).claim(
            &claimant,
            &ctx.accounts.fee_pool,
            log.as_slice(),
            &mut ctx.accounts.cursor,
            max_checkpoints,
        )?
    };

    let seeds: &[&[u8]] = &[COLLECTOR_SEED, &[ctx.accounts.collector.bump]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.pool_vault.to_account_info(),
                to: ctx.accounts.receiver_token.to_account_info(),
                authority: ctx.accounts.collector.to_account_info(),
            },
            &[seeds],
        ),
        outcome.amount,
    )?;

    emit!(EntitlementClaimed {
        pool_id: ctx.accounts.fee_pool.pool_id,
        account: claimant,
        receiver,
        amount: outcome.amount,
        processed_count: outcome.processed_count,
    });
    msg!(
        "Claimed {} through checkpoint {}/{}",
        outcome.amount,
        outcome.processed_count,
        ctx.accounts.fee_pool.checkpoint_count()
    );

    leave(&mut ctx.accounts.collector);
    Ok(())
}

pub fn resolve_receiver(receiver: Pubkey, claimant: Pubkey) -> Pubkey {
    if receiver == Pubkey::default() { claimant } else { receiver }
}

pub fn init_cursor(cursor: &mut ClaimCursor, owner: Pubkey, pool: Pubkey, bump: u8) {
    if cursor.owner == Pubkey::default() {
        cursor.owner = owner;
        cursor.pool = pool;
        cursor.processed_count = 0;
        cursor.bump = bump;
    }
}

#[derive(Accounts)]
pub struct Claim<'info> {
    #[account(mut)]
    pub claimant: Signer<'info>,

    #[account(mut, seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    #[account(
        seeds = [POOL_SEED, fee_pool.pool_id.as_ref()],
        bump = fee_pool.bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    #[account(
        mut,
        address = fee_pool.vault @ FeeSharingError::MintMismatch,
    )]
    pub pool_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = claimant,
        space = ClaimCursor::LEN,
        seeds = [CURSOR_SEED, fee_pool.key().as_ref(), claimant.key().as_ref()],
        bump,
    )]
    pub cursor: Box<Account<'info, ClaimCursor>>,

    #[account(
        mut,
        constraint = receiver_token.mint == pool_vault.mint @ FeeSharingError::MintMismatch,
    )]
    pub receiver_token: Box<Account<'info, TokenAccount>>,

    /// CHECK: the claimant's stake weight PDA under the weight program; checked in the handler
    pub stake_weight: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct EntitlementClaimed {
    pub pool_id: Pubkey,
    pub account: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
    pub processed_count: u64,
}
