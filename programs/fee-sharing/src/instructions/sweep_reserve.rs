use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::{constants::*, error::FeeSharingError, reserve::check_sweep, state::Collector};
use super::distribution::{enter, leave};

/// Admin: move `amount` of the wrapped-native reserve to `receiver_token`.
/// Checked against the literal reserve balance only; no ledger bookkeeping.
pub fn handler(ctx: Context<SweepReserve>, amount: u64) -> Result<()> {
    let balance = ctx.accounts.wrapped_reserve.amount;
    let receiver = ctx.accounts.receiver_token.key();

    if !check_sweep(balance, amount)? {
        emit!(ReserveSwept { pool_id: NATIVE_POOL_ID, admin: ctx.accounts.admin.key(), receiver, amount: 0 });
        msg!("Sweep of 0 requested; nothing moved");
        return Ok(());
    }

    enter(&mut ctx.accounts.collector)?;

    let seeds: &[&[u8]] = &[COLLECTOR_SEED, &[ctx.accounts.collector.bump]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.wrapped_reserve.to_account_info(),
                to: ctx.accounts.receiver_token.to_account_info(),
                authority: ctx.accounts.collector.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )?;

    emit!(ReserveSwept { pool_id: NATIVE_POOL_ID, admin: ctx.accounts.admin.key(), receiver, amount });
    msg!("Reserve swept: {} of {} to {}", amount, balance, receiver);

    leave(&mut ctx.accounts.collector);
    Ok(())
}

#[derive(Accounts)]
pub struct SweepReserve<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [COLLECTOR_SEED],
        bump = collector.bump,
        has_one = admin @ FeeSharingError::Unauthorized,
        has_one = wrapped_reserve @ FeeSharingError::MintMismatch,
    )]
    pub collector: Box<Account<'info, Collector>>,

    #[account(mut)]
    pub wrapped_reserve: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = receiver_token.mint == wrapped_reserve.mint @ FeeSharingError::MintMismatch,
    )]
    pub receiver_token: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct ReserveSwept {
    pub pool_id: Pubkey,
    pub admin: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
}
