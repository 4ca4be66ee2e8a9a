use anchor_lang::prelude::*;
use anchor_spl::token::{spl_token, Mint, Token, TokenAccount};
use crate::{constants::*, error::FeeSharingError, state::Collector};

/// Create the collector PDA and its wrapped-native reserve account.
/// The signer becomes admin; the weight bindings cannot be changed later.
pub fn handler(
    ctx: Context<InitializeCollector>,
    weight_oracle: Pubkey,
    total_weight_history: Pubkey,
    withdrawal_interval: i64,
) -> Result<()> {
    require!(withdrawal_interval > 0, FeeSharingError::InvalidInterval);

    let collector = &mut ctx.accounts.collector;
    collector.admin = ctx.accounts.admin.key();
    collector.weight_oracle = weight_oracle;
    collector.total_weight_history = total_weight_history;
    collector.wrapped_reserve = ctx.accounts.wrapped_reserve.key();
    collector.withdrawal_interval = withdrawal_interval;
    collector.locked = false;
    collector.bump = ctx.bumps.collector;
    collector.sources = Vec::new();

    emit!(CollectorInitialized {
        admin: collector.admin,
        weight_oracle,
        total_weight_history,
        withdrawal_interval,
    });
    msg!(
        "Collector initialized: admin={} oracle={} interval={}s",
        collector.admin,
        weight_oracle,
        withdrawal_interval
    );
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeCollector<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = Collector::LEN,
        seeds = [COLLECTOR_SEED],
        bump,
    )]
    pub collector: Box<Account<'info, Collector>>,

    #[account(address = spl_token::native_mint::ID)]
    pub native_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        seeds = [RESERVE_SEED],
        bump,
        token::mint = native_mint,
        token::authority = collector,
    )]
    pub wrapped_reserve: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct CollectorInitialized {
    pub admin: Pubkey,
    pub weight_oracle: Pubkey,
    pub total_weight_history: Pubkey,
    pub withdrawal_interval: i64,
}
